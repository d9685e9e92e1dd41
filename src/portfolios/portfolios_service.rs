use log::debug;
use std::sync::Arc;

use crate::db::DbPool;
use crate::errors::Result;
use crate::holdings::HoldingRepository;

use super::portfolios_model::{
    aggregate_positions, value_position, HoldingPosition, NewPortfolio, Portfolio,
    PortfolioSummary, PortfolioUpdate,
};
use super::portfolios_repository::PortfolioRepository;

/// Service for portfolio management and valuation.
///
/// Valuation is a pure read path: it joins open positions with current
/// stock prices and never mutates anything.
pub struct PortfolioService {
    repository: PortfolioRepository,
    holding_repository: HoldingRepository,
}

impl PortfolioService {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self {
            repository: PortfolioRepository::new(pool.clone()),
            holding_repository: HoldingRepository::new(pool),
        }
    }

    pub fn create_portfolio(&self, user_id: &str, new_portfolio: NewPortfolio) -> Result<Portfolio> {
        new_portfolio.validate()?;
        debug!("Creating portfolio '{}' for user {}", new_portfolio.name, user_id);
        self.repository.create(user_id, &new_portfolio)
    }

    pub fn get_user_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>> {
        self.repository.list_by_user(user_id)
    }

    pub fn get_portfolio(&self, portfolio_id: &str, user_id: &str) -> Result<Portfolio> {
        self.repository.get_owned(portfolio_id, user_id)
    }

    pub fn update_portfolio(
        &self,
        portfolio_id: &str,
        user_id: &str,
        update: PortfolioUpdate,
    ) -> Result<Portfolio> {
        let portfolio = self.repository.get_owned(portfolio_id, user_id)?;
        self.repository.update(&portfolio, &update)
    }

    /// Lists a portfolio's open positions valued at current prices.
    pub fn get_portfolio_holdings(
        &self,
        portfolio_id: &str,
        user_id: &str,
    ) -> Result<Vec<HoldingPosition>> {
        self.repository.get_owned(portfolio_id, user_id)?;

        let positions = self
            .holding_repository
            .list_with_stocks(portfolio_id)?
            .iter()
            .map(|(holding, stock)| value_position(holding, stock))
            .collect();

        Ok(positions)
    }

    /// Full valuation: metadata, aggregates and per-stock positions.
    pub fn get_portfolio_summary(
        &self,
        portfolio_id: &str,
        user_id: &str,
    ) -> Result<PortfolioSummary> {
        let portfolio = self.repository.get_owned(portfolio_id, user_id)?;

        let holdings: Vec<HoldingPosition> = self
            .holding_repository
            .list_with_stocks(portfolio_id)?
            .iter()
            .map(|(holding, stock)| value_position(holding, stock))
            .collect();

        let summary = aggregate_positions(&holdings);

        Ok(PortfolioSummary {
            portfolio,
            summary,
            holdings,
        })
    }
}
