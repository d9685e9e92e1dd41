use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::MONEY_SCALE;
use crate::errors::{Error, Result};
use crate::holdings::Holding;
use crate::stocks::Stock;

/// Domain model for a portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolio {
    pub name: String,
    pub description: Option<String>,
}

impl NewPortfolio {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "Portfolio name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Input model for renaming/redescribing a portfolio.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// One valued position inside a portfolio summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingPosition {
    pub stock_id: String,
    pub symbol: String,
    pub name: String,
    #[serde(with = "crate::utils::decimal_serde")]
    pub shares: Decimal,
    #[serde(with = "crate::utils::decimal_serde")]
    pub investment_amount: Decimal,
    #[serde(with = "crate::utils::decimal_serde")]
    pub sell_amount: Decimal,
    #[serde(with = "crate::utils::decimal_serde")]
    pub current_price: Decimal,
    #[serde(with = "crate::utils::decimal_serde")]
    pub current_value: Decimal,
    #[serde(with = "crate::utils::decimal_serde")]
    pub profit_loss: Decimal,
    #[serde(with = "crate::utils::decimal_serde")]
    pub profit_loss_percentage: Decimal,
}

/// Portfolio-level aggregates over all open positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    #[serde(with = "crate::utils::decimal_serde")]
    pub total_investment: Decimal,
    #[serde(with = "crate::utils::decimal_serde")]
    pub total_current_value: Decimal,
    #[serde(with = "crate::utils::decimal_serde")]
    pub total_sell_amount: Decimal,
    #[serde(with = "crate::utils::decimal_serde")]
    pub total_profit_loss: Decimal,
    #[serde(with = "crate::utils::decimal_serde")]
    pub profit_loss_percentage: Decimal,
}

/// Full valuation response: portfolio metadata, aggregates, per-stock
/// positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub portfolio: Portfolio,
    pub summary: PortfolioTotals,
    pub holdings: Vec<HoldingPosition>,
}

/// Values one holding at the stock's current price.
///
/// Profit and loss counts realized proceeds alongside the open position:
/// `current_value + sell_amount - investment_amount`, with the percentage
/// guarded to zero for a zero basis.
pub fn value_position(holding: &Holding, stock: &Stock) -> HoldingPosition {
    let current_value = (holding.shares * stock.current_price).round_dp(MONEY_SCALE);
    let profit_loss = current_value + holding.sell_amount - holding.investment_amount;
    let profit_loss_percentage = if holding.investment_amount > Decimal::ZERO {
        (profit_loss / holding.investment_amount * Decimal::ONE_HUNDRED).round_dp(MONEY_SCALE)
    } else {
        Decimal::ZERO
    };

    HoldingPosition {
        stock_id: stock.id.clone(),
        symbol: stock.symbol.clone(),
        name: stock.name.clone(),
        shares: holding.shares,
        investment_amount: holding.investment_amount,
        sell_amount: holding.sell_amount,
        current_price: stock.current_price,
        current_value,
        profit_loss,
        profit_loss_percentage,
    }
}

/// Aggregates valued positions into portfolio totals, with the same
/// zero-basis guard at the portfolio level.
pub fn aggregate_positions(positions: &[HoldingPosition]) -> PortfolioTotals {
    let total_investment: Decimal = positions.iter().map(|p| p.investment_amount).sum();
    let total_current_value: Decimal = positions.iter().map(|p| p.current_value).sum();
    let total_sell_amount: Decimal = positions.iter().map(|p| p.sell_amount).sum();
    let total_profit_loss: Decimal = positions.iter().map(|p| p.profit_loss).sum();
    let profit_loss_percentage = if total_investment > Decimal::ZERO {
        (total_profit_loss / total_investment * Decimal::ONE_HUNDRED).round_dp(MONEY_SCALE)
    } else {
        Decimal::ZERO
    };

    PortfolioTotals {
        total_investment,
        total_current_value,
        total_sell_amount,
        total_profit_loss,
        profit_loss_percentage,
    }
}

/// Database model for portfolios
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::portfolios)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PortfolioDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<PortfolioDB> for Portfolio {
    fn from(db: PortfolioDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            description: db.description,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
