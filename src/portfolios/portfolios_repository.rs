use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::get_connection;
use crate::errors::{Error, Result};
use crate::schema::portfolios;

use super::portfolios_model::{NewPortfolio, Portfolio, PortfolioDB, PortfolioUpdate};

/// Repository for portfolios.
pub struct PortfolioRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl PortfolioRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    pub fn create_in_transaction(
        conn: &mut SqliteConnection,
        user_id: &str,
        new_portfolio: &NewPortfolio,
    ) -> Result<Portfolio> {
        let now = chrono::Utc::now().naive_utc();
        let portfolio_db = PortfolioDB {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: new_portfolio.name.clone(),
            description: new_portfolio.description.clone().unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        diesel::insert_into(portfolios::table)
            .values(&portfolio_db)
            .execute(conn)?;

        Ok(portfolio_db.into())
    }

    pub fn create(&self, user_id: &str, new_portfolio: &NewPortfolio) -> Result<Portfolio> {
        let mut conn = get_connection(&self.pool)?;
        Self::create_in_transaction(&mut conn, user_id, new_portfolio)
    }

    /// Resolves a portfolio among the given user's own portfolios. A
    /// portfolio owned by someone else reads as missing.
    pub fn find_owned_in_transaction(
        conn: &mut SqliteConnection,
        portfolio_id: &str,
        user_id: &str,
    ) -> Result<Portfolio> {
        portfolios::table
            .filter(portfolios::id.eq(portfolio_id))
            .filter(portfolios::user_id.eq(user_id))
            .select(PortfolioDB::as_select())
            .first::<PortfolioDB>(conn)
            .optional()?
            .map(Portfolio::from)
            .ok_or_else(|| Error::NotFound("Portfolio not found".to_string()))
    }

    pub fn get_owned(&self, portfolio_id: &str, user_id: &str) -> Result<Portfolio> {
        let mut conn = get_connection(&self.pool)?;
        Self::find_owned_in_transaction(&mut conn, portfolio_id, user_id)
    }

    /// Lists a user's portfolios, oldest first.
    pub fn list_by_user(&self, user_id: &str) -> Result<Vec<Portfolio>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = portfolios::table
            .filter(portfolios::user_id.eq(user_id))
            .order(portfolios::created_at.asc())
            .select(PortfolioDB::as_select())
            .load::<PortfolioDB>(&mut conn)?;

        Ok(rows.into_iter().map(Portfolio::from).collect())
    }

    pub fn update(&self, portfolio: &Portfolio, update: &PortfolioUpdate) -> Result<Portfolio> {
        let mut conn = get_connection(&self.pool)?;

        let name = update.name.clone().unwrap_or_else(|| portfolio.name.clone());
        let description = update
            .description
            .clone()
            .unwrap_or_else(|| portfolio.description.clone());

        diesel::update(portfolios::table.find(&portfolio.id))
            .set((
                portfolios::name.eq(&name),
                portfolios::description.eq(&description),
                portfolios::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        Ok(Portfolio {
            name,
            description,
            updated_at: chrono::Utc::now().naive_utc(),
            ..portfolio.clone()
        })
    }
}
