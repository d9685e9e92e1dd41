use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::get_connection;
use crate::errors::Result;
use crate::schema::{portfolio_stocks, stocks};
use crate::stocks::{Stock, StockDB};

use super::holdings_model::{Holding, HoldingDB};

/// Repository for portfolio stock positions.
pub struct HoldingRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl HoldingRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Looks up the position for a (portfolio, stock) pair.
    pub fn find_in_transaction(
        conn: &mut SqliteConnection,
        portfolio_id: &str,
        stock_id: &str,
    ) -> Result<Option<Holding>> {
        let row = portfolio_stocks::table
            .filter(portfolio_stocks::portfolio_id.eq(portfolio_id))
            .filter(portfolio_stocks::stock_id.eq(stock_id))
            .select(HoldingDB::as_select())
            .first::<HoldingDB>(conn)
            .optional()?;

        Ok(row.map(Holding::from))
    }

    pub fn insert_in_transaction(
        conn: &mut SqliteConnection,
        portfolio_id: &str,
        stock_id: &str,
        shares: Decimal,
        investment_amount: Decimal,
    ) -> Result<Holding> {
        let holding_db = HoldingDB {
            id: Uuid::new_v4().to_string(),
            portfolio_id: portfolio_id.to_string(),
            stock_id: stock_id.to_string(),
            shares: shares.to_string(),
            investment_amount: investment_amount.to_string(),
            sell_amount: Decimal::ZERO.to_string(),
            updated_at: chrono::Utc::now().naive_utc(),
        };

        diesel::insert_into(portfolio_stocks::table)
            .values(&holding_db)
            .execute(conn)?;

        Ok(holding_db.into())
    }

    pub fn update_position_in_transaction(
        conn: &mut SqliteConnection,
        holding_id: &str,
        shares: Decimal,
        investment_amount: Decimal,
        sell_amount: Decimal,
    ) -> Result<()> {
        diesel::update(portfolio_stocks::table.find(holding_id))
            .set((
                portfolio_stocks::shares.eq(shares.to_string()),
                portfolio_stocks::investment_amount.eq(investment_amount.to_string()),
                portfolio_stocks::sell_amount.eq(sell_amount.to_string()),
                portfolio_stocks::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(conn)?;

        Ok(())
    }

    /// Removes a fully sold-out position. No zero-share rows persist.
    pub fn delete_in_transaction(conn: &mut SqliteConnection, holding_id: &str) -> Result<()> {
        diesel::delete(portfolio_stocks::table.find(holding_id)).execute(conn)?;
        Ok(())
    }

    /// Loads a portfolio's positions joined with their stocks, optionally
    /// restricted to open positions (shares > 0 is enforced structurally:
    /// zero-share rows are deleted, so the filter only guards against
    /// external edits).
    pub fn list_with_stocks(&self, portfolio_id: &str) -> Result<Vec<(Holding, Stock)>> {
        let mut conn = get_connection(&self.pool)?;

        let rows: Vec<(HoldingDB, StockDB)> = portfolio_stocks::table
            .inner_join(stocks::table)
            .filter(portfolio_stocks::portfolio_id.eq(portfolio_id))
            .select((HoldingDB::as_select(), StockDB::as_select()))
            .load(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(h, s)| (Holding::from(h), Stock::from(s)))
            .filter(|(h, _)| h.shares > Decimal::ZERO)
            .collect())
    }
}
