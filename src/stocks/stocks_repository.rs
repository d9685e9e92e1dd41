use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::get_connection;
use crate::errors::{Error, Result};
use crate::schema::stocks;

use super::stocks_model::{NewStock, Stock, StockDB};

/// Repository for the stock catalog.
pub struct StockRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl StockRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    pub fn create(&self, new_stock: NewStock) -> Result<Stock> {
        let mut conn = get_connection(&self.pool)?;
        let now = chrono::Utc::now().naive_utc();
        let stock_db = StockDB {
            id: Uuid::new_v4().to_string(),
            symbol: new_stock.symbol,
            name: new_stock.name,
            market: new_stock.market,
            current_price: new_stock.current_price.to_string(),
            created_at: now,
            updated_at: now,
        };

        diesel::insert_into(stocks::table)
            .values(&stock_db)
            .execute(&mut conn)?;

        Ok(stock_db.into())
    }

    pub fn get_by_id(&self, stock_id: &str) -> Result<Stock> {
        let mut conn = get_connection(&self.pool)?;
        Self::find_by_id_in_transaction(&mut conn, stock_id)
    }

    pub fn find_by_id_in_transaction(
        conn: &mut SqliteConnection,
        stock_id: &str,
    ) -> Result<Stock> {
        stocks::table
            .find(stock_id)
            .select(StockDB::as_select())
            .first::<StockDB>(conn)
            .optional()?
            .map(Stock::from)
            .ok_or_else(|| Error::NotFound("Stock not found".to_string()))
    }

    pub fn get_by_symbol(&self, symbol: &str) -> Result<Stock> {
        let mut conn = get_connection(&self.pool)?;
        stocks::table
            .filter(stocks::symbol.eq(symbol))
            .select(StockDB::as_select())
            .first::<StockDB>(&mut conn)
            .optional()?
            .map(Stock::from)
            .ok_or_else(|| Error::NotFound("Stock not found".to_string()))
    }

    /// Lists the whole catalog, symbol ascending.
    pub fn list(&self) -> Result<Vec<Stock>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = stocks::table
            .order(stocks::symbol.asc())
            .select(StockDB::as_select())
            .load::<StockDB>(&mut conn)?;

        Ok(rows.into_iter().map(Stock::from).collect())
    }

    pub fn set_price(&self, stock_id: &str, new_price: rust_decimal::Decimal) -> Result<Stock> {
        let mut conn = get_connection(&self.pool)?;
        diesel::update(stocks::table.find(stock_id))
            .set((
                stocks::current_price.eq(new_price.to_string()),
                stocks::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        Self::find_by_id_in_transaction(&mut conn, stock_id)
    }
}
