use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::constants::MONEY_SCALE;
use crate::db::DbPool;
use crate::errors::{Error, Result};

use super::stocks_model::{NewStock, Stock};
use super::stocks_repository::StockRepository;

/// Service for the stock catalog.
pub struct StockService {
    repository: StockRepository,
}

impl StockService {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self {
            repository: StockRepository::new(pool),
        }
    }

    pub fn create_stock(&self, new_stock: NewStock) -> Result<Stock> {
        if new_stock.symbol.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "Stock symbol cannot be empty".to_string(),
            ));
        }
        validate_price(new_stock.current_price)?;
        self.repository.create(new_stock)
    }

    pub fn list_stocks(&self) -> Result<Vec<Stock>> {
        self.repository.list()
    }

    pub fn get_stock(&self, stock_id: &str) -> Result<Stock> {
        self.repository.get_by_id(stock_id)
    }

    pub fn get_stock_by_symbol(&self, symbol: &str) -> Result<Stock> {
        self.repository.get_by_symbol(symbol)
    }

    /// Admin price update. Settlement and valuation pick the new price up on
    /// their next read.
    pub fn update_price(&self, stock_id: &str, new_price: Decimal) -> Result<Stock> {
        validate_price(new_price)?;

        // Existence check first so a missing id surfaces as NotFound.
        let stock = self.repository.get_by_id(stock_id)?;
        debug!(
            "Updating price of {} from {} to {}",
            stock.symbol, stock.current_price, new_price
        );

        self.repository.set_price(stock_id, new_price)
    }
}

fn validate_price(price: Decimal) -> Result<()> {
    if price <= Decimal::ZERO {
        return Err(Error::InvalidArgument(
            "Price must be positive".to_string(),
        ));
    }
    if price.normalize().scale() > MONEY_SCALE {
        return Err(Error::InvalidArgument(format!(
            "Price carries more than {} decimal places",
            MONEY_SCALE
        )));
    }
    Ok(())
}
