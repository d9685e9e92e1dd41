use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::parse_decimal;

/// Domain model for a listed stock.
///
/// `current_price` is read-mostly shared state: admin price updates mutate
/// it, valuation and settlement read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub market: String,
    #[serde(with = "crate::utils::decimal_serde")]
    pub current_price: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for adding a stock to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStock {
    pub symbol: String,
    pub name: String,
    pub market: String,
    #[serde(with = "crate::utils::decimal_serde")]
    pub current_price: Decimal,
}

/// Database model for stocks
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::stocks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StockDB {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub market: String,
    pub current_price: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<StockDB> for Stock {
    fn from(db: StockDB) -> Self {
        Self {
            current_price: parse_decimal(&db.current_price, "stock.current_price"),
            id: db.id,
            symbol: db.symbol,
            name: db.name,
            market: db.market,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
