use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::parse_decimal;

/// Domain model for a portfolio's position in one stock.
///
/// `investment_amount` is a gross cost basis: it accumulates what was paid
/// and is never reduced by partial sells. Realized proceeds accumulate in
/// `sell_amount`, so `current_value + sell_amount - investment_amount`
/// yields total profit and loss. A holding with zero shares is deleted
/// rather than kept around.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    pub portfolio_id: String,
    pub stock_id: String,
    #[serde(with = "crate::utils::decimal_serde")]
    pub shares: Decimal,
    #[serde(with = "crate::utils::decimal_serde")]
    pub investment_amount: Decimal,
    #[serde(with = "crate::utils::decimal_serde")]
    pub sell_amount: Decimal,
    pub updated_at: NaiveDateTime,
}

/// Database model for portfolio stock positions
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::portfolio_stocks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HoldingDB {
    pub id: String,
    pub portfolio_id: String,
    pub stock_id: String,
    pub shares: String,
    pub investment_amount: String,
    pub sell_amount: String,
    pub updated_at: NaiveDateTime,
}

impl From<HoldingDB> for Holding {
    fn from(db: HoldingDB) -> Self {
        Self {
            shares: parse_decimal(&db.shares, "holding.shares"),
            investment_amount: parse_decimal(&db.investment_amount, "holding.investment_amount"),
            sell_amount: parse_decimal(&db.sell_amount, "holding.sell_amount"),
            id: db.id,
            portfolio_id: db.portfolio_id,
            stock_id: db.stock_id,
            updated_at: db.updated_at,
        }
    }
}
