use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::SHARE_SCALE;
use crate::errors::{Error, Result};
use crate::utils::parse_decimal;

/// Side of a trade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeOrderType {
    Buy,
    Sell,
}

impl TradeOrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeOrderType::Buy => "BUY",
            TradeOrderType::Sell => "SELL",
        }
    }
}

impl FromStr for TradeOrderType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "BUY" => Ok(TradeOrderType::Buy),
            "SELL" => Ok(TradeOrderType::Sell),
            other => Err(Error::InvalidArgument(format!(
                "Unknown trade order type: {}",
                other
            ))),
        }
    }
}

/// When a trade order settles.
///
/// The settlement model is a property of the service, not of individual
/// orders; mixing both in one deployment would leave readers of the audit
/// trail with two meanings for a pending row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettlementMode {
    /// Orders validate and settle in one unit of work; every persisted
    /// order is already executed.
    #[default]
    Immediate,
    /// Orders are persisted pending and settle on a later execute call.
    Deferred,
}

/// Domain model for a trade order: the append-only record of one
/// settlement. `price` is the total consideration moved, not a per-unit
/// price. A null execution_date means the order is still pending
/// (deferred settlement only).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOrder {
    pub id: String,
    pub wallet_id: String,
    pub portfolio_id: String,
    pub stock_id: String,
    pub order_type: TradeOrderType,
    #[serde(with = "crate::utils::decimal_serde")]
    pub quantity: Decimal,
    #[serde(with = "crate::utils::decimal_serde")]
    pub price: Decimal,
    pub execution_date: Option<DateTime<Utc>>,
    pub external_ref_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TradeOrder {
    pub fn is_executed(&self) -> bool {
        self.execution_date.is_some()
    }
}

/// Input model for placing a trade order.
///
/// There is no caller-supplied price: orders are always priced at the
/// stock's current price at settlement time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTradeOrder {
    pub portfolio_id: String,
    pub stock_id: String,
    pub order_type: TradeOrderType,
    #[serde(with = "crate::utils::decimal_serde")]
    pub quantity: Decimal,
    pub external_ref_id: Option<String>,
}

impl NewTradeOrder {
    pub fn validate(&self) -> Result<()> {
        if self.quantity <= Decimal::ZERO {
            return Err(Error::InvalidArgument(
                "Quantity must be positive".to_string(),
            ));
        }
        if self.quantity.normalize().scale() > SHARE_SCALE {
            return Err(Error::InvalidArgument(format!(
                "Quantity carries more than {} decimal places",
                SHARE_SCALE
            )));
        }
        Ok(())
    }
}

/// A trade order joined with display fields for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOrderDetails {
    pub id: String,
    pub order_type: TradeOrderType,
    pub stock_symbol: String,
    pub stock_name: String,
    pub portfolio_name: String,
    #[serde(with = "crate::utils::decimal_serde")]
    pub quantity: Decimal,
    #[serde(with = "crate::utils::decimal_serde")]
    pub price: Decimal,
    pub execution_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub status: TradeOrderStatus,
}

/// Externally visible order state, derived from execution_date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeOrderStatus {
    Pending,
    Executed,
}

/// One page of a wallet's trade orders, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOrderPage {
    pub orders: Vec<TradeOrderDetails>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// Database model for trade orders
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::trade_orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TradeOrderDB {
    pub id: String,
    pub wallet_id: String,
    pub portfolio_id: String,
    pub stock_id: String,
    pub order_type: String,
    pub quantity: String,
    pub price: String,
    pub execution_date: Option<NaiveDateTime>,
    pub external_ref_id: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<TradeOrderDB> for TradeOrder {
    fn from(db: TradeOrderDB) -> Self {
        Self {
            order_type: db.order_type.parse().unwrap_or_else(|_| {
                log::error!("Trade order {} has unknown type '{}'", db.id, db.order_type);
                TradeOrderType::Buy
            }),
            quantity: parse_decimal(&db.quantity, "trade_order.quantity"),
            price: parse_decimal(&db.price, "trade_order.price"),
            execution_date: db.execution_date.map(|d| Utc.from_utc_datetime(&d)),
            created_at: Utc.from_utc_datetime(&db.created_at),
            id: db.id,
            wallet_id: db.wallet_id,
            portfolio_id: db.portfolio_id,
            stock_id: db.stock_id,
            external_ref_id: db.external_ref_id,
        }
    }
}
