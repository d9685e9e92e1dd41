use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::get_connection;
use crate::errors::Result;
use crate::schema::{portfolios, stocks, trade_orders, wallets};
use crate::wallets::{Wallet, WalletDB};

use super::trades_model::{
    NewTradeOrder, TradeOrder, TradeOrderDB, TradeOrderDetails, TradeOrderStatus, TradeOrderType,
};

/// Repository for the trade order audit trail.
pub struct TradeOrderRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl TradeOrderRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Appends a trade order row inside the settlement's unit of work.
    /// `price` is the total consideration; `execution_date` is set for
    /// immediate settlement and `None` for deferred orders.
    pub fn insert_in_transaction(
        conn: &mut SqliteConnection,
        wallet_id: &str,
        new_order: &NewTradeOrder,
        price: rust_decimal::Decimal,
        execution_date: Option<DateTime<Utc>>,
    ) -> Result<TradeOrder> {
        let order_db = TradeOrderDB {
            id: Uuid::new_v4().to_string(),
            wallet_id: wallet_id.to_string(),
            portfolio_id: new_order.portfolio_id.clone(),
            stock_id: new_order.stock_id.clone(),
            order_type: new_order.order_type.as_str().to_string(),
            quantity: new_order.quantity.to_string(),
            price: price.to_string(),
            execution_date: execution_date.map(|d| d.naive_utc()),
            external_ref_id: new_order.external_ref_id.clone(),
            created_at: Utc::now().naive_utc(),
        };

        diesel::insert_into(trade_orders::table)
            .values(&order_db)
            .execute(conn)?;

        Ok(order_db.into())
    }

    /// Loads an order together with its owning wallet, for ownership checks.
    pub fn find_with_wallet_in_transaction(
        conn: &mut SqliteConnection,
        order_id: &str,
    ) -> Result<Option<(TradeOrder, Wallet)>> {
        let row: Option<(TradeOrderDB, WalletDB)> = trade_orders::table
            .inner_join(wallets::table)
            .filter(trade_orders::id.eq(order_id))
            .select((TradeOrderDB::as_select(), WalletDB::as_select()))
            .first(conn)
            .optional()?;

        Ok(row.map(|(o, w)| (o.into(), w.into())))
    }

    /// Stamps the pending → executed transition.
    pub fn set_execution_date_in_transaction(
        conn: &mut SqliteConnection,
        order_id: &str,
        execution_date: DateTime<Utc>,
    ) -> Result<()> {
        diesel::update(trade_orders::table.find(order_id))
            .set(trade_orders::execution_date.eq(Some(execution_date.naive_utc())))
            .execute(conn)?;

        Ok(())
    }

    /// Lists one page of a wallet's orders with display fields, newest
    /// first, plus the total count.
    pub fn list_details_by_wallet(
        &self,
        wallet_id: &str,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<TradeOrderDetails>, i64)> {
        let mut conn = get_connection(&self.pool)?;

        let total = trade_orders::table
            .filter(trade_orders::wallet_id.eq(wallet_id))
            .count()
            .get_result::<i64>(&mut conn)?;

        let rows: Vec<(TradeOrderDB, String, String, String)> = trade_orders::table
            .inner_join(stocks::table)
            .inner_join(portfolios::table)
            .filter(trade_orders::wallet_id.eq(wallet_id))
            .order(trade_orders::created_at.desc())
            .offset((page - 1) * limit)
            .limit(limit)
            .select((
                TradeOrderDB::as_select(),
                stocks::symbol,
                stocks::name,
                portfolios::name,
            ))
            .load(&mut conn)?;

        let orders = rows
            .into_iter()
            .map(|(db, stock_symbol, stock_name, portfolio_name)| {
                let order = TradeOrder::from(db);
                TradeOrderDetails {
                    status: if order.is_executed() {
                        TradeOrderStatus::Executed
                    } else {
                        TradeOrderStatus::Pending
                    },
                    id: order.id,
                    order_type: order.order_type,
                    stock_symbol,
                    stock_name,
                    portfolio_name,
                    quantity: order.quantity,
                    price: order.price,
                    execution_date: order.execution_date,
                    created_at: order.created_at,
                }
            })
            .collect();

        Ok((orders, total))
    }

    /// Net executed share movement (bought minus sold) for one
    /// (portfolio, stock) pair, for reconciling a position against the
    /// order trail.
    pub fn executed_quantity(
        &self,
        portfolio_id: &str,
        stock_id: &str,
    ) -> Result<rust_decimal::Decimal> {
        let mut conn = get_connection(&self.pool)?;

        let rows: Vec<(String, String)> = trade_orders::table
            .filter(trade_orders::portfolio_id.eq(portfolio_id))
            .filter(trade_orders::stock_id.eq(stock_id))
            .filter(trade_orders::execution_date.is_not_null())
            .select((trade_orders::order_type, trade_orders::quantity))
            .load(&mut conn)?;

        let mut net = rust_decimal::Decimal::ZERO;
        for (order_type, quantity) in &rows {
            let quantity = crate::utils::parse_decimal(quantity, "trade_order.quantity");
            match order_type.parse::<TradeOrderType>() {
                Ok(TradeOrderType::Buy) => net += quantity,
                Ok(TradeOrderType::Sell) => net -= quantity,
                Err(_) => {}
            }
        }

        Ok(net)
    }
}
