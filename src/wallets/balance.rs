//! Balance calculator.
//!
//! The authoritative spendable balance of a wallet is derived by replaying
//! its executed history, never by reading the cached `wallets.balance`
//! column. Two ledgers feed it: deposit/withdrawal transactions, and the
//! cash legs of executed trade orders. Pending rows (execution_date NULL)
//! are excluded entirely.

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;

use crate::errors::Result;
use crate::schema::{trade_orders, transactions};
use crate::trades::TradeOrderType;
use crate::transactions::TransactionType;
use crate::utils::parse_decimal;

/// Computes the actual balance of a wallet from executed movements.
///
/// Takes an explicit connection so funds checks can run inside the same
/// write transaction that will move the money.
pub fn actual_balance(conn: &mut SqliteConnection, wallet_id: &str) -> Result<Decimal> {
    let cash_movements: Vec<(String, String)> = transactions::table
        .filter(transactions::wallet_id.eq(wallet_id))
        .filter(transactions::execution_date.is_not_null())
        .select((transactions::transaction_type, transactions::amount))
        .load(conn)?;

    let mut balance = Decimal::ZERO;
    for (transaction_type, amount) in &cash_movements {
        let amount = parse_decimal(amount, "transaction.amount");
        match transaction_type.parse::<TransactionType>() {
            Ok(TransactionType::Deposit) => balance += amount,
            Ok(TransactionType::Withdrawal) => balance -= amount,
            Err(_) => {
                log::error!("Skipping transaction with unknown type '{}'", transaction_type)
            }
        }
    }

    let trade_movements: Vec<(String, String)> = trade_orders::table
        .filter(trade_orders::wallet_id.eq(wallet_id))
        .filter(trade_orders::execution_date.is_not_null())
        .select((trade_orders::order_type, trade_orders::price))
        .load(conn)?;

    for (order_type, price) in &trade_movements {
        let price = parse_decimal(price, "trade_order.price");
        match order_type.parse::<TradeOrderType>() {
            Ok(TradeOrderType::Buy) => balance -= price,
            Ok(TradeOrderType::Sell) => balance += price,
            Err(_) => log::error!("Skipping trade order with unknown type '{}'", order_type),
        }
    }

    Ok(balance)
}
