//! Holdings accountant.
//!
//! Applies the share-side effect of a settled trade to a position row.
//! Both entry points take the settlement's transaction connection: a
//! holding mutation never commits separately from the wallet debit/credit
//! and trade order row it belongs to.

use diesel::sqlite::SqliteConnection;
use log::debug;
use rust_decimal::Decimal;

use crate::constants::MONEY_SCALE;
use crate::errors::{Error, Result};

use super::holdings_repository::HoldingRepository;

/// Adds bought shares to a portfolio's position, creating the row on the
/// first purchase. `total_cost` increases the gross cost basis.
pub fn add_shares(
    conn: &mut SqliteConnection,
    portfolio_id: &str,
    stock_id: &str,
    quantity: Decimal,
    total_cost: Decimal,
) -> Result<()> {
    match HoldingRepository::find_in_transaction(conn, portfolio_id, stock_id)? {
        Some(holding) => {
            HoldingRepository::update_position_in_transaction(
                conn,
                &holding.id,
                holding.shares + quantity,
                holding.investment_amount + total_cost,
                holding.sell_amount,
            )?;
        }
        None => {
            HoldingRepository::insert_in_transaction(
                conn,
                portfolio_id,
                stock_id,
                quantity,
                total_cost,
            )?;
        }
    }

    debug!(
        "Added {} shares of {} to portfolio {} (cost {})",
        quantity, stock_id, portfolio_id, total_cost
    );

    Ok(())
}

/// Removes sold shares from a portfolio's position.
///
/// The row is deleted when shares reach exactly zero; otherwise the
/// realized proceeds (quantity x current price) accumulate in sell_amount.
/// The gross cost basis is deliberately left untouched on partial sells;
/// the valuation identity `current_value + sell_amount - investment_amount`
/// depends on it.
pub fn remove_shares(
    conn: &mut SqliteConnection,
    portfolio_id: &str,
    stock_id: &str,
    quantity: Decimal,
    current_price: Decimal,
) -> Result<()> {
    let holding = HoldingRepository::find_in_transaction(conn, portfolio_id, stock_id)?
        .ok_or_else(|| {
            Error::InvalidState("No shares found for this stock in portfolio".to_string())
        })?;

    if holding.shares < quantity {
        return Err(Error::InsufficientShares(
            "Insufficient shares to sell".to_string(),
        ));
    }

    let remaining = holding.shares - quantity;
    if remaining.is_zero() {
        HoldingRepository::delete_in_transaction(conn, &holding.id)?;
        debug!(
            "Closed position in {} for portfolio {}",
            stock_id, portfolio_id
        );
    } else {
        let proceeds = (quantity * current_price).round_dp(MONEY_SCALE);
        HoldingRepository::update_position_in_transaction(
            conn,
            &holding.id,
            remaining,
            holding.investment_amount,
            holding.sell_amount + proceeds,
        )?;
        debug!(
            "Removed {} shares of {} from portfolio {} ({} remaining)",
            quantity, stock_id, portfolio_id, remaining
        );
    }

    Ok(())
}

/// Shares currently held for a (portfolio, stock) pair; zero when no row
/// exists.
pub fn shares_held(
    conn: &mut SqliteConnection,
    portfolio_id: &str,
    stock_id: &str,
) -> Result<Decimal> {
    Ok(HoldingRepository::find_in_transaction(conn, portfolio_id, stock_id)?
        .map(|h| h.shares)
        .unwrap_or(Decimal::ZERO))
}
