use chrono::{DateTime, Utc};
use log::debug;
use std::sync::Arc;

use crate::constants::{DEFAULT_PAGE_SIZE, MONEY_SCALE};
use crate::db::{DbPool, DbTransactionExecutor};
use crate::errors::{Error, Result};
use crate::holdings;
use crate::portfolios::PortfolioRepository;
use crate::stocks::{Stock, StockRepository};
use crate::users::UserRepository;
use crate::wallets::{actual_balance, Wallet, WalletRepository};

use super::trades_model::{
    NewTradeOrder, SettlementMode, TradeOrder, TradeOrderPage, TradeOrderType,
};
use super::trades_repository::TradeOrderRepository;

/// Trade settlement service.
///
/// Orders move through one state machine: pending (execution_date null) →
/// executed, terminal. Under `SettlementMode::Immediate` the order is born
/// executed; under `Deferred` it waits for an explicit execute call. In
/// both cases the trade order row, the wallet balance and the holding
/// mutate inside a single immediate transaction, with funds/share checks
/// re-reading state under the write lock, so racing orders against one
/// wallet serialize instead of both passing a stale check.
pub struct TradeService {
    pool: Arc<DbPool>,
    repository: TradeOrderRepository,
    wallet_repository: WalletRepository,
    mode: SettlementMode,
}

impl TradeService {
    pub fn new(pool: Arc<DbPool>, mode: SettlementMode) -> Self {
        Self {
            repository: TradeOrderRepository::new(pool.clone()),
            wallet_repository: WalletRepository::new(pool.clone()),
            pool,
            mode,
        }
    }

    /// Places a trade order for the user.
    ///
    /// Total consideration is always quantity x the stock's current price;
    /// callers cannot supply their own price. Validation failures abort
    /// before any write.
    pub fn create_trade_order(
        &self,
        user_id: &str,
        new_order: NewTradeOrder,
    ) -> Result<TradeOrder> {
        new_order.validate()?;
        let mode = self.mode;

        self.pool.execute(|conn| {
            UserRepository::find_by_id_in_transaction(conn, user_id)?;
            let wallet = match WalletRepository::find_by_user_id_in_transaction(conn, user_id) {
                Ok(wallet) => wallet,
                Err(Error::NotFound(_)) => {
                    return Err(Error::NotFound("User wallet not found".to_string()))
                }
                Err(e) => return Err(e),
            };
            let portfolio = PortfolioRepository::find_owned_in_transaction(
                conn,
                &new_order.portfolio_id,
                user_id,
            )?;
            let stock = StockRepository::find_by_id_in_transaction(conn, &new_order.stock_id)?;

            let total = (new_order.quantity * stock.current_price).round_dp(MONEY_SCALE);

            match new_order.order_type {
                TradeOrderType::Buy => {
                    let balance = actual_balance(conn, &wallet.id)?;
                    if balance < total {
                        return Err(Error::InsufficientFunds(
                            "Insufficient funds for this trade".to_string(),
                        ));
                    }
                }
                TradeOrderType::Sell => {
                    let held = holdings::shares_held(conn, &portfolio.id, &stock.id)?;
                    if held < new_order.quantity {
                        return Err(Error::InsufficientShares(
                            "Insufficient shares for this sale".to_string(),
                        ));
                    }
                }
            }

            let execution_date = match mode {
                SettlementMode::Immediate => Some(Utc::now()),
                SettlementMode::Deferred => None,
            };

            let order = TradeOrderRepository::insert_in_transaction(
                conn,
                &wallet.id,
                &new_order,
                total,
                execution_date,
            )?;

            if order.is_executed() {
                settle(conn, &order, &wallet, &stock)?;
            } else {
                debug!(
                    "Created pending {} order {} for {} shares of {}",
                    order.order_type.as_str(),
                    order.id,
                    order.quantity,
                    stock.symbol
                );
            }

            Ok(order)
        })
    }

    /// Executes a pending order using its stored quantity and price
    /// (deferred settlement only).
    ///
    /// Funds and shares are re-validated under the write lock: the world
    /// may have changed since the order was created. Executing an already
    /// executed order is rejected.
    pub fn execute_trade_order(
        &self,
        order_id: &str,
        user_id: &str,
        execution_date: DateTime<Utc>,
    ) -> Result<TradeOrder> {
        self.pool.execute(|conn| {
            let (order, wallet) =
                TradeOrderRepository::find_with_wallet_in_transaction(conn, order_id)?
                    .ok_or_else(|| Error::NotFound("Trade order not found".to_string()))?;

            if wallet.user_id != user_id {
                return Err(Error::NotFound("Trade order not found".to_string()));
            }

            if order.is_executed() {
                return Err(Error::InvalidState(
                    "Trade order has already been executed".to_string(),
                ));
            }

            let stock = StockRepository::find_by_id_in_transaction(conn, &order.stock_id)?;

            match order.order_type {
                TradeOrderType::Buy => {
                    let balance = actual_balance(conn, &wallet.id)?;
                    if balance < order.price {
                        return Err(Error::InsufficientFunds(
                            "Insufficient funds for this trade".to_string(),
                        ));
                    }
                }
                TradeOrderType::Sell => {
                    let held = holdings::shares_held(conn, &order.portfolio_id, &order.stock_id)?;
                    if held < order.quantity {
                        return Err(Error::InsufficientShares(
                            "Insufficient shares for this sale".to_string(),
                        ));
                    }
                }
            }

            TradeOrderRepository::set_execution_date_in_transaction(
                conn,
                order_id,
                execution_date,
            )?;

            let executed = TradeOrder {
                execution_date: Some(execution_date),
                ..order
            };
            settle(conn, &executed, &wallet, &stock)?;

            Ok(executed)
        })
    }

    /// Lists the user's trade orders with stock and portfolio display
    /// fields, newest first.
    pub fn get_user_trade_orders(
        &self,
        user_id: &str,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<TradeOrderPage> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

        let wallet = self.wallet_repository.get_by_user_id(user_id)?;
        let (orders, total) = self
            .repository
            .list_details_by_wallet(&wallet.id, page, limit)?;

        Ok(TradeOrderPage {
            orders,
            total,
            page,
            limit,
        })
    }
}

/// Applies an executed order's money and share legs.
///
/// Runs inside the caller's transaction. The wallet cache is recomputed
/// from the balance calculator (the just-inserted executed order is part
/// of the replay), so the cache converges no matter what it held before.
fn settle(
    conn: &mut diesel::SqliteConnection,
    order: &TradeOrder,
    wallet: &Wallet,
    stock: &Stock,
) -> Result<()> {
    match order.order_type {
        TradeOrderType::Buy => {
            holdings::add_shares(conn, &order.portfolio_id, &order.stock_id, order.quantity, order.price)?;
        }
        TradeOrderType::Sell => {
            holdings::remove_shares(
                conn,
                &order.portfolio_id,
                &order.stock_id,
                order.quantity,
                stock.current_price,
            )?;
        }
    }

    let balance = actual_balance(conn, &wallet.id)?;
    WalletRepository::set_balance_in_transaction(conn, &wallet.id, balance)?;

    debug!(
        "Settled {} order {}: {} shares of {} for {}, wallet {} balance now {}",
        order.order_type.as_str(),
        order.id,
        order.quantity,
        stock.symbol,
        order.price,
        wallet.id,
        balance
    );

    Ok(())
}
