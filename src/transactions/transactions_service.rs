use log::debug;
use std::sync::Arc;

use crate::constants::DEFAULT_PAGE_SIZE;
use crate::db::{DbPool, DbTransactionExecutor};
use crate::errors::{Error, Result};
use crate::wallets::{actual_balance, WalletRepository};

use super::transactions_model::{NewTransaction, Transaction, TransactionPage, TransactionType};
use super::transactions_repository::TransactionRepository;

/// Service for the deposit/withdrawal ledger.
///
/// Every mutation runs in one immediate transaction: validation, the ledger
/// append and the wallet cache update either all commit or none do.
pub struct TransactionService {
    pool: Arc<DbPool>,
    repository: TransactionRepository,
    wallet_repository: WalletRepository,
}

impl TransactionService {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self {
            repository: TransactionRepository::new(pool.clone()),
            wallet_repository: WalletRepository::new(pool.clone()),
            pool,
        }
    }

    /// Records a deposit or withdrawal on the user's wallet.
    ///
    /// With an execution date the transaction is settled immediately and the
    /// cached balance is adjusted in the same unit of work; without one it is
    /// stored pending and the cache is left untouched. Withdrawal funds
    /// checks run against the derived balance, inside the write transaction.
    pub fn create_transaction(
        &self,
        user_id: &str,
        new_transaction: NewTransaction,
    ) -> Result<Transaction> {
        new_transaction.validate()?;

        self.pool.execute(|conn| {
            let wallet = WalletRepository::find_by_user_id_in_transaction(conn, user_id)?;

            if new_transaction.transaction_type == TransactionType::Withdrawal {
                let balance = actual_balance(conn, &wallet.id)?;
                if balance < new_transaction.amount {
                    return Err(Error::InsufficientFunds(
                        "Insufficient funds for withdrawal".to_string(),
                    ));
                }
            }

            let saved =
                TransactionRepository::insert_in_transaction(conn, &wallet.id, &new_transaction)?;

            if saved.is_executed() {
                let new_balance = match saved.transaction_type {
                    TransactionType::Deposit => wallet.balance + saved.amount,
                    TransactionType::Withdrawal => wallet.balance - saved.amount,
                };
                WalletRepository::set_balance_in_transaction(conn, &wallet.id, new_balance)?;
            }

            debug!(
                "Recorded {} {} on wallet {} ({})",
                saved.transaction_type.as_str(),
                saved.amount,
                saved.wallet_id,
                if saved.is_executed() { "executed" } else { "pending" }
            );

            Ok(saved)
        })
    }

    /// Executes a pending transaction by stamping its execution date.
    ///
    /// The date transition is one-way: an already executed transaction can
    /// be neither re-executed nor cancelled. The cached balance is
    /// recomputed from scratch rather than adjusted incrementally, so the
    /// cache converges even if it had drifted.
    pub fn update_execution_date(
        &self,
        transaction_id: &str,
        user_id: &str,
        execution_date: chrono::DateTime<chrono::Utc>,
    ) -> Result<Transaction> {
        self.pool.execute(|conn| {
            let (transaction, wallet) =
                TransactionRepository::find_with_wallet_in_transaction(conn, transaction_id)?
                    .ok_or_else(|| Error::NotFound("Transaction not found".to_string()))?;

            if wallet.user_id != user_id {
                return Err(Error::NotFound("Transaction not found".to_string()));
            }

            if transaction.is_executed() {
                return Err(Error::InvalidState(
                    "Cannot update execution date for already executed transactions".to_string(),
                ));
            }

            TransactionRepository::set_execution_date_in_transaction(
                conn,
                transaction_id,
                execution_date,
            )?;

            let balance = actual_balance(conn, &wallet.id)?;
            WalletRepository::set_balance_in_transaction(conn, &wallet.id, balance)?;

            debug!(
                "Executed transaction {} on wallet {}, balance recomputed to {}",
                transaction_id, wallet.id, balance
            );

            Ok(Transaction {
                execution_date: Some(execution_date),
                ..transaction
            })
        })
    }

    /// Lists the user's transactions, newest first.
    pub fn get_user_transactions(
        &self,
        user_id: &str,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<TransactionPage> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

        let wallet = self.wallet_repository.get_by_user_id(user_id)?;
        let (transactions, total) = self.repository.list_by_wallet(&wallet.id, page, limit)?;

        Ok(TransactionPage {
            transactions,
            total,
            page,
            limit,
        })
    }

    /// Retrieves a single transaction, ownership-checked.
    pub fn get_transaction(&self, transaction_id: &str, user_id: &str) -> Result<Transaction> {
        let (transaction, wallet) = self
            .repository
            .find_with_wallet(transaction_id)?
            .ok_or_else(|| Error::NotFound("Transaction not found".to_string()))?;

        if wallet.user_id != user_id {
            return Err(Error::NotFound("Transaction not found".to_string()));
        }

        Ok(transaction)
    }
}
