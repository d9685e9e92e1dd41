use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::get_connection;
use crate::schema::{transactions, wallets};
use crate::wallets::{Wallet, WalletDB};
use crate::errors::Result;

use super::transactions_model::{NewTransaction, Transaction, TransactionDB};

/// Repository for the deposit/withdrawal ledger.
pub struct TransactionRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl TransactionRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Appends a transaction row inside the caller's unit of work.
    pub fn insert_in_transaction(
        conn: &mut SqliteConnection,
        wallet_id: &str,
        new_transaction: &NewTransaction,
    ) -> Result<Transaction> {
        let transaction_db = TransactionDB {
            id: Uuid::new_v4().to_string(),
            wallet_id: wallet_id.to_string(),
            transaction_type: new_transaction.transaction_type.as_str().to_string(),
            amount: new_transaction.amount.to_string(),
            execution_date: new_transaction.execution_date.map(|d| d.naive_utc()),
            external_ref_id: new_transaction.external_ref_id.clone(),
            created_at: Utc::now().naive_utc(),
        };

        diesel::insert_into(transactions::table)
            .values(&transaction_db)
            .execute(conn)?;

        Ok(transaction_db.into())
    }

    /// Loads a transaction together with its owning wallet, for ownership
    /// checks. Usable both inside and outside a write transaction.
    pub fn find_with_wallet_in_transaction(
        conn: &mut SqliteConnection,
        transaction_id: &str,
    ) -> Result<Option<(Transaction, Wallet)>> {
        let row: Option<(TransactionDB, WalletDB)> = transactions::table
            .inner_join(wallets::table)
            .filter(transactions::id.eq(transaction_id))
            .select((TransactionDB::as_select(), WalletDB::as_select()))
            .first(conn)
            .optional()?;

        Ok(row.map(|(t, w)| (t.into(), w.into())))
    }

    pub fn find_with_wallet(&self, transaction_id: &str) -> Result<Option<(Transaction, Wallet)>> {
        let mut conn = get_connection(&self.pool)?;
        Self::find_with_wallet_in_transaction(&mut conn, transaction_id)
    }

    /// The one allowed mutation of a transaction row: the pending → executed
    /// transition.
    pub fn set_execution_date_in_transaction(
        conn: &mut SqliteConnection,
        transaction_id: &str,
        execution_date: DateTime<Utc>,
    ) -> Result<()> {
        diesel::update(transactions::table.find(transaction_id))
            .set(transactions::execution_date.eq(Some(execution_date.naive_utc())))
            .execute(conn)?;

        Ok(())
    }

    /// Lists one page of a wallet's history, newest first, with the total
    /// row count for the pager.
    pub fn list_by_wallet(
        &self,
        wallet_id: &str,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Transaction>, i64)> {
        let mut conn = get_connection(&self.pool)?;

        let total = transactions::table
            .filter(transactions::wallet_id.eq(wallet_id))
            .count()
            .get_result::<i64>(&mut conn)?;

        let rows = transactions::table
            .filter(transactions::wallet_id.eq(wallet_id))
            .order(transactions::created_at.desc())
            .offset((page - 1) * limit)
            .limit(limit)
            .select(TransactionDB::as_select())
            .load::<TransactionDB>(&mut conn)?;

        Ok((rows.into_iter().map(Transaction::from).collect(), total))
    }
}
