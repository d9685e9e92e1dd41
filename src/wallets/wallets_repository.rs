use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::get_connection;
use crate::errors::{Error, Result};
use crate::schema::wallets;

use super::wallets_model::{Wallet, WalletDB};

/// Repository for managing wallet rows.
pub struct WalletRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl WalletRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Retrieves the wallet owned by a user.
    pub fn get_by_user_id(&self, user_id: &str) -> Result<Wallet> {
        let mut conn = get_connection(&self.pool)?;
        Self::find_by_user_id_in_transaction(&mut conn, user_id)
    }

    /// Looks up a user's wallet on an explicit connection, usable inside a
    /// write transaction.
    pub fn find_by_user_id_in_transaction(
        conn: &mut SqliteConnection,
        user_id: &str,
    ) -> Result<Wallet> {
        wallets::table
            .filter(wallets::user_id.eq(user_id))
            .select(WalletDB::as_select())
            .first::<WalletDB>(conn)
            .optional()?
            .map(Wallet::from)
            .ok_or_else(|| Error::NotFound("Wallet not found".to_string()))
    }

    /// Creates a wallet for a user. Called from the registration unit of work.
    pub fn create_in_transaction(
        conn: &mut SqliteConnection,
        user_id: &str,
        balance: rust_decimal::Decimal,
        currency: &str,
    ) -> Result<Wallet> {
        let now = chrono::Utc::now().naive_utc();
        let wallet_db = WalletDB {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            balance: balance.to_string(),
            currency: currency.to_string(),
            created_at: now,
            updated_at: now,
        };

        diesel::insert_into(wallets::table)
            .values(&wallet_db)
            .execute(conn)?;

        Ok(wallet_db.into())
    }

    /// Overwrites the cached balance. Only ever called inside the unit of
    /// work that moved the money.
    pub fn set_balance_in_transaction(
        conn: &mut SqliteConnection,
        wallet_id: &str,
        new_balance: rust_decimal::Decimal,
    ) -> Result<()> {
        diesel::update(wallets::table.find(wallet_id))
            .set((
                wallets::balance.eq(new_balance.to_string()),
                wallets::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(conn)?;

        Ok(())
    }
}
