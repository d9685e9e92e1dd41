use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::parse_decimal;

/// Domain model representing a user's cash wallet.
///
/// `balance` is a cached convenience value maintained alongside every
/// executed movement; funds checks go through the balance calculator
/// instead of trusting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: String,
    pub user_id: String,
    #[serde(with = "crate::utils::decimal_serde")]
    pub balance: Decimal,
    pub currency: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for wallets
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::wallets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WalletDB {
    pub id: String,
    pub user_id: String,
    pub balance: String,
    pub currency: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<WalletDB> for Wallet {
    fn from(db: WalletDB) -> Self {
        Self {
            balance: parse_decimal(&db.balance, "wallet.balance"),
            id: db.id,
            user_id: db.user_id,
            currency: db.currency,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
