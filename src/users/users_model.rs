use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::portfolios::Portfolio;

/// Domain model for a user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for registering a user.
///
/// Credential handling lives with the caller: `password_hash` arrives
/// already hashed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub password_hash: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(Error::InvalidArgument(
                "A valid email address is required".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "User name cannot be empty".to_string(),
            ));
        }
        if self.password_hash.is_empty() {
            return Err(Error::InvalidArgument(
                "Password hash cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Input model for profile updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Wallet as shown on the profile: the balance is the derived actual
/// balance, not the cached column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileWallet {
    pub id: String,
    #[serde(with = "crate::utils::decimal_serde")]
    pub balance: Decimal,
    pub currency: String,
}

/// Profile read model: user, wallet and portfolio list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user: User,
    pub wallet: ProfileWallet,
    pub portfolios: Vec<Portfolio>,
}

/// Database model for users
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserDB {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<UserDB> for User {
    fn from(db: UserDB) -> Self {
        Self {
            id: db.id,
            email: db.email,
            name: db.name,
            phone: db.phone,
            password_hash: db.password_hash,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
