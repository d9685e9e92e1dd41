use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::MONEY_SCALE;
use crate::errors::{Error, Result};
use crate::utils::parse_decimal;

/// Direction of a cash movement on a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdrawal => "WITHDRAWAL",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "DEPOSIT" => Ok(TransactionType::Deposit),
            "WITHDRAWAL" => Ok(TransactionType::Withdrawal),
            other => Err(Error::InvalidArgument(format!(
                "Unknown transaction type: {}",
                other
            ))),
        }
    }
}

/// Domain model for a deposit/withdrawal record.
///
/// A `None` execution_date means the transaction is pending and does not
/// count toward the wallet balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub wallet_id: String,
    pub transaction_type: TransactionType,
    #[serde(with = "crate::utils::decimal_serde")]
    pub amount: Decimal,
    pub execution_date: Option<DateTime<Utc>>,
    pub external_ref_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_executed(&self) -> bool {
        self.execution_date.is_some()
    }
}

/// Input model for recording a new transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub transaction_type: TransactionType,
    #[serde(with = "crate::utils::decimal_serde")]
    pub amount: Decimal,
    pub execution_date: Option<DateTime<Utc>>,
    pub external_ref_id: Option<String>,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(Error::InvalidArgument(
                "Transaction amount must be positive".to_string(),
            ));
        }
        if self.amount.normalize().scale() > MONEY_SCALE {
            return Err(Error::InvalidArgument(format!(
                "Transaction amount carries more than {} decimal places",
                MONEY_SCALE
            )));
        }
        Ok(())
    }
}

/// One page of a wallet's transaction history, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// Database model for transactions
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub wallet_id: String,
    pub transaction_type: String,
    pub amount: String,
    pub execution_date: Option<NaiveDateTime>,
    pub external_ref_id: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<TransactionDB> for Transaction {
    fn from(db: TransactionDB) -> Self {
        Self {
            transaction_type: db.transaction_type.parse().unwrap_or_else(|_| {
                log::error!(
                    "Transaction {} has unknown type '{}'",
                    db.id,
                    db.transaction_type
                );
                TransactionType::Deposit
            }),
            amount: parse_decimal(&db.amount, "transaction.amount"),
            execution_date: db.execution_date.map(|d| Utc.from_utc_datetime(&d)),
            created_at: Utc.from_utc_datetime(&db.created_at),
            id: db.id,
            wallet_id: db.wallet_id,
            external_ref_id: db.external_ref_id,
        }
    }
}
