use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tempfile::TempDir;

use ledgerdesk::db::{self, DbPool};
use ledgerdesk::stocks::{NewStock, Stock, StockService};
use ledgerdesk::transactions::{NewTransaction, TransactionService, TransactionType};
use ledgerdesk::users::{NewUser, UserProfile, UserService};

/// A fresh database in a temp directory. The directory is dropped (and the
/// database file deleted) when the context goes out of scope.
pub struct TestContext {
    pub pool: Arc<DbPool>,
    _data_dir: TempDir,
}

pub fn setup() -> TestContext {
    let data_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = db::init(data_dir.path().to_str().unwrap()).expect("Failed to initialize database");
    let pool = db::create_pool(&db_path).expect("Failed to create database pool");
    db::run_migrations(&pool).expect("Failed to run migrations");

    TestContext {
        pool,
        _data_dir: data_dir,
    }
}

/// Registers a user and returns the profile, which carries the wallet and
/// the default portfolio created alongside the account.
pub fn register_user(pool: &Arc<DbPool>, email: &str) -> UserProfile {
    let service = UserService::new(pool.clone());
    let user = service
        .register_user(NewUser {
            email: email.to_string(),
            name: "Test User".to_string(),
            phone: None,
            password_hash: "hashed".to_string(),
        })
        .expect("Failed to register user");

    service
        .get_user_profile(&user.id)
        .expect("Failed to load profile")
}

pub fn add_stock(pool: &Arc<DbPool>, symbol: &str, price: Decimal) -> Stock {
    StockService::new(pool.clone())
        .create_stock(NewStock {
            symbol: symbol.to_string(),
            name: format!("{} Inc.", symbol),
            market: "NASDAQ".to_string(),
            current_price: price,
        })
        .expect("Failed to create stock")
}

/// Records an executed deposit so the wallet has funds to trade with.
pub fn deposit(pool: &Arc<DbPool>, user_id: &str, amount: Decimal) {
    TransactionService::new(pool.clone())
        .create_transaction(
            user_id,
            NewTransaction {
                transaction_type: TransactionType::Deposit,
                amount,
                execution_date: Some(Utc::now()),
                external_ref_id: None,
            },
        )
        .expect("Failed to deposit");
}
