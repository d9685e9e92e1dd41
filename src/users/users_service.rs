use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::constants::{DEFAULT_CURRENCY, DEFAULT_PORTFOLIO_DESCRIPTION, DEFAULT_PORTFOLIO_NAME};
use crate::db::{DbPool, DbTransactionExecutor};
use crate::errors::{Error, Result};
use crate::portfolios::{NewPortfolio, PortfolioRepository};
use crate::wallets::{actual_balance, WalletRepository};

use super::users_model::{NewUser, ProfileWallet, User, UserProfile, UserUpdate};
use super::users_repository::UserRepository;

/// Account service: registration and profile reads/updates.
pub struct UserService {
    pool: Arc<DbPool>,
    repository: UserRepository,
    wallet_repository: WalletRepository,
    portfolio_repository: PortfolioRepository,
}

impl UserService {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self {
            repository: UserRepository::new(pool.clone()),
            wallet_repository: WalletRepository::new(pool.clone()),
            portfolio_repository: PortfolioRepository::new(pool.clone()),
            pool,
        }
    }

    /// Registers a user.
    ///
    /// The account, a zero-balance wallet and the default portfolio are
    /// created in one unit of work; either all three rows exist afterwards
    /// or none do. A duplicate email surfaces as a unique violation.
    pub fn register_user(&self, new_user: NewUser) -> Result<User> {
        new_user.validate()?;

        self.pool.execute(|conn| {
            let user = UserRepository::create_in_transaction(conn, &new_user)?;
            WalletRepository::create_in_transaction(
                conn,
                &user.id,
                Decimal::ZERO,
                DEFAULT_CURRENCY,
            )?;
            PortfolioRepository::create_in_transaction(
                conn,
                &user.id,
                &NewPortfolio {
                    name: DEFAULT_PORTFOLIO_NAME.to_string(),
                    description: Some(DEFAULT_PORTFOLIO_DESCRIPTION.to_string()),
                },
            )?;

            debug!("Registered user {} ({})", user.id, user.email);
            Ok(user)
        })
    }

    /// Returns the user with their wallet (derived balance) and portfolios.
    pub fn get_user_profile(&self, user_id: &str) -> Result<UserProfile> {
        let user = self.repository.get_by_id(user_id)?;
        let wallet = match self.wallet_repository.get_by_user_id(user_id) {
            Ok(wallet) => wallet,
            Err(Error::NotFound(_)) => {
                return Err(Error::NotFound("User wallet not found".to_string()))
            }
            Err(e) => return Err(e),
        };
        let portfolios = self.portfolio_repository.list_by_user(user_id)?;

        let balance = {
            let mut conn = crate::db::get_connection(&self.pool)?;
            actual_balance(&mut conn, &wallet.id)?
        };

        Ok(UserProfile {
            user,
            wallet: ProfileWallet {
                id: wallet.id,
                balance,
                currency: wallet.currency,
            },
            portfolios,
        })
    }

    /// Updates the user's display fields. A `None` field is left unchanged;
    /// there is no way to clear a phone number through this call.
    pub fn update_profile(&self, user_id: &str, update: UserUpdate) -> Result<User> {
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(Error::InvalidArgument(
                    "User name cannot be empty".to_string(),
                ));
            }
        }

        let user = self.repository.get_by_id(user_id)?;
        self.repository.update_profile(&user, &update)
    }
}
