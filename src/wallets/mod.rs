pub(crate) mod balance;
pub(crate) mod wallets_model;
pub(crate) mod wallets_repository;

pub use balance::actual_balance;
pub use wallets_model::{Wallet, WalletDB};
pub use wallets_repository::WalletRepository;
