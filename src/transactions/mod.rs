pub(crate) mod transactions_model;
pub(crate) mod transactions_repository;
pub(crate) mod transactions_service;

pub use transactions_model::{
    NewTransaction, Transaction, TransactionDB, TransactionPage, TransactionType,
};
pub use transactions_repository::TransactionRepository;
pub use transactions_service::TransactionService;
