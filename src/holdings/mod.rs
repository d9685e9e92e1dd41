pub(crate) mod holdings_accountant;
pub(crate) mod holdings_model;
pub(crate) mod holdings_repository;

pub use holdings_accountant::{add_shares, remove_shares, shares_held};
pub use holdings_model::{Holding, HoldingDB};
pub use holdings_repository::HoldingRepository;
