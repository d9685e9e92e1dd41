pub mod constants;
pub mod db;
pub mod errors;
pub mod holdings;
pub mod portfolios;
pub mod schema;
pub mod stocks;
pub mod trades;
pub mod transactions;
pub mod users;
pub mod utils;
pub mod wallets;

pub use errors::{Error, Result};
