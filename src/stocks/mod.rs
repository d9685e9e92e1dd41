pub(crate) mod stocks_model;
pub(crate) mod stocks_repository;
pub(crate) mod stocks_service;

pub use stocks_model::{NewStock, Stock, StockDB};
pub use stocks_repository::StockRepository;
pub use stocks_service::StockService;
