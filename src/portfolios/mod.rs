pub(crate) mod portfolios_model;
pub(crate) mod portfolios_repository;
pub(crate) mod portfolios_service;

#[cfg(test)]
mod portfolios_model_tests;

pub use portfolios_model::{
    aggregate_positions, value_position, HoldingPosition, NewPortfolio, Portfolio, PortfolioDB,
    PortfolioSummary, PortfolioTotals, PortfolioUpdate,
};
pub use portfolios_repository::PortfolioRepository;
pub use portfolios_service::PortfolioService;
