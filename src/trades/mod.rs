pub(crate) mod trades_model;
pub(crate) mod trades_repository;
pub(crate) mod trades_service;

pub use trades_model::{
    NewTradeOrder, SettlementMode, TradeOrder, TradeOrderDB, TradeOrderDetails, TradeOrderPage,
    TradeOrderStatus, TradeOrderType,
};
pub use trades_repository::TradeOrderRepository;
pub use trades_service::TradeService;
