use chrono::Utc;
use rust_decimal_macros::dec;

use ledgerdesk::errors::Error;
use ledgerdesk::portfolios::PortfolioService;
use ledgerdesk::stocks::StockService;
use ledgerdesk::trades::{
    NewTradeOrder, SettlementMode, TradeOrderRepository, TradeOrderType, TradeService,
};
use ledgerdesk::users::UserService;

mod common;

fn order(portfolio_id: &str, stock_id: &str, order_type: TradeOrderType, quantity: rust_decimal::Decimal) -> NewTradeOrder {
    NewTradeOrder {
        portfolio_id: portfolio_id.to_string(),
        stock_id: stock_id.to_string(),
        order_type,
        quantity,
        external_ref_id: None,
    }
}

#[test]
fn buy_settles_cash_and_shares_in_one_step() {
    let ctx = common::setup();
    let profile = common::register_user(&ctx.pool, "buyer@example.com");
    let portfolio_id = profile.portfolios[0].id.clone();
    let stock = common::add_stock(&ctx.pool, "ACME", dec!(150));
    common::deposit(&ctx.pool, &profile.user.id, dec!(1000));

    let trades = TradeService::new(ctx.pool.clone(), SettlementMode::Immediate);
    let placed = trades
        .create_trade_order(
            &profile.user.id,
            order(&portfolio_id, &stock.id, TradeOrderType::Buy, dec!(5)),
        )
        .unwrap();

    assert!(placed.is_executed());
    assert_eq!(placed.price, dec!(750));

    let users = UserService::new(ctx.pool.clone());
    assert_eq!(
        users.get_user_profile(&profile.user.id).unwrap().wallet.balance,
        dec!(250)
    );

    let portfolios = PortfolioService::new(ctx.pool.clone());
    let positions = portfolios
        .get_portfolio_holdings(&portfolio_id, &profile.user.id)
        .unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].shares, dec!(5));
    assert_eq!(positions[0].investment_amount, dec!(750));
    assert_eq!(positions[0].current_value, dec!(750));
}

#[test]
fn selling_out_a_position_removes_it_and_credits_the_wallet() {
    let ctx = common::setup();
    let profile = common::register_user(&ctx.pool, "seller@example.com");
    let portfolio_id = profile.portfolios[0].id.clone();
    let stock = common::add_stock(&ctx.pool, "ZEN", dec!(150));
    common::deposit(&ctx.pool, &profile.user.id, dec!(2000));

    let trades = TradeService::new(ctx.pool.clone(), SettlementMode::Immediate);
    trades
        .create_trade_order(
            &profile.user.id,
            order(&portfolio_id, &stock.id, TradeOrderType::Buy, dec!(10)),
        )
        .unwrap();

    // Price moves before the sale.
    StockService::new(ctx.pool.clone())
        .update_price(&stock.id, dec!(160))
        .unwrap();

    let sale = trades
        .create_trade_order(
            &profile.user.id,
            order(&portfolio_id, &stock.id, TradeOrderType::Sell, dec!(10)),
        )
        .unwrap();
    assert_eq!(sale.price, dec!(1600));

    // 2000 - 1500 + 1600
    let users = UserService::new(ctx.pool.clone());
    assert_eq!(
        users.get_user_profile(&profile.user.id).unwrap().wallet.balance,
        dec!(2100)
    );

    // The sold-out position is gone, not a zero-share row.
    let portfolios = PortfolioService::new(ctx.pool.clone());
    let positions = portfolios
        .get_portfolio_holdings(&portfolio_id, &profile.user.id)
        .unwrap();
    assert!(positions.is_empty());
}

#[test]
fn partial_sale_keeps_gross_cost_basis() {
    let ctx = common::setup();
    let profile = common::register_user(&ctx.pool, "partial@example.com");
    let portfolio_id = profile.portfolios[0].id.clone();
    let stock = common::add_stock(&ctx.pool, "PRT", dec!(100));
    common::deposit(&ctx.pool, &profile.user.id, dec!(1000));

    let trades = TradeService::new(ctx.pool.clone(), SettlementMode::Immediate);
    trades
        .create_trade_order(
            &profile.user.id,
            order(&portfolio_id, &stock.id, TradeOrderType::Buy, dec!(10)),
        )
        .unwrap();

    StockService::new(ctx.pool.clone())
        .update_price(&stock.id, dec!(110))
        .unwrap();

    trades
        .create_trade_order(
            &profile.user.id,
            order(&portfolio_id, &stock.id, TradeOrderType::Sell, dec!(4)),
        )
        .unwrap();

    let portfolios = PortfolioService::new(ctx.pool.clone());
    let summary = portfolios
        .get_portfolio_summary(&portfolio_id, &profile.user.id)
        .unwrap();
    let position = &summary.holdings[0];

    assert_eq!(position.shares, dec!(6));
    // investment stays gross, proceeds accumulate on the sell side
    assert_eq!(position.investment_amount, dec!(1000));
    assert_eq!(position.sell_amount, dec!(440));
    assert_eq!(position.current_value, dec!(660));
    // 660 + 440 - 1000
    assert_eq!(position.profit_loss, dec!(100));
    assert_eq!(summary.summary.total_profit_loss, dec!(100));

    // The position reconciles with the executed order trail.
    let net = TradeOrderRepository::new(ctx.pool.clone())
        .executed_quantity(&portfolio_id, &stock.id)
        .unwrap();
    assert_eq!(net, position.shares);
}

#[test]
fn buy_without_funds_is_rejected_without_mutation() {
    let ctx = common::setup();
    let profile = common::register_user(&ctx.pool, "broke@example.com");
    let portfolio_id = profile.portfolios[0].id.clone();
    let stock = common::add_stock(&ctx.pool, "EXP", dec!(300));
    common::deposit(&ctx.pool, &profile.user.id, dec!(100));

    let trades = TradeService::new(ctx.pool.clone(), SettlementMode::Immediate);
    let err = trades
        .create_trade_order(
            &profile.user.id,
            order(&portfolio_id, &stock.id, TradeOrderType::Buy, dec!(1)),
        )
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Insufficient funds: Insufficient funds for this trade"
    );

    let users = UserService::new(ctx.pool.clone());
    assert_eq!(
        users.get_user_profile(&profile.user.id).unwrap().wallet.balance,
        dec!(100)
    );
    let orders = trades
        .get_user_trade_orders(&profile.user.id, None, None)
        .unwrap();
    assert_eq!(orders.total, 0);
}

#[test]
fn selling_more_than_held_is_rejected() {
    let ctx = common::setup();
    let profile = common::register_user(&ctx.pool, "short@example.com");
    let portfolio_id = profile.portfolios[0].id.clone();
    let stock = common::add_stock(&ctx.pool, "SHT", dec!(10));
    common::deposit(&ctx.pool, &profile.user.id, dec!(100));

    let trades = TradeService::new(ctx.pool.clone(), SettlementMode::Immediate);

    // No position at all.
    let err = trades
        .create_trade_order(
            &profile.user.id,
            order(&portfolio_id, &stock.id, TradeOrderType::Sell, dec!(1)),
        )
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientShares(_)));

    trades
        .create_trade_order(
            &profile.user.id,
            order(&portfolio_id, &stock.id, TradeOrderType::Buy, dec!(3)),
        )
        .unwrap();

    let err = trades
        .create_trade_order(
            &profile.user.id,
            order(&portfolio_id, &stock.id, TradeOrderType::Sell, dec!(4)),
        )
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Insufficient shares: Insufficient shares for this sale"
    );

    // Position untouched by the failed sale.
    let portfolios = PortfolioService::new(ctx.pool.clone());
    let positions = portfolios
        .get_portfolio_holdings(&portfolio_id, &profile.user.id)
        .unwrap();
    assert_eq!(positions[0].shares, dec!(3));
}

#[test]
fn deferred_orders_settle_on_execute_only() {
    let ctx = common::setup();
    let profile = common::register_user(&ctx.pool, "deferred@example.com");
    let portfolio_id = profile.portfolios[0].id.clone();
    let stock = common::add_stock(&ctx.pool, "DFR", dec!(50));
    common::deposit(&ctx.pool, &profile.user.id, dec!(500));

    let trades = TradeService::new(ctx.pool.clone(), SettlementMode::Deferred);
    let placed = trades
        .create_trade_order(
            &profile.user.id,
            order(&portfolio_id, &stock.id, TradeOrderType::Buy, dec!(4)),
        )
        .unwrap();
    assert!(!placed.is_executed());
    assert_eq!(placed.price, dec!(200));

    // Nothing moved yet.
    let users = UserService::new(ctx.pool.clone());
    assert_eq!(
        users.get_user_profile(&profile.user.id).unwrap().wallet.balance,
        dec!(500)
    );
    let portfolios = PortfolioService::new(ctx.pool.clone());
    assert!(portfolios
        .get_portfolio_holdings(&portfolio_id, &profile.user.id)
        .unwrap()
        .is_empty());

    let executed = trades
        .execute_trade_order(&placed.id, &profile.user.id, Utc::now())
        .unwrap();
    assert!(executed.is_executed());
    assert_eq!(
        users.get_user_profile(&profile.user.id).unwrap().wallet.balance,
        dec!(300)
    );

    // Executed is terminal.
    let err = trades
        .execute_trade_order(&placed.id, &profile.user.id, Utc::now())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid state: Trade order has already been executed"
    );
}

#[test]
fn invalid_quantities_are_rejected_before_any_lookup() {
    let ctx = common::setup();
    let profile = common::register_user(&ctx.pool, "quant@example.com");
    let portfolio_id = profile.portfolios[0].id.clone();
    let stock = common::add_stock(&ctx.pool, "QNT", dec!(10));

    let trades = TradeService::new(ctx.pool.clone(), SettlementMode::Immediate);

    let err = trades
        .create_trade_order(
            &profile.user.id,
            order(&portfolio_id, &stock.id, TradeOrderType::Buy, dec!(0)),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid argument: Quantity must be positive");

    // More than four decimal places of shares.
    let err = trades
        .create_trade_order(
            &profile.user.id,
            order(&portfolio_id, &stock.id, TradeOrderType::Buy, dec!(0.00001)),
        )
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn trading_in_another_users_portfolio_reads_as_missing() {
    let ctx = common::setup();
    let alice = common::register_user(&ctx.pool, "owner@example.com");
    let mallory = common::register_user(&ctx.pool, "intruder@example.com");
    let stock = common::add_stock(&ctx.pool, "OWN", dec!(10));
    common::deposit(&ctx.pool, &mallory.user.id, dec!(100));

    let trades = TradeService::new(ctx.pool.clone(), SettlementMode::Immediate);
    let err = trades
        .create_trade_order(
            &mallory.user.id,
            order(&alice.portfolios[0].id, &stock.id, TradeOrderType::Buy, dec!(1)),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "Not found: Portfolio not found");
}

#[test]
fn concurrent_buys_cannot_double_spend() {
    let ctx = common::setup();
    let profile = common::register_user(&ctx.pool, "racer@example.com");
    let portfolio_id = profile.portfolios[0].id.clone();
    let stock = common::add_stock(&ctx.pool, "RCE", dec!(150));
    common::deposit(&ctx.pool, &profile.user.id, dec!(1000));

    // Two buys of 600 each against a balance of 1000: at most one can fit.
    let mut handles = Vec::new();
    for _ in 0..2 {
        let pool = ctx.pool.clone();
        let user_id = profile.user.id.clone();
        let portfolio_id = portfolio_id.clone();
        let stock_id = stock.id.clone();
        handles.push(std::thread::spawn(move || {
            TradeService::new(pool, SettlementMode::Immediate).create_trade_order(
                &user_id,
                NewTradeOrder {
                    portfolio_id,
                    stock_id,
                    order_type: TradeOrderType::Buy,
                    quantity: dec!(4),
                    external_ref_id: None,
                },
            )
        }));
    }

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, Error::InsufficientFunds(_))));

    let users = UserService::new(ctx.pool.clone());
    assert_eq!(
        users.get_user_profile(&profile.user.id).unwrap().wallet.balance,
        dec!(400)
    );
}

#[test]
fn order_listing_carries_display_fields_and_status() {
    let ctx = common::setup();
    let profile = common::register_user(&ctx.pool, "lister@example.com");
    let portfolio_id = profile.portfolios[0].id.clone();
    let stock = common::add_stock(&ctx.pool, "LST", dec!(20));
    common::deposit(&ctx.pool, &profile.user.id, dec!(100));

    let trades = TradeService::new(ctx.pool.clone(), SettlementMode::Immediate);
    trades
        .create_trade_order(
            &profile.user.id,
            order(&portfolio_id, &stock.id, TradeOrderType::Buy, dec!(2)),
        )
        .unwrap();

    let page = trades
        .get_user_trade_orders(&profile.user.id, None, None)
        .unwrap();
    assert_eq!(page.total, 1);
    let details = &page.orders[0];
    assert_eq!(details.stock_symbol, "LST");
    assert_eq!(details.stock_name, "LST Inc.");
    assert_eq!(details.portfolio_name, "Main Portfolio");
    assert_eq!(details.price, dec!(40));
    assert_eq!(
        serde_json::to_value(details.status).unwrap(),
        serde_json::json!("executed")
    );
}
