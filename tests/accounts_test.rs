use rust_decimal_macros::dec;

use ledgerdesk::constants::{DEFAULT_CURRENCY, DEFAULT_PORTFOLIO_NAME};
use ledgerdesk::errors::{DatabaseError, Error};
use ledgerdesk::portfolios::{NewPortfolio, PortfolioService, PortfolioUpdate};
use ledgerdesk::stocks::{NewStock, StockService};
use ledgerdesk::users::{NewUser, UserService, UserUpdate};

mod common;

#[test]
fn registration_provisions_wallet_and_default_portfolio() {
    let ctx = common::setup();
    let profile = common::register_user(&ctx.pool, "new@example.com");

    assert_eq!(profile.wallet.balance, dec!(0));
    assert_eq!(profile.wallet.currency, DEFAULT_CURRENCY);
    assert_eq!(profile.portfolios.len(), 1);
    assert_eq!(profile.portfolios[0].name, DEFAULT_PORTFOLIO_NAME);
}

#[test]
fn duplicate_email_rolls_the_whole_registration_back() {
    let ctx = common::setup();
    let service = UserService::new(ctx.pool.clone());

    let new_user = |name: &str| NewUser {
        email: "taken@example.com".to_string(),
        name: name.to_string(),
        phone: None,
        password_hash: "hashed".to_string(),
    };

    let first = service.register_user(new_user("First")).unwrap();
    let err = service.register_user(new_user("Second")).unwrap_err();
    assert!(matches!(
        err,
        Error::Database(DatabaseError::UniqueViolation(_))
    ));

    // The surviving account is the first one, with exactly one portfolio.
    let profile = service.get_user_profile(&first.id).unwrap();
    assert_eq!(profile.user.name, "First");
    assert_eq!(profile.portfolios.len(), 1);
}

#[test]
fn invalid_registration_input_is_rejected() {
    let ctx = common::setup();
    let service = UserService::new(ctx.pool.clone());

    let err = service
        .register_user(NewUser {
            email: "not-an-email".to_string(),
            name: "X".to_string(),
            phone: None,
            password_hash: "hashed".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    let err = service
        .register_user(NewUser {
            email: "ok@example.com".to_string(),
            name: "   ".to_string(),
            phone: None,
            password_hash: "hashed".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn profile_updates_keep_untouched_fields() {
    let ctx = common::setup();
    let profile = common::register_user(&ctx.pool, "edit@example.com");
    let service = UserService::new(ctx.pool.clone());

    let updated = service
        .update_profile(
            &profile.user.id,
            UserUpdate {
                name: Some("Renamed".to_string()),
                phone: None,
            },
        )
        .unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.email, "edit@example.com");

    // A None field leaves the stored value alone, phone included.
    service
        .update_profile(
            &profile.user.id,
            UserUpdate {
                name: None,
                phone: Some("555-0100".to_string()),
            },
        )
        .unwrap();
    let updated = service
        .update_profile(
            &profile.user.id,
            UserUpdate {
                name: Some("Renamed Again".to_string()),
                phone: None,
            },
        )
        .unwrap();
    assert_eq!(updated.name, "Renamed Again");
    assert_eq!(updated.phone.as_deref(), Some("555-0100"));

    let err = service
        .update_profile(
            &profile.user.id,
            UserUpdate {
                name: Some("  ".to_string()),
                phone: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    let err = service
        .get_user_profile("no-such-user")
        .unwrap_err();
    assert_eq!(err.to_string(), "Not found: User not found");
}

#[test]
fn stock_catalog_enforces_symbols_and_prices() {
    let ctx = common::setup();
    let service = StockService::new(ctx.pool.clone());

    let stock = common::add_stock(&ctx.pool, "AAA", dec!(12.5));
    assert_eq!(service.get_stock_by_symbol("AAA").unwrap().id, stock.id);

    // Duplicate symbol.
    let err = service
        .create_stock(NewStock {
            symbol: "AAA".to_string(),
            name: "Other".to_string(),
            market: "NYSE".to_string(),
            current_price: dec!(1),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Database(DatabaseError::UniqueViolation(_))
    ));

    // Price validation.
    for price in [dec!(0), dec!(-5), dec!(1.001)] {
        let err = service.update_price(&stock.id, price).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    let updated = service.update_price(&stock.id, dec!(13)).unwrap();
    assert_eq!(updated.current_price, dec!(13));

    let err = service.get_stock("no-such-stock").unwrap_err();
    assert_eq!(err.to_string(), "Not found: Stock not found");
}

#[test]
fn portfolios_are_scoped_to_their_owner() {
    let ctx = common::setup();
    let alice = common::register_user(&ctx.pool, "alice@example.com");
    let bob = common::register_user(&ctx.pool, "bob@example.com");
    let service = PortfolioService::new(ctx.pool.clone());

    let second = service
        .create_portfolio(
            &alice.user.id,
            NewPortfolio {
                name: "Growth".to_string(),
                description: Some("High beta".to_string()),
            },
        )
        .unwrap();

    let portfolios = service.get_user_portfolios(&alice.user.id).unwrap();
    assert_eq!(portfolios.len(), 2);

    // Bob cannot see, rename or summarize Alice's portfolio.
    let err = service.get_portfolio(&second.id, &bob.user.id).unwrap_err();
    assert_eq!(err.to_string(), "Not found: Portfolio not found");

    let err = service
        .update_portfolio(
            &second.id,
            &bob.user.id,
            PortfolioUpdate {
                name: Some("Mine now".to_string()),
                description: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let renamed = service
        .update_portfolio(
            &second.id,
            &alice.user.id,
            PortfolioUpdate {
                name: Some("Growth II".to_string()),
                description: None,
            },
        )
        .unwrap();
    assert_eq!(renamed.name, "Growth II");
    assert_eq!(renamed.description, "High beta");
}

#[test]
fn empty_portfolio_summarizes_to_zeroes_and_reads_are_idempotent() {
    let ctx = common::setup();
    let profile = common::register_user(&ctx.pool, "zero@example.com");
    let service = PortfolioService::new(ctx.pool.clone());
    let portfolio_id = &profile.portfolios[0].id;

    let first = service
        .get_portfolio_summary(portfolio_id, &profile.user.id)
        .unwrap();
    assert!(first.holdings.is_empty());
    assert_eq!(first.summary.total_investment, dec!(0));
    assert_eq!(first.summary.total_profit_loss, dec!(0));
    assert_eq!(first.summary.profit_loss_percentage, dec!(0));

    // Valuation is a pure read.
    let second = service
        .get_portfolio_summary(portfolio_id, &profile.user.id)
        .unwrap();
    assert_eq!(first.summary, second.summary);
}
