#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::holdings::Holding;
    use crate::portfolios::portfolios_model::{aggregate_positions, value_position};
    use crate::stocks::Stock;

    fn holding(shares: Decimal, investment: Decimal, sold: Decimal) -> Holding {
        Holding {
            id: "h1".to_string(),
            portfolio_id: "p1".to_string(),
            stock_id: "s1".to_string(),
            shares,
            investment_amount: investment,
            sell_amount: sold,
            updated_at: Utc::now().naive_utc(),
        }
    }

    fn stock(price: Decimal) -> Stock {
        let now = Utc::now().naive_utc();
        Stock {
            id: "s1".to_string(),
            symbol: "AAPL".to_string(),
            name: "Apple Inc.".to_string(),
            market: "NASDAQ".to_string(),
            current_price: price,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn values_open_position_at_current_price() {
        let position = value_position(&holding(dec!(5), dec!(750.00), dec!(0)), &stock(dec!(160.00)));

        assert_eq!(position.current_value, dec!(800.00));
        assert_eq!(position.profit_loss, dec!(50.00));
        assert_eq!(position.profit_loss_percentage, dec!(6.67));
    }

    #[test]
    fn counts_realized_proceeds_in_profit_loss() {
        // 10 bought for 1500, 4 sold for 640, 6 still held at 160.
        let position =
            value_position(&holding(dec!(6), dec!(1500.00), dec!(640.00)), &stock(dec!(160.00)));

        assert_eq!(position.current_value, dec!(960.00));
        assert_eq!(position.profit_loss, dec!(100.00));
    }

    #[test]
    fn zero_basis_guards_percentage() {
        let position = value_position(&holding(dec!(1), dec!(0), dec!(0)), &stock(dec!(10.00)));

        assert_eq!(position.profit_loss_percentage, Decimal::ZERO);
    }

    #[test]
    fn aggregates_sum_per_position_figures() {
        let stock = stock(dec!(100.00));
        let positions = vec![
            value_position(&holding(dec!(2), dec!(150.00), dec!(0)), &stock),
            value_position(&holding(dec!(1), dec!(120.00), dec!(30.00)), &stock),
        ];

        let totals = aggregate_positions(&positions);

        assert_eq!(totals.total_investment, dec!(270.00));
        assert_eq!(totals.total_current_value, dec!(300.00));
        assert_eq!(totals.total_sell_amount, dec!(30.00));
        assert_eq!(totals.total_profit_loss, dec!(60.00));
        assert_eq!(totals.profit_loss_percentage, dec!(22.22));
    }

    #[test]
    fn empty_portfolio_aggregates_to_zero() {
        let totals = aggregate_positions(&[]);

        assert_eq!(totals.total_investment, Decimal::ZERO);
        assert_eq!(totals.total_profit_loss, Decimal::ZERO);
        assert_eq!(totals.profit_loss_percentage, Decimal::ZERO);
    }
}
