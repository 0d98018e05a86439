//! Session-level integration tests.
//!
//! Tests cover:
//! - Market BUY/SELL fills with default slippage and commission
//! - Limit and cash/position rejections leave the session unchanged
//! - Reset confirmation flow through `dispatch`
//! - Dataset loading through a data port, including failed loads
//! - Chart window and trade markers as the cursor moves

mod common;

use common::*;
use rust_decimal_macros::dec;
use tradesim::domain::error::{OrderRejection, SimulatorError};
use tradesim::domain::order::{OrderRequest, Side};
use tradesim::domain::session::{CommandOutcome, SessionCommand};

mod fills {
    use super::*;

    #[test]
    fn market_buy_at_100() {
        let mut s = session_with(flat_series(100, dec!(100.00)));
        let trade = s.place_order(&OrderRequest::market(Side::Buy, 10)).unwrap();

        assert_eq!(trade.execution_price, dec!(100.10));
        assert_eq!(trade.total, dec!(1002.00));
        assert_eq!(trade.commission, dec!(1.00));
        assert_eq!(s.portfolio().cash(), dec!(98998.00));
        assert_eq!(s.portfolio().position(), 10);
    }

    #[test]
    fn market_sell_at_100() {
        let mut s = session_with(flat_series(100, dec!(100.00)));
        s.place_order(&OrderRequest::market(Side::Buy, 10)).unwrap();
        let cash_before = s.portfolio().cash();

        let trade = s.place_order(&OrderRequest::market(Side::Sell, 10)).unwrap();

        assert_eq!(trade.execution_price, dec!(99.90));
        assert_eq!(trade.total, dec!(998.00));
        assert_eq!(s.portfolio().cash(), cash_before + dec!(998.00));
        assert_eq!(s.portfolio().position(), 0);
        assert_eq!(s.portfolio().trades().len(), 2);
    }

    #[test]
    fn round_trip_costs_slippage_and_two_commissions() {
        let mut s = session_with(flat_series(100, dec!(100.00)));
        s.place_order(&OrderRequest::market(Side::Buy, 10)).unwrap();
        s.place_order(&OrderRequest::market(Side::Sell, 10)).unwrap();

        let snap = s.snapshot();
        assert_eq!(snap.cash, dec!(99996.00));
        assert_eq!(snap.valuation.total_pnl, dec!(-4.00));
        assert_eq!(snap.valuation.total_pnl_pct, dec!(-0.004));
    }

    #[test]
    fn limit_buy_fills_when_close_at_or_below_limit() {
        let mut s = session_with(flat_series(100, dec!(100.00)));
        let trade = s
            .place_order(&OrderRequest::limit(Side::Buy, 5, dec!(100.00)))
            .unwrap();
        // admissibility uses the raw close; the fill still pays slippage
        assert_eq!(trade.execution_price, dec!(100.10));
    }

    #[test]
    fn trades_are_dated_by_the_current_bar() {
        let mut s = session_with(flat_series(100, dec!(10)));
        s.advance(5);
        let trade = s.place_order(&OrderRequest::market(Side::Buy, 1)).unwrap();
        assert_eq!(trade.date, date(2024, 1, 1) + chrono::Days::new(55));
    }

    #[test]
    fn valuation_tracks_price_moves() {
        let mut closes = vec![dec!(100); 60];
        closes[51] = dec!(110);
        let mut s = session_with(series(&closes));
        s.place_order(&OrderRequest::market(Side::Buy, 100)).unwrap();
        s.advance(1);

        let snap = s.snapshot();
        assert_eq!(snap.price, dec!(110));
        assert_eq!(snap.valuation.portfolio_value, snap.cash + dec!(11000));
    }
}

mod rejections {
    use super::*;

    #[test]
    fn limit_buy_above_limit_is_rejected() {
        let mut s = session_with(flat_series(100, dec!(100.00)));
        let err = s
            .place_order(&OrderRequest::limit(Side::Buy, 10, dec!(95.00)))
            .unwrap_err();

        assert_eq!(
            err,
            OrderRejection::LimitNotMet {
                side: Side::Buy,
                market: dec!(100.00),
                limit: dec!(95.00),
            }
        );
        assert_eq!(s.portfolio().cash(), dec!(100000));
        assert!(s.portfolio().trades().is_empty());
    }

    #[test]
    fn limit_sell_below_limit_is_rejected() {
        let mut s = session_with(flat_series(100, dec!(100.00)));
        s.place_order(&OrderRequest::market(Side::Buy, 10)).unwrap();
        let err = s
            .place_order(&OrderRequest::limit(Side::Sell, 10, dec!(105)))
            .unwrap_err();
        assert!(matches!(err, OrderRejection::LimitNotMet { side: Side::Sell, .. }));
        assert_eq!(s.portfolio().position(), 10);
    }

    #[test]
    fn oversized_buy_is_rejected_with_amounts() {
        let mut s = session_with(flat_series(100, dec!(100.00)));
        let err = s
            .place_order(&OrderRequest::market(Side::Buy, 1_000_000))
            .unwrap_err();

        match err {
            OrderRejection::InsufficientCash {
                shares,
                required,
                available,
            } => {
                assert_eq!(shares, 1_000_000);
                assert_eq!(required, dec!(100100001.00));
                assert_eq!(available, dec!(100000));
            }
            other => panic!("unexpected rejection {other:?}"),
        }
        assert_eq!(s.portfolio().cash(), dec!(100000));
        assert_eq!(s.portfolio().position(), 0);
    }

    #[test]
    fn oversized_sell_is_rejected() {
        let mut s = session_with(flat_series(100, dec!(100.00)));
        s.place_order(&OrderRequest::market(Side::Buy, 3)).unwrap();
        let err = s.place_order(&OrderRequest::market(Side::Sell, 4)).unwrap_err();
        assert_eq!(
            err,
            OrderRejection::InsufficientPosition {
                requested: 4,
                held: 3,
            }
        );
        assert_eq!(s.portfolio().position(), 3);
        assert_eq!(s.portfolio().trades().len(), 1);
    }

    #[test]
    fn orders_too_large_to_price_are_rejected() {
        let mut s = session_with(flat_series(100, dec!(10000000000)));
        let buy = s.place_order(&OrderRequest::market(Side::Buy, i64::MAX));
        assert!(matches!(buy, Err(OrderRejection::InsufficientCash { .. })));
        let sell = s.place_order(&OrderRequest::market(Side::Sell, i64::MAX));
        assert!(matches!(sell, Err(OrderRejection::InsufficientPosition { .. })));

        let snap = s.snapshot();
        assert_eq!(snap.cash, dec!(100000));
        assert_eq!(snap.position, 0);
        assert!(snap.trades.is_empty());
    }

    #[test]
    fn zero_shares_is_invalid() {
        let mut s = session_with(flat_series(100, dec!(100.00)));
        let err = s.place_order(&OrderRequest::market(Side::Sell, 0)).unwrap_err();
        assert!(matches!(err, OrderRejection::InvalidOrder { .. }));
    }

    #[test]
    fn rejection_through_dispatch_maps_to_simulator_error() {
        let mut s = session_with(flat_series(100, dec!(100.00)));
        let err = s
            .dispatch(SessionCommand::PlaceOrder(OrderRequest::market(Side::Sell, 1)))
            .unwrap_err();
        assert!(matches!(
            err,
            SimulatorError::Rejected(OrderRejection::InsufficientPosition { .. })
        ));
    }
}

mod reset_flow {
    use super::*;

    #[test]
    fn request_then_confirm() {
        let mut s = session_with(flat_series(100, dec!(100.00)));
        s.dispatch(SessionCommand::PlaceOrder(OrderRequest::market(Side::Buy, 10)))
            .unwrap();
        s.dispatch(SessionCommand::Advance(30)).unwrap();

        assert_eq!(
            s.dispatch(SessionCommand::RequestReset).unwrap(),
            CommandOutcome::ResetRequested
        );
        assert_eq!(s.portfolio().position(), 10);
        assert_eq!(
            s.dispatch(SessionCommand::ConfirmReset).unwrap(),
            CommandOutcome::ResetConfirmed
        );

        let snap = s.snapshot();
        assert_eq!(snap.cash, dec!(100000));
        assert_eq!(snap.position, 0);
        assert!(snap.trades.is_empty());
        assert_eq!(snap.current_day, 50);
    }

    #[test]
    fn confirm_without_request_fails() {
        let mut s = session_with(flat_series(100, dec!(100.00)));
        s.place_order(&OrderRequest::market(Side::Buy, 1)).unwrap();
        let err = s.dispatch(SessionCommand::ConfirmReset).unwrap_err();
        assert!(matches!(err, SimulatorError::ResetNotPending));
        assert_eq!(s.portfolio().position(), 1);
    }

    #[test]
    fn cancel_then_confirm_fails() {
        let mut s = session_with(flat_series(100, dec!(100.00)));
        s.dispatch(SessionCommand::RequestReset).unwrap();
        s.dispatch(SessionCommand::CancelReset).unwrap();
        assert!(s.dispatch(SessionCommand::ConfirmReset).is_err());
    }

    #[test]
    fn reset_on_short_series_clamps_cursor() {
        let mut s = session_with(flat_series(20, dec!(100.00)));
        s.retreat(5);
        s.request_reset();
        s.confirm_reset().unwrap();
        assert_eq!(s.current_day(), 19);
    }
}

mod datasets {
    use super::*;

    #[test]
    fn load_from_port_replaces_everything() {
        let port = MockDataPort::new().with_bars("MSFT", flat_series(30, dec!(250)));
        let mut s = session_with(flat_series(100, dec!(100.00)));
        s.place_order(&OrderRequest::market(Side::Buy, 10)).unwrap();

        s.load_from(&port, "MSFT").unwrap();

        let snap = s.snapshot();
        assert_eq!(snap.dataset, "MSFT");
        assert_eq!(snap.last_index, 29);
        assert_eq!(snap.current_day, 29);
        assert_eq!(snap.price, dec!(250));
        assert_eq!(snap.cash, dec!(100000));
        assert_eq!(snap.position, 0);
        assert!(snap.trades.is_empty());
    }

    #[test]
    fn failed_load_keeps_prior_state() {
        let port = MockDataPort::new().with_error("BAD", "not-a-date");
        let mut s = session_with(flat_series(100, dec!(100.00)));
        s.place_order(&OrderRequest::market(Side::Buy, 10)).unwrap();
        s.advance(7);

        let err = s.load_from(&port, "BAD").unwrap_err();
        assert!(matches!(err, SimulatorError::DataLoad(_)));

        let snap = s.snapshot();
        assert_eq!(snap.dataset, "TEST");
        assert_eq!(snap.current_day, 57);
        assert_eq!(snap.position, 10);
        assert_eq!(snap.trades.len(), 1);
    }

    #[test]
    fn unknown_dataset_keeps_prior_state() {
        let port = MockDataPort::new();
        let mut s = session_with(flat_series(100, dec!(100.00)));
        assert!(s.load_from(&port, "NOPE").is_err());
        assert_eq!(s.market().name(), "TEST");
    }

    #[test]
    fn replace_through_dispatch_reports_size() {
        let mut s = session_with(flat_series(100, dec!(100.00)));
        let outcome = s
            .dispatch(SessionCommand::ReplaceDataset(market(
                "AAPL",
                flat_series(75, dec!(190)),
            )))
            .unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::DatasetLoaded {
                name: "AAPL".into(),
                bars: 75,
            }
        );
    }
}

mod chart {
    use super::*;

    #[test]
    fn window_ends_at_current_day() {
        let mut s = session_with(flat_series(100, dec!(100.00)));
        s.set_chart_days(10);
        let view = s.chart();
        assert_eq!(view.bars.len(), 11);
        assert_eq!(view.bars.last().unwrap().date, s.current_bar().date);
    }

    #[test]
    fn window_is_shorter_near_the_start() {
        let mut s = session_with(flat_series(100, dec!(100.00)));
        s.seek(3);
        let view = s.chart();
        assert_eq!(view.bars.len(), 4);
    }

    #[test]
    fn markers_follow_the_window() {
        let mut s = session_with(flat_series(100, dec!(100.00)));
        s.set_chart_days(10);
        s.place_order(&OrderRequest::market(Side::Buy, 10)).unwrap();
        s.advance(5);
        s.place_order(&OrderRequest::market(Side::Sell, 5)).unwrap();

        assert_eq!(s.chart().markers.len(), 2);

        s.advance(8);
        let markers = s.chart().markers;
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].action, Side::Sell);

        s.seek(52);
        let markers = s.chart().markers;
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].action, Side::Buy);
    }

    #[test]
    fn chart_days_are_clamped() {
        let mut s = session_with(flat_series(100, dec!(100.00)));
        assert_eq!(s.set_chart_days(3), 10);
        assert_eq!(s.set_chart_days(500), 100);

        let mut tiny = session_with(flat_series(5, dec!(1)));
        assert_eq!(tiny.set_chart_days(1), 5);
    }
}
