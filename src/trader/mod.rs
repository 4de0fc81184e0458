//! The trading core.
//!
//! `AutoTrader` owns every piece of mutable strategy state (position,
//! risk flags, open orders, cached Future quote) and processes gateway
//! events strictly one at a time. Each handler runs to completion before
//! the next event is looked at; commands leave through the gateway sink
//! without waiting for an answer.

mod stats;

pub use stats::TraderStats;

use crate::config::Config;
use crate::gateway::{
    BookSnapshot, Command, Gateway, GatewayEvent, Instrument, OrderId, Price, Volume,
};
use crate::orders::{OrderIdAllocator, OrderRegistry, OrderState, TrackedOrder};
use crate::risk::{PositionLedger, RiskFlags, RiskThrottle};
use crate::strategy::{
    Decision, DecisionEngine, HedgeEngine, MarketState, OrderIntent, PriceLadder,
};
use tracing::{debug, info, warn};

/// Event-driven ETF/Future arbitrage agent.
pub struct AutoTrader<G: Gateway> {
    gateway: G,
    ids: OrderIdAllocator,
    registry: OrderRegistry,
    ledger: PositionLedger,
    throttle: RiskThrottle,
    market: MarketState,
    decision: DecisionEngine,
    hedge: HedgeEngine,
    stats: TraderStats,
}

impl<G: Gateway> AutoTrader<G> {
    /// Create a trader sending its commands to `gateway`.
    pub fn new(config: &Config, gateway: G) -> Self {
        Self {
            gateway,
            ids: OrderIdAllocator::new(),
            registry: OrderRegistry::new(),
            ledger: PositionLedger::new(),
            throttle: RiskThrottle::new(config.risk.clone()),
            market: MarketState::new(),
            decision: DecisionEngine::new(config.trading.clone()),
            hedge: HedgeEngine::new(&config.trading),
            stats: TraderStats::default(),
        }
    }

    /// Process one gateway event.
    pub fn handle_event(&mut self, event: GatewayEvent) {
        self.stats.events += 1;
        match event {
            GatewayEvent::OrderBookUpdate(book) => self.on_order_book_update(&book),
            GatewayEvent::TradeTicks(book) => self.on_trade_ticks(&book),
            GatewayEvent::OrderFilled {
                order_id,
                price,
                volume,
            } => self.on_order_filled(order_id, price, volume),
            GatewayEvent::OrderStatus {
                order_id,
                fill_volume,
                remaining_volume,
                fees,
            } => self.on_order_status(order_id, fill_volume, remaining_volume, fees),
            GatewayEvent::HedgeFilled {
                order_id,
                price,
                volume,
            } => self.on_hedge_filled(order_id, price, volume),
            GatewayEvent::Error { order_id, message } => self.on_error(order_id, &message),
        }
    }

    /// Order book update for either instrument.
    ///
    /// The risk throttle runs first and may cancel everything outstanding;
    /// only then is the ETF decision rule applied. Future updates refresh the
    /// cached quote and never place orders.
    pub fn on_order_book_update(&mut self, book: &BookSnapshot) {
        self.stats.book_updates += 1;

        if self.throttle.flags().do_not_buy {
            debug!(
                instrument = %book.instrument,
                seq = book.sequence_number,
                "Holding off until next fill"
            );
            return;
        }

        info!(
            instrument = %book.instrument,
            seq = book.sequence_number,
            position = self.ledger.etf(),
            "Order book update"
        );

        let outcome = self
            .throttle
            .evaluate(self.ledger.etf(), self.registry.outstanding_count());
        if outcome.requires_cancel_all() {
            self.cancel_all();
        }

        match book.instrument {
            Instrument::Etf => self.trade_etf_book(book),
            Instrument::Future => self.market.update_future(book),
        }
    }

    fn trade_etf_book(&mut self, book: &BookSnapshot) {
        let decision = self.decision.evaluate(
            PriceLadder::new(&book.ask_prices, &book.ask_volumes),
            PriceLadder::new(&book.bid_prices, &book.bid_volumes),
            &self.market,
            &self.throttle.flags(),
        );

        match decision {
            Decision::Place(intent) => self.insert_order(intent),
            Decision::Hold(reason) => {
                debug!(seq = book.sequence_number, ?reason, "No order this cycle")
            }
            Decision::NoBook => {
                debug!(seq = book.sequence_number, "ETF book one-sided or empty")
            }
        }
    }

    fn insert_order(&mut self, intent: OrderIntent) {
        let order_id = self.ids.next_id();

        self.gateway.send(Command::InsertOrder {
            order_id,
            side: intent.side,
            price: intent.price,
            volume: intent.volume,
            lifespan: intent.lifespan,
        });
        self.registry.register(TrackedOrder::new(
            order_id,
            intent.side,
            intent.price,
            intent.volume,
            intent.lifespan,
        ));
        self.stats.orders_inserted += 1;

        info!(
            order_id,
            side = ?intent.side,
            price = intent.price,
            volume = intent.volume,
            "Inserted ETF order"
        );
    }

    /// Cancel every outstanding order. Returns how many cancels were sent.
    pub fn cancel_all(&mut self) -> usize {
        let ids = self.registry.drain_outstanding();
        for order_id in &ids {
            self.gateway.send(Command::CancelOrder {
                order_id: *order_id,
            });
        }

        if !ids.is_empty() {
            info!(count = ids.len(), ids = ?ids, "Cancelled outstanding orders");
        }
        self.stats.cancels_sent += ids.len() as u64;
        ids.len()
    }

    /// Own ETF order filled: update the position and hedge it at once.
    pub fn on_order_filled(&mut self, order_id: OrderId, price: Price, volume: Volume) {
        info!(order_id, price, volume, "Order filled");

        let Some(side) = self.registry.record_fill(order_id, volume) else {
            warn!(order_id, "Fill for unknown order ignored");
            return;
        };
        self.stats.fills += 1;

        let position = self.ledger.apply_etf_fill(side, volume);

        let hedge = self.hedge.hedge_for(side, volume);
        let hedge_id = self.ids.next_id();
        self.gateway.send(Command::HedgeOrder {
            order_id: hedge_id,
            side: hedge.side,
            price: hedge.price,
            volume: hedge.volume,
        });
        self.ledger.record_hedge(hedge.side, hedge.volume);
        self.stats.hedges_sent += 1;
        self.throttle.clear_hold_off();

        info!(
            order_id,
            hedge_id,
            hedge_side = ?hedge.side,
            hedge_price = hedge.price,
            position,
            net_delta = self.ledger.net_delta(),
            "Sent Future hedge"
        );
    }

    /// Exchange status report for an own order.
    pub fn on_order_status(
        &mut self,
        order_id: OrderId,
        fill_volume: Volume,
        remaining_volume: Volume,
        fees: i64,
    ) {
        info!(
            order_id,
            fill_volume,
            remaining_volume,
            fees,
            "Order status"
        );

        match self
            .registry
            .apply_status(order_id, fill_volume, remaining_volume)
        {
            Some(transition) if transition.to == OrderState::Closed => {
                debug!(order_id, side = ?transition.side, from = ?transition.from, "Order terminated");
            }
            Some(_) => {}
            None => debug!(order_id, "Status for untracked order"),
        }
    }

    /// Hedge fills are informational.
    pub fn on_hedge_filled(&mut self, order_id: OrderId, price: Price, volume: Volume) {
        self.stats.hedge_fills += 1;
        info!(order_id, price, volume, "Hedge filled");
    }

    /// Trade ticks are informational.
    pub fn on_trade_ticks(&mut self, book: &BookSnapshot) {
        debug!(
            instrument = %book.instrument,
            seq = book.sequence_number,
            "Trade ticks"
        );
    }

    /// Exchange rejected or errored an order.
    ///
    /// Everything outstanding is cancelled; if the order is one of ours it is
    /// force-closed as though its remaining volume had dropped to zero.
    pub fn on_error(&mut self, order_id: OrderId, message: &str) {
        self.stats.errors += 1;
        warn!(order_id, %message, "Order error");

        self.cancel_all();

        if self.registry.side_of(order_id).is_some() {
            self.on_order_status(order_id, 0, 0, 0);
        }
    }

    /// Ignore book updates until the next own fill arrives.
    pub fn hold_off(&mut self) {
        info!("Holding off new orders until next fill");
        self.throttle.hold_off();
    }

    /// Signed ETF position.
    pub fn position(&self) -> i64 {
        self.ledger.etf()
    }

    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    pub fn flags(&self) -> RiskFlags {
        self.throttle.flags()
    }

    pub fn registry(&self) -> &OrderRegistry {
        &self.registry
    }

    pub fn market(&self) -> &MarketState {
        &self.market
    }

    pub fn stats(&self) -> &TraderStats {
        &self.stats
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Lifespan, MockGateway, RecordingGateway, Side};

    fn trader() -> AutoTrader<RecordingGateway> {
        AutoTrader::new(&Config::default(), RecordingGateway::new())
    }

    fn book(instrument: Instrument, ask: (Price, Volume), bid: (Price, Volume)) -> BookSnapshot {
        BookSnapshot {
            instrument,
            sequence_number: 1,
            ask_prices: vec![ask.0, 0],
            ask_volumes: vec![ask.1, 0],
            bid_prices: vec![bid.0, 0],
            bid_volumes: vec![bid.1, 0],
        }
    }

    /// Future quoted 14700/14800, ETF bid 15000: a sell edge of two ticks.
    fn sell_setup(trader: &mut AutoTrader<impl Gateway>) {
        trader.on_order_book_update(&book(Instrument::Future, (14800, 50), (14700, 50)));
        trader.on_order_book_update(&book(Instrument::Etf, (15100, 8), (15000, 30)));
    }

    /// Future quoted 15000/15100, ETF ask 14800: a buy edge of two ticks.
    fn buy_setup(trader: &mut AutoTrader<impl Gateway>) {
        trader.on_order_book_update(&book(Instrument::Future, (15100, 50), (15000, 50)));
        trader.on_order_book_update(&book(Instrument::Etf, (14800, 40), (14700, 12)));
    }

    #[test]
    fn test_sell_inserted_on_edge() {
        let mut trader = trader();
        sell_setup(&mut trader);

        assert_eq!(
            trader.gateway().commands(),
            &[Command::InsertOrder {
                order_id: 1,
                side: Side::Sell,
                price: 15000,
                volume: 8,
                lifespan: Lifespan::FillAndKill,
            }]
        );
        assert_eq!(trader.registry().active_ask(), Some(1));
    }

    #[test]
    fn test_buy_inserted_on_opposite_edge() {
        let mut trader = trader();
        buy_setup(&mut trader);

        assert_eq!(
            trader.gateway().commands(),
            &[Command::InsertOrder {
                order_id: 1,
                side: Side::Buy,
                price: 14800,
                volume: 12,
                lifespan: Lifespan::FillAndKill,
            }]
        );
        assert_eq!(trader.registry().active_bid(), Some(1));
    }

    #[test]
    fn test_future_update_never_places_orders() {
        let mut trader = trader();
        trader.on_order_book_update(&book(Instrument::Future, (14800, 50), (14700, 50)));

        assert!(trader.gateway().commands().is_empty());
        assert_eq!(trader.market().future_best_ask(), Some(14800));
    }

    #[test]
    fn test_no_order_before_future_known() {
        let mut trader = trader();
        trader.on_order_book_update(&book(Instrument::Etf, (15100, 8), (15000, 30)));
        assert!(trader.gateway().commands().is_empty());
    }

    #[test]
    fn test_buy_fill_hedged_once() {
        let mut trader = trader();
        buy_setup(&mut trader);
        trader.gateway_mut().take();

        trader.on_order_filled(1, 14800, 10);

        assert_eq!(trader.position(), 10);
        assert_eq!(
            trader.gateway().commands(),
            &[Command::HedgeOrder {
                order_id: 2,
                side: Side::Sell,
                price: 100,
                volume: 10,
            }]
        );
        assert_eq!(trader.ledger().net_delta(), 0);
    }

    #[test]
    fn test_sell_fill_hedged_with_buy_at_ceiling() {
        let mut trader = trader();
        sell_setup(&mut trader);
        trader.gateway_mut().take();

        trader.on_order_filled(1, 15000, 6);

        assert_eq!(trader.position(), -6);
        assert_eq!(
            trader.gateway().hedges(),
            vec![&Command::HedgeOrder {
                order_id: 2,
                side: Side::Buy,
                price: 2_147_483_600,
                volume: 6,
            }]
        );
    }

    #[test]
    fn test_fill_for_unknown_order_ignored() {
        let mut trader = trader();
        trader.on_order_filled(42, 15000, 5);

        assert_eq!(trader.position(), 0);
        assert!(trader.gateway().commands().is_empty());
    }

    #[test]
    fn test_position_breach_cancels_and_blocks_buys() {
        let mut trader = trader();
        buy_setup(&mut trader);
        trader.on_order_filled(1, 14800, 70);
        trader.gateway_mut().take();

        // Same buy edge again: order 1 is still outstanding and gets cancelled
        trader.on_order_book_update(&book(Instrument::Etf, (14800, 40), (14700, 12)));
        assert_eq!(trader.gateway().cancelled_ids(), vec![1]);
        assert!(trader.gateway().inserts().is_empty());
        assert!(trader.flags().disable_buy);

        // Back within the threshold: buying resumes
        trader.on_order_status(1, 0, 0, 0);
        trader.registry.register(TrackedOrder::new(
            90,
            Side::Sell,
            15000,
            10,
            Lifespan::FillAndKill,
        ));
        trader.on_order_filled(90, 15000, 10);
        trader.gateway_mut().take();

        trader.on_order_book_update(&book(Instrument::Etf, (14800, 40), (14700, 12)));
        assert!(!trader.flags().disable_buy);
        assert_eq!(trader.gateway().inserts().len(), 1);
    }

    #[test]
    fn test_order_cap_cancels_before_deciding() {
        let mut trader = trader();
        trader.on_order_book_update(&book(Instrument::Future, (15100, 50), (15000, 50)));
        for _ in 0..5 {
            trader.on_order_book_update(&book(Instrument::Etf, (14800, 40), (14700, 12)));
        }
        assert_eq!(trader.registry().outstanding_count(), 5);
        trader.gateway_mut().take();

        trader.on_order_book_update(&book(Instrument::Etf, (14800, 40), (14700, 12)));

        let commands = trader.gateway().commands();
        assert_eq!(trader.gateway().cancelled_ids(), vec![1, 2, 3, 4, 5]);
        assert!(matches!(
            commands.last(),
            Some(Command::InsertOrder { order_id: 6, .. })
        ));
        assert_eq!(trader.registry().outstanding_count(), 1);
    }

    #[test]
    fn test_terminal_status_frees_outstanding_slot() {
        let mut trader = trader();
        buy_setup(&mut trader);

        trader.on_order_status(1, 12, 0, 3);

        assert_eq!(trader.registry().outstanding_count(), 0);
        assert_eq!(trader.registry().active_bid(), None);
    }

    #[test]
    fn test_error_on_tracked_bid_cancels_and_closes() {
        let mut trader = trader();
        buy_setup(&mut trader);
        trader.gateway_mut().take();

        trader.on_error(1, "order rejected");

        assert_eq!(trader.gateway().cancelled_ids(), vec![1]);
        assert_eq!(trader.registry().side_of(1), None);
        assert_eq!(trader.registry().active_bid(), None);
        assert_eq!(trader.stats().errors, 1);
    }

    #[test]
    fn test_error_on_unknown_id_only_cancels() {
        let mut trader = trader();
        buy_setup(&mut trader);
        trader.gateway_mut().take();

        trader.on_error(77, "unknown");

        assert_eq!(trader.gateway().cancelled_ids(), vec![1]);
        // Cancelled but not terminated: a racing fill is still attributed
        assert_eq!(trader.registry().side_of(1), Some(Side::Buy));
    }

    #[test]
    fn test_crossed_books_insert_one_sell() {
        let mut trader = trader();
        trader.on_order_book_update(&book(Instrument::Future, (14800, 50), (15000, 50)));
        trader.on_order_book_update(&book(Instrument::Etf, (14800, 6), (15000, 9)));

        assert_eq!(
            trader.gateway().inserts(),
            vec![&Command::InsertOrder {
                order_id: 1,
                side: Side::Sell,
                price: 15000,
                volume: 6,
                lifespan: Lifespan::FillAndKill,
            }]
        );
    }

    #[test]
    fn test_book_near_price_limit_does_not_trade() {
        let mut trader = trader();
        let line = r#"{"type":"order_book_update","instrument":"ETF","sequence_number":1,"ask_prices":[9223372036854775807],"ask_volumes":[1],"bid_prices":[9223372036854775000],"bid_volumes":[1]}"#;
        let event = crate::gateway::source::decode_line(line, 1).unwrap().unwrap();

        // Future not yet known
        trader.handle_event(event.clone());
        assert!(trader.gateway().commands().is_empty());

        trader.on_order_book_update(&book(
            Instrument::Future,
            (i64::MAX, 1),
            (9_223_372_036_854_775_000, 1),
        ));
        trader.handle_event(event);
        assert!(trader.gateway().commands().is_empty());
        assert_eq!(trader.position(), 0);
    }

    #[test]
    fn test_hold_off_until_next_fill() {
        let mut trader = trader();
        buy_setup(&mut trader);
        trader.hold_off();
        trader.gateway_mut().take();

        trader.on_order_book_update(&book(Instrument::Etf, (14800, 40), (14700, 12)));
        assert!(trader.gateway().commands().is_empty());

        trader.on_order_filled(1, 14800, 5);
        assert!(!trader.flags().do_not_buy);

        trader.on_order_book_update(&book(Instrument::Etf, (14800, 40), (14700, 12)));
        assert_eq!(trader.gateway().inserts().len(), 1);
    }

    #[test]
    fn test_handle_event_dispatches_and_counts() {
        let mut trader = trader();
        trader.handle_event(GatewayEvent::OrderBookUpdate(book(
            Instrument::Future,
            (14800, 50),
            (14700, 50),
        )));
        trader.handle_event(GatewayEvent::OrderBookUpdate(book(
            Instrument::Etf,
            (15100, 8),
            (15000, 30),
        )));
        trader.handle_event(GatewayEvent::OrderFilled {
            order_id: 1,
            price: 15000,
            volume: 8,
        });
        trader.handle_event(GatewayEvent::HedgeFilled {
            order_id: 2,
            price: 14800,
            volume: 8,
        });

        let stats = trader.stats();
        assert_eq!(stats.events, 4);
        assert_eq!(stats.book_updates, 2);
        assert_eq!(stats.orders_inserted, 1);
        assert_eq!(stats.hedges_sent, 1);
        assert_eq!(stats.hedge_fills, 1);
        assert_eq!(trader.position(), -8);
    }

    #[test]
    fn test_exactly_one_hedge_per_fill() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_send()
            .withf(|c| matches!(c, Command::InsertOrder { side: Side::Buy, .. }))
            .times(1)
            .return_const(());
        gateway
            .expect_send()
            .withf(|c| {
                matches!(
                    c,
                    Command::HedgeOrder {
                        side: Side::Sell,
                        price: 100,
                        volume: 10,
                        ..
                    }
                )
            })
            .times(1)
            .return_const(());

        let mut trader = AutoTrader::new(&Config::default(), gateway);
        buy_setup(&mut trader);
        trader.on_order_filled(1, 14800, 10);

        assert_eq!(trader.position(), 10);
    }
}
