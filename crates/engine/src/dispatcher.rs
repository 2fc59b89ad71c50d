use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

use broker::BrokerClient;
use common::models::{
    LogEntry, Notification, Outcome, OrderRequest, OrderSide, Severity, Signal, SignalAction,
    SymbolSignal,
};
use strategy::SignalEvaluator;

use crate::activity::ActivityLog;
use crate::config::DispatchConfig;
use crate::errors::DispatchError;
use crate::risk::{RiskGate, RiskVerdict};

/// State shared between the dispatcher handle and the loop task. The
/// loop task is the only writer; observers read published snapshots.
struct Shared {
    log: Mutex<ActivityLog>,
    log_tx: watch::Sender<Vec<LogEntry>>,
    signal_tx: watch::Sender<Option<SymbolSignal>>,
}

/// Everything one cycle needs, cloneable into the loop task.
#[derive(Clone)]
struct CycleRunner {
    broker: Arc<dyn BrokerClient>,
    evaluator: Arc<dyn SignalEvaluator>,
    config: DispatchConfig,
    risk: RiskGate,
    notifier: Option<broadcast::Sender<Notification>>,
    shared: Arc<Shared>,
}

impl CycleRunner {
    /// Append-then-publish: the log is mutated under the lock, then a
    /// fresh snapshot goes out on the watch channel.
    fn record(&self, entry: LogEntry) {
        let snapshot = {
            let mut log = self.shared.log.lock().unwrap();
            log.append(entry);
            log.snapshot()
        };
        self.shared.log_tx.send_replace(snapshot);
    }

    fn notify(&self, title: &str, description: String, severity: Severity) {
        if let Some(tx) = &self.notifier {
            let _ = tx.send(Notification::new(title, description, severity));
        }
    }

    /// One pass over the watchlist, sequential by symbol. A failure for
    /// one symbol is logged and never aborts the rest of the cycle.
    async fn run_cycle(&self) {
        debug!("cycle start: {} symbols", self.config.watchlist.len());
        for symbol in &self.config.watchlist {
            if let Err(err) = self.process_symbol(symbol).await {
                warn!("{}: {}", symbol, err);
                let action = match err {
                    DispatchError::Fetch(_) | DispatchError::Evaluation(_) => "Analysis failed",
                    DispatchError::Preparation(_) => "Trade preparation failed",
                    DispatchError::Submission(_) => "Trade failed",
                };
                if matches!(err, DispatchError::Submission(_)) {
                    self.notify("Trade failed", format!("{symbol}: {err}"), Severity::Error);
                }
                self.record(LogEntry::new(
                    action,
                    symbol.clone(),
                    0,
                    err.to_string(),
                    Outcome::Failed,
                ));
            }
        }
    }

    async fn process_symbol(&self, symbol: &str) -> Result<(), DispatchError> {
        let end = Utc::now();
        let start = end - chrono::Duration::days(self.config.lookback_days);

        let bars = self
            .broker
            .get_historical_bars(symbol, "1Day", start, end)
            .await
            .map_err(DispatchError::Fetch)?;

        if bars.is_empty() {
            self.record(LogEntry::new(
                "Analysis skipped",
                symbol,
                0,
                "No historical data",
                Outcome::Skipped,
            ));
            return Ok(());
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let signal = self
            .evaluator
            .evaluate(&closes)
            .map_err(|e| DispatchError::Evaluation(e.to_string()))?;

        debug!(
            "{}: {:?} strength={:.0} confidence={:.2}",
            symbol, signal.action, signal.strength, signal.confidence
        );
        self.shared.signal_tx.send_replace(Some(SymbolSignal {
            symbol: symbol.to_string(),
            signal: signal.clone(),
        }));

        if signal.action == SignalAction::Hold {
            self.record(LogEntry::new(
                "Hold",
                symbol,
                0,
                signal.reason,
                Outcome::Skipped,
            ));
            return Ok(());
        }

        if signal.confidence <= self.config.confidence_threshold
            || signal.strength <= self.config.strength_threshold
        {
            self.record(LogEntry::new(
                "Signal below threshold",
                symbol,
                0,
                signal.reason,
                Outcome::Skipped,
            ));
            return Ok(());
        }

        self.execute_trade(symbol, &signal).await
    }

    /// At most one entry order leaves here per symbol per cycle.
    async fn execute_trade(&self, symbol: &str, signal: &Signal) -> Result<(), DispatchError> {
        let side = match signal.action {
            SignalAction::Buy => OrderSide::Buy,
            SignalAction::Sell => OrderSide::Sell,
            SignalAction::Hold => return Ok(()),
        };

        let positions = self
            .broker
            .get_positions()
            .await
            .map_err(DispatchError::Preparation)?;
        let account = self
            .broker
            .get_account()
            .await
            .map_err(DispatchError::Preparation)?;
        let price = self
            .broker
            .get_latest_price(symbol)
            .await
            .map_err(DispatchError::Preparation)?;

        let qty = match self
            .risk
            .admit(symbol, side, &positions, account.buying_power, price)
        {
            RiskVerdict::Rejected(reason) => {
                self.record(LogEntry::new(
                    "Trade skipped",
                    symbol,
                    0,
                    reason.as_str(),
                    Outcome::Skipped,
                ));
                return Ok(());
            }
            RiskVerdict::Approved { qty } => qty,
        };

        let order = OrderRequest::market(
            symbol,
            qty,
            side,
            self.config.default_time_in_force,
            Uuid::new_v4().to_string(),
        );
        let receipt = self
            .broker
            .submit_order(&order)
            .await
            .map_err(DispatchError::Submission)?;

        let action = match side {
            OrderSide::Buy => "Buy order placed",
            OrderSide::Sell => "Sell order placed",
        };
        info!("{}: {} x{} (order {})", symbol, action, qty, receipt.order_id);
        self.record(LogEntry::new(
            action,
            symbol,
            qty,
            signal.reason.clone(),
            Outcome::Success,
        ));
        self.notify(
            action,
            format!("{symbol} x{qty}: {}", signal.reason),
            Severity::Info,
        );

        if side == OrderSide::Buy {
            if let Some(pct) = self.config.stop_loss_percent {
                self.place_stop_loss(symbol, qty, price, pct).await;
            }
        }

        Ok(())
    }

    /// Protective exit after a filled buy. Its failure is logged but
    /// never propagated, so it cannot mask a successful entry.
    async fn place_stop_loss(&self, symbol: &str, qty: u32, entry_price: f64, pct: f64) {
        let stop_price = entry_price * (1.0 - pct / 100.0);
        let order = OrderRequest::stop(
            symbol,
            qty,
            OrderSide::Sell,
            stop_price,
            Uuid::new_v4().to_string(),
        );
        match self.broker.submit_order(&order).await {
            Ok(_) => {
                self.record(LogEntry::new(
                    "Stop loss placed",
                    symbol,
                    qty,
                    format!("Stop at {stop_price:.2}"),
                    Outcome::Success,
                ));
            }
            Err(e) => {
                warn!("{}: stop loss failed: {}", symbol, e);
                self.record(LogEntry::new(
                    "Stop loss failed",
                    symbol,
                    qty,
                    e.to_string(),
                    Outcome::Failed,
                ));
            }
        }
    }
}

/// Timer-driven dispatch loop with an explicit start/stop lifecycle.
/// Collaborators are injected, so cycles can also be driven manually
/// (e.g. from tests) via [`OrderDispatcher::run_cycle`].
pub struct OrderDispatcher {
    runner: CycleRunner,
    running: Arc<AtomicBool>,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
}

impl OrderDispatcher {
    pub fn new(
        broker: Arc<dyn BrokerClient>,
        evaluator: Arc<dyn SignalEvaluator>,
        config: DispatchConfig,
    ) -> Self {
        let (log_tx, _) = watch::channel(Vec::new());
        let (signal_tx, _) = watch::channel(None);
        let risk = RiskGate::new(&config);
        let shared = Arc::new(Shared {
            log: Mutex::new(ActivityLog::new(config.log_capacity)),
            log_tx,
            signal_tx,
        });

        Self {
            runner: CycleRunner {
                broker,
                evaluator,
                config,
                risk,
                notifier: None,
                shared,
            },
            running: Arc::new(AtomicBool::new(false)),
            shutdown: Mutex::new(None),
        }
    }

    pub fn with_notifier(mut self, tx: broadcast::Sender<Notification>) -> Self {
        self.runner.notifier = Some(tx);
        self
    }

    /// Begin the repeating cycle. The first cycle runs immediately.
    /// Calling `start` while already running is a no-op.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("dispatch loop already running; start ignored");
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        *self.shutdown.lock().unwrap() = Some(shutdown_tx);

        info!(
            interval = ?self.runner.config.cycle_interval,
            symbols = ?self.runner.config.watchlist,
            "dispatch loop started"
        );
        self.runner.record(LogEntry::new(
            "Auto-trading started",
            "",
            0,
            "Dispatch loop initialized",
            Outcome::Success,
        ));

        // The task must not touch the `running` flag on its way out:
        // `stop` clears it synchronously, and by the time this task
        // observes the shutdown signal a newer loop may own the flag.
        let runner = self.runner.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(runner.config.cycle_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = interval.tick() => runner.run_cycle().await,
                    res = shutdown_rx.changed() => {
                        if res.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("dispatch loop stopped");
        });
    }

    /// Suppress future cycles. An in-flight cycle (and any order it has
    /// already submitted) is left to complete. Idempotent.
    pub fn stop(&self) {
        let Some(tx) = self.shutdown.lock().unwrap().take() else {
            debug!("dispatch loop not running; stop ignored");
            return;
        };
        self.running.store(false, Ordering::SeqCst);
        let _ = tx.send(true);
        self.runner.record(LogEntry::new(
            "Auto-trading stopped",
            "",
            0,
            "Dispatch loop halted by caller",
            Outcome::Success,
        ));
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Drive exactly one cycle, outside the timer.
    pub async fn run_cycle(&self) {
        self.runner.run_cycle().await;
    }

    /// Newest-first snapshots of the activity trail, republished after
    /// every append.
    pub fn activity_feed(&self) -> watch::Receiver<Vec<LogEntry>> {
        self.runner.shared.log_tx.subscribe()
    }

    pub fn activity_snapshot(&self) -> Vec<LogEntry> {
        self.runner.shared.log.lock().unwrap().snapshot()
    }

    /// Most recent evaluation published by the loop.
    pub fn latest_signal(&self) -> watch::Receiver<Option<SymbolSignal>> {
        self.runner.shared.signal_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use mockall::mock;

    use common::models::{AccountSnapshot, Bar, OrderReceipt, OrderType, Position, TimeInForce};

    mock! {
        Broker {}

        #[async_trait]
        impl BrokerClient for Broker {
            async fn get_historical_bars(
                &self,
                symbol: &str,
                timeframe: &str,
                start: DateTime<Utc>,
                end: DateTime<Utc>,
            ) -> anyhow::Result<Vec<Bar>>;
            async fn get_positions(&self) -> anyhow::Result<Vec<Position>>;
            async fn get_latest_price(&self, symbol: &str) -> anyhow::Result<f64>;
            async fn get_account(&self) -> anyhow::Result<AccountSnapshot>;
            async fn submit_order(&self, order: &OrderRequest) -> anyhow::Result<OrderReceipt>;
            async fn cancel_order(&self, order_id: &str) -> anyhow::Result<()>;
        }
    }

    struct FixedEvaluator(Signal);

    impl SignalEvaluator for FixedEvaluator {
        fn evaluate(&self, _closes: &[f64]) -> anyhow::Result<Signal> {
            Ok(self.0.clone())
        }
    }

    struct FailingEvaluator;

    impl SignalEvaluator for FailingEvaluator {
        fn evaluate(&self, _closes: &[f64]) -> anyhow::Result<Signal> {
            Err(anyhow!("bad math"))
        }
    }

    fn bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| Bar {
                timestamp: Utc::now(),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0 + i as f64,
                volume: 1_000.0,
            })
            .collect()
    }

    fn account(buying_power: f64) -> AccountSnapshot {
        AccountSnapshot {
            buying_power,
            portfolio_value: buying_power,
            currency: "USD".to_string(),
        }
    }

    fn receipt() -> OrderReceipt {
        OrderReceipt {
            order_id: "ord-1".to_string(),
            status: "accepted".to_string(),
        }
    }

    fn strong_signal(action: SignalAction) -> Signal {
        Signal {
            action,
            strength: 90.0,
            confidence: 0.9,
            reason: "test signal".to_string(),
        }
    }

    fn config(watchlist: &[&str]) -> DispatchConfig {
        DispatchConfig {
            watchlist: watchlist.iter().map(|s| s.to_string()).collect(),
            ..DispatchConfig::default()
        }
    }

    fn dispatcher(
        mock: MockBroker,
        evaluator: impl SignalEvaluator + 'static,
        config: DispatchConfig,
    ) -> OrderDispatcher {
        OrderDispatcher::new(Arc::new(mock), Arc::new(evaluator), config)
    }

    #[tokio::test]
    async fn submits_one_sized_entry_order_per_cycle() {
        let mut mock = MockBroker::new();
        mock.expect_get_historical_bars()
            .returning(|_, _, _, _| Ok(bars(40)));
        mock.expect_get_positions().returning(|| Ok(vec![]));
        mock.expect_get_account().returning(|| Ok(account(2000.0)));
        mock.expect_get_latest_price().returning(|_| Ok(50.0));
        // min(1000, 2000 * 0.1) / 50 = 4 shares, exactly once.
        mock.expect_submit_order()
            .times(1)
            .withf(|order: &OrderRequest| {
                order.symbol == "AAPL"
                    && order.qty == 4
                    && order.side == OrderSide::Buy
                    && order.order_type == OrderType::Market
            })
            .returning(|_| Ok(receipt()));

        let d = dispatcher(
            mock,
            FixedEvaluator(strong_signal(SignalAction::Buy)),
            config(&["AAPL"]),
        );
        d.run_cycle().await;

        let snapshot = d.activity_snapshot();
        assert!(snapshot.iter().any(|e| {
            e.action == "Buy order placed" && e.symbol == "AAPL" && e.outcome == Outcome::Success
        }));
    }

    #[tokio::test]
    async fn fetch_failure_for_one_symbol_does_not_abort_the_cycle() {
        let mut mock = MockBroker::new();
        mock.expect_get_historical_bars()
            .returning(|symbol, _, _, _| {
                if symbol == "MSFT" {
                    Err(anyhow!("feed down"))
                } else {
                    Ok(bars(40))
                }
            });

        let d = dispatcher(
            mock,
            FixedEvaluator(Signal::hold("quiet market")),
            config(&["AAPL", "MSFT", "GOOGL"]),
        );
        d.run_cycle().await;

        let snapshot = d.activity_snapshot();
        assert_eq!(snapshot.len(), 3);

        let failed: Vec<_> = snapshot
            .iter()
            .filter(|e| e.outcome == Outcome::Failed)
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].symbol, "MSFT");
        assert!(failed[0].reason.contains("feed down"));

        for sym in ["AAPL", "GOOGL"] {
            assert!(snapshot
                .iter()
                .any(|e| e.symbol == sym && e.outcome == Outcome::Skipped));
        }
    }

    #[tokio::test]
    async fn sub_threshold_signal_never_reaches_the_broker() {
        let mut mock = MockBroker::new();
        mock.expect_get_historical_bars()
            .returning(|_, _, _, _| Ok(bars(40)));
        mock.expect_submit_order().never();
        mock.expect_get_positions().never();

        let weak = Signal {
            action: SignalAction::Buy,
            strength: 90.0,
            confidence: 0.2,
            reason: "weak".to_string(),
        };
        let d = dispatcher(mock, FixedEvaluator(weak), config(&["AAPL"]));
        d.run_cycle().await;

        let snapshot = d.activity_snapshot();
        assert!(snapshot
            .iter()
            .any(|e| e.action == "Signal below threshold" && e.outcome == Outcome::Skipped));
    }

    #[tokio::test]
    async fn sell_without_position_is_skipped() {
        let mut mock = MockBroker::new();
        mock.expect_get_historical_bars()
            .returning(|_, _, _, _| Ok(bars(40)));
        mock.expect_get_positions().returning(|| Ok(vec![]));
        mock.expect_get_account().returning(|| Ok(account(2000.0)));
        mock.expect_get_latest_price().returning(|_| Ok(50.0));
        mock.expect_submit_order().never();

        let d = dispatcher(
            mock,
            FixedEvaluator(strong_signal(SignalAction::Sell)),
            config(&["AAPL"]),
        );
        d.run_cycle().await;

        let snapshot = d.activity_snapshot();
        assert!(snapshot.iter().any(|e| {
            e.action == "Trade skipped"
                && e.reason == "No open position to sell"
                && e.outcome == Outcome::Skipped
        }));
    }

    #[tokio::test]
    async fn position_cap_blocks_new_buys() {
        let mut mock = MockBroker::new();
        mock.expect_get_historical_bars()
            .returning(|_, _, _, _| Ok(bars(40)));
        mock.expect_get_positions().returning(|| {
            Ok((0..5)
                .map(|i| Position {
                    symbol: format!("SYM{i}"),
                    qty: 1.0,
                    avg_entry_price: 10.0,
                    current_price: 10.0,
                    unrealized_pl: 0.0,
                })
                .collect())
        });
        mock.expect_get_account().returning(|| Ok(account(2000.0)));
        mock.expect_get_latest_price().returning(|_| Ok(50.0));
        mock.expect_submit_order().never();

        let d = dispatcher(
            mock,
            FixedEvaluator(strong_signal(SignalAction::Buy)),
            config(&["NFLX"]),
        );
        d.run_cycle().await;

        let snapshot = d.activity_snapshot();
        assert!(snapshot
            .iter()
            .any(|e| e.action == "Trade skipped" && e.reason == "Max positions reached"));
    }

    #[tokio::test]
    async fn protective_stop_follows_a_filled_buy() {
        let mut mock = MockBroker::new();
        mock.expect_get_historical_bars()
            .returning(|_, _, _, _| Ok(bars(40)));
        mock.expect_get_positions().returning(|| Ok(vec![]));
        mock.expect_get_account().returning(|| Ok(account(2000.0)));
        mock.expect_get_latest_price().returning(|_| Ok(50.0));
        mock.expect_submit_order()
            .times(1)
            .withf(|o: &OrderRequest| o.order_type == OrderType::Market)
            .returning(|_| Ok(receipt()));
        // 5% below the 50.0 entry price, good-till-cancelled.
        mock.expect_submit_order()
            .times(1)
            .withf(|o: &OrderRequest| {
                o.order_type == OrderType::Stop
                    && o.side == OrderSide::Sell
                    && o.stop_price == Some(47.5)
                    && o.time_in_force == TimeInForce::Gtc
            })
            .returning(|_| Ok(receipt()));

        let mut cfg = config(&["AAPL"]);
        cfg.stop_loss_percent = Some(5.0);
        let d = dispatcher(mock, FixedEvaluator(strong_signal(SignalAction::Buy)), cfg);
        d.run_cycle().await;

        let snapshot = d.activity_snapshot();
        assert!(snapshot.iter().any(|e| e.action == "Stop loss placed"));
    }

    #[tokio::test]
    async fn submission_failure_is_logged_and_spares_other_symbols() {
        let mut mock = MockBroker::new();
        mock.expect_get_historical_bars()
            .returning(|_, _, _, _| Ok(bars(40)));
        mock.expect_get_positions().returning(|| Ok(vec![]));
        mock.expect_get_account().returning(|| Ok(account(2000.0)));
        mock.expect_get_latest_price().returning(|_| Ok(50.0));
        mock.expect_submit_order()
            .times(2)
            .returning(|_| Err(anyhow!("order rejected")));

        let d = dispatcher(
            mock,
            FixedEvaluator(strong_signal(SignalAction::Buy)),
            config(&["AAPL", "TSLA"]),
        );
        d.run_cycle().await;

        let snapshot = d.activity_snapshot();
        let failed: Vec<_> = snapshot
            .iter()
            .filter(|e| e.action == "Trade failed" && e.outcome == Outcome::Failed)
            .collect();
        assert_eq!(failed.len(), 2);
    }

    #[tokio::test]
    async fn evaluation_failure_becomes_a_failed_entry() {
        let mut mock = MockBroker::new();
        mock.expect_get_historical_bars()
            .returning(|_, _, _, _| Ok(bars(40)));

        let d = dispatcher(mock, FailingEvaluator, config(&["AAPL"]));
        d.run_cycle().await;

        let snapshot = d.activity_snapshot();
        assert!(snapshot.iter().any(|e| {
            e.action == "Analysis failed"
                && e.outcome == Outcome::Failed
                && e.reason.contains("bad math")
        }));
    }

    #[tokio::test]
    async fn account_failure_after_analysis_is_labelled_trade_preparation() {
        let mut mock = MockBroker::new();
        mock.expect_get_historical_bars()
            .returning(|_, _, _, _| Ok(bars(40)));
        mock.expect_get_positions().returning(|| Ok(vec![]));
        mock.expect_get_account()
            .returning(|| Err(anyhow!("account endpoint down")));

        let d = dispatcher(
            mock,
            FixedEvaluator(strong_signal(SignalAction::Buy)),
            config(&["AAPL"]),
        );
        d.run_cycle().await;

        let snapshot = d.activity_snapshot();
        assert!(snapshot.iter().any(|e| {
            e.action == "Trade preparation failed"
                && e.outcome == Outcome::Failed
                && e.reason.contains("account endpoint down")
        }));
        assert!(!snapshot.iter().any(|e| e.action == "Analysis failed"));
    }

    #[tokio::test]
    async fn empty_history_is_a_skip_not_an_error() {
        let mut mock = MockBroker::new();
        mock.expect_get_historical_bars()
            .returning(|_, _, _, _| Ok(vec![]));

        let d = dispatcher(
            mock,
            FixedEvaluator(strong_signal(SignalAction::Buy)),
            config(&["AAPL"]),
        );
        d.run_cycle().await;

        let snapshot = d.activity_snapshot();
        assert!(snapshot
            .iter()
            .any(|e| e.action == "Analysis skipped" && e.outcome == Outcome::Skipped));
    }

    #[tokio::test]
    async fn start_and_stop_are_idempotent() {
        let mock = MockBroker::new();
        let mut cfg = config(&[]);
        cfg.cycle_interval = Duration::from_secs(3600);

        let d = dispatcher(mock, FixedEvaluator(Signal::hold("idle")), cfg);

        d.start();
        d.start();
        assert!(d.is_running());

        let started = d
            .activity_snapshot()
            .iter()
            .filter(|e| e.action == "Auto-trading started")
            .count();
        assert_eq!(started, 1);

        d.stop();
        d.stop();
        assert!(!d.is_running());

        let stopped = d
            .activity_snapshot()
            .iter()
            .filter(|e| e.action == "Auto-trading stopped")
            .count();
        assert_eq!(stopped, 1);
    }

    #[tokio::test]
    async fn restart_after_stop_stays_running() {
        let mock = MockBroker::new();
        let mut cfg = config(&[]);
        cfg.cycle_interval = Duration::from_secs(3600);

        let d = dispatcher(mock, FixedEvaluator(Signal::hold("idle")), cfg);

        d.start();
        d.stop();
        d.start();

        // Give the first loop task time to observe its shutdown signal
        // and exit; it must not clear the flag the second run owns.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(d.is_running());

        // And with the second loop live, a further start stays a no-op.
        d.start();
        let started = d
            .activity_snapshot()
            .iter()
            .filter(|e| e.action == "Auto-trading started")
            .count();
        assert_eq!(started, 2);
    }

    #[tokio::test]
    async fn stop_without_start_is_a_no_op() {
        let mock = MockBroker::new();
        let d = dispatcher(mock, FixedEvaluator(Signal::hold("idle")), config(&[]));
        d.stop();
        assert!(!d.is_running());
        assert!(d.activity_snapshot().is_empty());
    }

    #[tokio::test]
    async fn observers_see_published_snapshots_and_signals() {
        let mut mock = MockBroker::new();
        mock.expect_get_historical_bars()
            .returning(|_, _, _, _| Ok(bars(40)));

        let d = dispatcher(
            mock,
            FixedEvaluator(Signal::hold("quiet market")),
            config(&["AAPL"]),
        );
        let feed = d.activity_feed();
        let signal = d.latest_signal();

        d.run_cycle().await;

        assert_eq!(feed.borrow().len(), 1);
        let latest = signal.borrow().clone();
        let latest = latest.expect("signal published");
        assert_eq!(latest.symbol, "AAPL");
        assert_eq!(latest.signal.action, SignalAction::Hold);
    }
}
