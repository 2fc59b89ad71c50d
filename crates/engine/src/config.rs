use std::env;
use std::time::Duration;

use common::models::TimeInForce;

const DEFAULT_WATCHLIST: &[&str] = &["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA"];

/// Run-level configuration for the dispatch loop. Loaded once at startup
/// and immutable for the lifetime of the dispatcher; the cadence and the
/// signal thresholds are deliberately parameters, not constants.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Symbols evaluated each cycle; membership is static per run.
    pub watchlist: Vec<String>,
    pub cycle_interval: Duration,
    pub max_open_positions: usize,
    /// Cap on the notional of any single new position, account currency.
    pub max_position_size: f64,
    /// Floor below which a proposed position is not worth opening.
    pub min_position_notional: f64,
    /// When set, a protective GTC stop is placed after each filled buy.
    pub stop_loss_percent: Option<f64>,
    pub default_time_in_force: TimeInForce,
    pub confidence_threshold: f64,
    pub strength_threshold: f64,
    /// Trailing window of daily bars fed to the evaluator.
    pub lookback_days: i64,
    pub log_capacity: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            watchlist: DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect(),
            cycle_interval: Duration::from_secs(60),
            max_open_positions: 5,
            max_position_size: 1000.0,
            min_position_notional: 100.0,
            stop_loss_percent: None,
            default_time_in_force: TimeInForce::Day,
            confidence_threshold: 0.6,
            strength_threshold: 60.0,
            lookback_days: 30,
            log_capacity: 20,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl DispatchConfig {
    /// WATCHLIST=AAPL,MSFT + CYCLE_INTERVAL_SECS / MAX_OPEN_POSITIONS /
    /// MAX_POSITION_SIZE / MIN_POSITION_NOTIONAL / STOP_LOSS_PERCENT /
    /// TIME_IN_FORCE / CONFIDENCE_THRESHOLD / STRENGTH_THRESHOLD /
    /// LOOKBACK_DAYS / LOG_CAPACITY, all optional.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let watchlist = env::var("WATCHLIST")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|x| x.trim())
                    .filter(|x| !x.is_empty())
                    .map(|x| x.to_ascii_uppercase())
                    .collect::<Vec<String>>()
            })
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.watchlist);

        let default_time_in_force = env::var("TIME_IN_FORCE")
            .ok()
            .and_then(|s| TimeInForce::parse(&s))
            .unwrap_or(defaults.default_time_in_force);

        Self {
            watchlist,
            cycle_interval: Duration::from_secs(env_parse("CYCLE_INTERVAL_SECS", 60)),
            max_open_positions: env_parse("MAX_OPEN_POSITIONS", defaults.max_open_positions),
            max_position_size: env_parse("MAX_POSITION_SIZE", defaults.max_position_size),
            min_position_notional: env_parse(
                "MIN_POSITION_NOTIONAL",
                defaults.min_position_notional,
            ),
            stop_loss_percent: env::var("STOP_LOSS_PERCENT")
                .ok()
                .and_then(|s| s.parse().ok()),
            default_time_in_force,
            confidence_threshold: env_parse(
                "CONFIDENCE_THRESHOLD",
                defaults.confidence_threshold,
            ),
            strength_threshold: env_parse("STRENGTH_THRESHOLD", defaults.strength_threshold),
            lookback_days: env_parse("LOOKBACK_DAYS", defaults.lookback_days),
            log_capacity: env_parse("LOG_CAPACITY", defaults.log_capacity),
        }
    }
}
