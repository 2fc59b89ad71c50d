use ta::Next;
use ta::indicators::{RelativeStrengthIndex, SimpleMovingAverage};

use common::models::{Signal, SignalAction};

use crate::evaluator::SignalEvaluator;

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;
const CROSSOVER_DEADBAND_PCT: f64 = 0.1;
const MOMENTUM_DEADBAND_PCT: f64 = 1.0;

struct Vote {
    action: SignalAction,
    score: f64,
    note: String,
}

/// Indicator-vote evaluator: RSI extremes, fast/slow SMA crossover and
/// short-horizon momentum each cast a vote; the majority direction wins.
/// Ties and quiet markets resolve to hold.
pub struct CombinedEvaluator {
    rsi_period: usize,
    fast_period: usize,
    slow_period: usize,
    momentum_period: usize,
}

impl Default for CombinedEvaluator {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            fast_period: 10,
            slow_period: 30,
            momentum_period: 5,
        }
    }
}

impl CombinedEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum series length before any vote is meaningful.
    fn required_history(&self) -> usize {
        self.slow_period.max(self.rsi_period) + 1
    }

    fn rsi_vote(&self, closes: &[f64]) -> Vote {
        // Periods are fixed small constants, so construction cannot fail.
        let mut rsi = RelativeStrengthIndex::new(self.rsi_period).unwrap();
        let mut value = 50.0;
        for c in closes {
            value = rsi.next(*c);
        }

        if value < RSI_OVERSOLD {
            Vote {
                action: SignalAction::Buy,
                score: ((RSI_OVERSOLD - value) / RSI_OVERSOLD * 100.0).min(100.0),
                note: format!("RSI {value:.1} oversold"),
            }
        } else if value > RSI_OVERBOUGHT {
            Vote {
                action: SignalAction::Sell,
                score: ((value - RSI_OVERBOUGHT) / (100.0 - RSI_OVERBOUGHT) * 100.0).min(100.0),
                note: format!("RSI {value:.1} overbought"),
            }
        } else {
            Vote {
                action: SignalAction::Hold,
                score: 0.0,
                note: format!("RSI {value:.1} neutral"),
            }
        }
    }

    fn crossover_vote(&self, closes: &[f64]) -> Vote {
        let mut fast = SimpleMovingAverage::new(self.fast_period).unwrap();
        let mut slow = SimpleMovingAverage::new(self.slow_period).unwrap();
        let (mut fast_val, mut slow_val) = (0.0, 0.0);
        for c in closes {
            fast_val = fast.next(*c);
            slow_val = slow.next(*c);
        }

        let diff_pct = if slow_val != 0.0 {
            (fast_val - slow_val) / slow_val * 100.0
        } else {
            0.0
        };

        if diff_pct.abs() < CROSSOVER_DEADBAND_PCT {
            Vote {
                action: SignalAction::Hold,
                score: 0.0,
                note: format!(
                    "SMA{}/SMA{} flat",
                    self.fast_period, self.slow_period
                ),
            }
        } else if diff_pct > 0.0 {
            Vote {
                action: SignalAction::Buy,
                score: (diff_pct * 25.0).min(100.0),
                note: format!(
                    "SMA{} above SMA{} by {diff_pct:.2}%",
                    self.fast_period, self.slow_period
                ),
            }
        } else {
            Vote {
                action: SignalAction::Sell,
                score: (diff_pct.abs() * 25.0).min(100.0),
                note: format!(
                    "SMA{} below SMA{} by {:.2}%",
                    self.fast_period,
                    self.slow_period,
                    diff_pct.abs()
                ),
            }
        }
    }

    fn momentum_vote(&self, closes: &[f64]) -> Vote {
        let last = closes[closes.len() - 1];
        let base = closes[closes.len() - 1 - self.momentum_period];
        let change_pct = if base != 0.0 {
            (last / base - 1.0) * 100.0
        } else {
            0.0
        };

        if change_pct.abs() < MOMENTUM_DEADBAND_PCT {
            Vote {
                action: SignalAction::Hold,
                score: 0.0,
                note: format!("{}d momentum flat", self.momentum_period),
            }
        } else {
            let action = if change_pct > 0.0 {
                SignalAction::Buy
            } else {
                SignalAction::Sell
            };
            Vote {
                action,
                score: (change_pct.abs() * 20.0).min(100.0),
                note: format!("{}d momentum {change_pct:+.1}%", self.momentum_period),
            }
        }
    }
}

impl SignalEvaluator for CombinedEvaluator {
    fn evaluate(&self, closes: &[f64]) -> anyhow::Result<Signal> {
        if closes.len() < self.required_history() {
            return Ok(Signal::hold("Insufficient price history"));
        }

        let votes = [
            self.rsi_vote(closes),
            self.crossover_vote(closes),
            self.momentum_vote(closes),
        ];

        let buys = votes
            .iter()
            .filter(|v| v.action == SignalAction::Buy)
            .count();
        let sells = votes
            .iter()
            .filter(|v| v.action == SignalAction::Sell)
            .count();

        let reason = votes
            .iter()
            .map(|v| v.note.as_str())
            .collect::<Vec<_>>()
            .join("; ");

        let action = if buys > sells {
            SignalAction::Buy
        } else if sells > buys {
            SignalAction::Sell
        } else {
            return Ok(Signal {
                action: SignalAction::Hold,
                strength: 0.0,
                confidence: 0.0,
                reason,
            });
        };

        let agreeing: Vec<&Vote> = votes.iter().filter(|v| v.action == action).collect();
        let strength = (agreeing.iter().map(|v| v.score).sum::<f64>() / agreeing.len() as f64)
            .clamp(0.0, 100.0);
        let confidence =
            (0.25 * agreeing.len() as f64 + strength / 400.0).clamp(0.0, 1.0);

        Ok(Signal {
            action,
            strength,
            confidence,
            reason,
        })
    }
}
