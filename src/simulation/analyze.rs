//! Outcome aggregation
//!
//! Reduces a batch of turn outcomes into per-metric histograms, end-reason
//! counts and summary averages.

use crate::simulation::turn::{EndReason, TurnOutcome};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One histogram row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBucket {
    pub value: u32,
    pub count: usize,
    /// % of trials exactly at `value`
    pub exact_pct: f64,
    /// % of trials at or above `value`
    pub at_least_pct: f64,
    /// % of trials at or below `value`
    pub at_most_pct: f64,
}

/// Distribution of one integer metric, ascending by value
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Histogram {
    pub total: usize,
    pub buckets: Vec<HistogramBucket>,
}

impl Histogram {
    pub fn from_values<I: IntoIterator<Item = u32>>(values: I) -> Self {
        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for v in values {
            *counts.entry(v).or_insert(0) += 1;
        }

        let total: usize = counts.values().sum();
        if total == 0 {
            return Histogram::default();
        }

        let mut below = 0usize; // count strictly below the current bucket
        let buckets = counts
            .into_iter()
            .map(|(value, count)| {
                let bucket = HistogramBucket {
                    value,
                    count,
                    exact_pct: count as f64 / total as f64 * 100.0,
                    at_least_pct: 100.0 - below as f64 / total as f64 * 100.0,
                    at_most_pct: (below + count) as f64 / total as f64 * 100.0,
                };
                below += count;
                bucket
            })
            .collect();

        Histogram { total, buckets }
    }

    /// No data was recorded
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(no data)");
        }
        write!(f, "val |   =n    |  >=n    |  <=n")?;
        for b in &self.buckets {
            write!(
                f,
                "\n{:>3} | {:>7} | {:>7} | {:>7}",
                b.value,
                format!("{:.1}%", b.exact_pct),
                format!("{:.1}%", b.at_least_pct),
                format!("{:.1}%", b.at_most_pct),
            )?;
        }
        Ok(())
    }
}

/// End-reason counts, most frequent first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReasonCounts {
    pub total: usize,
    pub counts: Vec<(EndReason, usize)>,
}

impl ReasonCounts {
    pub fn from_outcomes(outcomes: &[TurnOutcome]) -> Self {
        // First-seen order, then a stable sort keeps it for equal counts
        let mut counts: Vec<(EndReason, usize)> = Vec::new();
        for outcome in outcomes {
            match counts.iter_mut().find(|(r, _)| *r == outcome.end_reason) {
                Some((_, c)) => *c += 1,
                None => counts.push((outcome.end_reason, 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        ReasonCounts {
            total: outcomes.len(),
            counts,
        }
    }

    pub fn get(&self, reason: EndReason) -> usize {
        self.counts
            .iter()
            .find(|(r, _)| *r == reason)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }
}

impl fmt::Display for ReasonCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.counts.is_empty() {
            return write!(f, "(no data)");
        }
        let width = self
            .counts
            .iter()
            .map(|(r, _)| r.to_string().len())
            .max()
            .unwrap_or(0);
        for (i, (reason, count)) in self.counts.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let pct = *count as f64 / self.total as f64 * 100.0;
            write!(
                f,
                "{:<width$} | {:>6} ({:>5}%)",
                reason.to_string(),
                count,
                format!("{:.1}", pct),
                width = width
            )?;
        }
        Ok(())
    }
}

/// Scalar averages over a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub trials: usize,
    pub deck_size: usize,
    pub avg_cards_drawn: f64,
    pub avg_coins: f64,
    pub avg_buys: f64,
    pub deck_exhausted_pct: f64,
}

impl Summary {
    pub fn from_outcomes(outcomes: &[TurnOutcome], deck_size: usize) -> Self {
        let n = outcomes.len();
        if n == 0 {
            return Summary {
                deck_size,
                ..Default::default()
            };
        }

        let mut drawn = 0u64;
        let mut coins = 0u64;
        let mut buys = 0u64;
        let mut exhausted = 0usize;
        for o in outcomes {
            drawn += o.cards_drawn as u64;
            coins += o.coins as u64;
            buys += o.buys as u64;
            if o.deck_exhausted {
                exhausted += 1;
            }
        }

        let n_f = n as f64;
        Summary {
            trials: n,
            deck_size,
            avg_cards_drawn: drawn as f64 / n_f,
            avg_coins: coins as f64 / n_f,
            avg_buys: buys as f64 / n_f,
            deck_exhausted_pct: exhausted as f64 / n_f * 100.0,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Deck size: {}", self.deck_size)?;
        writeln!(
            f,
            "Avg cards drawn: 5 + {:.2} = {:.2}",
            self.avg_cards_drawn,
            5.0 + self.avg_cards_drawn
        )?;
        writeln!(f, "Avg coins: {:.2}", self.avg_coins)?;
        writeln!(f, "Avg buys: {:.2}", self.avg_buys)?;
        write!(f, "Deck hit empty while drawing: {:.1}%", self.deck_exhausted_pct)
    }
}

/// Everything derived from one batch of outcomes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStatistics {
    pub summary: Summary,
    pub cards_drawn: Histogram,
    pub coins: Histogram,
    pub buys: Histogram,
    pub end_reasons: ReasonCounts,
}

/// Aggregate a batch of outcomes. Order of `outcomes` does not matter.
pub fn aggregate_results(outcomes: &[TurnOutcome], deck_size: usize) -> AggregateStatistics {
    AggregateStatistics {
        summary: Summary::from_outcomes(outcomes, deck_size),
        cards_drawn: Histogram::from_values(outcomes.iter().map(|o| o.cards_drawn)),
        coins: Histogram::from_values(outcomes.iter().map(|o| o.coins)),
        buys: Histogram::from_values(outcomes.iter().map(|o| o.buys)),
        end_reasons: ReasonCounts::from_outcomes(outcomes),
    }
}
