use crate::simulation::analyze::AggregateStatistics;
use serde::Serialize;

/// Saved results of one batch, with the settings needed to reproduce it
#[derive(Debug, Serialize)]
pub struct SimulationReport<'a> {
    pub generated_at: String,
    pub deck: String,
    pub seed: Option<u64>,
    pub parallel: bool,
    pub statistics: &'a AggregateStatistics,
}

impl<'a> SimulationReport<'a> {
    pub fn new(deck: String, seed: Option<u64>, parallel: bool, statistics: &'a AggregateStatistics) -> Self {
        SimulationReport {
            generated_at: chrono::Local::now().to_rfc3339(),
            deck,
            seed,
            parallel,
            statistics,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the report as pretty JSON
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::from)?;
        std::fs::write(path, json)
    }
}

/// Render the four result blocks as shown on the console
pub fn render_text(stats: &AggregateStatistics) -> String {
    format!(
        "=== Summary ===\n{}\n\n=== Cards drawn (beyond 5) ===\n{}\n\n=== Coins ===\n{}\n\n=== Buys ===\n{}\n\n=== Action phase ended ===\n{}\n",
        stats.summary, stats.cards_drawn, stats.coins, stats.buys, stats.end_reasons
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::analyze::aggregate_results;
    use crate::simulation::turn::{EndReason, TurnOutcome};

    fn sample() -> AggregateStatistics {
        let outcomes = vec![
            TurnOutcome {
                cards_drawn: 3,
                coins: 6,
                buys: 1,
                end_reason: EndReason::NoActions,
                deck_exhausted: false,
            },
            TurnOutcome {
                cards_drawn: 0,
                coins: 4,
                buys: 1,
                end_reason: EndReason::NoActionCards,
                deck_exhausted: false,
            },
        ];
        aggregate_results(&outcomes, 12)
    }

    #[test]
    fn test_report_json() {
        let stats = sample();
        let report = SimulationReport::new("7 copper, 3 estate, 2 smithy".to_string(), Some(42), false, &stats);
        let json = report.to_json().expect("report should serialize");
        let value: serde_json::Value = serde_json::from_str(&json).expect("report should be valid JSON");

        assert_eq!(value["seed"], 42);
        assert_eq!(value["statistics"]["summary"]["trials"], 2);
        assert_eq!(value["statistics"]["coins"]["buckets"][0]["value"], 4);
        assert_eq!(value["statistics"]["end_reasons"]["counts"][0][0], "no_actions");
        assert!(value["generated_at"].as_str().is_some_and(|s| !s.is_empty()));
    }

    #[test]
    fn test_render_text_no_data() {
        let stats = aggregate_results(&[], 0);
        let text = render_text(&stats);
        assert!(text.contains("=== Coins ===\n(no data)"));
        assert!(text.contains("Avg coins: 0.00"));
    }
}
