pub mod analyze;
pub mod decisions;
pub mod deck;
pub mod engine;
pub mod report;
pub mod turn;

pub use analyze::{aggregate_results, AggregateStatistics, Histogram, ReasonCounts, Summary};
pub use deck::{format_deck_list, parse_deck_file, parse_deck_list, DeckError};
pub use engine::{run, run_batch, run_checked, run_partitioned, SimulationConfig, SimulationError};
pub use turn::{simulate_turn, EndReason, TurnOutcome};
