use crate::card::Card;
use crate::rng::{GameRng, RandomSource};
use crate::simulation::turn::{simulate_turn, TurnOutcome};
use rayon::prelude::*;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SimulationError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Settings for one batch of trials
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub trials: usize,
    /// None = fresh random seed
    pub seed: Option<u64>,
    /// Per-trial sub-streams executed on the rayon pool
    pub parallel: bool,
    /// Trials between progress callbacks
    pub chunk_size: usize,
    /// Trace the first trial
    pub verbose: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            trials: 10_000,
            seed: None,
            parallel: false,
            chunk_size: 100_000,
            verbose: false,
        }
    }
}

/// Validate an externally supplied trial count
pub fn check_trial_count(trials: i64) -> Result<usize, SimulationError> {
    if trials < 0 {
        return Err(SimulationError::InvalidArgument(format!(
            "trial count must be non-negative, got {}",
            trials
        )));
    }
    usize::try_from(trials).map_err(|_| {
        SimulationError::InvalidArgument(format!("trial count {} does not fit this platform", trials))
    })
}

/// Run `trials` turns, each from a fresh shuffle, sharing one random stream
pub fn run<R: RandomSource + ?Sized>(deck: &[Card], trials: usize, rng: &mut R) -> Vec<TurnOutcome> {
    (0..trials).map(|_| simulate_turn(deck, rng, false)).collect()
}

/// `run` with the trial count checked first; nothing is simulated on error
pub fn run_checked<R: RandomSource + ?Sized>(
    deck: &[Card],
    trials: i64,
    rng: &mut R,
) -> Result<Vec<TurnOutcome>, SimulationError> {
    let trials = check_trial_count(trials)?;
    Ok(run(deck, trials, rng))
}

/// Like `run`, calling `on_progress(done)` after every `chunk_size` trials.
/// Produces exactly the outcomes `run` would with the same source.
pub fn run_chunked<R, F>(
    deck: &[Card],
    trials: usize,
    rng: &mut R,
    chunk_size: usize,
    mut on_progress: F,
) -> Vec<TurnOutcome>
where
    R: RandomSource + ?Sized,
    F: FnMut(usize),
{
    let chunk_size = chunk_size.max(1);
    let mut results = Vec::with_capacity(trials);
    while results.len() < trials {
        let n = chunk_size.min(trials - results.len());
        for _ in 0..n {
            results.push(simulate_turn(deck, rng, false));
        }
        on_progress(results.len());
    }
    results
}

/// Trial `index` of a partitioned run: its own sub-stream of `master_seed`
pub fn run_trial(deck: &[Card], master_seed: u64, index: u64, verbose: bool) -> TurnOutcome {
    let mut rng = GameRng::for_trial(master_seed, index);
    simulate_turn(deck, &mut rng, verbose)
}

/// Partitioned run: trial `i` always consumes sub-stream `i`, so the outcomes
/// are identical whether computed sequentially or on the rayon pool.
pub fn run_partitioned(deck: &[Card], trials: usize, master_seed: u64, parallel: bool) -> Vec<TurnOutcome> {
    if parallel {
        (0..trials as u64)
            .into_par_iter()
            .map(|i| run_trial(deck, master_seed, i, false))
            .collect()
    } else {
        (0..trials as u64)
            .map(|i| run_trial(deck, master_seed, i, false))
            .collect()
    }
}

/// Run a batch according to `config`, reporting progress per chunk.
/// Sequential runs use one continuous stream; parallel runs are partitioned.
pub fn run_batch<F>(deck: &[Card], config: &SimulationConfig, mut on_progress: F) -> Vec<TurnOutcome>
where
    F: FnMut(usize),
{
    let mut rng = GameRng::new(config.seed);
    let seed = rng.seed();
    let mut results = Vec::with_capacity(config.trials);

    // The traced trial is trial 0 of whichever stream the mode uses
    if config.verbose && config.trials > 0 {
        let first = if config.parallel {
            run_trial(deck, seed, 0, true)
        } else {
            simulate_turn(deck, &mut rng, true)
        };
        results.push(first);
    }

    if !config.parallel {
        let done = results.len();
        let rest = run_chunked(deck, config.trials - done, &mut rng, config.chunk_size, |n| {
            on_progress(done + n)
        });
        results.extend(rest);
        return results;
    }

    let chunk_size = config.chunk_size.max(1);
    while results.len() < config.trials {
        let start = results.len() as u64;
        let end = (results.len() + chunk_size).min(config.trials) as u64;
        let chunk: Vec<TurnOutcome> = (start..end)
            .into_par_iter()
            .map(|i| run_trial(deck, seed, i, false))
            .collect();
        results.extend(chunk);
        on_progress(results.len());
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardDatabase;
    use crate::simulation::deck::parse_deck_list;

    fn deck(list: &str) -> Vec<Card> {
        let db = CardDatabase::builtin().expect("Failed to load cards");
        parse_deck_list(list, &db).expect("deck should parse")
    }

    #[test]
    fn test_negative_trials_rejected() {
        let deck = deck("7 copper, 3 estate");
        let mut rng = GameRng::new(Some(1));
        let before = rng.clone().random();

        let result = run_checked(&deck, -1, &mut rng);
        assert!(matches!(result, Err(SimulationError::InvalidArgument(_))));
        // no draws were consumed
        assert_eq!(rng.random(), before);
    }

    #[test]
    fn test_trial_count_bounds() {
        assert_eq!(check_trial_count(0), Ok(0));
        assert_eq!(check_trial_count(10_000_001), Ok(10_000_001));
        assert!(check_trial_count(-5).is_err());
    }

    #[test]
    fn test_zero_trials() {
        let deck = deck("7 copper, 3 estate");
        let mut rng = GameRng::new(Some(1));
        let outcomes = run_checked(&deck, 0, &mut rng).expect("zero trials is valid");
        assert!(outcomes.is_empty());
    }

    #[test]
    fn test_run_produces_exactly_n() {
        let deck = deck("7 copper, 3 estate, 2 smithy");
        let mut rng = GameRng::new(Some(1));
        assert_eq!(run(&deck, 137, &mut rng).len(), 137);
    }

    #[test]
    fn test_same_seed_same_outcomes() {
        let deck = deck("7 copper, 3 estate, 3 lab, 1 village, 2 smithy");
        let a = run(&deck, 500, &mut GameRng::new(Some(42)));
        let b = run(&deck, 500, &mut GameRng::new(Some(42)));
        assert_eq!(a, b);
    }

    #[test]
    fn test_chunking_does_not_change_stream() {
        let deck = deck("7 copper, 3 estate, 3 lab, 1 village, 2 smithy");
        let plain = run(&deck, 1_000, &mut GameRng::new(Some(9)));

        let mut reports = Vec::new();
        let chunked = run_chunked(&deck, 1_000, &mut GameRng::new(Some(9)), 300, |done| reports.push(done));

        assert_eq!(plain, chunked);
        assert_eq!(reports, vec![300, 600, 900, 1_000]);
    }

    #[test]
    fn test_partitioned_parallel_matches_sequential() {
        let deck = deck("5 copper, 2 silver, 3 estate, 2 village, 2 smithy, 1 merchant");
        let sequential = run_partitioned(&deck, 2_000, 77, false);
        let parallel = run_partitioned(&deck, 2_000, 77, true);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_run_batch_parallel_matches_partitioned() {
        let deck = deck("5 copper, 2 silver, 3 estate, 2 lab, 2 smithy");
        let config = SimulationConfig {
            trials: 1_234,
            seed: Some(5),
            parallel: true,
            chunk_size: 500,
            verbose: false,
        };
        let mut reports = Vec::new();
        let batch = run_batch(&deck, &config, |done| reports.push(done));

        assert_eq!(batch, run_partitioned(&deck, 1_234, 5, false));
        assert_eq!(reports, vec![500, 1_000, 1_234]);
    }

    #[test]
    fn test_run_batch_sequential_matches_run() {
        let deck = deck("7 copper, 3 estate, 2 smithy");
        let config = SimulationConfig {
            trials: 321,
            seed: Some(11),
            ..Default::default()
        };
        let batch = run_batch(&deck, &config, |_| {});
        assert_eq!(batch, run(&deck, 321, &mut GameRng::new(Some(11))));
    }

    #[test]
    fn test_verbose_batch_still_runs_every_trial() {
        let deck = deck("7 copper, 3 estate, 2 smithy");
        let config = SimulationConfig {
            trials: 100,
            seed: Some(11),
            verbose: true,
            ..Default::default()
        };
        let batch = run_batch(&deck, &config, |_| {});
        assert_eq!(batch.len(), 100);
        // tracing only adds output; the stream is unchanged
        assert_eq!(batch, run(&deck, 100, &mut GameRng::new(Some(11))));

        let parallel = SimulationConfig { parallel: true, ..config.clone() };
        assert_eq!(run_batch(&deck, &parallel, |_| {}), run_partitioned(&deck, 100, 11, false));

        let empty = SimulationConfig { trials: 0, ..config };
        assert!(run_batch(&deck, &empty, |_| {}).is_empty());
    }
}
