use clap::{Parser, Subcommand};
use dominion_turn_sim::card::{Card, CardDatabase, CardDatabaseError};
use dominion_turn_sim::rng::{seed_from_str, GameRng};
use dominion_turn_sim::simulation::engine::{check_trial_count, run_batch, SimulationConfig};
use dominion_turn_sim::simulation::report::{render_text, SimulationReport};
use dominion_turn_sim::simulation::{
    aggregate_results, format_deck_list, parse_deck_file, parse_deck_list, AggregateStatistics,
};
use indicatif::{ProgressBar, ProgressStyle};

const DEFAULT_DECK: &str = "7 copper, 3 estate, 3 lab, 1 village, 2 smithy";

/// Larger requests are clamped, not rejected
const MAX_CLI_TRIALS: usize = 10_000_000;

#[derive(Parser)]
#[command(name = "dominion-turn-sim")]
#[command(about = "Dominion single-turn deck simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Seed for random number generator (for reproducibility)
    #[arg(short, long)]
    seed: Option<String>,

    /// Deck list, e.g. "7 copper, 3 estate"
    #[arg(short, long, default_value = DEFAULT_DECK)]
    deck: String,

    /// Card catalog JSON to use instead of the built-in one
    #[arg(long, global = true)]
    cards: Option<String>,

    /// Trace a single turn
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a batch of turns (default)
    Run {
        /// Number of turns to simulate
        #[arg(short, long, default_value = "10000", allow_negative_numbers = true)]
        num_trials: i64,

        /// Deck list, e.g. "7 copper, 3 estate"
        #[arg(short, long, default_value = DEFAULT_DECK)]
        deck: String,

        /// Read the deck list from a file instead
        #[arg(long)]
        deck_file: Option<String>,

        /// Seed for reproducibility (decimal or any string)
        #[arg(short, long)]
        seed: Option<String>,

        /// Spread trials over all cores using per-trial random streams
        #[arg(short, long)]
        parallel: bool,

        /// Trials per progress update
        #[arg(long, default_value = "100000")]
        chunk_size: usize,

        /// Write a JSON report to this path
        #[arg(short, long)]
        output: Option<String>,

        /// Trace a single turn
        #[arg(short, long)]
        verbose: bool,
    },

    /// Compare two deck lists
    Compare {
        /// First deck list
        deck1: String,

        /// Second deck list
        deck2: String,

        /// Number of turns per deck
        #[arg(short, long, default_value = "10000", allow_negative_numbers = true)]
        num_trials: i64,

        /// Seed for reproducibility
        #[arg(short, long)]
        seed: Option<String>,
    },

    /// List the card catalog
    Cards,
}

fn main() {
    let cli = Cli::parse();

    let db = match load_database(cli.cards.as_deref()) {
        Ok(db) => {
            eprintln!("✓ Loaded {} cards", db.card_count());
            db
        }
        Err(e) => {
            eprintln!("✗ Failed to load cards: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Run {
            num_trials,
            deck,
            deck_file,
            seed,
            parallel,
            chunk_size,
            output,
            verbose,
        }) => {
            let cards = load_deck(&db, &deck, deck_file.as_deref());
            let config = SimulationConfig {
                trials: trial_count(if verbose { 1 } else { num_trials }),
                seed: seed.as_deref().map(seed_from_str),
                parallel,
                chunk_size,
                verbose,
            };
            run_simulation(&db, &cards, config, output.as_deref());
        }
        Some(Commands::Compare {
            deck1,
            deck2,
            num_trials,
            seed,
        }) => {
            compare_decks(&db, &deck1, &deck2, trial_count(num_trials), seed.as_deref());
        }
        Some(Commands::Cards) => list_cards(&db),
        None => {
            // Default: run simulation with top-level args
            let cards = load_deck(&db, &cli.deck, None);
            let config = SimulationConfig {
                trials: if cli.verbose { 1 } else { SimulationConfig::default().trials },
                seed: cli.seed.as_deref().map(seed_from_str),
                verbose: cli.verbose,
                ..Default::default()
            };
            run_simulation(&db, &cards, config, None);
        }
    }
}

fn load_database(path: Option<&str>) -> Result<CardDatabase, CardDatabaseError> {
    match path {
        Some(path) => CardDatabase::from_file(path),
        None => CardDatabase::builtin(),
    }
}

fn load_deck(db: &CardDatabase, list: &str, file: Option<&str>) -> Vec<Card> {
    let parsed = match file {
        Some(path) => parse_deck_file(path, db),
        None => parse_deck_list(list, db),
    };
    match parsed {
        Ok(deck) => deck,
        Err(e) => {
            eprintln!("✗ Failed to parse deck: {}", e);
            std::process::exit(1);
        }
    }
}

fn trial_count(n: i64) -> usize {
    match check_trial_count(n) {
        Ok(n) if n > MAX_CLI_TRIALS => {
            eprintln!("Trial count clamped to {}", MAX_CLI_TRIALS);
            MAX_CLI_TRIALS
        }
        Ok(n) => n,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}

/// Resolve the seed up front so an unseeded run can still be reproduced
fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| GameRng::new(None).seed())
}

fn progress_bar(config: &SimulationConfig) -> ProgressBar {
    if config.trials <= config.chunk_size {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(config.trials as u64);
    let style = ProgressStyle::with_template("{bar:40} {pos}/{len} trials ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

fn simulate(deck: &[Card], config: &SimulationConfig) -> AggregateStatistics {
    let bar = progress_bar(config);
    let outcomes = run_batch(deck, config, |done| bar.set_position(done as u64));
    bar.finish_and_clear();
    aggregate_results(&outcomes, deck.len())
}

fn run_simulation(db: &CardDatabase, deck: &[Card], mut config: SimulationConfig, output: Option<&str>) {
    let seed = resolve_seed(config.seed);
    config.seed = Some(seed);
    let deck_list = format_deck_list(deck, db);

    println!("\n=== Dominion Turn Simulator ===\n");
    println!("Deck: {} ({} cards)", deck_list, deck.len());
    println!("Trials: {}", config.trials);
    println!("Seed: {}", seed);
    if config.parallel {
        println!("Mode: parallel ({} threads)", rayon::current_num_threads());
    }
    println!();

    let start = std::time::Instant::now();
    let stats = simulate(deck, &config);
    let elapsed = start.elapsed();

    if config.verbose {
        println!();
    }
    println!("{}", render_text(&stats));
    println!(
        "Simulation completed in {:.2?} ({:.0} trials/sec)",
        elapsed,
        config.trials as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );

    if let Some(path) = output {
        let report = SimulationReport::new(deck_list, config.seed, config.parallel, &stats);
        match report.save(path) {
            Ok(()) => eprintln!("✓ Report saved to {}", path),
            Err(e) => eprintln!("✗ Failed to save report: {}", e),
        }
    }
}

fn compare_decks(db: &CardDatabase, deck1_list: &str, deck2_list: &str, trials: usize, seed: Option<&str>) {
    let deck1 = load_deck(db, deck1_list, None);
    let deck2 = load_deck(db, deck2_list, None);
    let seed = resolve_seed(seed.map(seed_from_str));

    println!("\n=== Dominion Deck Comparison ===\n");
    println!("Deck 1: {}", format_deck_list(&deck1, db));
    println!("Deck 2: {}", format_deck_list(&deck2, db));
    println!("Trials per deck: {}", trials);
    println!("Seed: {}", seed);
    println!();

    let config = SimulationConfig {
        trials,
        seed: Some(seed),
        ..Default::default()
    };

    let start = std::time::Instant::now();
    println!("Running deck 1...");
    let stats1 = simulate(&deck1, &config);
    println!("Running deck 2...");
    let stats2 = simulate(&deck2, &config);
    let elapsed = start.elapsed();

    let (s1, s2) = (&stats1.summary, &stats2.summary);
    println!("\n=== Results ===\n");
    println!("{:24} {:>12} {:>12}", "Metric", "Deck 1", "Deck 2");
    println!("{:-<50}", "");
    println!("{:24} {:>12} {:>12}", "Deck size", s1.deck_size, s2.deck_size);
    println!("{:24} {:>12.2} {:>12.2}", "Avg cards drawn", s1.avg_cards_drawn, s2.avg_cards_drawn);
    println!("{:24} {:>12.2} {:>12.2}", "Avg coins", s1.avg_coins, s2.avg_coins);
    println!("{:24} {:>12.2} {:>12.2}", "Avg buys", s1.avg_buys, s2.avg_buys);
    println!(
        "{:24} {:>11.1}% {:>11.1}%",
        "Deck hit empty", s1.deck_exhausted_pct, s2.deck_exhausted_pct
    );

    println!();
    if s1.avg_coins > s2.avg_coins {
        println!("✓ Deck 1 produces {:.2} more coins on average", s1.avg_coins - s2.avg_coins);
    } else if s2.avg_coins > s1.avg_coins {
        println!("✓ Deck 2 produces {:.2} more coins on average", s2.avg_coins - s1.avg_coins);
    } else {
        println!("Both decks produce the same average coins");
    }

    println!("\nCompleted in {:.2?}", elapsed);
}

fn list_cards(db: &CardDatabase) {
    println!(
        "{:14} {:14} {:18} {:>4} {:>7} {:>4} {:>5} {:>5} {:>3}",
        "Id", "Name", "Types", "Draw", "Actions", "Buys", "Coins", "Value", "VP"
    );
    println!("{:-<86}", "");
    for card in db.cards() {
        let mut types = card.type_line();
        if card.merchant {
            types.push_str(" (merchant)");
        }
        println!(
            "{:14} {:14} {:18} {:>4} {:>7} {:>4} {:>5} {:>5} {:>3}",
            card.id, card.name, types, card.draw, card.actions, card.buys, card.coins, card.value, card.vp
        );
    }
}
