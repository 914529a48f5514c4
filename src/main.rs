//! Tak engine command line
//!
//! - `tak selfplay` - Let two players play a full game
//! - `tak search` - Search one position given as a list of actions
//! - `tak perft` - Count the legal-move tree to a fixed depth

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use tak::rules::perft;
use tak::{
    Board, Deadline, Engine, Game, HeuristicEvaluator, RandomStrategy, SearchConfig,
    SearchStrategy, Strategy,
};

/// Tak engine with iterative-deepening alpha-beta search
#[derive(Parser)]
#[command(name = "tak")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with search settings (defaults apply to missing fields)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game between two players and print the result
    Selfplay {
        #[arg(long, default_value_t = 5)]
        size: usize,
        /// Thinking time per move in milliseconds
        #[arg(long, default_value_t = 1000)]
        budget_ms: u64,
        #[arg(long, default_value_t = 300)]
        max_plies: u32,
        #[arg(long, value_enum, default_value_t = Kind::Search)]
        white: Kind,
        #[arg(long, value_enum, default_value_t = Kind::Random)]
        black: Kind,
        /// Seed for random players
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Search a position reached by playing `moves` from the empty board
    Search {
        #[arg(long, default_value_t = 5)]
        size: usize,
        #[arg(long, default_value_t = 1000)]
        budget_ms: u64,
        /// Actions separated by `;`, e.g. "PLACE_FLAT 0 0; PLACE_FLAT 4 4"
        #[arg(long, default_value = "")]
        moves: String,
    },
    /// Count leaf nodes of the legal-move tree
    Perft {
        #[arg(long, default_value_t = 5)]
        size: usize,
        #[arg(long, default_value_t = 3)]
        depth: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Search,
    Random,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Selfplay {
            size,
            budget_ms,
            max_plies,
            white,
            black,
            seed,
        } => {
            let mut game = Game::new(size)?;
            let mut white = make_player(white, &config, seed);
            let mut black = make_player(black, &config, seed.wrapping_add(1));
            let result = game.play_out(
                white.as_mut(),
                black.as_mut(),
                Duration::from_millis(budget_ms),
                max_plies,
            )?;
            for (i, action) in game.moves().iter().enumerate() {
                println!("{:>3}. {action}", i + 1);
            }
            println!("{}", game.board());
            match result {
                Some(result) => println!("result: {result:?}"),
                None => println!("no result after {max_plies} plies"),
            }
        }
        Commands::Search {
            size,
            budget_ms,
            moves,
        } => {
            let board = replay(size, &moves)?;
            let mut engine = Engine::with_config(HeuristicEvaluator::default(), config);
            let result = engine.find_best_action_with_stats(
                &board,
                board.to_move(),
                board.ply(),
                Deadline::from_millis(budget_ms),
            )?;
            println!("{board}");
            println!("best: {}", result.action);
            println!(
                "score {:.2}, depth {}, nodes {}, pruned {}, {} ms{}",
                result.score,
                result.depth_reached,
                result.nodes_visited,
                result.pruned_count,
                result.elapsed.as_millis(),
                if result.fallback { " (fallback)" } else { "" }
            );
        }
        Commands::Perft { size, depth } => {
            let mut board = Board::new(size)?;
            for d in 1..=depth {
                println!("perft({d}) = {}", perft(&mut board, d));
            }
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SearchConfig> {
    let Some(path) = path else {
        return Ok(SearchConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn make_player(kind: Kind, config: &SearchConfig, seed: u64) -> Box<dyn Strategy> {
    match kind {
        Kind::Search => Box::new(SearchStrategy::new(Engine::with_config(
            HeuristicEvaluator::default(),
            config.clone(),
        ))),
        Kind::Random => Box::new(RandomStrategy::seeded(seed)),
    }
}

fn replay(size: usize, moves: &str) -> Result<Board> {
    let mut game = Game::new(size)?;
    for text in moves.split(';').map(str::trim).filter(|t| !t.is_empty()) {
        if game.play_text(text).with_context(|| format!("playing `{text}`"))?.is_some() {
            bail!("the game is already over after `{text}`");
        }
    }
    Ok(game.board().clone())
}
