//! Command-line configuration.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::scheduler::Mode;

/// quizdrill - flashcard quiz client favouring weak items
#[derive(Debug, Parser)]
#[command(name = "quizdrill")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Drill question/answer items, favouring the ones you keep missing")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Quiz yourself in the terminal
    Drill {
        #[command(flatten)]
        source: SourceArgs,

        /// Selection strategy
        #[arg(long, value_enum, default_value_t = Mode::Weighted)]
        mode: Mode,

        /// Seed for reproducible question order
        #[arg(long)]
        seed: Option<u64>,

        /// Keep using local statistics instead of re-fetching before each pass
        #[arg(long)]
        no_resync: bool,
    },

    /// Show how many items sit in each mastery tier
    Tiers {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Base URL of the quiz service
    #[arg(long, env = "QUIZ_API_URL")]
    pub api: Option<String>,

    /// CSV deck files or directories; take precedence over `--api`
    #[arg(required_unless_present = "api")]
    pub decks: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Api(String),
    Decks(Vec<PathBuf>),
}

impl SourceArgs {
    pub fn source(&self) -> Source {
        match &self.api {
            Some(url) if self.decks.is_empty() => Source::Api(url.clone()),
            _ => Source::Decks(self.decks.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrillConfig {
    pub source: Source,
    pub mode: Mode,
    pub seed: Option<u64>,
    pub resync: bool,
}

impl DrillConfig {
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
