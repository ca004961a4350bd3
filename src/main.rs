use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::Parser;
use rand::Rng;

use quizdrill::config::{Cli, Command, DrillConfig, Source};
use quizdrill::item::Outcome;
use quizdrill::mastery::{MasteryTier, TierCounts};
use quizdrill::service::{DeckFileService, HttpQuizService, QuizService};
use quizdrill::session::Session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Drill {
            source,
            mode,
            seed,
            no_resync,
        } => {
            let config = DrillConfig {
                source: source.source(),
                mode,
                seed,
                resync: !no_resync,
            };
            let rng = config.rng();
            match &config.source {
                Source::Api(url) => drill(HttpQuizService::new(url), &config, rng).await,
                Source::Decks(paths) => {
                    let service = DeckFileService::open(paths)?;
                    drill(service, &config, rng).await
                }
            }
        }
        Command::Tiers { source } => match source.source() {
            Source::Api(url) => tiers(HttpQuizService::new(&url)).await,
            Source::Decks(paths) => tiers(DeckFileService::open(&paths)?).await,
        },
    }
}

async fn tiers<S: QuizService>(mut service: S) -> anyhow::Result<()> {
    let items = service
        .fetch_pool()
        .await
        .context("could not fetch items")?;
    let counts = TierCounts::of(&items);
    for tier in MasteryTier::ALL {
        println!("  {:<9} {}", tier.name(), counts.get(tier));
    }
    println!("  {:<9} {}", "total", counts.total());
    Ok(())
}

enum Reply {
    Outcome(Outcome),
    Quit,
}

async fn drill<S: QuizService, R: Rng>(
    service: S,
    config: &DrillConfig,
    rng: R,
) -> anyhow::Result<()> {
    let mut session = Session::start(service, config.mode, rng, config.resync)
        .await
        .context("could not start session")?;

    let stdin = io::stdin();
    let mut stdin = stdin.lock();
    let mut buf = String::new();

    loop {
        let question = session.next_item().await?.question.clone();
        println!("[{}] {}", session.summary().seen, question);
        println!();

        print!("Press Enter to reveal (q to quit)...");
        io::stdout().flush()?;
        buf.clear();
        if stdin.read_line(&mut buf)? == 0 || buf.trim() == "q" {
            break;
        }

        if let Some(item) = session.current() {
            println!("{}", item.answer);
        }
        println!();

        let reply = loop {
            print!("Correct? (y/n, q to quit): ");
            io::stdout().flush()?;
            buf.clear();
            if stdin.read_line(&mut buf)? == 0 {
                break Reply::Quit;
            }
            match buf.trim() {
                "y" | "Y" => break Reply::Outcome(Outcome::Correct),
                "n" | "N" => break Reply::Outcome(Outcome::Wrong),
                "q" => break Reply::Quit,
                _ => println!("Please enter y, n or q."),
            }
        };

        let Reply::Outcome(outcome) = reply else {
            break;
        };
        if let Err(e) = session.answer(outcome).await {
            eprintln!("Warning: answer not recorded: {e}");
        }
        println!();
    }

    let summary = session.summary();
    println!();
    println!("Session complete!");
    println!(
        "  Correct: {}, Wrong: {}, Seen: {} ({} min)",
        summary.correct,
        summary.wrong,
        summary.seen,
        summary.elapsed.num_minutes()
    );
    Ok(())
}
