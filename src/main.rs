// src/main.rs

use clap::{Parser, Subcommand};
use fact_drill::constants::TIMEOUT_TIME;
use fact_drill::models::SessionVerdict;
use fact_drill::{rating, Result, SqliteStore, Trainer, TrainerConfig};
use log::{debug, error, info};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "fact-drill", about = "Adaptive multiplication fact drills")]
struct Cli {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "player")]
    player: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play one drill session
    Play,
    /// Show the player's mastery
    Mastery,
    /// Rank every stored player by mastery
    Leaderboard,
    /// Restore the starting competency table
    Reset,
}

fn main() {
    let cli = Cli::parse();
    let config = match TrainerConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            process::exit(2);
        }
    };

    let env = env_logger::Env::default().default_filter_or(config.log_filter.as_str());
    env_logger::Builder::from_env(env).init();

    info!("Starting fact-drill...");
    if let Err(e) = run(cli, config) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(cli: Cli, config: TrainerConfig) -> Result<()> {
    info!("Database path: {:?}", config.database_path);
    let store = SqliteStore::open(&config.database_path)?;
    let mut trainer = Trainer::new(store, config.session);

    match cli.command {
        Command::Play => play(&mut trainer, &cli.player),
        Command::Mastery => {
            let stats = trainer.mastery(&cli.player)?;
            println!("Mastery: {}%", stats.display_score());
            println!(
                "Mastered facts: {}/{}",
                stats.puzzles_at_mastery, stats.total_puzzles
            );
            println!(
                "Recent accuracy: {:.0}%  Avg time: {:.1}s",
                stats.recent_accuracy * 100.0,
                stats.avg_response_time
            );
            Ok(())
        }
        Command::Leaderboard => {
            for (i, standing) in trainer.leaderboard()?.iter().enumerate() {
                println!(
                    "{:>2}. {:<20} Mastery Rank: {}%  Highest: {}%",
                    i + 1,
                    standing.player,
                    standing.current_mastery,
                    standing.highest_mastery
                );
            }
            Ok(())
        }
        Command::Reset => {
            trainer.reset_progress(&cli.player)?;
            println!("Progress Reset!");
            Ok(())
        }
    }
}

fn play(trainer: &mut Trainer<SqliteStore>, player: &str) -> Result<()> {
    if trainer.start_session(player)? == 0 || trainer.is_session_complete() {
        println!("Nothing to practise.");
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let entry = trainer.current_fact();
        let (current, total) = trainer.progress();
        print!("[{}/{}] {} = ", current, total, entry.fact);
        io::stdout().flush()?;

        let started = Instant::now();
        let Some(line) = lines.next() else {
            debug!("Input closed, abandoning session");
            return Ok(());
        };
        let line = line?;
        let elapsed = started.elapsed().as_secs_f64();

        if elapsed > TIMEOUT_TIME {
            let update = trainer.submit_timeout()?;
            println!(
                "Out of time! {} = {}  ({:+})",
                entry.fact,
                entry.fact.answer(),
                update.nominal_delta
            );
        } else {
            let is_correct = line.trim().parse::<u32>().ok() == Some(entry.fact.answer());
            let update = trainer.submit_answer(is_correct, elapsed)?;
            if is_correct {
                let tier = rating::performance_tier(elapsed);
                println!("Hit! {:.1}s [{}]  ({:+})", elapsed, tier.color(), update.nominal_delta);
            } else {
                println!(
                    "Overheated!! Correct answer was: {}  ({:+})",
                    entry.fact.answer(),
                    update.nominal_delta
                );
            }
        }

        if let Some(lives) = trainer.lives_left() {
            debug!("Lives left: {}", lives);
        }
        if !trainer.advance() {
            break;
        }
    }

    let report = trainer.finish_session()?;
    println!();
    println!("Session Summary");
    match report.summary.verdict() {
        SessionVerdict::Improvement(n) => println!("Improvement: {} points", n),
        SessionVerdict::Degradation(n) => println!("Degradation: {} points", n),
        SessionVerdict::NoChange => println!("No change"),
    }
    for (entry, delta) in report.summary.presented_facts.iter().zip(&report.summary.deltas) {
        println!("  {}: Delta {}", entry.fact, delta);
    }
    println!(
        "Correct: {}/{}  Mastery: {}%{}",
        report.summary.correct_count(),
        report.summary.presented_facts.len(),
        report.mastery.display_score(),
        if report.new_record { "  (new best!)" } else { "" }
    );
    Ok(())
}
