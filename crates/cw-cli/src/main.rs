//! CLI frontend for the Castaway season engine.

mod commands;

use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "castaway",
    about = "Castaway — a deterministic elimination-game season engine",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a full season headlessly and report the outcome
    Run {
        /// Seed string; the same seed replays the same season
        #[arg(short, long, default_value = "castaway")]
        seed: String,

        /// Comma-separated cast ids, in cast order
        #[arg(
            short,
            long,
            default_value = "ada,grace,alan,edsger,barbara,donald,tony,margaret"
        )]
        cast: String,

        /// Show the full event log, not just the round table
        #[arg(short, long)]
        verbose: bool,

        /// Emit the finished season aggregate as JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Trace the vote reveal sequencer's cadence over synthetic ticks
    Reveal {
        /// Number of votes to reveal
        #[arg(short, long, default_value = "5")]
        votes: usize,

        /// Speed multiplier, or "instant"
        #[arg(short, long, default_value = "1")]
        speed: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            seed,
            cast,
            verbose,
            json,
        } => commands::run::run(&seed, &cast, verbose, json),
        Commands::Reveal { votes, speed } => commands::reveal::run(votes, &speed),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
