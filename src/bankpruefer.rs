use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::process::exit;

mod libquiz;

use crate::libquiz::bank::{self, ChoiceCount};
use crate::libquiz::sampler;

#[derive(Parser, Debug)]
#[command(name = "Bankprüfer")]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "info")]
    log_level: String,
    #[arg(short, long, default_value = "2")]
    choices_count: u32,
    #[arg(long, default_value = "5")]
    min_categories: usize,
    #[arg(long, default_value = "2")]
    min_per_category: usize,

    bank: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    let bank_file = match args.bank {
        Some(f) => f,
        None => {
            error!("{}", "Bank file not specified!".red());
            exit(1);
        }
    };
    let choices = match ChoiceCount::from_count(args.choices_count) {
        Some(choices) => choices,
        None => {
            error!(
                "{}",
                format!(
                    "Unsupported choice count {} (expected 2 or 4)!",
                    args.choices_count
                )
                .red()
            );
            exit(1);
        }
    };

    let bank = match bank::load_bank(&bank_file, choices) {
        Ok(bank) => bank,
        Err(err) => {
            error!("{}", format!("Bank rejected: {}!", err).red());
            exit(1);
        }
    };

    info!(
        "{}",
        format!("Bank {:?} ({} questions)", bank_file, bank.len()).blue()
    );
    let counts = sampler::category_counts(&bank);
    let categorized: usize = counts.values().sum();
    for (name, count) in &counts {
        info!(
            "{}",
            format!("├ Category: {} ({} questions)", name, count).blue()
        );
    }
    let uncategorized = bank.len() - categorized;
    if uncategorized > 0 {
        info!(
            "{}",
            format!("├ (no category) ({} questions)", uncategorized).yellow()
        );
    }

    match sampler::validate_categories(&bank, args.min_categories, args.min_per_category) {
        Ok(()) => println!(
            "{}",
            format!(
                "Bank is valid: {} categories, every one at least {} questions deep.",
                counts.len(),
                args.min_per_category
            )
            .green()
        ),
        Err(err) => {
            println!("{}", format!("Bank fails the category gate: {}", err).red());
            exit(1);
        }
    }
}
