use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use log::debug;
use std::path::PathBuf;
use std::process::exit;

mod cli;
mod libquiz;

use crate::libquiz::bank::{self, ChoiceCount, DEFAULT_LANGUAGE};
use crate::libquiz::sampler::SelectionMode;
use crate::libquiz::session::{QuizConfig, Session};

#[derive(Debug, PartialEq)]
enum Choice {
    Option(usize),
    Next,
    Previous,
    Quit,
    Unknown,
}

#[derive(Parser, Debug)]
#[command(name = "Quizspiel")]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "DIR", default_value = "banks")]
    bank_dir: PathBuf,
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    lang: String,
    #[arg(short, long, default_value = "10")]
    question_count: usize,
    #[arg(short, long)]
    per_category: Option<usize>,
    #[arg(short, long, default_value = "2")]
    choices_count: u32,
    #[arg(long, default_value = "5")]
    min_categories: usize,
    #[arg(long, default_value = "2")]
    min_per_category: usize,
    #[arg(long)]
    no_shuffle: bool,
    #[arg(short, long, default_value = "error")]
    log_level: String,
}

impl Choice {
    fn from_str(choices_count: usize, input: &str) -> Choice {
        match input.trim() {
            "q" => Choice::Quit,
            "p" => Choice::Previous,
            "" | "n" => Choice::Next,
            input => match input.parse::<usize>() {
                Ok(num) => {
                    if num < 1 || num > choices_count {
                        println!(
                            "{}",
                            format!("There are only {} options available!", choices_count)
                                .bright_red()
                        );
                        Choice::Unknown
                    } else {
                        Choice::Option(num - 1)
                    }
                }
                Err(_) => Choice::Unknown,
            },
        }
    }
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    let choices = match ChoiceCount::from_count(args.choices_count) {
        Some(choices) => choices,
        None => {
            println!(
                "{}",
                format!(
                    "Unsupported choice count {} (expected 2 or 4).",
                    args.choices_count
                )
                .bright_red()
            );
            exit(1);
        }
    };
    let mode = match args.per_category {
        Some(per_category) => SelectionMode::Stratified { per_category },
        None => SelectionMode::Flat {
            count: args.question_count,
        },
    };
    let config = QuizConfig {
        mode,
        min_categories: args.min_categories,
        min_per_category: args.min_per_category,
        shuffle_answers: !args.no_shuffle,
    };
    debug!("[Setup] Config: {:?}", config);

    let bank_file = match bank::bank_path(&args.bank_dir, &args.lang) {
        Ok(path) => path,
        Err(err) => {
            println!("{}", format!("{}", err).bright_red());
            exit(1);
        }
    };
    debug!("[Setup] Bank file at {:?}", bank_file);

    let mut session = Session::new(config);
    let ticket = session.begin_load();
    session.finish_load(ticket, bank::load_bank(&bank_file, choices));

    cli::cli_loop(&mut session, || bank::load_bank(&bank_file, choices));
}
