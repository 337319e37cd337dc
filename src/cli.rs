use colored::Colorize;
use log::debug;
use text_io::read;

use crate::libquiz::bank::QuestionRecord;
use crate::libquiz::sampler::SelectedQuestion;
use crate::libquiz::session::{Phase, Session};
use crate::libquiz::QuizError;
use crate::Choice;

pub fn cli_loop<F>(session: &mut Session, reload: F)
where
    F: Fn() -> Result<Vec<QuestionRecord>, QuizError>,
{
    loop {
        match session.phase() {
            Phase::Start => {
                println!("{}", "==========> Quizspiel <==========".cyan());
                print!("{} ", "Start? (Enter to play, q to quit):".cyan());
                let input: String = read!("{}\n");
                if input.trim() == "q" {
                    println!("{}", "Bis bald!".cyan());
                    return;
                }
                session.start();
            }
            Phase::Playing => {
                if !play_current(session) {
                    println!("{}", "Quitting Early!".cyan());
                    return;
                }
            }
            Phase::Results => {
                show_results(session);
                print!("{} ", "Nochmal spielen? (y/n):".cyan());
                let input: String = read!("{}\n");
                if input.trim() == "y" {
                    session.restart();
                } else {
                    println!("{}", "Bis bald!".cyan());
                    return;
                }
            }
            Phase::Error => {
                if let Some(err) = session.last_error() {
                    println!("{}", format!("Something went wrong: {}", err).bright_red());
                }
                print!(
                    "{} ",
                    "Retry? (r to reload the bank, anything else quits):".cyan()
                );
                let input: String = read!("{}\n");
                if input.trim() != "r" {
                    return;
                }
                session.retry();
                let ticket = session.begin_load();
                session.finish_load(ticket, reload());
            }
        }
    }
}

/// Renders the current question and handles input for it. Returns `false`
/// when the player quits early.
fn play_current(session: &mut Session) -> bool {
    let question = match session.current_question() {
        Some(question) => question.clone(),
        None => return false,
    };
    let option_count = question.shuffled_answers.len();

    let leading = format!("Frage {}/{}. ", session.position(), session.total());
    println!(
        "{}{}",
        leading.cyan(),
        question.record.question.as_str().black().bold().on_white()
    );
    let indent = " ".repeat(leading.len());
    for (i, answer) in question.shuffled_answers.iter().enumerate() {
        println!("{}{}. {}", indent, format!("{}", i + 1).bold(), answer);
    }

    if !session.is_answered() {
        loop {
            print!(
                "{} ",
                format!("Answer (1-{}, p to go back, q to quit):", option_count).cyan()
            );
            let choice_string: String = read!("{}\n");
            let choice = Choice::from_str(option_count, choice_string.as_str());
            debug!("choice: {:?}", choice);
            match choice {
                Choice::Option(num) => {
                    session.answer(num);
                    break;
                }
                Choice::Previous => {
                    if session.previous() {
                        return true;
                    }
                    println!("{}", "Already at the first question!".yellow());
                }
                Choice::Quit => return false,
                // An answer has to be picked before moving on.
                Choice::Next | Choice::Unknown => {}
            }
        }
    }
    show_feedback(session, &question);

    loop {
        print!(
            "{} ",
            "Weiter? (Enter for next, p to go back, q to quit):".cyan()
        );
        let choice_string: String = read!("{}\n");
        match Choice::from_str(option_count, choice_string.as_str()) {
            Choice::Next => {
                session.next();
                return true;
            }
            Choice::Previous => {
                if session.previous() {
                    return true;
                }
                println!("{}", "Already at the first question!".yellow());
            }
            Choice::Quit => return false,
            // Answered questions are locked.
            Choice::Option(_) | Choice::Unknown => {}
        }
    }
}

fn show_feedback(session: &Session, question: &SelectedQuestion) {
    let Some(selected) = session.selected_index() else {
        return;
    };
    if session.is_correct() == Some(true) {
        println!("{}", "Richtig!".bright_green());
    } else {
        println!(
            "{}",
            format!(
                "Falsch! (Deine Antwort: {})",
                question.shuffled_answers[selected]
            )
            .bright_red()
        );
        println!(
            "{}",
            format!(
                "Richtige Antwort: {}",
                question.shuffled_answers[question.correct_shuffled_index]
            )
            .green()
        );
    }
    println!("{}", question.record.explanation.as_str().italic());
}

fn show_results(session: &Session) {
    let Some(result) = session.result() else {
        return;
    };
    println!("{}", "==========> Quiz beendet! <==========".cyan());
    let score = format!(
        "{}/{} Punkte ({}%)",
        result.correct_answers, result.total_questions, result.percentage
    );
    // Same thresholds as the score bar: bottom third red, under 80% yellow.
    let colored_score = if result.correct_answers <= result.total_questions / 3 {
        score.bright_red()
    } else if result.correct_answers < result.total_questions * 4 / 5 {
        score.yellow()
    } else {
        score.bright_green()
    };
    println!("{}", colored_score);
    println!();

    for (idx, (question, answer)) in session
        .questions()
        .iter()
        .zip(result.answers.iter())
        .enumerate()
    {
        println!(
            "{}{}",
            format!("{}. ", idx + 1).cyan(),
            question.record.question.as_str().bold()
        );
        match answer {
            Some(answer) if answer.is_correct => {
                println!(
                    "   {}",
                    format!(
                        "✓ Deine Antwort: {}",
                        question.shuffled_answers[answer.selected_index]
                    )
                    .green()
                );
            }
            Some(answer) => {
                println!(
                    "   {}",
                    format!(
                        "✗ Deine Antwort: {}",
                        question.shuffled_answers[answer.selected_index]
                    )
                    .red()
                );
                println!(
                    "   {}",
                    format!(
                        "Richtige Antwort: {}",
                        question.shuffled_answers[answer.correct_index]
                    )
                    .green()
                );
            }
            None => {
                println!("   {}", "✗ Keine Antwort".red());
                println!(
                    "   {}",
                    format!(
                        "Richtige Antwort: {}",
                        question.shuffled_answers[question.correct_shuffled_index]
                    )
                    .green()
                );
            }
        }
        println!("   {}", question.record.explanation.as_str().italic());
    }
}
