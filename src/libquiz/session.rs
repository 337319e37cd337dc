use log::{debug, warn};

use crate::libquiz::bank::QuestionRecord;
use crate::libquiz::sampler::{self, SelectedQuestion, SelectionMode};
use crate::libquiz::QuizError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Playing,
    Results,
    Error,
}

#[derive(Debug, Clone)]
pub struct QuizConfig {
    pub mode: SelectionMode,
    pub min_categories: usize,
    pub min_per_category: usize,
    pub shuffle_answers: bool,
}

impl Default for QuizConfig {
    fn default() -> Self {
        QuizConfig {
            mode: SelectionMode::Flat { count: 10 },
            min_categories: sampler::DEFAULT_MIN_CATEGORIES,
            min_per_category: sampler::DEFAULT_MIN_PER_CATEGORY,
            shuffle_answers: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question_id: String,
    pub selected_index: usize,
    pub is_correct: bool,
    pub correct_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    pub total_questions: usize,
    pub correct_answers: usize,
    pub percentage: u32,
    pub answers: Vec<Option<AnswerRecord>>,
}

impl SessionResult {
    /// An unanswered position counts as not-correct; it must never break
    /// scoring.
    pub(crate) fn from_answers(answers: &[Option<AnswerRecord>]) -> SessionResult {
        let total_questions = answers.len();
        let correct_answers = answers
            .iter()
            .filter(|a| a.as_ref().is_some_and(|r| r.is_correct))
            .count();
        let percentage = if total_questions == 0 {
            0
        } else {
            ((correct_answers * 100) as f64 / total_questions as f64).round() as u32
        };
        SessionResult {
            total_questions,
            correct_answers,
            percentage,
            answers: answers.to_vec(),
        }
    }
}

pub type LoadTicket = u64;

/// One quiz run from start to the results screen. Exactly one event is
/// processed at a time; every action runs synchronously to completion.
#[derive(Debug)]
pub struct Session {
    config: QuizConfig,
    phase: Phase,
    bank: Option<Vec<QuestionRecord>>,
    questions: Vec<SelectedQuestion>,
    answers: Vec<Option<AnswerRecord>>,
    current: usize,
    result: Option<SessionResult>,
    last_error: Option<QuizError>,
    load_epoch: LoadTicket,
}

impl Session {
    pub fn new(config: QuizConfig) -> Session {
        Session {
            config,
            phase: Phase::Start,
            bank: None,
            questions: Vec::new(),
            answers: Vec::new(),
            current: 0,
            result: None,
            last_error: None,
            load_epoch: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Marks a new load in flight and invalidates every earlier ticket.
    /// Last request wins: a bank delivered against a stale ticket is dropped.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_epoch += 1;
        self.load_epoch
    }

    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        outcome: Result<Vec<QuestionRecord>, QuizError>,
    ) -> bool {
        if ticket != self.load_epoch {
            debug!(
                "[Session] Discarding stale load result (ticket {}, current {}).",
                ticket, self.load_epoch
            );
            return false;
        }
        match outcome {
            Ok(bank) => {
                debug!("[Session] Installed bank of {} questions.", bank.len());
                self.bank = Some(bank);
                true
            }
            Err(err) => {
                self.load_failed(err);
                true
            }
        }
    }

    pub fn load_failed(&mut self, err: QuizError) {
        self.fail(err);
    }

    fn fail(&mut self, err: QuizError) {
        warn!("[Session] {}", err);
        self.last_error = Some(err);
        self.phase = Phase::Error;
    }

    fn start_gate(&self, bank: &[QuestionRecord]) -> Result<(), QuizError> {
        match self.config.mode {
            // The flat variant runs on uncategorized banks; only the total
            // count matters.
            SelectionMode::Flat { count } => {
                if bank.len() < count {
                    Err(QuizError::NotEnoughQuestions {
                        available: bank.len(),
                        needed: count,
                    })
                } else {
                    Ok(())
                }
            }
            SelectionMode::Stratified { .. } => sampler::validate_categories(
                bank,
                self.config.min_categories,
                self.config.min_per_category,
            ),
        }
    }

    /// Guard failures transition to `Error` and leave everything else
    /// untouched; the bank stays installed so a retry needs no new load.
    pub fn start(&mut self) -> bool {
        if self.phase != Phase::Start {
            return false;
        }
        let Some(bank) = self.bank.take() else {
            self.fail(QuizError::Invalid("no question bank loaded".to_string()));
            return false;
        };
        if let Err(err) = self.start_gate(&bank) {
            self.bank = Some(bank);
            self.fail(err);
            return false;
        }
        let picked = match sampler::sample(&bank, self.config.mode) {
            Ok(picked) => picked,
            Err(err) => {
                self.bank = Some(bank);
                self.fail(err);
                return false;
            }
        };
        self.questions = picked
            .iter()
            .map(|q| sampler::shuffle_answers(q, self.config.shuffle_answers))
            .collect();
        self.bank = Some(bank);
        self.answers = vec![None; self.questions.len()];
        self.current = 0;
        self.result = None;
        self.phase = Phase::Playing;
        debug!("[Session] Started with {} questions.", self.questions.len());
        true
    }

    /// Records (or overwrites) the answer for the current question. The front
    /// end locks an answered question; the model itself allows replacement.
    pub fn answer(&mut self, selected_index: usize) -> bool {
        if self.phase != Phase::Playing {
            return false;
        }
        let Some(question) = self.questions.get(self.current) else {
            return false;
        };
        if selected_index >= question.shuffled_answers.len() {
            warn!(
                "[Session] Answer index {} out of range for question '{}'.",
                selected_index, question.record.id
            );
            return false;
        }
        self.answers[self.current] = Some(AnswerRecord {
            question_id: question.record.id.clone(),
            selected_index,
            is_correct: selected_index == question.correct_shuffled_index,
            correct_index: question.correct_shuffled_index,
        });
        true
    }

    pub fn next(&mut self) -> bool {
        if self.phase != Phase::Playing || self.current_answer().is_none() {
            return false;
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        } else {
            self.finish();
        }
        true
    }

    pub fn previous(&mut self) -> bool {
        if self.phase != Phase::Playing || self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    fn finish(&mut self) {
        let result = SessionResult::from_answers(&self.answers);
        debug!(
            "[Session] Finished: {}/{} correct ({}%).",
            result.correct_answers, result.total_questions, result.percentage
        );
        self.result = Some(result);
        self.phase = Phase::Results;
    }

    pub fn restart(&mut self) -> bool {
        if self.phase != Phase::Results {
            return false;
        }
        self.questions.clear();
        self.answers.clear();
        self.current = 0;
        self.result = None;
        self.phase = Phase::Start;
        true
    }

    /// Returns to `Start`; the caller re-invokes the loader through
    /// `begin_load`/`finish_load`.
    pub fn retry(&mut self) -> bool {
        if self.phase != Phase::Error {
            return false;
        }
        self.last_error = None;
        self.phase = Phase::Start;
        true
    }

    pub fn current_question(&self) -> Option<&SelectedQuestion> {
        if self.phase == Phase::Playing {
            self.questions.get(self.current)
        } else {
            None
        }
    }

    /// 1-based position of the current question.
    pub fn position(&self) -> usize {
        self.current + 1
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn current_answer(&self) -> Option<&AnswerRecord> {
        if self.phase != Phase::Playing {
            return None;
        }
        self.answers.get(self.current).and_then(|a| a.as_ref())
    }

    pub fn is_answered(&self) -> bool {
        self.current_answer().is_some()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.current_answer().map(|a| a.selected_index)
    }

    pub fn is_correct(&self) -> Option<bool> {
        self.current_answer().map(|a| a.is_correct)
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    /// The full question set of the finished run, for the results detail view.
    pub fn questions(&self) -> &[SelectedQuestion] {
        &self.questions
    }

    pub fn last_error(&self) -> Option<&QuizError> {
        self.last_error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, category: Option<&str>) -> QuestionRecord {
        QuestionRecord {
            id: id.to_string(),
            question: format!("Frage {}?", id),
            answers: vec!["Ja".to_string(), "Nein".to_string()],
            correct_index: 0,
            explanation: format!("Erklärung {}.", id),
            category: category.map(|c| c.to_string()),
        }
    }

    fn bank(n: usize) -> Vec<QuestionRecord> {
        (0..n).map(|i| record(&format!("q{}", i), None)).collect()
    }

    fn flat_config(count: usize) -> QuizConfig {
        QuizConfig {
            mode: SelectionMode::Flat { count },
            // Shuffling off keeps correct_shuffled_index == correct_index == 0
            // so tests can answer deterministically.
            shuffle_answers: false,
            ..QuizConfig::default()
        }
    }

    fn playing_session(n: usize) -> Session {
        let mut session = Session::new(flat_config(n));
        let ticket = session.begin_load();
        assert!(session.finish_load(ticket, Ok(bank(n))));
        assert!(session.start());
        session
    }

    #[test]
    fn walks_linearly_to_results() {
        let mut session = playing_session(6);
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.position(), 1);
        assert_eq!(session.total(), 6);

        for i in 0..6 {
            assert_eq!(session.position(), i + 1);
            assert!(!session.is_answered());
            assert!(session.answer(1));
            assert!(session.next());
        }
        assert_eq!(session.phase(), Phase::Results);

        assert!(session.restart());
        assert_eq!(session.phase(), Phase::Start);
        assert!(session.result().is_none());
        assert!(session.questions().is_empty());
        assert!(session.selected_index().is_none());
    }

    #[test]
    fn scores_three_of_five_as_sixty_percent() {
        let mut session = playing_session(5);
        for i in 0..5 {
            // Correct answer is index 0 on positions 0, 2 and 4.
            let pick = if i % 2 == 0 { 0 } else { 1 };
            assert!(session.answer(pick));
            assert!(session.next());
        }
        let result = session.result().unwrap();
        assert_eq!(result.total_questions, 5);
        assert_eq!(result.correct_answers, 3);
        assert_eq!(result.percentage, 60);
        assert_eq!(result.answers.len(), 5);
    }

    #[test]
    fn next_requires_an_answer() {
        let mut session = playing_session(3);
        assert!(!session.next());
        assert_eq!(session.position(), 1);
        assert!(session.answer(0));
        assert!(session.next());
        assert_eq!(session.position(), 2);
    }

    #[test]
    fn previous_preserves_the_prior_answer() {
        let mut session = playing_session(4);
        assert!(!session.previous());

        assert!(session.answer(1));
        assert!(session.next());
        assert!(session.answer(0));
        assert!(session.next());
        assert_eq!(session.position(), 3);

        assert!(session.previous());
        assert_eq!(session.position(), 2);
        assert!(session.is_answered());
        assert_eq!(session.selected_index(), Some(0));
        assert_eq!(session.is_correct(), Some(true));

        assert!(session.previous());
        assert_eq!(session.selected_index(), Some(1));
        assert_eq!(session.is_correct(), Some(false));
    }

    #[test]
    fn re_answering_replaces_the_record() {
        let mut session = playing_session(2);
        assert!(session.answer(1));
        assert_eq!(session.is_correct(), Some(false));
        assert!(session.answer(0));
        assert_eq!(session.is_correct(), Some(true));
        assert_eq!(session.selected_index(), Some(0));
    }

    #[test]
    fn out_of_range_answers_are_ignored() {
        let mut session = playing_session(2);
        assert!(!session.answer(2));
        assert!(!session.is_answered());
    }

    #[test]
    fn unanswered_positions_count_as_incorrect() {
        let answered = |correct: bool| {
            Some(AnswerRecord {
                question_id: "q".to_string(),
                selected_index: 0,
                is_correct: correct,
                correct_index: 0,
            })
        };
        let result =
            SessionResult::from_answers(&[answered(true), None, answered(true), None, None]);
        assert_eq!(result.total_questions, 5);
        assert_eq!(result.correct_answers, 2);
        assert_eq!(result.percentage, 40);
    }

    #[test]
    fn short_bank_fails_start_and_keeps_the_bank() {
        let mut session = Session::new(flat_config(10));
        let ticket = session.begin_load();
        session.finish_load(ticket, Ok(bank(3)));
        assert!(!session.start());
        assert_eq!(session.phase(), Phase::Error);
        assert!(matches!(
            session.last_error(),
            Some(QuizError::NotEnoughQuestions {
                available: 3,
                needed: 10
            })
        ));

        // The bank survives the failed start; retry returns to Start without
        // a reload.
        assert!(session.retry());
        assert_eq!(session.phase(), Phase::Start);
        assert!(session.last_error().is_none());
    }

    #[test]
    fn stratified_start_runs_the_category_gate() {
        let mut categorized = Vec::new();
        for category in ["A", "B", "C", "D"] {
            for i in 0..2 {
                categorized.push(record(&format!("{}{}", category, i), Some(category)));
            }
        }
        let config = QuizConfig {
            mode: SelectionMode::Stratified { per_category: 2 },
            shuffle_answers: false,
            ..QuizConfig::default()
        };
        let mut session = Session::new(config);
        let ticket = session.begin_load();
        session.finish_load(ticket, Ok(categorized));
        assert!(!session.start());
        assert!(matches!(
            session.last_error(),
            Some(QuizError::InsufficientCategories { found: 4, needed: 5 })
        ));
    }

    #[test]
    fn load_failure_reaches_the_error_phase() {
        let mut session = Session::new(flat_config(10));
        let ticket = session.begin_load();
        assert!(session.finish_load(
            ticket,
            Err(QuizError::Invalid("bank contains no questions".to_string()))
        ));
        assert_eq!(session.phase(), Phase::Error);
        assert!(session.retry());
        assert_eq!(session.phase(), Phase::Start);
    }

    #[test]
    fn stale_load_results_are_discarded() {
        let mut session = Session::new(flat_config(2));
        let stale = session.begin_load();
        let current = session.begin_load();

        assert!(!session.finish_load(stale, Ok(bank(5))));
        assert!(!session.start());
        assert_eq!(session.phase(), Phase::Error);

        assert!(session.retry());
        assert!(session.finish_load(current, Ok(bank(2))));
        assert!(session.start());
        assert_eq!(session.phase(), Phase::Playing);
    }

    #[test]
    fn actions_are_ignored_outside_playing() {
        let mut session = Session::new(flat_config(2));
        assert!(!session.answer(0));
        assert!(!session.next());
        assert!(!session.previous());
        assert!(!session.restart());
        assert!(!session.retry());
        assert!(session.current_question().is_none());
    }
}
