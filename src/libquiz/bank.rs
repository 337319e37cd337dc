use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::libquiz::QuizError;

pub const SUPPORTED_LANGUAGES: [&str; 4] = ["de", "en", "es", "it"];
pub const DEFAULT_LANGUAGE: &str = "de";

/// How many answers every question in a bank must carry. Banks never mix
/// conventions; the variant is fixed at the data-source level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceCount {
    Two,
    Four,
}

impl ChoiceCount {
    pub fn from_count(count: u32) -> Option<ChoiceCount> {
        match count {
            2 => Some(ChoiceCount::Two),
            4 => Some(ChoiceCount::Four),
            _ => None,
        }
    }

    pub fn len(self) -> usize {
        match self {
            ChoiceCount::Two => 2,
            ChoiceCount::Four => 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QuestionRecord {
    pub id: String,
    pub question: String,
    pub answers: Vec<String>,
    pub correct_index: usize,
    pub explanation: String,
    #[serde(default)]
    pub category: Option<String>,
}

pub(crate) fn bank_path(dir: &Path, lang: &str) -> Result<PathBuf, QuizError> {
    if !SUPPORTED_LANGUAGES.contains(&lang) {
        return Err(QuizError::UnsupportedLanguage(lang.to_string()));
    }
    Ok(dir.join(format!("questions_{}.json", lang)))
}

pub(crate) fn load_bank(src: &Path, choices: ChoiceCount) -> Result<Vec<QuestionRecord>, QuizError> {
    info!("[Bank] Loading question bank from {:?}", src);
    let json = fs::read_to_string(src)?;
    let bank: Vec<QuestionRecord> = serde_json::from_str(json.as_str())?;
    validate_bank(&bank, choices)?;
    debug!("[Bank] Loaded {} questions.", bank.len());
    Ok(bank)
}

/// Rejects the whole bank on the first structurally bad entry. No partial
/// loads: a bank is either fully usable or not at all.
pub(crate) fn validate_bank(bank: &[QuestionRecord], choices: ChoiceCount) -> Result<(), QuizError> {
    if bank.is_empty() {
        return Err(QuizError::Invalid("bank contains no questions".to_string()));
    }
    for (idx, record) in bank.iter().enumerate() {
        if record.id.is_empty() {
            return Err(QuizError::Invalid(format!("entry {} has an empty `id`", idx)));
        }
        if record.question.is_empty() {
            return Err(QuizError::Invalid(format!(
                "question '{}' has an empty `question`",
                record.id
            )));
        }
        if record.explanation.is_empty() {
            return Err(QuizError::Invalid(format!(
                "question '{}' has an empty `explanation`",
                record.id
            )));
        }
        if record.answers.len() != choices.len() {
            return Err(QuizError::Invalid(format!(
                "question '{}' has {} answers, bank convention is {}",
                record.id,
                record.answers.len(),
                choices.len()
            )));
        }
        if record.correct_index >= record.answers.len() {
            return Err(QuizError::Invalid(format!(
                "question '{}' has `correctIndex` {} outside its {} answers",
                record.id,
                record.correct_index,
                record.answers.len()
            )));
        }
    }
    Ok(())
}
