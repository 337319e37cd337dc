use thiserror::Error;

pub(crate) mod bank;
pub(crate) mod sampler;
pub(crate) mod session;

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("cannot read question bank: {0}")]
    Load(#[from] std::io::Error),
    #[error("malformed question bank: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid question bank: {0}")]
    Invalid(String),
    #[error("not enough questions: bank has {available}, need {needed}")]
    NotEnoughQuestions { available: usize, needed: usize },
    #[error("not enough categories: bank has {found}, need {needed}")]
    InsufficientCategories { found: usize, needed: usize },
    #[error("category '{category}' has {available} questions, need {needed}")]
    InsufficientCategory {
        category: String,
        available: usize,
        needed: usize,
    },
    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),
}
