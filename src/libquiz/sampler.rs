use log::debug;
use rand::rng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

use crate::libquiz::bank::QuestionRecord;
use crate::libquiz::QuizError;

pub const DEFAULT_MIN_CATEGORIES: usize = 5;
pub const DEFAULT_MIN_PER_CATEGORY: usize = 2;

/// Selection policy for one quiz run. Flat mode draws uniformly from the
/// whole bank; stratified mode draws the same number from every category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Flat { count: usize },
    Stratified { per_category: usize },
}

#[derive(Debug, Clone)]
pub struct SelectedQuestion {
    pub record: QuestionRecord,
    pub shuffled_answers: Vec<String>,
    pub correct_shuffled_index: usize,
}

fn group_by_category(bank: &[QuestionRecord]) -> BTreeMap<&str, Vec<&QuestionRecord>> {
    let mut groups: BTreeMap<&str, Vec<&QuestionRecord>> = BTreeMap::new();
    for record in bank {
        if let Some(category) = &record.category {
            groups.entry(category.as_str()).or_default().push(record);
        }
    }
    groups
}

/// Per-category question counts, in category name order. Uncategorized
/// entries belong to no group.
pub(crate) fn category_counts(bank: &[QuestionRecord]) -> BTreeMap<&str, usize> {
    group_by_category(bank)
        .into_iter()
        .map(|(name, members)| (name, members.len()))
        .collect()
}

/// Pure pass/fail gate over the bank's category shape. Callable before any
/// selection work so the failure surfaces without sampling.
pub(crate) fn validate_categories(
    bank: &[QuestionRecord],
    min_categories: usize,
    min_per_category: usize,
) -> Result<(), QuizError> {
    let groups = group_by_category(bank);
    if groups.len() < min_categories {
        return Err(QuizError::InsufficientCategories {
            found: groups.len(),
            needed: min_categories,
        });
    }
    for (name, members) in &groups {
        if members.len() < min_per_category {
            return Err(QuizError::InsufficientCategory {
                category: name.to_string(),
                available: members.len(),
                needed: min_per_category,
            });
        }
    }
    Ok(())
}

pub(crate) fn flat_sample(
    bank: &[QuestionRecord],
    count: usize,
) -> Result<Vec<QuestionRecord>, QuizError> {
    if bank.len() < count {
        return Err(QuizError::NotEnoughQuestions {
            available: bank.len(),
            needed: count,
        });
    }
    debug!("[Setup] Drawing {} of {} questions.", count, bank.len());
    let mut pool = bank.to_vec();
    pool.shuffle(&mut rng());
    pool.truncate(count);
    Ok(pool)
}

pub(crate) fn stratified_sample(
    bank: &[QuestionRecord],
    per_category: usize,
) -> Result<Vec<QuestionRecord>, QuizError> {
    let groups = group_by_category(bank);
    if groups.is_empty() {
        return Err(QuizError::InsufficientCategories { found: 0, needed: 1 });
    }
    // All-or-nothing: every group must be deep enough before anything is drawn.
    for (name, members) in &groups {
        if members.len() < per_category {
            return Err(QuizError::InsufficientCategory {
                category: name.to_string(),
                available: members.len(),
                needed: per_category,
            });
        }
    }
    debug!(
        "[Setup] Drawing {} questions each from {} categories.",
        per_category,
        groups.len()
    );
    let mut picked = Vec::with_capacity(per_category * groups.len());
    for (_, mut members) in groups {
        members.shuffle(&mut rng());
        picked.extend(members[..per_category].iter().map(|r| (*r).clone()));
    }
    // Reshuffle the concatenation so category order is not apparent.
    picked.shuffle(&mut rng());
    Ok(picked)
}

pub(crate) fn sample(
    bank: &[QuestionRecord],
    mode: SelectionMode,
) -> Result<Vec<QuestionRecord>, QuizError> {
    match mode {
        SelectionMode::Flat { count } => flat_sample(bank, count),
        SelectionMode::Stratified { per_category } => stratified_sample(bank, per_category),
    }
}

/// Permutes the answer order of one question. The permutation is carried as
/// indices, so the correct answer stays tracked even when two answers share
/// the same text.
pub(crate) fn shuffle_answers(record: &QuestionRecord, shuffle: bool) -> SelectedQuestion {
    let mut order: Vec<usize> = (0..record.answers.len()).collect();
    if shuffle {
        order.shuffle(&mut rng());
    }
    let shuffled_answers = order.iter().map(|&i| record.answers[i].clone()).collect();
    let correct_shuffled_index = order
        .iter()
        .position(|&i| i == record.correct_index)
        .unwrap();
    SelectedQuestion {
        record: record.clone(),
        shuffled_answers,
        correct_shuffled_index,
    }
}
