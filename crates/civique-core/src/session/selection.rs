//! Question-set selection for each quiz mode.
//!
//! The randomness used for exam shuffling comes from a caller-supplied RNG
//! so selection is reproducible under a fixed seed.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::{Catalog, Category, Question};
use crate::config::Config;
use crate::error::ConfigError;
use crate::session::QuizMode;

/// Caller overrides for one session.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Learning mode: restrict the pool to a single category.
    pub category: Option<Category>,
    /// Override the configured set size.
    pub question_count: Option<usize>,
}

/// Build the ordered question set for a session.
///
/// - Exam: the full pool is shuffled (Fisher-Yates), then truncated to the
///   configured exam size.
/// - Learning: optionally filtered to one category, kept in catalog order.
/// - Review: filtered to the weak categories; with no weak categories the
///   full pool is used instead, so review stays usable on a fresh profile.
///
/// An empty result is a configuration error: every mode requires a
/// non-empty set.
pub fn select_questions(
    catalog: &Catalog,
    mode: QuizMode,
    options: &SessionOptions,
    weak_categories: &BTreeSet<Category>,
    config: &Config,
    rng: &mut impl Rng,
) -> Result<Vec<Question>, ConfigError> {
    let mut pool: Vec<Question> = match mode {
        QuizMode::Exam => catalog.questions().to_vec(),
        QuizMode::Learning => catalog
            .questions()
            .iter()
            .filter(|q| options.category.map_or(true, |c| q.category == c))
            .cloned()
            .collect(),
        QuizMode::Review => {
            if weak_categories.is_empty() {
                log::debug!("review requested with no weak categories; using the full pool");
                catalog.questions().to_vec()
            } else {
                catalog
                    .questions()
                    .iter()
                    .filter(|q| weak_categories.contains(&q.category))
                    .cloned()
                    .collect()
            }
        }
    };

    if pool.is_empty() {
        return Err(ConfigError::EmptySelection {
            mode,
            category: options.category,
        });
    }

    if mode == QuizMode::Exam {
        pool.shuffle(rng);
    }

    let count = options.question_count.unwrap_or(match mode {
        QuizMode::Exam => config.exam.question_count,
        QuizMode::Learning => config.learning.question_count,
        QuizMode::Review => config.review.question_count,
    });
    pool.truncate(count.max(1));
    Ok(pool)
}
