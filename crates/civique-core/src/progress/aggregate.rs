//! Folds completed attempts and lesson events into [`UserProgress`].
//!
//! Derived statistics (overall score, weak categories) are recomputed from
//! the complete attempt history on every fold rather than patched
//! incrementally. That is O(history) per attempt, which is fine at the
//! realistic scale of hundreds of attempts and removes any chance of drift.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::catalog::{Category, Module};
use crate::error::CatalogError;
use crate::progress::UserProgress;
use crate::scoring::ExamAttempt;

/// A category whose historical average score falls below this is weak.
pub const WEAK_CATEGORY_THRESHOLD: f64 = 70.0;

/// Append a completed attempt and recompute the derived statistics.
pub fn record_attempt(progress: &mut UserProgress, attempt: ExamAttempt) {
    touch_activity(progress, attempt.date);
    progress.total_time_min += attempt.duration_min;
    progress.exam_attempts.push(attempt);
    recompute_from_history(progress);
}

/// Mark a lesson completed within its module.
///
/// Idempotent: completing an already-completed lesson changes nothing.
/// Returns whether the lesson was newly completed.
pub fn complete_lesson(
    progress: &mut UserProgress,
    module: &Module,
    lesson_id: &str,
    now: DateTime<Utc>,
) -> Result<bool, CatalogError> {
    let lesson = module
        .lesson_by_id(lesson_id)
        .ok_or_else(|| CatalogError::UnknownLesson {
            module_id: module.id.clone(),
            lesson_id: lesson_id.to_string(),
        })?;

    let entry = progress
        .module_progress
        .entry(module.id.clone())
        .or_default();
    let newly_completed = entry.lessons_completed.insert(lesson.id.clone());
    if newly_completed {
        entry.time_spent_min += lesson.estimated_min;
        progress.total_time_min += lesson.estimated_min;
    }
    entry.completed = module
        .lessons
        .iter()
        .all(|l| entry.lessons_completed.contains(&l.id));
    entry.last_accessed = Some(now);

    if newly_completed {
        touch_activity(progress, now);
    }
    Ok(newly_completed)
}

/// Record a module-scoped quiz score (most recent wins).
pub fn record_module_quiz_score(
    progress: &mut UserProgress,
    module_id: &str,
    score: f64,
    now: DateTime<Utc>,
) {
    let entry = progress
        .module_progress
        .entry(module_id.to_string())
        .or_default();
    entry.quiz_score = score;
    entry.attempts += 1;
    entry.last_accessed = Some(now);
}

/// Recompute overall score and the weak-category set from the full history.
fn recompute_from_history(progress: &mut UserProgress) {
    let attempts = &progress.exam_attempts;
    progress.overall_score = if attempts.is_empty() {
        0.0
    } else {
        attempts.iter().map(|a| a.score).sum::<f64>() / attempts.len() as f64
    };

    // Collect every per-attempt category score across the whole history;
    // categories never attempted are never flagged.
    let mut by_category: BTreeMap<Category, Vec<f64>> = BTreeMap::new();
    for attempt in attempts {
        for (&category, &score) in &attempt.category_scores {
            by_category.entry(category).or_default().push(score);
        }
    }
    progress.weak_categories = by_category
        .into_iter()
        .filter(|(_, scores)| {
            (scores.iter().sum::<f64>() / scores.len() as f64) < WEAK_CATEGORY_THRESHOLD
        })
        .map(|(category, _)| category)
        .collect();
}

/// Update the consecutive-day streak for an activity at `at`.
///
/// Same calendar day: unchanged. Next calendar day: +1. Anything else,
/// including the first ever activity: reset to 1.
fn touch_activity(progress: &mut UserProgress, at: DateTime<Utc>) {
    let today = at.date_naive();
    progress.streak = match progress.last_activity {
        Some(last) => {
            let last_day = last.date_naive();
            if today == last_day {
                progress.streak
            } else if (today - last_day).num_days() == 1 {
                progress.streak + 1
            } else {
                1
            }
        }
        None => 1,
    };
    progress.last_activity = Some(at);
}
