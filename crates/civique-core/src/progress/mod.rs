//! Persisted user state: attempt history plus derived aggregates.

mod aggregate;

pub use aggregate::{
    complete_lesson, record_attempt, record_module_quiz_score, WEAK_CATEGORY_THRESHOLD,
};

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Category;
use crate::scoring::ExamAttempt;

/// Progress within one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModuleProgress {
    /// Every lesson of the module has been completed.
    pub completed: bool,
    pub lessons_completed: BTreeSet<String>,
    /// Most recent quiz score recorded against this module, 0-100.
    pub quiz_score: f64,
    /// Cumulative study minutes in this module.
    pub time_spent_min: u64,
    pub last_accessed: Option<DateTime<Utc>>,
    /// Number of quiz attempts recorded against this module.
    pub attempts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Study,
    Exam,
    Streak,
    Mastery,
}

/// An unlocked achievement. The core persists and surfaces these; award
/// rules belong to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub unlocked_at: DateTime<Utc>,
    pub category: AchievementCategory,
}

/// The single persisted user record. Mutated only through the aggregator
/// operations and full reset; persists across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    /// Arithmetic mean of all attempt scores, 0-100. Recomputed from the
    /// full history on every new attempt, never patched incrementally.
    pub overall_score: f64,
    pub module_progress: BTreeMap<String, ModuleProgress>,
    /// Append-only attempt history; cleared only by a full reset.
    pub exam_attempts: Vec<ExamAttempt>,
    /// Categories whose historical average score is below
    /// [`WEAK_CATEGORY_THRESHOLD`].
    pub weak_categories: BTreeSet<Category>,
    /// Consecutive calendar days with recorded activity.
    pub streak: u32,
    /// `None` until the first recorded activity.
    pub last_activity: Option<DateTime<Utc>>,
    /// Cumulative study + exam minutes.
    pub total_time_min: u64,
    pub badges: Vec<String>,
    pub achievements: Vec<Achievement>,
}

impl Default for UserProgress {
    fn default() -> Self {
        Self {
            overall_score: 0.0,
            module_progress: BTreeMap::new(),
            exam_attempts: Vec::new(),
            weak_categories: BTreeSet::new(),
            streak: 0,
            last_activity: None,
            total_time_min: 0,
            badges: Vec::new(),
            achievements: Vec::new(),
        }
    }
}

impl UserProgress {
    /// Share of modules fully completed, 0-100.
    pub fn completion_percentage(&self, total_modules: usize) -> f64 {
        if total_modules == 0 {
            return 0.0;
        }
        let completed = self
            .module_progress
            .values()
            .filter(|p| p.completed)
            .count();
        completed as f64 / total_modules as f64 * 100.0
    }

    pub fn attempt_count(&self) -> usize {
        self.exam_attempts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        let progress = UserProgress::default();
        assert_eq!(progress.overall_score, 0.0);
        assert_eq!(progress.streak, 0);
        assert!(progress.last_activity.is_none());
        assert!(progress.exam_attempts.is_empty());
        assert!(progress.weak_categories.is_empty());
    }

    #[test]
    fn completion_percentage_counts_completed_modules() {
        let mut progress = UserProgress::default();
        progress.module_progress.insert(
            "m1".into(),
            ModuleProgress {
                completed: true,
                ..Default::default()
            },
        );
        progress
            .module_progress
            .insert("m2".into(), ModuleProgress::default());
        assert_eq!(progress.completion_percentage(4), 25.0);
        assert_eq!(progress.completion_percentage(0), 0.0);
    }

    #[test]
    fn json_round_trip_is_lossless() {
        use crate::catalog::{Category, ExamType};
        use crate::session::QuizMode;
        use chrono::TimeZone;

        let mut progress = UserProgress::default();
        progress.overall_score = 72.5;
        progress.streak = 4;
        progress.last_activity = Some(Utc.with_ymd_and_hms(2025, 3, 10, 19, 30, 0).unwrap());
        progress.total_time_min = 95;
        progress.weak_categories.insert(Category::Geographie);
        progress.exam_attempts.push(ExamAttempt {
            id: "a1".into(),
            date: Utc.with_ymd_and_hms(2025, 3, 10, 19, 0, 0).unwrap(),
            score: 66.0,
            duration_min: 21,
            question_ids: vec!["q1".into(), "q2".into()],
            answers: vec![Some(1), None],
            category_scores: [(Category::Geographie, 50.0)].into_iter().collect(),
            exam_type: ExamType::Csp,
            mode: QuizMode::Exam,
            passed: false,
        });
        progress.module_progress.insert(
            "m1".into(),
            ModuleProgress {
                completed: false,
                lessons_completed: ["l1".to_string()].into_iter().collect(),
                quiz_score: 80.0,
                time_spent_min: 12,
                last_accessed: Some(Utc.with_ymd_and_hms(2025, 3, 9, 8, 0, 0).unwrap()),
                attempts: 1,
            },
        );

        let json = serde_json::to_string(&progress).unwrap();
        let back: UserProgress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, progress);
    }
}
