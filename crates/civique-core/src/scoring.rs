//! Attempt grading.
//!
//! [`grade`] is a pure function from a finished answer sheet to a score
//! breakdown; it has no side effects and no clock or id generation, so it
//! can be unit-tested against literal fixtures. The persisted
//! [`ExamAttempt`] is assembled separately with a caller-supplied id and
//! timestamp.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Category, ExamType, Question};
use crate::session::{CompletedQuiz, QuizMode};

/// Score breakdown for one finished answer sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    pub total: usize,
    pub correct: usize,
    /// Overall score, 0-100.
    pub score: f64,
    /// Per-category score, 0-100. Categories with no question in the set
    /// are omitted.
    pub category_scores: BTreeMap<Category, f64>,
    pub passed: bool,
}

/// Grade an answer sheet against its question set.
///
/// Unanswered slots never count as correct. An empty set scores 0.
pub fn grade(questions: &[Question], answers: &[Option<u8>], passing_score: f64) -> Grade {
    debug_assert_eq!(questions.len(), answers.len());

    let mut correct = 0usize;
    let mut per_category: BTreeMap<Category, (usize, usize)> = BTreeMap::new();

    for (question, answer) in questions.iter().zip(answers) {
        let is_correct = *answer == Some(question.correct_answer);
        if is_correct {
            correct += 1;
        }
        let entry = per_category.entry(question.category).or_insert((0, 0));
        entry.1 += 1;
        if is_correct {
            entry.0 += 1;
        }
    }

    let score = if questions.is_empty() {
        0.0
    } else {
        correct as f64 / questions.len() as f64 * 100.0
    };

    let category_scores = per_category
        .into_iter()
        .map(|(category, (hit, total))| (category, hit as f64 / total as f64 * 100.0))
        .collect();

    Grade {
        total: questions.len(),
        correct,
        score,
        category_scores,
        passed: score >= passing_score,
    }
}

/// One completed quiz run's recorded outcome. Append-only once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamAttempt {
    pub id: String,
    pub date: DateTime<Utc>,
    /// Overall score, 0-100.
    pub score: f64,
    /// Whole minutes; 0 for untimed modes.
    pub duration_min: u64,
    pub question_ids: Vec<String>,
    /// Parallel to `question_ids`; `None` = unanswered.
    pub answers: Vec<Option<u8>>,
    pub category_scores: BTreeMap<Category, f64>,
    pub exam_type: ExamType,
    pub mode: QuizMode,
    pub passed: bool,
}

impl ExamAttempt {
    /// Assemble the persisted record from a finalized quiz and its grade.
    ///
    /// The id and timestamp come from the caller so grading stays
    /// deterministic; the controller stamps a v4 uuid and the clock time.
    pub fn from_quiz(
        quiz: &CompletedQuiz,
        grade: &Grade,
        exam_type: ExamType,
        id: String,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            date,
            score: grade.score,
            duration_min: quiz.duration_min,
            question_ids: quiz.questions.iter().map(|q| q.id.clone()).collect(),
            answers: quiz.answers.clone(),
            category_scores: grade.category_scores.clone(),
            exam_type,
            mode: quiz.mode,
            passed: grade.passed,
        }
    }
}
