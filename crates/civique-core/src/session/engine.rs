//! Quiz session state machine.
//!
//! A session is a wall-clock-based state machine in the same shape as a
//! caller-driven timer engine: it holds no internal threads, and the host is
//! responsible for calling `tick()` about once per second while a timed exam
//! is running. Constructing the session is the `start` transition; the
//! absence of a session is the not-started state.
//!
//! ## State Transitions
//!
//! ```text
//! (start) -> InProgress -> Completed
//! ```
//!
//! `Completed` is terminal; the session is then consumed by [`QuizSession::finalize`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Question, OPTION_COUNT};
use crate::error::SessionError;

/// Session rules regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    /// Timed mock exam: shuffled set, locked answers, countdown.
    Exam,
    /// Self-paced learning: explanations revealed before advancing.
    Learning,
    /// Targeted review of weak categories.
    Review,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Phase {
    InProgress,
    Completed,
}

/// Outcome of an `advance` / `continue_after_explanation` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the next question.
    Next,
    /// Learning mode: the explanation is now showing; the index did not move.
    Revealed,
    /// The session reached its terminal state.
    Finished,
}

/// Event reported by `tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// The countdown reached zero and the session force-completed.
    TimeExpired,
}

/// The finalized output of a completed session: an immutable
/// `(questions, answers, duration)` record handed to scoring.
#[derive(Debug, Clone)]
pub struct CompletedQuiz {
    pub mode: QuizMode,
    pub questions: Vec<Question>,
    /// Parallel to `questions`; `None` = unanswered.
    pub answers: Vec<Option<u8>>,
    /// Whole minutes spent; 0 for untimed modes.
    pub duration_min: u64,
}

/// One quiz run, from start to completion.
///
/// Operates on wall-clock deltas -- no internal thread. The host calls
/// `tick()` periodically while an exam is running; dropping the session is
/// abandonment and persists nothing.
#[derive(Debug, Clone)]
pub struct QuizSession {
    mode: QuizMode,
    questions: Vec<Question>,
    current_index: usize,
    answers: Vec<Option<u8>>,
    /// Countdown, present only in Exam mode.
    remaining_secs: Option<u64>,
    /// Timestamp of the last countdown update.
    last_tick: Option<DateTime<Utc>>,
    /// Learning mode: the current question's explanation is showing.
    revealed_explanation: bool,
    started_at: DateTime<Utc>,
    phase: Phase,
}

impl QuizSession {
    /// Start a session over a non-empty question set.
    ///
    /// `time_limit_secs` arms the countdown and is only meaningful in Exam
    /// mode; untimed modes ignore it.
    pub fn start(
        mode: QuizMode,
        questions: Vec<Question>,
        time_limit_secs: u64,
        now: DateTime<Utc>,
    ) -> Self {
        let answers = vec![None; questions.len()];
        let remaining_secs = match mode {
            QuizMode::Exam => Some(time_limit_secs),
            QuizMode::Learning | QuizMode::Review => None,
        };
        // An empty set has nothing to traverse; such a session is born
        // completed and grades to 0.
        let phase = if questions.is_empty() {
            Phase::Completed
        } else {
            Phase::InProgress
        };
        Self {
            mode,
            questions,
            current_index: 0,
            answers,
            remaining_secs,
            last_tick: (mode == QuizMode::Exam).then_some(now),
            revealed_explanation: false,
            started_at: now,
            phase,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn is_completed(&self) -> bool {
        self.phase == Phase::Completed
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn answers(&self) -> &[Option<u8>] {
        &self.answers
    }

    /// Recorded answer for the current slot.
    pub fn current_answer(&self) -> Option<u8> {
        self.answers.get(self.current_index).copied().flatten()
    }

    pub fn remaining_secs(&self) -> Option<u64> {
        self.remaining_secs
    }

    pub fn explanation_revealed(&self) -> bool {
        self.revealed_explanation
    }

    /// 1-based progress fraction, e.g. question 1 of 10 -> 0.1.
    pub fn progress_fraction(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        ((self.current_index + 1) as f64 / self.questions.len() as f64).min(1.0)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Record an answer for the current question.
    ///
    /// Exam mode: an already-answered slot is locked; the call is a no-op
    /// (first answer wins). Other modes may change the selection freely
    /// until advancing.
    pub fn select_answer(&mut self, option: u8) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        if option as usize >= OPTION_COUNT {
            return Err(SessionError::OptionOutOfRange {
                given: option,
                limit: OPTION_COUNT as u8,
            });
        }
        let slot = &mut self.answers[self.current_index];
        if self.mode == QuizMode::Exam && slot.is_some() {
            return Ok(());
        }
        *slot = Some(option);
        Ok(())
    }

    /// Move past the current question.
    ///
    /// Exam mode requires the current slot to be answered. Learning mode
    /// first reveals the explanation without moving the index; call
    /// [`QuizSession::continue_after_explanation`] to actually advance.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        self.ensure_in_progress()?;
        match self.mode {
            QuizMode::Exam => {
                if self.answers[self.current_index].is_none() {
                    return Err(SessionError::AnswerRequired);
                }
                Ok(self.step_forward())
            }
            QuizMode::Learning => {
                if self.revealed_explanation {
                    return Err(SessionError::ExplanationPending);
                }
                self.revealed_explanation = true;
                Ok(Advance::Revealed)
            }
            QuizMode::Review => Ok(self.step_forward()),
        }
    }

    /// Learning mode: dismiss the explanation and move on.
    pub fn continue_after_explanation(&mut self) -> Result<Advance, SessionError> {
        self.ensure_in_progress()?;
        if !self.revealed_explanation {
            return Err(SessionError::NoExplanationPending);
        }
        self.revealed_explanation = false;
        Ok(self.step_forward())
    }

    /// Update the countdown. Call about once per second while an exam runs.
    ///
    /// Computes the elapsed wall-clock time since the previous tick and
    /// force-completes the session when the countdown reaches zero, leaving
    /// unanswered slots unanswered. No-op for untimed modes and completed
    /// sessions, so it is safe to call between any two user transitions.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<TickEvent> {
        if self.phase == Phase::Completed {
            return None;
        }
        let remaining = self.remaining_secs.as_mut()?;
        let last = self.last_tick.replace(now)?;
        let elapsed = (now - last).num_seconds().max(0) as u64;
        *remaining = remaining.saturating_sub(elapsed);
        if *remaining == 0 {
            self.phase = Phase::Completed;
            self.revealed_explanation = false;
            return Some(TickEvent::TimeExpired);
        }
        None
    }

    /// Consume a completed session into its immutable record.
    pub fn finalize(self, now: DateTime<Utc>) -> Result<CompletedQuiz, SessionError> {
        if self.phase != Phase::Completed {
            return Err(SessionError::NotCompleted);
        }
        let duration_min = match self.mode {
            QuizMode::Exam => ((now - self.started_at).num_seconds().max(0) as u64) / 60,
            QuizMode::Learning | QuizMode::Review => 0,
        };
        Ok(CompletedQuiz {
            mode: self.mode,
            questions: self.questions,
            answers: self.answers,
            duration_min,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        match self.phase {
            Phase::InProgress => Ok(()),
            Phase::Completed => Err(SessionError::SessionCompleted),
        }
    }

    fn step_forward(&mut self) -> Advance {
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            Advance::Next
        } else {
            self.phase = Phase::Completed;
            Advance::Finished
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, Difficulty};
    use chrono::{Duration, TimeZone};

    fn question(id: &str, correct: u8) -> Question {
        Question {
            id: id.into(),
            category: Category::Histoire,
            difficulty: Difficulty::Facile,
            prompt: format!("Question {id}?"),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_answer: correct,
            explanation: "Parce que.".into(),
            source: String::new(),
            tags: vec![],
        }
    }

    fn bank(n: usize) -> Vec<Question> {
        (0..n).map(|i| question(&format!("q{i}"), 0)).collect()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn start_initializes_unanswered_slots() {
        let session = QuizSession::start(QuizMode::Exam, bank(5), 1800, t0());
        assert_eq!(session.len(), 5);
        assert_eq!(session.current_index(), 0);
        assert!(session.answers().iter().all(|a| a.is_none()));
        assert_eq!(session.remaining_secs(), Some(1800));
    }

    #[test]
    fn untimed_modes_have_no_countdown() {
        let session = QuizSession::start(QuizMode::Learning, bank(3), 1800, t0());
        assert_eq!(session.remaining_secs(), None);
        let mut session = session;
        assert_eq!(session.tick(t0() + Duration::seconds(10)), None);
        assert!(!session.is_completed());
    }

    #[test]
    fn exam_answer_is_locked_first_wins() {
        let mut session = QuizSession::start(QuizMode::Exam, bank(2), 1800, t0());
        session.select_answer(1).unwrap();
        session.select_answer(3).unwrap(); // no-op, slot locked
        assert_eq!(session.current_answer(), Some(1));
    }

    #[test]
    fn learning_answer_can_change() {
        let mut session = QuizSession::start(QuizMode::Learning, bank(2), 0, t0());
        session.select_answer(1).unwrap();
        session.select_answer(3).unwrap();
        assert_eq!(session.current_answer(), Some(3));
    }

    #[test]
    fn option_out_of_range_rejected() {
        let mut session = QuizSession::start(QuizMode::Review, bank(2), 0, t0());
        let err = session.select_answer(4).unwrap_err();
        assert!(matches!(err, SessionError::OptionOutOfRange { given: 4, .. }));
    }

    #[test]
    fn exam_advance_requires_answer() {
        let mut session = QuizSession::start(QuizMode::Exam, bank(2), 1800, t0());
        assert_eq!(session.advance().unwrap_err(), SessionError::AnswerRequired);
        session.select_answer(0).unwrap();
        assert_eq!(session.advance().unwrap(), Advance::Next);
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn exam_completes_on_last_question() {
        let mut session = QuizSession::start(QuizMode::Exam, bank(2), 1800, t0());
        session.select_answer(0).unwrap();
        session.advance().unwrap();
        session.select_answer(2).unwrap();
        assert_eq!(session.advance().unwrap(), Advance::Finished);
        assert!(session.is_completed());
        // Terminal state: further transitions are invalid.
        assert_eq!(
            session.select_answer(0).unwrap_err(),
            SessionError::SessionCompleted
        );
        assert_eq!(session.advance().unwrap_err(), SessionError::SessionCompleted);
    }

    #[test]
    fn learning_reveals_before_advancing() {
        let mut session = QuizSession::start(QuizMode::Learning, bank(2), 0, t0());
        session.select_answer(2).unwrap();
        assert_eq!(session.advance().unwrap(), Advance::Revealed);
        assert!(session.explanation_revealed());
        assert_eq!(session.current_index(), 0); // index unchanged

        // A second advance while revealed is a usage error.
        assert_eq!(
            session.advance().unwrap_err(),
            SessionError::ExplanationPending
        );

        assert_eq!(session.continue_after_explanation().unwrap(), Advance::Next);
        assert!(!session.explanation_revealed());
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn continue_without_reveal_rejected() {
        let mut session = QuizSession::start(QuizMode::Learning, bank(2), 0, t0());
        assert_eq!(
            session.continue_after_explanation().unwrap_err(),
            SessionError::NoExplanationPending
        );
    }

    #[test]
    fn learning_completes_after_last_explanation() {
        let mut session = QuizSession::start(QuizMode::Learning, bank(1), 0, t0());
        session.select_answer(0).unwrap();
        session.advance().unwrap();
        assert_eq!(
            session.continue_after_explanation().unwrap(),
            Advance::Finished
        );
        assert!(session.is_completed());
    }

    #[test]
    fn review_advances_with_unanswered_slots() {
        let mut session = QuizSession::start(QuizMode::Review, bank(2), 0, t0());
        assert_eq!(session.advance().unwrap(), Advance::Next);
        assert_eq!(session.advance().unwrap(), Advance::Finished);
        assert!(session.answers().iter().all(|a| a.is_none()));
    }

    #[test]
    fn tick_counts_down_wall_clock() {
        let mut session = QuizSession::start(QuizMode::Exam, bank(5), 1800, t0());
        assert_eq!(session.tick(t0() + Duration::seconds(1)), None);
        assert_eq!(session.remaining_secs(), Some(1799));
        assert_eq!(session.tick(t0() + Duration::seconds(61)), None);
        assert_eq!(session.remaining_secs(), Some(1739));
    }

    #[test]
    fn timer_expiry_force_completes() {
        let mut session = QuizSession::start(QuizMode::Exam, bank(5), 30, t0());
        session.select_answer(0).unwrap();
        session.advance().unwrap();
        session.select_answer(1).unwrap();
        session.advance().unwrap();

        // 2 of 5 answered when the countdown hits zero.
        let event = session.tick(t0() + Duration::seconds(30));
        assert_eq!(event, Some(TickEvent::TimeExpired));
        assert!(session.is_completed());

        let quiz = session.finalize(t0() + Duration::seconds(30)).unwrap();
        assert_eq!(quiz.answers.len(), 5);
        assert_eq!(quiz.answers.iter().filter(|a| a.is_some()).count(), 2);
    }

    #[test]
    fn tick_after_completion_is_noop() {
        let mut session = QuizSession::start(QuizMode::Exam, bank(1), 10, t0());
        session.select_answer(0).unwrap();
        session.advance().unwrap();
        assert_eq!(session.tick(t0() + Duration::seconds(60)), None);
    }

    #[test]
    fn finalize_requires_completion() {
        let session = QuizSession::start(QuizMode::Exam, bank(2), 1800, t0());
        assert_eq!(
            session.finalize(t0()).unwrap_err(),
            SessionError::NotCompleted
        );
    }

    #[test]
    fn finalize_reports_exam_duration_in_minutes() {
        let mut session = QuizSession::start(QuizMode::Exam, bank(1), 1800, t0());
        session.select_answer(0).unwrap();
        session.advance().unwrap();
        let quiz = session
            .finalize(t0() + Duration::seconds(5 * 60 + 30))
            .unwrap();
        assert_eq!(quiz.duration_min, 5);
    }

    #[test]
    fn untimed_duration_is_zero() {
        let mut session = QuizSession::start(QuizMode::Learning, bank(1), 0, t0());
        session.select_answer(0).unwrap();
        session.advance().unwrap();
        session.continue_after_explanation().unwrap();
        let quiz = session.finalize(t0() + Duration::minutes(42)).unwrap();
        assert_eq!(quiz.duration_min, 0);
    }

    #[test]
    fn empty_set_session_is_born_completed() {
        let session = QuizSession::start(QuizMode::Exam, vec![], 1800, t0());
        assert!(session.is_completed());
        let mut session = session;
        assert_eq!(
            session.select_answer(0).unwrap_err(),
            SessionError::SessionCompleted
        );
        let quiz = session.finalize(t0()).unwrap();
        assert!(quiz.questions.is_empty());
    }

    #[test]
    fn progress_fraction_is_one_based() {
        let mut session = QuizSession::start(QuizMode::Review, bank(4), 0, t0());
        assert_eq!(session.progress_fraction(), 0.25);
        session.advance().unwrap();
        assert_eq!(session.progress_fraction(), 0.5);
    }
}
