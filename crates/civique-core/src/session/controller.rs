//! Session controller: the explicit context object owning the single
//! active session and the single user-progress record.
//!
//! All quiz-taking and progress mutation flows through this type; there is
//! no ambient state. `&mut self` on every transition serializes the timer
//! tick against user-initiated operations, matching the single-threaded
//! cooperative model: the host calls [`SessionController::tick`] about once
//! per second while a timed exam runs, and simply stops once the session
//! ends.

use rand::SeedableRng;
use rand_pcg::Pcg64;
use uuid::Uuid;

use crate::catalog::{Catalog, ExamType, Question};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::{Result, SessionError, StoreError};
use crate::progress::{self, UserProgress};
use crate::scoring::{grade, ExamAttempt};
use crate::session::engine::{Advance, QuizMode, QuizSession, TickEvent};
use crate::session::selection::{select_questions, SessionOptions};
use crate::store::ProgressStore;

/// Read-only snapshot of the running session, for the screen layer.
#[derive(Debug)]
pub struct SessionView<'a> {
    pub question: &'a Question,
    /// 0-based index of the current question.
    pub index: usize,
    pub total: usize,
    /// 1-based progress fraction: question 1 of 10 -> 0.1.
    pub progress_fraction: f64,
    /// Countdown seconds; `None` for untimed modes.
    pub remaining_secs: Option<u64>,
    pub explanation_revealed: bool,
    /// Recorded answer for the current question.
    pub selected: Option<u8>,
}

/// Result of finishing a session.
///
/// The attempt is always produced and already folded into the in-memory
/// progress; a persistence failure is carried alongside instead of erasing
/// it, so "progress not saved" can be surfaced without losing the result.
#[derive(Debug)]
pub struct SessionOutcome {
    pub attempt: ExamAttempt,
    pub save_error: Option<StoreError>,
}

/// Owns the catalog, config, store handle, clock, RNG, the persisted
/// progress record, and at most one active [`QuizSession`].
pub struct SessionController {
    catalog: Catalog,
    config: Config,
    store: Box<dyn ProgressStore>,
    clock: Box<dyn Clock>,
    rng: Pcg64,
    progress: UserProgress,
    active: Option<QuizSession>,
    exam_type: ExamType,
}

impl SessionController {
    /// Build a controller, loading any previously persisted progress.
    pub fn new(
        catalog: Catalog,
        config: Config,
        store: Box<dyn ProgressStore>,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        let rng = Pcg64::from_entropy();
        Self::with_rng(catalog, config, store, clock, rng)
    }

    /// Like [`SessionController::new`] with a caller-seeded RNG, so
    /// question shuffling is reproducible.
    pub fn with_rng(
        catalog: Catalog,
        config: Config,
        store: Box<dyn ProgressStore>,
        clock: Box<dyn Clock>,
        rng: Pcg64,
    ) -> Result<Self> {
        let progress = store.load()?.unwrap_or_default();
        Ok(Self {
            catalog,
            config,
            store,
            clock,
            rng,
            progress,
            active: None,
            exam_type: ExamType::Csp,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn exam_type(&self) -> ExamType {
        self.exam_type
    }

    pub fn set_exam_type(&mut self, exam_type: ExamType) {
        self.exam_type = exam_type;
    }

    pub fn has_active_session(&self) -> bool {
        self.active.is_some()
    }

    /// Snapshot of the running session.
    pub fn session_view(&self) -> Result<SessionView<'_>, SessionError> {
        let session = self.active.as_ref().ok_or(SessionError::NoActiveSession)?;
        let question = session
            .current_question()
            .ok_or(SessionError::SessionCompleted)?;
        Ok(SessionView {
            question,
            index: session.current_index(),
            total: session.len(),
            progress_fraction: session.progress_fraction(),
            remaining_secs: session.remaining_secs(),
            explanation_revealed: session.explanation_revealed(),
            selected: session.current_answer(),
        })
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Start a session in the given mode.
    ///
    /// Rejects with [`SessionError::SessionInProgress`] while another
    /// session is active; call [`SessionController::abandon_session`]
    /// first to discard it.
    pub fn start_session(&mut self, mode: QuizMode, options: SessionOptions) -> Result<()> {
        if self.active.is_some() {
            return Err(SessionError::SessionInProgress.into());
        }
        let questions = select_questions(
            &self.catalog,
            mode,
            &options,
            &self.progress.weak_categories,
            &self.config,
            &mut self.rng,
        )?;
        let now = self.clock.now();
        self.active = Some(QuizSession::start(
            mode,
            questions,
            self.config.exam.time_limit_secs,
            now,
        ));
        Ok(())
    }

    /// Discard the active session without persisting anything.
    ///
    /// Returns whether a session was actually discarded. Dropping the
    /// session also cancels its countdown: there is nothing left to tick.
    pub fn abandon_session(&mut self) -> bool {
        self.active.take().is_some()
    }

    pub fn select_answer(&mut self, option: u8) -> Result<(), SessionError> {
        self.active_mut()?.select_answer(option)
    }

    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        self.active_mut()?.advance()
    }

    pub fn continue_after_explanation(&mut self) -> Result<Advance, SessionError> {
        self.active_mut()?.continue_after_explanation()
    }

    /// Periodic countdown wake-up; safe to call at any time.
    ///
    /// Returns [`TickEvent::TimeExpired`] when the countdown just
    /// force-completed the session, after which
    /// [`SessionController::finish_session`] produces the attempt.
    pub fn tick(&mut self) -> Option<TickEvent> {
        let now = self.clock.now();
        self.active.as_mut()?.tick(now)
    }

    /// Score the completed session, fold it into progress, and persist.
    ///
    /// A store failure does not corrupt the in-memory record; it is
    /// surfaced in the returned [`SessionOutcome`].
    pub fn finish_session(&mut self) -> Result<SessionOutcome> {
        let session = match self.active.take() {
            None => return Err(SessionError::NoActiveSession.into()),
            Some(session) => session,
        };
        if !session.is_completed() {
            self.active = Some(session);
            return Err(SessionError::NotCompleted.into());
        }
        let now = self.clock.now();
        let quiz = session.finalize(now)?;
        let graded = grade(&quiz.questions, &quiz.answers, self.config.exam.passing_score);
        let attempt = ExamAttempt::from_quiz(
            &quiz,
            &graded,
            self.exam_type,
            Uuid::new_v4().to_string(),
            now,
        );
        progress::record_attempt(&mut self.progress, attempt.clone());

        let save_error = self.store.save(&self.progress).err();
        if let Some(err) = &save_error {
            log::warn!("progress not saved: {err}");
        }
        Ok(SessionOutcome {
            attempt,
            save_error,
        })
    }

    // ── Progress events ──────────────────────────────────────────────

    /// Mark a lesson completed and persist the updated progress.
    ///
    /// Returns whether the lesson was newly completed. On a store failure
    /// the in-memory record keeps the completion; the error only reports
    /// that it was not persisted.
    pub fn complete_lesson(&mut self, module_id: &str, lesson_id: &str) -> Result<bool> {
        let module = self
            .catalog
            .module_by_id(module_id)
            .ok_or_else(|| crate::error::CatalogError::UnknownModule {
                id: module_id.to_string(),
            })?
            .clone();
        let now = self.clock.now();
        let newly = progress::complete_lesson(&mut self.progress, &module, lesson_id, now)?;
        if newly {
            self.store.save(&self.progress)?;
        }
        Ok(newly)
    }

    /// Record a module-scoped quiz score (most recent wins) and persist.
    pub fn record_module_quiz_score(&mut self, module_id: &str, score: f64) -> Result<()> {
        let now = self.clock.now();
        progress::record_module_quiz_score(&mut self.progress, module_id, score, now);
        self.store.save(&self.progress)?;
        Ok(())
    }

    /// Full data reset: replaces the progress record and persists the
    /// empty state. The only operation that removes attempts.
    pub fn reset_progress(&mut self) -> Result<()> {
        self.progress = UserProgress::default();
        self.active = None;
        self.store.save(&self.progress)?;
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn active_mut(&mut self) -> Result<&mut QuizSession, SessionError> {
        self.active.as_mut().ok_or(SessionError::NoActiveSession)
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("exam_type", &self.exam_type)
            .field("active", &self.active.is_some())
            .field("attempts", &self.progress.exam_attempts.len())
            .finish()
    }
}
