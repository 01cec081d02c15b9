//! # Civique Core Library
//!
//! Core business logic for a single-user, offline-first civic-exam study
//! application: quiz sessions, scoring, and longitudinal progress tracking.
//! Screens and navigation live in the host application; this crate exposes
//! the session controller they drive.
//!
//! ## Architecture
//!
//! - **Quiz Session Engine**: A wall-clock-based state machine that requires
//!   the caller to periodically invoke `tick()` while a timed exam runs
//! - **Scoring**: A pure grading function from a finished answer sheet to a
//!   score breakdown and the persisted `ExamAttempt`
//! - **Progress Aggregator**: Folds attempts and lesson completions into the
//!   persisted `UserProgress`, recomputing derived statistics from the full
//!   history
//! - **Storage**: SQLite-backed key-value progress store and TOML-based
//!   configuration
//!
//! ## Key Components
//!
//! - [`SessionController`]: Owns the single active session and the progress
//!   record; the interface the screen layer calls
//! - [`QuizSession`]: Core session state machine
//! - [`Catalog`]: Validated, immutable question bank and module tree
//! - [`UserProgress`]: Persisted attempt history plus derived aggregates

pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod progress;
pub mod scoring;
pub mod session;
pub mod store;

pub use catalog::{Catalog, Category, Difficulty, ExamType, Lesson, Module, Question};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{CatalogError, ConfigError, CoreError, Result, SessionError, StoreError};
pub use progress::{
    Achievement, AchievementCategory, ModuleProgress, UserProgress, WEAK_CATEGORY_THRESHOLD,
};
pub use scoring::{grade, ExamAttempt, Grade};
pub use session::{
    Advance, CompletedQuiz, QuizMode, QuizSession, SessionController, SessionOptions,
    SessionOutcome, SessionView, TickEvent,
};
pub use store::{MemoryProgressStore, ProgressStore, SqliteProgressStore};
