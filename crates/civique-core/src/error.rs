//! Core error types for civique-core.
//!
//! State-machine and configuration violations are usage errors and fail
//! immediately; store errors are infrastructure errors the caller may retry
//! or surface without losing in-memory state.

use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::Category;
use crate::session::QuizMode;

/// Core error type for civique-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Session state-machine violations
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Progress-store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Catalog validation errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// An operation was invoked in a session state that forbids it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No session has been started
    #[error("No quiz session is active")]
    NoActiveSession,

    /// A session is already running; abandon it before starting another
    #[error("A quiz session is already in progress")]
    SessionInProgress,

    /// The session already reached its terminal state
    #[error("The quiz session is already completed")]
    SessionCompleted,

    /// finalize/finish was called before the session completed
    #[error("The quiz session is not completed yet")]
    NotCompleted,

    /// Timed-exam advance with an unanswered current slot
    #[error("The current question must be answered before advancing")]
    AnswerRequired,

    /// Learning-mode advance while the explanation is showing
    #[error("The explanation is showing; continue before advancing")]
    ExplanationPending,

    /// continue_after_explanation without a revealed explanation
    #[error("No explanation is showing")]
    NoExplanationPending,

    /// Selected option index outside [0, 3]
    #[error("Option index {given} out of range (questions have {limit} options)")]
    OptionOutOfRange { given: u8, limit: u8 },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The requested mode/category combination yields no questions
    #[error("Question selection for mode '{mode:?}' (category: {category:?}) is empty")]
    EmptySelection {
        mode: QuizMode,
        category: Option<Category>,
    },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Progress-store errors.
///
/// Recoverable: the in-memory `UserProgress` stays valid when a save fails.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the store backing file
    #[error("Failed to open progress store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Store query failed: {0}")]
    QueryFailed(String),

    /// The persisted blob could not be (de)serialized
    #[error("Progress serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store data directory could not be resolved or created
    #[error("Failed to prepare data directory: {0}")]
    DataDir(String),
}

/// Catalog validation errors, raised where raw reference data enters the
/// system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Questions carry exactly 4 answer options
    #[error("Question '{id}' has {found} options, expected 4")]
    WrongOptionCount { id: String, found: usize },

    /// correct_answer must index into the options
    #[error("Question '{id}' correct answer index {index} out of range")]
    CorrectAnswerOutOfRange { id: String, index: u8 },

    /// Raw category tag not in the closed category set
    #[error("Unknown category tag '{raw}' on '{id}'")]
    UnknownCategory { id: String, raw: String },

    /// Question ids are unique within the bank
    #[error("Duplicate question id '{id}'")]
    DuplicateQuestionId { id: String },

    /// Lookup of an unknown module
    #[error("Unknown module '{id}'")]
    UnknownModule { id: String },

    /// Lookup of an unknown lesson within a module
    #[error("Unknown lesson '{lesson_id}' in module '{module_id}'")]
    UnknownLesson {
        module_id: String,
        lesson_id: String,
    },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::QueryFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
