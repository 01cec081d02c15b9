//! Quiz session: state machine, question selection, and the controller
//! that ties them to progress and persistence.

mod controller;
mod engine;
mod selection;

pub use controller::{SessionController, SessionOutcome, SessionView};
pub use engine::{Advance, CompletedQuiz, QuizMode, QuizSession, TickEvent};
pub use selection::{select_questions, SessionOptions};
