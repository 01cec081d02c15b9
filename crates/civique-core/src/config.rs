//! TOML-based quiz configuration.
//!
//! Holds the per-mode session rules:
//! - Timed exam: question count, time limit, passing score
//! - Learning and review: practice set sizes
//!
//! Configuration is stored at `~/.config/civique/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::store::data_dir;

/// Timed-exam rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamConfig {
    #[serde(default = "default_exam_question_count")]
    pub question_count: usize,
    /// Countdown length in seconds.
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: u64,
    /// Minimum overall score to pass, 0-100. Applies to both exam types.
    #[serde(default = "default_passing_score")]
    pub passing_score: f64,
}

/// Self-paced learning rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningConfig {
    #[serde(default = "default_practice_question_count")]
    pub question_count: usize,
}

/// Targeted-review rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(default = "default_practice_question_count")]
    pub question_count: usize,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/civique/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub exam: ExamConfig,
    #[serde(default)]
    pub learning: LearningConfig,
    #[serde(default)]
    pub review: ReviewConfig,
}

// Default functions
fn default_exam_question_count() -> usize {
    30
}
fn default_time_limit_secs() -> u64 {
    30 * 60
}
fn default_passing_score() -> f64 {
    80.0
}
fn default_practice_question_count() -> usize {
    10
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            question_count: default_exam_question_count(),
            time_limit_secs: default_time_limit_secs(),
            passing_score: default_passing_score(),
        }
    }
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            question_count: default_practice_question_count(),
        }
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            question_count: default_practice_question_count(),
        }
    }
}

impl Config {
    /// Load from `config.toml` in the data directory, falling back to
    /// defaults when the file does not exist yet.
    pub fn load_default() -> Result<Self, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/civique"),
            message: e.to_string(),
        })?;
        Self::load(dir.join("config.toml"))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, text).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_rules() {
        let config = Config::default();
        assert_eq!(config.exam.question_count, 30);
        assert_eq!(config.exam.time_limit_secs, 1800);
        assert_eq!(config.exam.passing_score, 80.0);
        assert_eq!(config.learning.question_count, 10);
        assert_eq!(config.review.question_count, 10);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            "[exam]\n\
             question_count = 20\n",
        )
        .unwrap();
        assert_eq!(config.exam.question_count, 20);
        assert_eq!(config.exam.time_limit_secs, 1800);
        assert_eq!(config.review.question_count, 10);
    }

    #[test]
    fn toml_round_trip() {
        let mut config = Config::default();
        config.exam.time_limit_secs = 900;
        config.learning.question_count = 5;

        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.exam.time_limit_secs, 900);
        assert_eq!(back.learning.question_count, 5);
        assert_eq!(back.exam.passing_score, 80.0);
    }

    #[test]
    fn load_and_save_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        // Missing file loads defaults.
        let config = Config::load(&path).unwrap();
        assert_eq!(config.exam.question_count, 30);

        let mut config = config;
        config.exam.question_count = 15;
        config.save(&path).unwrap();

        let back = Config::load(&path).unwrap();
        assert_eq!(back.exam.question_count, 15);
    }
}
