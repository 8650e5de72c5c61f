//! Error types for the quiz core.

use thiserror::Error;

use crate::session::Phase;

/// Errors raised while loading the question bank. Fatal to startup.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("could not read question bank {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not fetch question bank {url}: {reason}")]
    Http { url: String, reason: String },
    #[error("question bank is not a valid JSON question list: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question {index} is invalid: {reason}")]
    Invalid { index: usize, reason: String },
    #[error("question bank is empty")]
    Empty,
}

/// Errors raised by the selection engine. Recoverable: the user picks again.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionError {
    #[error("Select at least one domain.")]
    InvalidSelection,
    #[error("No questions available for selected domains")]
    NoQuestionsAvailable,
}

/// Errors raised by session transitions. The session is left unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: Phase },
    #[error("question {index} has already been answered")]
    AlreadyAnswered { index: usize },
    #[error("saved progress is inconsistent: {0}")]
    CorruptSnapshot(String),
}

/// Errors from the key-value persistence medium. Only ever logged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the controller actions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("no question bank loaded")]
    NotLoaded,
}
