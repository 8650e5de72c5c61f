use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::question::Question;
use crate::session::Session;
use crate::storage::KeyValueStore;

/// Well-known key holding the in-progress session
pub const PROGRESS_KEY: &str = "sq_progress";

/// Stored form of a session. Field names match the format earlier versions wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    #[serde(rename = "currentIndex", default)]
    pub current_index: usize,
    #[serde(default)]
    pub score: usize,
    #[serde(rename = "quizQuestions", default)]
    pub questions: Vec<Question>,
    #[serde(rename = "savedAt", default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Local>>,
}

impl PersistedSnapshot {
    pub fn new(current_index: usize, score: usize, questions: Vec<Question>) -> Self {
        Self {
            current_index,
            score,
            questions,
            saved_at: None,
        }
    }
}

/// Saves and restores the session under [`PROGRESS_KEY`].
///
/// Persistence never fails the quiz: write errors and unreadable snapshots are
/// logged and otherwise behave as if nothing was stored.
#[derive(Debug, Clone)]
pub struct ProgressStore<S: KeyValueStore> {
    kv: S,
}

impl<S: KeyValueStore> ProgressStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Overwrite the stored snapshot with the session's current state
    pub fn save(&mut self, session: &Session) {
        let mut snapshot = session.snapshot();
        snapshot.saved_at = Some(Local::now());

        let data = match serde_json::to_string(&snapshot) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize progress");
                return;
            }
        };

        match self.kv.set(PROGRESS_KEY, &data) {
            Ok(()) => tracing::debug!(
                index = snapshot.current_index,
                score = snapshot.score,
                "progress saved"
            ),
            Err(e) => tracing::warn!(error = %e, "failed to save progress"),
        }
    }

    pub fn load(&self) -> Option<PersistedSnapshot> {
        let saved = match self.kv.get(PROGRESS_KEY) {
            Ok(Some(saved)) => saved,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read progress");
                return None;
            }
        };

        match serde_json::from_str::<PersistedSnapshot>(&saved) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load progress");
                None
            }
        }
    }

    pub fn clear(&mut self) {
        if let Err(e) = self.kv.remove(PROGRESS_KEY) {
            tracing::warn!(error = %e, "failed to clear progress");
        }
    }
}
