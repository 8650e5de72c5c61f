use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::progress::PersistedSnapshot;
use crate::question::Question;

/// Coarse lifecycle of a quiz run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum Phase {
    #[strum(to_string = "not started")]
    NotStarted,
    #[strum(to_string = "in progress")]
    InProgress,
    #[strum(to_string = "finished")]
    Finished,
}

/// Result of answering the current question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub selected: String,
    pub correct_option: String,
    pub is_correct: bool,
}

/// One quiz run: the chosen questions, where the user is, and how they are doing.
///
/// Every transition either succeeds completely or returns an error and leaves
/// the session untouched.
#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    questions: Vec<Question>,
    current_index: usize,
    score: usize,
    answered: Option<AnswerOutcome>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            phase: Phase::NotStarted,
            questions: Vec::new(),
            current_index: 0,
            score: 0,
            answered: None,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, questions: Vec<Question>) -> Result<(), SessionError> {
        self.expect_phase(Phase::NotStarted, "start")?;

        self.phase = if questions.is_empty() {
            Phase::Finished
        } else {
            Phase::InProgress
        };
        self.questions = questions;
        self.current_index = 0;
        self.score = 0;
        self.answered = None;
        tracing::debug!(total = self.questions.len(), phase = %self.phase, "session started");
        Ok(())
    }

    /// Restore a saved run. An index equal to the question count resumes into `Finished`.
    pub fn resume(&mut self, snapshot: PersistedSnapshot) -> Result<(), SessionError> {
        self.expect_phase(Phase::NotStarted, "resume")?;

        let total = snapshot.questions.len();
        if total == 0 {
            return Err(SessionError::CorruptSnapshot("no questions".to_string()));
        }
        for (index, question) in snapshot.questions.iter().enumerate() {
            question
                .validate(index)
                .map_err(|e| SessionError::CorruptSnapshot(e.to_string()))?;
        }
        if snapshot.current_index > total {
            return Err(SessionError::CorruptSnapshot(format!(
                "position {} is past the last of {} questions",
                snapshot.current_index, total
            )));
        }

        self.phase = if snapshot.current_index == total {
            Phase::Finished
        } else {
            Phase::InProgress
        };
        self.questions = snapshot.questions;
        self.current_index = snapshot.current_index;
        self.score = snapshot.score;
        self.answered = None;
        tracing::debug!(
            index = self.current_index,
            score = self.score,
            total,
            "session resumed"
        );
        Ok(())
    }

    pub fn answer(&mut self, selected: &str) -> Result<AnswerOutcome, SessionError> {
        self.expect_phase(Phase::InProgress, "answer")?;
        if self.answered.is_some() {
            return Err(SessionError::AlreadyAnswered {
                index: self.current_index,
            });
        }

        let question = &self.questions[self.current_index];
        let outcome = AnswerOutcome {
            selected: selected.to_string(),
            correct_option: question.correct.clone(),
            is_correct: question.is_correct(selected),
        };

        if outcome.is_correct {
            self.score += 1;
        }
        self.answered = Some(outcome.clone());
        Ok(outcome)
    }

    pub fn advance(&mut self) -> Result<Phase, SessionError> {
        self.expect_phase(Phase::InProgress, "advance")?;

        self.current_index += 1;
        self.answered = None;
        if self.current_index >= self.questions.len() {
            self.phase = Phase::Finished;
            tracing::debug!(score = self.score, total = self.total(), "session finished");
        }
        Ok(self.phase)
    }

    /// Drop everything and return to `NotStarted`. Valid from any phase.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            Phase::InProgress => self.questions.get(self.current_index),
            _ => None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn answered(&self) -> Option<&AnswerOutcome> {
        self.answered.as_ref()
    }

    /// `(score, total)` once the run is over
    pub fn final_score(&self) -> Option<(usize, usize)> {
        match self.phase {
            Phase::Finished => Some((self.score, self.total())),
            _ => None,
        }
    }

    /// Share of questions already passed, as a whole percentage
    pub fn progress_percent(&self) -> u16 {
        crate::util::percent(self.current_index, self.total())
    }

    pub fn snapshot(&self) -> PersistedSnapshot {
        PersistedSnapshot::new(self.current_index, self.score, self.questions.clone())
    }

    fn expect_phase(&self, expected: Phase, action: &'static str) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                action,
                phase: self.phase,
            })
        }
    }
}
