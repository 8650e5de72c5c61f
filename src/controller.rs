use chrono::{DateTime, Local};
use rand::Rng;
use std::time::Duration;

use crate::error::QuizError;
use crate::progress::ProgressStore;
use crate::question::{BankSource, QuestionBank, DEFAULT_FETCH_TIMEOUT};
use crate::selection::{self, SelectionCriteria};
use crate::session::{AnswerOutcome, Phase, Session};
use crate::storage::KeyValueStore;

pub const NO_EXPLANATION: &str = "No explanation provided.";

/// Everything the presentation layer needs to draw the current screen
#[derive(Debug, Clone, PartialEq)]
pub struct QuizView {
    pub phase: Phase,
    pub question: Option<QuestionView>,
    pub score: usize,
    pub total: usize,
    /// 1-based position, e.g. `"2 / 5"`
    pub progress_label: String,
    pub progress_percent: u16,
    pub final_score: Option<(usize, usize)>,
    pub resumed: Option<ResumeInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub domain: String,
    pub text: String,
    /// Options in display order
    pub options: Vec<String>,
    pub answered: Option<AnswerOutcome>,
    pub explanation: String,
}

/// Set when the running session was restored from saved progress
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeInfo {
    pub saved_at: Option<DateTime<Local>>,
}

impl ResumeInfo {
    pub fn describe(&self) -> String {
        match self.saved_at {
            Some(at) => format!("Resumed progress saved {}", at.format("%b %e at %H:%M")),
            None => "Resumed saved progress".to_string(),
        }
    }
}

/// Owns the quiz state and maps user actions onto it.
///
/// Progress is written on every start and advance and whenever a resumed
/// question is shown, never on answer.
pub struct QuizController<S: KeyValueStore, R: Rng> {
    bank: Option<QuestionBank>,
    session: Session,
    store: ProgressStore<S>,
    rng: R,
    option_order: Vec<String>,
    resumed: Option<ResumeInfo>,
}

impl<S: KeyValueStore, R: Rng> QuizController<S, R> {
    pub fn new(kv: S, rng: R) -> Self {
        Self {
            bank: None,
            session: Session::new(),
            store: ProgressStore::new(kv),
            rng,
            option_order: Vec::new(),
            resumed: None,
        }
    }

    /// Load the question bank, then pick up any saved progress
    pub fn request_load(&mut self, source: &BankSource) -> Result<QuizView, QuizError> {
        self.request_load_with_timeout(source, DEFAULT_FETCH_TIMEOUT)
    }

    pub fn request_load_with_timeout(
        &mut self,
        source: &BankSource,
        timeout: Duration,
    ) -> Result<QuizView, QuizError> {
        let bank = QuestionBank::load_with_timeout(source, timeout)?;
        Ok(self.attach_bank(bank))
    }

    /// Use an already loaded bank, then pick up any saved progress
    pub fn attach_bank(&mut self, bank: QuestionBank) -> QuizView {
        self.bank = Some(bank);
        self.try_resume();
        self.view()
    }

    fn try_resume(&mut self) {
        if self.session.phase() != Phase::NotStarted {
            return;
        }
        let Some(snapshot) = self.store.load() else {
            return;
        };
        let saved_at = snapshot.saved_at;

        match self.session.resume(snapshot) {
            Ok(()) => {
                tracing::info!(
                    index = self.session.current_index(),
                    total = self.session.total(),
                    "resuming saved progress"
                );
                self.resumed = Some(ResumeInfo { saved_at });
                self.show_current();
            }
            Err(e) => tracing::warn!(error = %e, "ignoring saved progress"),
        }
    }

    pub fn configure_and_start<I, D>(
        &mut self,
        domains: I,
        count: usize,
        shuffle: bool,
    ) -> Result<QuizView, QuizError>
    where
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        let bank = self.bank.as_ref().ok_or(QuizError::NotLoaded)?;
        let criteria = SelectionCriteria::new(domains, count, shuffle);
        let questions = selection::select(bank, &criteria, &mut self.rng)?;

        self.session.start(questions)?;
        self.resumed = None;
        if self.session.phase() == Phase::InProgress {
            self.show_current();
        } else {
            self.option_order.clear();
            self.store.save(&self.session);
        }
        Ok(self.view())
    }

    pub fn submit_answer(&mut self, option: &str) -> Result<QuizView, QuizError> {
        self.session.answer(option)?;
        Ok(self.view())
    }

    pub fn go_to_next(&mut self) -> Result<QuizView, QuizError> {
        match self.session.advance()? {
            Phase::InProgress => self.show_current(),
            _ => {
                self.option_order.clear();
                self.store.save(&self.session);
            }
        }
        Ok(self.view())
    }

    /// Forget the session and the saved progress
    pub fn reset_progress(&mut self) -> QuizView {
        self.session.reset();
        self.store.clear();
        self.option_order.clear();
        self.resumed = None;
        tracing::info!("progress reset");
        self.view()
    }

    /// Back to the start panel for another run. Saved progress stays until the next start.
    pub fn restart(&mut self) -> QuizView {
        self.session.reset();
        self.option_order.clear();
        self.resumed = None;
        self.view()
    }

    pub fn domains(&self) -> Vec<String> {
        self.bank.as_ref().map(QuestionBank::domains).unwrap_or_default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &ProgressStore<S> {
        &self.store
    }

    pub fn view(&self) -> QuizView {
        let session = &self.session;
        let question = session.current_question().map(|q| QuestionView {
            domain: q.domain.clone(),
            text: q.question.clone(),
            options: self.option_order.clone(),
            answered: session.answered().cloned(),
            explanation: q.explanation().unwrap_or(NO_EXPLANATION).to_string(),
        });

        QuizView {
            phase: session.phase(),
            question,
            score: session.score(),
            total: session.total(),
            progress_label: format!(
                "{} / {}",
                (session.current_index() + 1).min(session.total()),
                session.total()
            ),
            progress_percent: session.progress_percent(),
            final_score: session.final_score(),
            resumed: self.resumed.clone(),
        }
    }

    /// Re-roll the option order for the question now on screen and persist
    fn show_current(&mut self) {
        self.option_order = match self.session.current_question() {
            Some(q) => selection::shuffle_options(q, &mut self.rng),
            None => Vec::new(),
        };
        self.store.save(&self.session);
    }
}
