use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;

use crate::config::Config;
use crate::controller::{QuizController, QuizView};
use crate::error::QuizError;
use crate::selection::DEFAULT_COUNT;
use crate::session::Phase;
use crate::storage::KeyValueStore;

/// Controller flavour the terminal app drives
pub type Quiz = QuizController<Box<dyn KeyValueStore>, StdRng>;

const MAX_COUNT_DIGITS: usize = 4;

/// What the event loop should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    None,
    /// A new session was started from the start panel
    Started,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainChoice {
    pub name: String,
    pub checked: bool,
}

/// Start panel form state
#[derive(Debug, Clone)]
pub struct StartPanel {
    pub domains: Vec<DomainChoice>,
    pub cursor: usize,
    pub count_input: String,
    pub shuffle: bool,
}

impl StartPanel {
    /// Tick the remembered domains, or all of them when none of those still exist
    pub fn new(domains: Vec<String>, config: &Config) -> Self {
        let any_known = domains.iter().any(|d| config.domains.contains(d));
        let domains = domains
            .into_iter()
            .map(|name| DomainChoice {
                checked: !any_known || config.domains.contains(&name),
                name,
            })
            .collect();

        Self {
            domains,
            cursor: 0,
            count_input: config.number_of_questions.to_string(),
            shuffle: config.shuffle,
        }
    }

    pub fn selected_domains(&self) -> Vec<String> {
        self.domains
            .iter()
            .filter(|d| d.checked)
            .map(|d| d.name.clone())
            .collect()
    }

    /// Parsed question count; blank, zero or garbage means the default
    pub fn count(&self) -> usize {
        self.count_input
            .parse::<usize>()
            .ok()
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_COUNT)
    }

    pub fn set_all(&mut self, checked: bool) {
        for d in &mut self.domains {
            d.checked = checked;
        }
    }

    fn toggle_current(&mut self) {
        if let Some(d) = self.domains.get_mut(self.cursor) {
            d.checked = !d.checked;
        }
    }

    fn adjust_count(&mut self, up: bool) {
        let n = self.count();
        let n = if up { n.saturating_add(1) } else { n.saturating_sub(1).max(1) };
        self.count_input = n.to_string();
    }

    pub fn to_config(&self, base: &Config) -> Config {
        Config {
            number_of_questions: self.count(),
            shuffle: self.shuffle,
            domains: self.selected_domains(),
            ..base.clone()
        }
    }
}

/// Terminal app state: the quiz plus the bits of UI state around it
pub struct App {
    pub quiz: Quiz,
    pub view: QuizView,
    pub start: StartPanel,
    pub option_cursor: usize,
    pub show_explanation: bool,
    pub confirm_reset: bool,
    pub message: Option<String>,
}

impl App {
    /// `quiz` must already have its bank attached
    pub fn new(quiz: Quiz, config: &Config) -> Self {
        let start = StartPanel::new(quiz.domains(), config);
        let view = quiz.view();
        Self {
            quiz,
            view,
            start,
            option_cursor: 0,
            show_explanation: false,
            confirm_reset: false,
            message: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.view.phase
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppAction::Quit;
        }

        if self.confirm_reset {
            self.confirm_reset = false;
            if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                let view = self.quiz.reset_progress();
                self.refresh(view);
                self.message = Some("Saved progress cleared.".to_string());
            }
            return AppAction::None;
        }

        if key.code == KeyCode::Esc {
            return AppAction::Quit;
        }

        match self.view.phase {
            Phase::NotStarted => self.on_start_key(key),
            Phase::InProgress => {
                self.on_question_key(key);
                AppAction::None
            }
            Phase::Finished => {
                self.on_end_key(key);
                AppAction::None
            }
        }
    }

    fn on_start_key(&mut self, key: KeyEvent) -> AppAction {
        let panel = &mut self.start;
        match key.code {
            KeyCode::Up => panel.cursor = panel.cursor.saturating_sub(1),
            KeyCode::Down => {
                if panel.cursor + 1 < panel.domains.len() {
                    panel.cursor += 1;
                }
            }
            KeyCode::Char(' ') => panel.toggle_current(),
            KeyCode::Char('a') => panel.set_all(true),
            KeyCode::Char('c') => panel.set_all(false),
            KeyCode::Char('s') => panel.shuffle = !panel.shuffle,
            KeyCode::Char('+') | KeyCode::Right => panel.adjust_count(true),
            KeyCode::Char('-') | KeyCode::Left => panel.adjust_count(false),
            KeyCode::Char(d) if d.is_ascii_digit() => {
                if panel.count_input.len() < MAX_COUNT_DIGITS {
                    panel.count_input.push(d);
                }
            }
            KeyCode::Backspace => {
                panel.count_input.pop();
            }
            KeyCode::Enter => return self.start_quiz(),
            _ => {}
        }
        AppAction::None
    }

    fn start_quiz(&mut self) -> AppAction {
        let domains = self.start.selected_domains();
        let count = self.start.count();
        match self.quiz.configure_and_start(domains, count, self.start.shuffle) {
            Ok(view) => {
                self.refresh(view);
                self.message = None;
                AppAction::Started
            }
            Err(e) => {
                self.message = Some(e.to_string());
                AppAction::None
            }
        }
    }

    fn on_question_key(&mut self, key: KeyEvent) {
        let option_count = self
            .view
            .question
            .as_ref()
            .map_or(0, |q| q.options.len());
        let answered = self
            .view
            .question
            .as_ref()
            .is_some_and(|q| q.answered.is_some());

        match key.code {
            KeyCode::Up => self.option_cursor = self.option_cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.option_cursor + 1 < option_count {
                    self.option_cursor += 1;
                }
            }
            KeyCode::Char(d @ '1'..='9') => {
                let idx = (d as u8 - b'1') as usize;
                if idx < option_count {
                    self.option_cursor = idx;
                    self.answer_selected();
                }
            }
            KeyCode::Enter if answered => self.next(),
            KeyCode::Enter => self.answer_selected(),
            KeyCode::Char('e') => self.show_explanation = !self.show_explanation,
            KeyCode::Char('n') | KeyCode::Right => self.next(),
            KeyCode::Char('R') => self.confirm_reset = true,
            _ => {}
        }
    }

    fn on_end_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') | KeyCode::Enter => {
                let view = self.quiz.restart();
                self.refresh(view);
            }
            KeyCode::Char('R') => self.confirm_reset = true,
            _ => {}
        }
    }

    fn answer_selected(&mut self) {
        let Some(option) = self
            .view
            .question
            .as_ref()
            .and_then(|q| q.options.get(self.option_cursor))
            .cloned()
        else {
            return;
        };

        match self.quiz.submit_answer(&option) {
            Ok(view) => self.view = view,
            // the card already shows the result; a second pick is ignored
            Err(QuizError::Session(_)) => {}
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    fn next(&mut self) {
        match self.quiz.go_to_next() {
            Ok(view) => self.refresh(view),
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    /// Take a new view for a freshly shown question or panel
    fn refresh(&mut self, view: QuizView) {
        self.view = view;
        self.option_cursor = 0;
        self.show_explanation = false;
    }
}
