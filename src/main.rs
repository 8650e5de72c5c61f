use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use quizr::{
    app::{App, AppAction, Quiz},
    config::{Config, ConfigStore, FileConfigStore},
    controller::QuizController,
    logging,
    progress::ProgressStore,
    question::BankSource,
    runtime::{CrosstermEventSource, QuizEvent, Runner},
    storage::{FileKvStore, KeyValueStore, MemoryKvStore},
};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

const POLL_INTERVAL_MS: u64 = 250;

/// multiple-choice quiz runner with domain filters and resumable progress
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal quiz runner: pick the domains you want to practice, answer questions one at a time, and pick up where you left off after a restart."
)]
pub struct Cli {
    /// question bank to load: a JSON file or an http(s) URL (defaults to the last one used, then the built-in sample bank)
    source: Option<String>,

    /// number of questions per session
    #[clap(short = 'n', long)]
    count: Option<usize>,

    /// keep questions in bank order instead of shuffling them
    #[clap(long)]
    no_shuffle: bool,

    /// preselect a domain on the start panel (repeatable)
    #[clap(short = 'd', long = "domain")]
    domains: Vec<String>,

    /// keep progress in memory only; nothing is saved or resumed
    #[clap(long)]
    no_save: bool,

    /// seconds to wait when fetching a remote question bank
    #[clap(long)]
    timeout_secs: Option<u64>,

    /// clear saved progress and exit
    #[clap(long)]
    reset: bool,
}

impl Cli {
    /// Layer command line flags over the remembered config
    fn apply_to(&self, base: Config) -> Config {
        Config {
            number_of_questions: self.count.unwrap_or(base.number_of_questions),
            shuffle: base.shuffle && !self.no_shuffle,
            domains: if self.domains.is_empty() {
                base.domains
            } else {
                self.domains.clone()
            },
            source: self.source.clone().or(base.source),
            fetch_timeout_secs: self.timeout_secs.unwrap_or(base.fetch_timeout_secs),
        }
    }
}

fn bank_source(config: &Config) -> BankSource {
    config
        .source
        .as_deref()
        .map(BankSource::parse)
        .unwrap_or(BankSource::Builtin)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init_tracing();

    if cli.reset {
        ProgressStore::new(FileKvStore::new()).clear();
        println!("Saved progress cleared.");
        return Ok(());
    }

    let config_store = FileConfigStore::new();
    let config = cli.apply_to(config_store.load());

    let kv: Box<dyn KeyValueStore> = if cli.no_save {
        Box::new(MemoryKvStore::new())
    } else {
        Box::new(FileKvStore::new())
    };
    let mut quiz: Quiz = QuizController::new(kv, StdRng::from_entropy());

    let source = bank_source(&config);
    let timeout = Duration::from_secs(config.fetch_timeout_secs);
    if let Err(e) = quiz.request_load_with_timeout(&source, timeout) {
        tracing::error!(source = %source, error = %e, "failed to load question bank");
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, e.to_string()).exit();
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(quiz, &config);
    let result = start_tui(&mut terminal, &mut app, &config_store, &config);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    config_store: &impl ConfigStore,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(POLL_INTERVAL_MS),
    );

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            QuizEvent::Closed => break,
            QuizEvent::Resize => {}
            QuizEvent::Key(key) => match app.handle_key(key) {
                AppAction::Quit => break,
                AppAction::Started => remember_settings(app, config_store, config),
                AppAction::None => {}
            },
        }
        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn remember_settings(app: &App, config_store: &impl ConfigStore, config: &Config) {
    if let Err(e) = config_store.save(&app.start.to_config(config)) {
        tracing::warn!(error = %e, "failed to save config");
    }
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;
    use quizr::runtime::key;
    use quizr::session::Phase;
    use ratatui::backend::TestBackend;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn create_test_app(config: &Config) -> App {
        let kv: Box<dyn KeyValueStore> = Box::new(MemoryKvStore::new());
        let mut quiz: Quiz = QuizController::new(kv, StdRng::seed_from_u64(3));
        quiz.request_load(&BankSource::Builtin).unwrap();
        App::new(quiz, config)
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["quizr"]);

        assert_eq!(cli.source, None);
        assert_eq!(cli.count, None);
        assert!(!cli.no_shuffle);
        assert!(cli.domains.is_empty());
        assert!(!cli.no_save);
        assert!(!cli.reset);
    }

    #[test]
    fn test_cli_source_and_count() {
        let cli = Cli::parse_from(["quizr", "bank.json", "-n", "5"]);
        assert_eq!(cli.source.as_deref(), Some("bank.json"));
        assert_eq!(cli.count, Some(5));

        let cli = Cli::parse_from(["quizr", "--count", "12"]);
        assert_eq!(cli.count, Some(12));
    }

    #[test]
    fn test_cli_repeated_domains() {
        let cli = Cli::parse_from(["quizr", "-d", "rust", "--domain", "history"]);
        assert_eq!(cli.domains, vec!["rust", "history"]);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["quizr", "--no-shuffle", "--no-save", "--timeout-secs", "3"]);
        assert!(cli.no_shuffle);
        assert!(cli.no_save);
        assert_eq!(cli.timeout_secs, Some(3));
    }

    #[test]
    fn test_cli_rejects_bad_count() {
        assert!(Cli::try_parse_from(["quizr", "-n", "lots"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let base = Config {
            number_of_questions: 7,
            shuffle: true,
            domains: vec!["history".into()],
            source: Some("old.json".into()),
            fetch_timeout_secs: 10,
        };
        let cli = Cli::parse_from(["quizr", "new.json", "-n", "3", "--no-shuffle", "-d", "rust"]);
        let merged = cli.apply_to(base.clone());

        assert_eq!(merged.number_of_questions, 3);
        assert!(!merged.shuffle);
        assert_eq!(merged.domains, vec!["rust"]);
        assert_eq!(merged.source.as_deref(), Some("new.json"));

        let untouched = Cli::parse_from(["quizr"]).apply_to(base.clone());
        assert_eq!(untouched, base);
    }

    #[test]
    fn test_bank_source_selection() {
        assert_eq!(bank_source(&Config::default()), BankSource::Builtin);
        let cfg = Config {
            source: Some("questions.json".into()),
            ..Config::default()
        };
        assert_eq!(
            bank_source(&cfg),
            BankSource::Path(PathBuf::from("questions.json"))
        );
    }

    #[test]
    fn test_start_remembers_settings() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let config = Config {
            domains: vec!["rust".into()],
            number_of_questions: 2,
            ..Config::default()
        };
        let mut app = create_test_app(&config);

        assert_eq!(app.handle_key(key(KeyCode::Enter)), AppAction::Started);
        remember_settings(&app, &store, &config);

        let saved = store.load();
        assert_eq!(saved.domains, vec!["rust"]);
        assert_eq!(saved.number_of_questions, 2);
    }

    #[test]
    fn test_ui_draws_every_phase() {
        let mut app = create_test_app(&Config::default());
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal.draw(|f| ui(&app, f)).unwrap();
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.phase(), Phase::InProgress);
        terminal.draw(|f| ui(&app, f)).unwrap();

        while app.phase() == Phase::InProgress {
            app.handle_key(key(KeyCode::Char('1')));
            app.handle_key(key(KeyCode::Enter));
        }
        assert_eq!(app.phase(), Phase::Finished);
        terminal.draw(|f| ui(&app, f)).unwrap();
    }
}
