use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::LoadError;

static BANK_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/bank");

const BUILTIN_BANK: &str = "sample.json";

/// Default budget for fetching a remote bank
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A single multiple-choice question as stored in the bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub domain: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    pub fn is_correct(&self, option: &str) -> bool {
        option == self.correct
    }

    /// Explanation text, treating an empty string like a missing one
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref().filter(|e| !e.is_empty())
    }

    pub(crate) fn validate(&self, index: usize) -> Result<(), LoadError> {
        if self.options.is_empty() {
            return Err(LoadError::Invalid {
                index,
                reason: "no options".to_string(),
            });
        }
        if !self.options.contains(&self.correct) {
            return Err(LoadError::Invalid {
                index,
                reason: format!("correct answer {:?} is not one of its options", self.correct),
            });
        }
        Ok(())
    }
}

/// Where a question bank is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankSource {
    /// The sample bank compiled into the binary
    Builtin,
    Path(PathBuf),
    Url(String),
}

impl BankSource {
    /// Interpret a command line argument: http(s) URLs are fetched, anything else is a file path
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            BankSource::Url(raw.to_string())
        } else {
            BankSource::Path(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for BankSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BankSource::Builtin => write!(f, "builtin"),
            BankSource::Path(p) => write!(f, "{}", p.display()),
            BankSource::Url(u) => write!(f, "{u}"),
        }
    }
}

/// Read-only set of all available questions
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Load a bank, fetching remote sources with the default timeout
    pub fn load(source: &BankSource) -> Result<Self, LoadError> {
        Self::load_with_timeout(source, DEFAULT_FETCH_TIMEOUT)
    }

    pub fn load_with_timeout(source: &BankSource, timeout: Duration) -> Result<Self, LoadError> {
        let raw = match source {
            BankSource::Builtin => read_builtin()?,
            BankSource::Path(path) => read_file(path)?,
            BankSource::Url(url) => fetch_url(url, timeout)?,
        };
        let bank = Self::from_json(&raw)?;
        tracing::info!(source = %source, count = bank.len(), "loaded {} questions", bank.len());
        Ok(bank)
    }

    pub fn from_json(raw: &str) -> Result<Self, LoadError> {
        let questions: Vec<Question> = serde_json::from_str(raw)?;
        Self::from_questions(questions)
    }

    pub fn from_questions(questions: Vec<Question>) -> Result<Self, LoadError> {
        if questions.is_empty() {
            return Err(LoadError::Empty);
        }
        for (index, q) in questions.iter().enumerate() {
            q.validate(index)?;
        }
        Ok(Self { questions })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Distinct domains in order of first appearance
    pub fn domains(&self) -> Vec<String> {
        self.questions
            .iter()
            .map(|q| q.domain.clone())
            .unique()
            .collect()
    }
}

fn read_builtin() -> Result<String, LoadError> {
    let file = BANK_DIR.get_file(BUILTIN_BANK).ok_or_else(|| LoadError::Io {
        path: BUILTIN_BANK.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "builtin bank missing"),
    })?;
    file.contents_utf8()
        .map(str::to_string)
        .ok_or_else(|| LoadError::Io {
            path: BUILTIN_BANK.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "builtin bank is not utf-8"),
        })
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn fetch_url(url: &str, timeout: Duration) -> Result<String, LoadError> {
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into();

    let http_err = |e: ureq::Error| LoadError::Http {
        url: url.to_string(),
        reason: e.to_string(),
    };

    let mut response = agent.get(url).call().map_err(http_err)?;
    response.body_mut().read_to_string().map_err(http_err)
}
