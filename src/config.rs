//! Application configuration: an optional TOML file plus environment overrides.
//!
//! Lookup order for the file is `QUIZBANK_CONFIG`, then
//! `<config_dir>/quizbank/config.toml`. A missing file means defaults; a file
//! that exists but does not parse is an error.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{QuizError, Result};

pub const APP_DIR: &str = "quizbank";
const DEFAULT_DB_NAME: &str = "quizbank.db";
const CONFIG_FILE_NAME: &str = "config.toml";
pub const LOG_FILE_NAME: &str = "quizbank.log";

pub const DB_ENV: &str = "QUIZBANK_DB";
pub const CONFIG_ENV: &str = "QUIZBANK_CONFIG";
pub const AI_ENDPOINT_ENV: &str = "QUIZBANK_AI_ENDPOINT";
pub const AI_MODEL_ENV: &str = "QUIZBANK_AI_MODEL";

const DEFAULT_MODEL: &str = "models/gemini-2.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_QUESTION_COUNT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: Option<PathBuf>,
    pub ai: AiConfig,
    pub quiz: QuizDefaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub endpoint: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuizDefaults {
    pub question_count: usize,
    pub shuffle_questions: bool,
    pub shuffle_options: bool,
}

impl Default for QuizDefaults {
    fn default() -> Self {
        Self {
            question_count: DEFAULT_QUESTION_COUNT,
            shuffle_questions: true,
            shuffle_options: true,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let explicit = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
        let path = explicit.clone().unwrap_or_else(|| app_dir().join(CONFIG_FILE_NAME));

        let mut config = match std::fs::read_to_string(&path) {
            Ok(text) => {
                let config = Self::parse(&text)
                    .map_err(|e| QuizError::invalid(format!("{}: {}", path.display(), e)))?;
                info!(path = %path.display(), "Loaded config");
                config
            }
            // Only an explicitly named file has to exist
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
                Self::default()
            }
            Err(e) => return Err(e.into()),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(DB_ENV) {
            self.database = Some(PathBuf::from(path));
        }
        if let Some(endpoint) = lookup(AI_ENDPOINT_ENV) {
            self.ai.endpoint = Some(endpoint);
        }
        if let Some(model) = lookup(AI_MODEL_ENV) {
            self.ai.model = model;
        }
    }

    pub fn db_path(&self) -> PathBuf {
        match &self.database {
            Some(path) => path.clone(),
            None => app_dir().join(DEFAULT_DB_NAME),
        }
    }
}

pub fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub fn log_file_path() -> PathBuf {
    app_dir().join(LOG_FILE_NAME)
}
