use rusqlite::ffi;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("question bank {0} has no questions to quiz on")]
    EmptyBank(i64),

    #[error("text generation failed: {0}")]
    GenerationFailed(String),

    #[error("storage error: {0}")]
    Storage(rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, QuizError>;

/// The variant of a [`QuizError`] without its payload, for reports that outlive the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    ConstraintViolation,
    InvalidFormat,
    EmptyBank,
    GenerationFailed,
    Storage,
    Io,
}

impl QuizError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        QuizError::NotFound { entity, id }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        QuizError::InvalidFormat(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            QuizError::NotFound { .. } => ErrorKind::NotFound,
            QuizError::ConstraintViolation(_) => ErrorKind::ConstraintViolation,
            QuizError::InvalidFormat(_) => ErrorKind::InvalidFormat,
            QuizError::EmptyBank(_) => ErrorKind::EmptyBank,
            QuizError::GenerationFailed(_) => ErrorKind::GenerationFailed,
            QuizError::Storage(_) => ErrorKind::Storage,
            QuizError::Io(_) => ErrorKind::Io,
        }
    }
}

// Unique violations are the only constraint the schema declares on user data
impl From<rusqlite::Error> for QuizError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                QuizError::ConstraintViolation(
                    msg.clone().unwrap_or_else(|| "unique constraint failed".to_string()),
                )
            }
            _ => QuizError::Storage(err),
        }
    }
}
