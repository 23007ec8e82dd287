use thiserror::Error;

use crate::validation::{Script, MAX_WORD_LENGTH};

/// Rejection of a word typed by the user. The `Display` text is sent back to the chat as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", .0.empty_hint())]
    Empty(Script),
    #[error("Слишком длинный ввод. Максимум {} символов.", MAX_WORD_LENGTH)]
    TooLong(Script),
    #[error("{}", .0.wrong_script_hint())]
    WrongScript(Script),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("record already exists")]
    IntegrityConflict,
    #[error("database error: {0}")]
    Persistence(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::IntegrityConflict,
            _ => StoreError::Persistence(err),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} should be set.")]
    Missing(&'static str),
    #[error("{name} can't be parsed: {reason}")]
    Invalid { name: &'static str, reason: String },
}
