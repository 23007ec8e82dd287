//! Checks applied to words typed into the chat before they reach the database.
//!
//! A word may contain letters of a single script plus spaces, hyphens and
//! apostrophes, so `mother-in-law` and `don't` are accepted while `cat1` is not.

use crate::error::ValidationError;

pub const MAX_WORD_LENGTH: usize = 80;

/// Alphabet a submitted word must be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// English words, the answers of every card.
    Latin,
    /// Russian translations.
    Cyrillic,
}

impl Script {
    fn contains(self, c: char) -> bool {
        match self {
            Script::Latin => c.is_ascii_alphabetic(),
            Script::Cyrillic => matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё'),
        }
    }

    pub(crate) fn empty_hint(self) -> &'static str {
        match self {
            Script::Latin => "Введите слово (не пустое).",
            Script::Cyrillic => "Введите перевод (не пустое).",
        }
    }

    pub(crate) fn wrong_script_hint(self) -> &'static str {
        match self {
            Script::Latin => "Нужно слово на английском (латинскими буквами).",
            Script::Cyrillic => "Нужен перевод на русском (кириллицей).",
        }
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '-' | '\'')
}

fn validate(text: &str, script: Script) -> Result<String, ValidationError> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Empty(script));
    }

    if trimmed.chars().count() > MAX_WORD_LENGTH {
        return Err(ValidationError::TooLong(script));
    }

    let has_letters = trimmed.chars().any(char::is_alphabetic);
    let well_formed = trimmed
        .chars()
        .all(|c| script.contains(c) || is_separator(c));

    if !has_letters || !well_formed {
        return Err(ValidationError::WrongScript(script));
    }

    Ok(trimmed.to_owned())
}

/// Validates an English word and returns it trimmed.
pub fn validate_source_word(text: &str) -> Result<String, ValidationError> {
    validate(text, Script::Latin)
}

/// Validates a Russian translation and returns it trimmed.
pub fn validate_target_text(text: &str) -> Result<String, ValidationError> {
    validate(text, Script::Cyrillic)
}
