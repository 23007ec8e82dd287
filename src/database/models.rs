use std::fmt;

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    user_id: Uuid,
    username: String,
    account_id: i64,
    created_at: DateTime<Utc>,
}

/// A card of the shared word list: an English word and its Russian translation.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Word {
    word_id: Uuid,
    source_word: String,
    target_word: String,
}

/// A word a user added to their own dictionary.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DictionaryEntry {
    entry_id: Uuid,
    user_id: Uuid,
    source_word: String,
    target_word: String,
}

/// Per (user, word) counters. They are only ever incremented.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct LearningHistory {
    history_id: Uuid,
    user_id: Uuid,
    word_id: Uuid,
    correct_count: i32,
    fail_count: i32,
    seen_count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct LeaderboardRow {
    username: String,
    total_correct: i64,
    total_fails: i64,
}

/// Where the delete flow found the word it removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deleted {
    Word,
    DictionaryEntry,
}

impl fmt::Display for LeaderboardRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n   Правильных: {}\n   Ошибок: {}",
            self.username, self.total_correct, self.total_fails
        )
    }
}

impl User {
    pub fn new(account_id: i64, username: String) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            username,
            account_id,
            created_at: Utc::now(),
        }
    }

    pub fn user_id(&self) -> &Uuid {
        &self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn account_id(&self) -> i64 {
        self.account_id
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }
}

impl Word {
    #[cfg(test)]
    pub(crate) fn new(source_word: String, target_word: String) -> Self {
        Self {
            word_id: Uuid::new_v4(),
            source_word,
            target_word,
        }
    }

    pub fn word_id(&self) -> &Uuid {
        &self.word_id
    }

    pub fn source_word(&self) -> &str {
        &self.source_word
    }

    pub fn target_word(&self) -> &str {
        &self.target_word
    }
}

impl DictionaryEntry {
    pub fn new(user_id: Uuid, source_word: String, target_word: String) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            user_id,
            source_word,
            target_word,
        }
    }

    pub fn entry_id(&self) -> &Uuid {
        &self.entry_id
    }

    pub fn user_id(&self) -> &Uuid {
        &self.user_id
    }

    pub fn source_word(&self) -> &str {
        &self.source_word
    }

    pub fn target_word(&self) -> &str {
        &self.target_word
    }
}

impl LearningHistory {
    #[cfg(test)]
    pub(crate) fn new(user_id: Uuid, word_id: Uuid) -> Self {
        Self {
            history_id: Uuid::new_v4(),
            user_id,
            word_id,
            correct_count: 0,
            fail_count: 0,
            seen_count: 0,
        }
    }

    pub fn user_id(&self) -> &Uuid {
        &self.user_id
    }

    pub fn word_id(&self) -> &Uuid {
        &self.word_id
    }

    pub fn correct_count(&self) -> i32 {
        self.correct_count
    }

    pub fn fail_count(&self) -> i32 {
        self.fail_count
    }

    pub fn seen_count(&self) -> i32 {
        self.seen_count
    }

    #[cfg(test)]
    pub(crate) fn mark_seen(&mut self) {
        self.seen_count += 1;
    }

    #[cfg(test)]
    pub(crate) fn mark_answered(&mut self, is_correct: bool) {
        if is_correct {
            self.correct_count += 1;
        } else {
            self.fail_count += 1;
        }
    }
}

impl LeaderboardRow {
    #[cfg(test)]
    pub(crate) fn new(username: String, total_correct: i64, total_fails: i64) -> Self {
        Self {
            username,
            total_correct,
            total_fails,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn total_correct(&self) -> i64 {
        self.total_correct
    }

    pub fn total_fails(&self) -> i64 {
        self.total_fails
    }
}
