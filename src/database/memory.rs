//! In-memory store used by unit tests in place of PostgreSQL.

use std::sync::Mutex;

use rand::seq::IndexedRandom;
use uuid::Uuid;

use super::connection::{
    CreateDictionaryEntry, CreateUser, DeleteWord, DrawWords, RecordOutcome, RetrieveLeaderboard,
    StoreResult,
};
use super::models::{Deleted, DictionaryEntry, LeaderboardRow, LearningHistory, User, Word};
use crate::error::StoreError;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    words: Vec<Word>,
    entries: Vec<DictionaryEntry>,
    history: Vec<LearningHistory>,
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    tables: Mutex<Tables>,
    broken: bool,
}

impl MemoryStore {
    pub(crate) fn with_words(pairs: &[(&str, &str)]) -> Self {
        let store = Self::default();
        for (source, target) in pairs {
            store.insert_word(source, target);
        }
        store
    }

    /// A store whose every operation fails like a lost database connection.
    pub(crate) fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub(crate) fn insert_word(&self, source: &str, target: &str) -> Uuid {
        let word = Word::new(source.to_owned(), target.to_owned());
        let word_id = *word.word_id();
        self.tables.lock().unwrap().words.push(word);
        word_id
    }

    pub(crate) fn insert_user(&self, account_id: i64, username: &str) -> Uuid {
        let user = User::new(account_id, username.to_owned());
        let user_id = *user.user_id();
        self.tables.lock().unwrap().users.push(user);
        user_id
    }

    pub(crate) fn users(&self) -> Vec<User> {
        self.tables.lock().unwrap().users.clone()
    }

    pub(crate) fn words(&self) -> Vec<Word> {
        self.tables.lock().unwrap().words.clone()
    }

    pub(crate) fn entries(&self) -> Vec<DictionaryEntry> {
        self.tables.lock().unwrap().entries.clone()
    }

    pub(crate) fn history(&self) -> Vec<LearningHistory> {
        self.tables.lock().unwrap().history.clone()
    }

    pub(crate) fn history_for(&self, account_id: i64, word_id: &Uuid) -> Option<LearningHistory> {
        let tables = self.tables.lock().unwrap();
        let user = tables.users.iter().find(|u| u.account_id() == account_id)?;
        tables
            .history
            .iter()
            .find(|h| h.user_id() == user.user_id() && h.word_id() == word_id)
            .cloned()
    }

    fn check(&self) -> StoreResult<()> {
        if self.broken {
            return Err(StoreError::Persistence(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

impl Tables {
    fn user_id(&self, account_id: i64) -> Option<Uuid> {
        self.users
            .iter()
            .find(|u| u.account_id() == account_id)
            .map(|u| *u.user_id())
    }

    fn history_mut(&mut self, user_id: Uuid, word_id: Uuid) -> &mut LearningHistory {
        let position = self
            .history
            .iter()
            .position(|h| *h.user_id() == user_id && *h.word_id() == word_id);

        match position {
            Some(idx) => &mut self.history[idx],
            None => {
                self.history.push(LearningHistory::new(user_id, word_id));
                self.history.last_mut().unwrap()
            }
        }
    }
}

impl CreateUser for MemoryStore {
    async fn upsert_user(&self, account_id: i64, username: &str) -> StoreResult<User> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if let Some(user) = tables.users.iter().find(|u| u.account_id() == account_id) {
            return Ok(user.clone());
        }
        let user = User::new(account_id, username.to_owned());
        tables.users.push(user.clone());
        Ok(user)
    }
}

impl DrawWords for MemoryStore {
    async fn draw_words(&self, user_id: &Uuid, limit: i64) -> StoreResult<Vec<Word>> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let words: Vec<Word> = tables
            .words
            .choose_multiple(&mut rand::rng(), limit as usize)
            .cloned()
            .collect();

        for word in &words {
            tables.history_mut(*user_id, *word.word_id()).mark_seen();
        }

        Ok(words)
    }
}

impl DeleteWord for MemoryStore {
    async fn delete_word_for(
        &self,
        account_id: i64,
        source_word: &str,
    ) -> StoreResult<Option<Deleted>> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let user_id = tables.user_id(account_id).ok_or(StoreError::NotFound)?;
        let needle = source_word.to_lowercase();

        if let Some(idx) = tables
            .words
            .iter()
            .position(|w| w.source_word().to_lowercase() == needle)
        {
            let word = tables.words.remove(idx);
            tables.history.retain(|h| h.word_id() != word.word_id());
            return Ok(Some(Deleted::Word));
        }

        let position = tables.entries.iter().position(|e| {
            *e.user_id() == user_id && e.source_word().to_lowercase() == needle
        });

        Ok(position.map(|idx| {
            tables.entries.remove(idx);
            Deleted::DictionaryEntry
        }))
    }
}

impl CreateDictionaryEntry for MemoryStore {
    async fn add_dictionary_entry(
        &self,
        account_id: i64,
        source_word: &str,
        target_word: &str,
    ) -> StoreResult<DictionaryEntry> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let user_id = tables.user_id(account_id).ok_or(StoreError::NotFound)?;
        let needle = source_word.to_lowercase();

        if tables
            .entries
            .iter()
            .any(|e| *e.user_id() == user_id && e.source_word().to_lowercase() == needle)
        {
            return Err(StoreError::IntegrityConflict);
        }

        let entry = DictionaryEntry::new(user_id, source_word.to_owned(), target_word.to_owned());
        tables.entries.push(entry.clone());
        Ok(entry)
    }
}

impl RecordOutcome for MemoryStore {
    async fn record_outcome(
        &self,
        account_id: i64,
        word_id: &Uuid,
        is_correct: bool,
    ) -> StoreResult<bool> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let Some(user_id) = tables.user_id(account_id) else {
            return Ok(false);
        };
        if !tables.words.iter().any(|w| w.word_id() == word_id) {
            return Ok(false);
        }

        tables
            .history_mut(user_id, *word_id)
            .mark_answered(is_correct);
        Ok(true)
    }
}

impl RetrieveLeaderboard for MemoryStore {
    async fn leaderboard(&self, limit: i64) -> StoreResult<Vec<LeaderboardRow>> {
        self.check()?;
        let tables = self.tables.lock().unwrap();

        let mut totals: Vec<(&User, i64, i64)> = tables
            .users
            .iter()
            .map(|user| {
                let (correct, fails) = tables
                    .history
                    .iter()
                    .filter(|h| h.user_id() == user.user_id())
                    .fold((0i64, 0i64), |(c, f), h| {
                        (c + i64::from(h.correct_count()), f + i64::from(h.fail_count()))
                    });
                (user, correct, fails)
            })
            .filter(|(_, correct, _)| *correct > 0)
            .collect();

        totals.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| a.0.created_at().cmp(b.0.created_at()))
                .then_with(|| a.0.user_id().cmp(b.0.user_id()))
        });

        let rows = totals
            .into_iter()
            .take(limit as usize)
            .map(|(user, correct, fails)| {
                LeaderboardRow::new(user.username().to_owned(), correct, fails)
            })
            .collect();

        Ok(rows)
    }
}
