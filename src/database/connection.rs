use std::borrow::Cow;

use sqlx::postgres::PgPool;
use uuid::Uuid;

use super::models::{Deleted, DictionaryEntry, LeaderboardRow, User, Word};
use crate::error::StoreError;

pub struct Connection {
    pool: PgPool,
}

impl Connection {
    pub async fn connect(connection_string: Cow<'_, str>) -> Result<Self, StoreError> {
        let pool = PgPool::connect(&connection_string).await?;
        Ok(Self { pool })
    }

    pub async fn perform_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        tracing::debug!("Applying migrations");
        sqlx::migrate!().run(&self.pool).await
    }
}

pub(crate) type StoreResult<T> = Result<T, StoreError>;

pub(crate) trait CreateUser {
    /// Returns the user registered for `account_id`, registering it under `username` if absent.
    async fn upsert_user(&self, account_id: i64, username: &str) -> StoreResult<User>;
}

pub(crate) trait DrawWords {
    /// Picks up to `limit` random words and counts them as seen by `user_id`.
    async fn draw_words(&self, user_id: &Uuid, limit: i64) -> StoreResult<Vec<Word>>;
}

pub(crate) trait DeleteWord {
    async fn delete_word_for(
        &self,
        account_id: i64,
        source_word: &str,
    ) -> StoreResult<Option<Deleted>>;
}

pub(crate) trait CreateDictionaryEntry {
    async fn add_dictionary_entry(
        &self,
        account_id: i64,
        source_word: &str,
        target_word: &str,
    ) -> StoreResult<DictionaryEntry>;
}

pub(crate) trait RecordOutcome {
    /// Returns `false` when either the user or the word no longer exists.
    async fn record_outcome(
        &self,
        account_id: i64,
        word_id: &Uuid,
        is_correct: bool,
    ) -> StoreResult<bool>;
}

pub(crate) trait RetrieveLeaderboard {
    async fn leaderboard(&self, limit: i64) -> StoreResult<Vec<LeaderboardRow>>;
}

pub(crate) trait Store:
    CreateUser + DrawWords + DeleteWord + CreateDictionaryEntry + RecordOutcome + RetrieveLeaderboard
{
}

impl<T> Store for T where
    T: CreateUser
        + DrawWords
        + DeleteWord
        + CreateDictionaryEntry
        + RecordOutcome
        + RetrieveLeaderboard
{
}

async fn find_user_id(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    account_id: i64,
) -> StoreResult<Option<Uuid>> {
    let user_id = sqlx::query_scalar("SELECT user_id FROM users WHERE account_id = $1")
        .bind(account_id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(user_id)
}

impl CreateUser for Connection {
    async fn upsert_user(&self, account_id: i64, username: &str) -> StoreResult<User> {
        let candidate = User::new(account_id, username.to_owned());

        // The no-op update makes RETURNING yield the existing row on conflict.
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (user_id, username, account_id, created_at) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (account_id) DO UPDATE SET account_id = EXCLUDED.account_id \
             RETURNING user_id, username, account_id, created_at",
        )
        .bind(candidate.user_id())
        .bind(candidate.username())
        .bind(candidate.account_id())
        .bind(candidate.created_at())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}

impl DrawWords for Connection {
    async fn draw_words(&self, user_id: &Uuid, limit: i64) -> StoreResult<Vec<Word>> {
        tracing::debug!("Creating transaction");
        let mut tx = self.pool.begin().await?;

        let words = sqlx::query_as::<_, Word>(
            "SELECT word_id, source_word, target_word FROM words ORDER BY random() LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&mut *tx)
        .await?;

        for word in &words {
            tracing::debug!("Marking '{}' as seen", word.source_word());
            sqlx::query(
                "INSERT INTO learning_history (history_id, user_id, word_id, seen_count) \
                 VALUES ($1, $2, $3, 1) \
                 ON CONFLICT (user_id, word_id) \
                 DO UPDATE SET seen_count = learning_history.seen_count + 1",
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(word.word_id())
            .execute(&mut *tx)
            .await?;
        }

        tracing::debug!("Closing transaction");
        tx.commit().await?;

        Ok(words)
    }
}

impl DeleteWord for Connection {
    async fn delete_word_for(
        &self,
        account_id: i64,
        source_word: &str,
    ) -> StoreResult<Option<Deleted>> {
        let mut tx = self.pool.begin().await?;

        let user_id = find_user_id(&mut tx, account_id)
            .await?
            .ok_or(StoreError::NotFound)?;

        let word: Option<Uuid> = sqlx::query_scalar(
            "DELETE FROM words WHERE word_id = \
             (SELECT word_id FROM words WHERE lower(source_word) = lower($1) LIMIT 1) \
             RETURNING word_id",
        )
        .bind(source_word)
        .fetch_optional(&mut *tx)
        .await?;

        if word.is_some() {
            tx.commit().await?;
            return Ok(Some(Deleted::Word));
        }

        let entry: Option<Uuid> = sqlx::query_scalar(
            "DELETE FROM dictionaries WHERE entry_id = \
             (SELECT entry_id FROM dictionaries WHERE user_id = $1 AND lower(source_word) = lower($2) LIMIT 1) \
             RETURNING entry_id",
        )
        .bind(user_id)
        .bind(source_word)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(entry.map(|_| Deleted::DictionaryEntry))
    }
}

impl CreateDictionaryEntry for Connection {
    async fn add_dictionary_entry(
        &self,
        account_id: i64,
        source_word: &str,
        target_word: &str,
    ) -> StoreResult<DictionaryEntry> {
        let mut tx = self.pool.begin().await?;

        let user_id = find_user_id(&mut tx, account_id)
            .await?
            .ok_or(StoreError::NotFound)?;

        let entry = DictionaryEntry::new(user_id, source_word.to_owned(), target_word.to_owned());

        let added = sqlx::query_as::<_, DictionaryEntry>(
            "INSERT INTO dictionaries (entry_id, user_id, source_word, target_word) \
             VALUES ($1, $2, $3, $4) \
             RETURNING entry_id, user_id, source_word, target_word",
        )
        .bind(entry.entry_id())
        .bind(entry.user_id())
        .bind(entry.source_word())
        .bind(entry.target_word())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(added)
    }
}

impl RecordOutcome for Connection {
    async fn record_outcome(
        &self,
        account_id: i64,
        word_id: &Uuid,
        is_correct: bool,
    ) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let Some(user_id) = find_user_id(&mut tx, account_id).await? else {
            return Ok(false);
        };

        let word: Option<Uuid> = sqlx::query_scalar("SELECT word_id FROM words WHERE word_id = $1")
            .bind(word_id)
            .fetch_optional(&mut *tx)
            .await?;

        if word.is_none() {
            return Ok(false);
        }

        let (correct, fail): (i32, i32) = if is_correct { (1, 0) } else { (0, 1) };

        sqlx::query(
            "INSERT INTO learning_history (history_id, user_id, word_id, correct_count, fail_count) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id, word_id) DO UPDATE SET \
             correct_count = learning_history.correct_count + EXCLUDED.correct_count, \
             fail_count = learning_history.fail_count + EXCLUDED.fail_count",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(word_id)
        .bind(correct)
        .bind(fail)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }
}

impl RetrieveLeaderboard for Connection {
    async fn leaderboard(&self, limit: i64) -> StoreResult<Vec<LeaderboardRow>> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            "SELECT users.username, \
             SUM(learning_history.correct_count)::BIGINT AS total_correct, \
             SUM(learning_history.fail_count)::BIGINT AS total_fails \
             FROM users INNER JOIN learning_history ON learning_history.user_id = users.user_id \
             GROUP BY users.user_id, users.username, users.created_at \
             HAVING SUM(learning_history.correct_count) > 0 \
             ORDER BY total_correct DESC, users.created_at, users.user_id \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
