use tracing::instrument;
use uuid::Uuid;

use crate::database::connection::{CreateUser, DrawWords, RecordOutcome, RetrieveLeaderboard};
use crate::database::models::{LeaderboardRow, User, Word};

pub(crate) const QUIZ_BATCH_SIZE: i64 = 4;
pub(crate) const LEADERBOARD_SIZE: i64 = 3;
const USERNAME_MAX_LENGTH: usize = 100;
const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

/// What the transport tells us about the person behind a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Profile {
    pub(crate) account_id: i64,
    pub(crate) username: Option<String>,
    pub(crate) first_name: Option<String>,
}

impl Profile {
    /// Username, then first name, then `user_<id>`.
    pub(crate) fn display_name(&self) -> String {
        let name = [self.username.as_deref(), self.first_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|name| !name.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("user_{}", self.account_id));

        name.chars().take(USERNAME_MAX_LENGTH).collect()
    }
}

#[instrument(level = "debug", skip(store))]
pub(crate) async fn ensure_user<S: CreateUser>(store: &S, profile: &Profile) -> Option<User> {
    match store
        .upsert_user(profile.account_id, &profile.display_name())
        .await
    {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::error!(account_id = profile.account_id, "Failed to register user: {e}");
            None
        }
    }
}

/// Up to [`QUIZ_BATCH_SIZE`] distinct random words, each counted as seen by `user`.
#[instrument(level = "debug", skip(store))]
pub(crate) async fn draw_quiz_batch<S: DrawWords>(store: &S, user: &User) -> Vec<Word> {
    match store.draw_words(user.user_id(), QUIZ_BATCH_SIZE).await {
        Ok(words) => words,
        Err(e) => {
            tracing::error!(account_id = user.account_id(), "Failed to draw words: {e}");
            Vec::new()
        }
    }
}

#[instrument(level = "debug", skip(store))]
pub(crate) async fn record_outcome<S: RecordOutcome>(
    store: &S,
    account_id: i64,
    word_id: Option<Uuid>,
    is_correct: bool,
) {
    let Some(word_id) = word_id else {
        return;
    };

    match store.record_outcome(account_id, &word_id, is_correct).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::debug!(account_id, %word_id, "Outcome skipped: user or word is gone");
        }
        Err(e) => {
            tracing::error!(account_id, %word_id, "Failed to record outcome: {e}");
        }
    }
}

#[instrument(level = "debug", skip(store))]
pub(crate) async fn leaderboard<S: RetrieveLeaderboard>(store: &S) -> Option<Vec<LeaderboardRow>> {
    match store.leaderboard(LEADERBOARD_SIZE).await {
        Ok(rows) => Some(rows),
        Err(e) => {
            tracing::error!("Failed to load leaderboard: {e}");
            None
        }
    }
}

pub(crate) fn format_target_reveal(source_word: &str, target_word: &str) -> String {
    format!("{source_word} -> {target_word}")
}

pub(crate) fn format_hint(lines: &[&str]) -> String {
    lines.join("\n")
}

pub(crate) fn format_leaderboard(rows: &[LeaderboardRow]) -> String {
    if rows.is_empty() {
        return "Статистика пока пуста. Начните тренироваться, чтобы попасть в рейтинг!".to_owned();
    }

    let mut text = String::from("ЛИДЕРЫ:\n\n");
    for (medal, row) in MEDALS.iter().zip(rows) {
        text.push_str(&format!("{medal} {row}\n\n"));
    }

    text
}
