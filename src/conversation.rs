//! Transport-independent half of the bot: given the dialogue state and an incoming
//! text, decide what to answer and which state comes next.

use rand::{seq::SliceRandom, Rng};
use tracing::instrument;

use crate::database::connection::{CreateDictionaryEntry, CreateUser, DeleteWord, DrawWords, Store};
use crate::database::models::Word;
use crate::error::StoreError;
use crate::services::{self, format_hint, format_target_reveal, Profile};
use crate::state::{ActiveCard, TrainingState};
use crate::validation::{validate_source_word, validate_target_text};

/// Reply-keyboard buttons that work in every state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Control {
    Train,
    Next,
    AddWord,
    DeleteWord,
}

impl Control {
    pub(crate) const ALL: [Control; 4] = [
        Control::Train,
        Control::Next,
        Control::AddWord,
        Control::DeleteWord,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Control::Train => "Тренька!",
            Control::Next => "Дальше ⏭",
            Control::AddWord => "Добавить слово ➕",
            Control::DeleteWord => "Удалить слово🔙",
        }
    }

    pub(crate) fn parse(text: &str) -> Option<Self> {
        Control::ALL.into_iter().find(|control| control.label() == text)
    }
}

/// Keyboard to attach to a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Markup {
    /// Leave whatever keyboard the user already has.
    Keep,
    Start,
    Answers(Vec<String>),
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reply {
    pub(crate) text: String,
    pub(crate) markup: Markup,
}

impl Reply {
    pub(crate) fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: Markup::Keep,
        }
    }

    pub(crate) fn with_markup(text: impl Into<String>, markup: Markup) -> Self {
        Self {
            text: text.into(),
            markup,
        }
    }
}

/// Replies to send, in order, and the state to store afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Step {
    pub(crate) replies: Vec<Reply>,
    pub(crate) next: TrainingState,
}

impl Step {
    fn stay(next: TrainingState, reply: Reply) -> Self {
        Self {
            replies: vec![reply],
            next,
        }
    }

    fn preceded_by(mut self, reply: Reply) -> Self {
        self.replies.insert(0, reply);
        self
    }
}

pub(crate) fn welcome(profile: &Profile) -> Reply {
    Reply::with_markup(
        format!(
            "Привет {}👋 Давай попрактикуемся в английском языке. Нажми на кнопку '{}'",
            profile.display_name(),
            Control::Train.label()
        ),
        Markup::Start,
    )
}

/// Entry point for every non-command text message.
#[instrument(level = "info", skip(store, state))]
pub(crate) async fn route<S: Store>(
    store: &S,
    profile: &Profile,
    state: TrainingState,
    text: &str,
) -> Step {
    if let Some(control) = Control::parse(text) {
        return match control {
            Control::Train | Control::Next => start_training(store, profile, state).await,
            Control::DeleteWord => ask_word_to_delete(),
            Control::AddWord => ask_new_source_word(),
        };
    }

    match state {
        TrainingState::Idle => start_training(store, profile, TrainingState::Idle).await,
        TrainingState::ChoosingTranslation { card } => {
            check_answer(store, profile, card, text).await
        }
        TrainingState::AwaitingDeleteWord => delete_word(store, profile, text).await,
        TrainingState::AwaitingNewSourceWord => receive_source_word(text),
        TrainingState::AwaitingNewTargetWord { source_word } => {
            receive_target_word(store, profile, source_word, text).await
        }
    }
}

/// Deals a new card. When no card can be dealt the user stays in `current`.
pub(crate) async fn start_training<S: CreateUser + DrawWords>(
    store: &S,
    profile: &Profile,
    current: TrainingState,
) -> Step {
    const NO_WORDS: &str = "Ошибка: не удалось получить слова для тренировки";

    let Some(user) = services::ensure_user(store, profile).await else {
        return Step::stay(current, Reply::text(NO_WORDS));
    };

    let batch = services::draw_quiz_batch(store, &user).await;

    match deal_card(batch) {
        Some(card) => {
            tracing::info!(
                "{}: asking for '{}'",
                user.username(),
                card.target_word
            );
            let prompt = format!("Тогда выбери перевод слова:\n🇷🇺 {}", card.target_word);
            Step {
                replies: vec![Reply::with_markup(
                    prompt,
                    Markup::Answers(card.answers.clone()),
                )],
                next: TrainingState::ChoosingTranslation { card },
            }
        }
        None => {
            tracing::warn!("{}: no words to train on", user.username());
            Step::stay(current, Reply::text(NO_WORDS))
        }
    }
}

fn deal_card(mut batch: Vec<Word>) -> Option<ActiveCard> {
    if batch.is_empty() {
        return None;
    }

    let mut rng = rand::rng();
    let target = batch.swap_remove(rng.random_range(0..batch.len()));

    let mut answers: Vec<String> = batch
        .iter()
        .map(|word| word.source_word().to_owned())
        .filter(|source| source != target.source_word())
        .collect();
    // One button per label, even when different words share a spelling.
    answers.sort_unstable();
    answers.dedup();
    answers.push(target.source_word().to_owned());
    answers.shuffle(&mut rng);
    answers.extend(
        [Control::Next, Control::AddWord, Control::DeleteWord].map(|c| c.label().to_owned()),
    );

    Some(ActiveCard {
        source_word: target.source_word().to_owned(),
        target_word: target.target_word().to_owned(),
        word_id: *target.word_id(),
        answers,
    })
}

async fn check_answer<S: Store>(
    store: &S,
    profile: &Profile,
    card: ActiveCard,
    text: &str,
) -> Step {
    let is_correct = text == card.source_word;
    services::record_outcome(store, profile.account_id, Some(card.word_id), is_correct).await;

    if is_correct {
        let reveal = format_target_reveal(&card.source_word, &card.target_word);
        let hint = format_hint(&["Отлично!❤", reveal.as_str()]);
        start_training(store, profile, TrainingState::Idle)
            .await
            .preceded_by(Reply::text(hint))
    } else {
        let retry = format!("Попробуй ещё раз - 🇷🇺{}", card.target_word);
        let hint = format_hint(&["Допущена ошибка!", retry.as_str()]);
        let markup = Markup::Answers(card.answers.clone());
        Step::stay(
            TrainingState::ChoosingTranslation { card },
            Reply::with_markup(hint, markup),
        )
    }
}

fn ask_word_to_delete() -> Step {
    Step::stay(
        TrainingState::AwaitingDeleteWord,
        Reply::with_markup("Введите слово на английском для удаления:", Markup::Remove),
    )
}

async fn delete_word<S: CreateUser + DrawWords + DeleteWord>(
    store: &S,
    profile: &Profile,
    text: &str,
) -> Step {
    let word = match validate_source_word(text) {
        Ok(word) => word,
        Err(e) => {
            return start_training(store, profile, TrainingState::AwaitingDeleteWord)
                .await
                .preceded_by(Reply::text(e.to_string()));
        }
    };

    let report = match store.delete_word_for(profile.account_id, &word).await {
        Ok(Some(deleted)) => {
            tracing::info!(account_id = profile.account_id, ?deleted, "Deleted '{word}'");
            format!("Слово '{word}' успешно удалено!")
        }
        Ok(None) => "Слово не найдено.".to_owned(),
        Err(StoreError::NotFound) => {
            return Step::stay(TrainingState::Idle, Reply::text("Пользователь не найден!"));
        }
        Err(e) => {
            tracing::error!(account_id = profile.account_id, "Failed to delete '{word}': {e}");
            "Произошла ошибка при удалении слова. Попробуйте позже.".to_owned()
        }
    };

    start_training(store, profile, TrainingState::Idle)
        .await
        .preceded_by(Reply::text(report))
}

fn ask_new_source_word() -> Step {
    Step::stay(
        TrainingState::AwaitingNewSourceWord,
        Reply::with_markup("Введите английское слово:", Markup::Remove),
    )
}

fn receive_source_word(text: &str) -> Step {
    match validate_source_word(text) {
        Ok(source_word) => Step::stay(
            TrainingState::AwaitingNewTargetWord { source_word },
            Reply::text("Введите перевод слова:"),
        ),
        Err(e) => Step::stay(TrainingState::AwaitingNewSourceWord, Reply::text(e.to_string())),
    }
}

async fn receive_target_word<S: CreateUser + DrawWords + CreateDictionaryEntry>(
    store: &S,
    profile: &Profile,
    source_word: String,
    text: &str,
) -> Step {
    let target_word = match validate_target_text(text) {
        Ok(target_word) => target_word,
        Err(e) => {
            return Step::stay(
                TrainingState::AwaitingNewTargetWord { source_word },
                Reply::text(e.to_string()),
            );
        }
    };

    let Ok(source_word) = validate_source_word(&source_word) else {
        return Step::stay(
            TrainingState::Idle,
            Reply::with_markup(
                "Английское слово некорректно. Начните заново: кнопка «Добавить слово».",
                Markup::Start,
            ),
        );
    };

    let failure = match store
        .add_dictionary_entry(profile.account_id, &source_word, &target_word)
        .await
    {
        Ok(entry) => {
            tracing::info!(
                account_id = profile.account_id,
                "Added '{}' -> '{}'",
                entry.source_word(),
                entry.target_word()
            );
            return start_training(store, profile, TrainingState::Idle)
                .await
                .preceded_by(Reply::text("Слово успешно добавлено!"));
        }
        Err(StoreError::NotFound) => "Пользователь не найден в базе данных!",
        Err(StoreError::IntegrityConflict) => {
            tracing::warn!(account_id = profile.account_id, "'{source_word}' is already in the dictionary");
            "Такое слово уже есть в словаре или ошибка данных."
        }
        Err(e) => {
            tracing::error!(account_id = profile.account_id, "Failed to add '{source_word}': {e}");
            "Не удалось добавить слово. Попробуйте позже."
        }
    };

    Step::stay(
        TrainingState::Idle,
        Reply::with_markup(failure, Markup::Start),
    )
}
