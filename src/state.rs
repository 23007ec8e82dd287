use uuid::Uuid;

/// The card currently shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveCard {
    /// English word the user has to pick. It is also the label of the correct button.
    pub(crate) source_word: String,
    pub(crate) target_word: String,
    pub(crate) word_id: Uuid,
    /// Button labels in display order, control buttons included.
    pub(crate) answers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TrainingState {
    #[default]
    Idle,
    ChoosingTranslation {
        card: ActiveCard,
    },
    AwaitingDeleteWord,
    AwaitingNewSourceWord,
    AwaitingNewTargetWord {
        source_word: String,
    },
}
