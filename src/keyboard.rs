use teloxide::types::{KeyboardButton, KeyboardMarkup, ReplyMarkup};

use crate::conversation::{Control, Markup};

const ANSWERS_PER_ROW: usize = 2;

pub(crate) fn start_keyboard() -> KeyboardMarkup {
    let keyboard = vec![vec![KeyboardButton::new(Control::Train.label())]];

    KeyboardMarkup::new(keyboard).resize_keyboard()
}

pub(crate) fn answers_keyboard(answers: &[String]) -> KeyboardMarkup {
    let keyboard = answers
        .chunks(ANSWERS_PER_ROW)
        .map(|row| row.iter().map(KeyboardButton::new).collect::<Vec<_>>());

    KeyboardMarkup::new(keyboard)
}

/// `None` leaves the keyboard the chat already shows.
pub(crate) fn reply_markup(markup: &Markup) -> Option<ReplyMarkup> {
    match markup {
        Markup::Keep => None,
        Markup::Start => Some(start_keyboard().into()),
        Markup::Answers(answers) => Some(answers_keyboard(answers).into()),
        Markup::Remove => Some(ReplyMarkup::kb_remove()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_are_laid_out_two_per_row() {
        let answers: Vec<String> = ["cat", "dog", "house", "Дальше ⏭", "Добавить слово ➕"]
            .map(String::from)
            .to_vec();

        let markup = answers_keyboard(&answers);

        let rows: Vec<Vec<&str>> = markup
            .keyboard
            .iter()
            .map(|row| row.iter().map(|button| button.text.as_str()).collect())
            .collect();
        assert_eq!(
            rows,
            vec![
                vec!["cat", "dog"],
                vec!["house", "Дальше ⏭"],
                vec!["Добавить слово ➕"],
            ]
        );
    }

    #[test]
    fn start_keyboard_has_single_train_button() {
        let markup = start_keyboard();
        assert_eq!(markup.keyboard.len(), 1);
        assert_eq!(markup.keyboard[0][0].text, "Тренька!");
        assert!(markup.resize_keyboard);
    }

    #[test]
    fn keep_sends_no_markup() {
        assert!(reply_markup(&Markup::Keep).is_none());
        assert!(matches!(
            reply_markup(&Markup::Remove),
            Some(ReplyMarkup::KeyboardRemove(_))
        ));
        assert!(matches!(
            reply_markup(&Markup::Start),
            Some(ReplyMarkup::Keyboard(_))
        ));
    }
}
