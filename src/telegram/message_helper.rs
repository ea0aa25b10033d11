use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineKeyboardButton, InlineKeyboardButtonKind, InlineKeyboardMarkup, ParseMode,
    ReplyMarkup,
};
use teloxide::{Bot, RequestError};

use crate::chat_gpt::NameSuggestion;
use crate::utils::telegram_utils::{escape_markdown_v2_code, escape_markdown_v2_reserved_chars};

const PICK_PREFIX: &str = "pick:";
const DEFAULT_REASON: &str = "Suggested name";

/// Post the candidates with one inline button per name and return the sent
/// message, whose id identifies the pending pick.
pub async fn send_suggestions_using_inline_keyboard(
    bot: &Bot,
    chat_id: ChatId,
    suggestions: &[NameSuggestion],
) -> Result<Message, RequestError> {
    let buttons: Vec<Vec<InlineKeyboardButton>> = suggestions
        .iter()
        .enumerate()
        .collect::<Vec<_>>()
        .chunks(2)
        .map(|row| {
            row.iter()
                .map(|(index, suggestion)| {
                    InlineKeyboardButton::new(
                        suggestion.name.clone(),
                        InlineKeyboardButtonKind::CallbackData(pick_data(*index)),
                    )
                })
                .collect::<Vec<InlineKeyboardButton>>()
        })
        .collect();

    bot.send_message(chat_id, render_suggestions(suggestions))
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup {
            inline_keyboard: buttons,
        }))
        .send()
        .await
}

pub fn pick_data(index: usize) -> String {
    format!("{PICK_PREFIX}{index}")
}

pub fn parse_pick_data(data: &str) -> Option<usize> {
    data.strip_prefix(PICK_PREFIX)?.parse().ok()
}

fn render_suggestions(suggestions: &[NameSuggestion]) -> String {
    let mut output = String::from("*Pick a name:*\n");
    for (index, suggestion) in suggestions.iter().enumerate() {
        let reason = non_blank(&suggestion.reason).unwrap_or(DEFAULT_REASON);
        output.push_str(&format!(
            "\n{}\\. `{}` \\- {}",
            index + 1,
            escape_markdown_v2_code(&suggestion.name),
            escape_markdown_v2_reserved_chars(reason)
        ));
        // An empty italic entity (`__`) would be rejected by Telegram.
        if let Some(explanation) = non_blank(&suggestion.explanation) {
            output.push_str(&format!(
                "\n    _{}_",
                escape_markdown_v2_reserved_chars(explanation)
            ));
        }
    }
    output
}

fn non_blank(text: &Option<String>) -> Option<&str> {
    text.as_deref().map(str::trim).filter(|text| !text.is_empty())
}
