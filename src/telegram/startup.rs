use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use log::{error, info, warn};
use teloxide::types::{ChatAction, MessageEntityKind, ParseMode};
use teloxide::{prelude::*, utils::command::BotCommands};
use tokio::sync::Mutex;

use crate::chat_gpt::{
    GenerationRequest, LogDiagnostics, NameKind, NameSuggestion, SuggestionService,
};
use crate::storages::{self, Settings, AUTO_LANGUAGE};
use crate::telegram::command_options::split_options_and_body;
use crate::telegram::message_helper::{parse_pick_data, send_suggestions_using_inline_keyboard};
use crate::telegram::pending_picks::{PendingPick, PendingPicks};
use crate::telegram::selection::{detect_language, replace_selection, NamingTarget};
use crate::utils::naming_style::{repair_suggestions, NamingStyle};
use crate::utils::telegram_utils::{escape_markdown_v2_code, escape_markdown_v2_reserved_chars};

const SLOW_RESPONSE_WARNING_AFTER: Duration = Duration::from_secs(15);

#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
enum Command {
    #[command(description = "display this text")]
    Help,
    #[command(description = "suggest variable names: /variable [-l<language>] [-s<style>] <text>")]
    Variable(String),
    #[command(description = "suggest method names: /method [-l<language>] [-s<style>] <text>")]
    Method(String),
    #[command(description = "show the current settings")]
    Settings,
}

type PendingPicksRef = Arc<Mutex<PendingPicks>>;

pub async fn startup() -> Result<(), anyhow::Error> {
    let bot = Bot::from_env();
    let service = SuggestionService::new(Arc::new(LogDiagnostics))
        .context("Cannot create the AI service client")?;
    let pending_picks: PendingPicksRef = Arc::new(Mutex::new(PendingPicks::default()));

    let ignore_update = |_upd| Box::pin(async {});

    let handler = dptree::entry()
        .branch(
            Update::filter_message().branch(
                dptree::entry()
                    .filter_command::<Command>()
                    .endpoint(answer_command),
            ),
        )
        .branch(Update::filter_callback_query().endpoint(handle_pick));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![service, pending_picks])
        .default_handler(ignore_update)
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
    Ok(())
}

async fn answer_command(
    bot: Bot,
    msg: Message,
    command: Command,
    service: SuggestionService,
    pending_picks: PendingPicksRef,
) -> ResponseResult<()> {
    match command {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::Settings => show_settings(&bot, &msg).await?,
        Command::Variable(input) => {
            suggest_names(&bot, &msg, NameKind::Variable, &input, &service, &pending_picks).await?
        }
        Command::Method(input) => {
            suggest_names(&bot, &msg, NameKind::Method, &input, &service, &pending_picks).await?
        }
    }
    Ok(())
}

async fn show_settings(bot: &Bot, msg: &Message) -> ResponseResult<()> {
    let text = match storages::get_settings() {
        Ok(settings) => describe_settings(&settings),
        Err(e) => {
            error!("Cannot load settings: {e:#}");
            format!("Cannot load settings: {e:#}")
        }
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

fn describe_settings(settings: &Settings) -> String {
    let api_key = match settings.api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => "configured",
        _ => "NOT configured",
    };
    format!(
        "API key: {}\nEndpoint: {}\nModel: {}\nNaming style: {}\nLanguage: {}\nContext lines: {}",
        api_key,
        settings.api_endpoint,
        settings.model,
        settings.naming_style,
        settings.language,
        settings.context_lines
    )
}

async fn suggest_names(
    bot: &Bot,
    msg: &Message,
    kind: NameKind,
    input: &str,
    service: &SuggestionService,
    pending_picks: &PendingPicksRef,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    let settings = match storages::get_settings() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Cannot load settings: {e:#}");
            bot.send_message(chat_id, format!("Cannot load settings: {e:#}"))
                .await?;
            return Ok(());
        }
    };

    let (options, body) = split_options_and_body(input);
    let replied = msg.reply_to_message();
    let target = match NamingTarget::from_input(
        body,
        replied.and_then(|m| m.text()),
        settings.context_lines,
    ) {
        Ok(target) => target,
        Err(e) => {
            bot.send_message(chat_id, e.to_string()).await?;
            return Ok(());
        }
    };

    let language = options
        .language
        .unwrap_or_else(|| settings.language.clone());
    let language = if language == AUTO_LANGUAGE {
        replied
            .and_then(code_block_language)
            .unwrap_or_else(|| detect_language(&target.context).to_string())
    } else {
        language
    };
    let naming_style: NamingStyle = match options.naming_style {
        Some(style) => style.parse().unwrap_or_default(),
        None => settings.naming_style(),
    };

    info!(
        "Naming {:?} \"{}\" ({} context chars, {}, {}, model {})",
        kind,
        target.selected_text,
        target.context.len(),
        language,
        naming_style,
        settings.model
    );

    let request = GenerationRequest {
        selected_text: target.selected_text.clone(),
        surrounding_context: target.context.clone(),
        target_language: language,
        naming_style: naming_style.clone(),
    };
    let config = settings.service_config();

    bot.send_chat_action(chat_id, ChatAction::Typing).await?;

    let result = await_with_slow_warning(
        service.request_names(kind, &request, &config),
        SLOW_RESPONSE_WARNING_AFTER,
        || async move {
            bot.send_message(chat_id, "The AI service is responding slowly, please wait...")
                .await
                .map(|_| ())
        },
    )
    .await;

    let suggestions = match result {
        Ok(suggestions) => repair_suggestions(suggestions, &naming_style),
        Err(e) => {
            error!("Failed to generate names: {e}");
            bot.send_message(chat_id, format!("Failed to generate names: {e}"))
                .await?;
            return Ok(());
        }
    };

    if suggestions.is_empty() {
        warn!("No usable name suggestions");
        bot.send_message(chat_id, "Could not generate any name suggestions.")
            .await?;
        return Ok(());
    }

    let sent = match send_suggestions_using_inline_keyboard(bot, chat_id, &suggestions).await {
        Ok(sent) => sent,
        Err(e) => {
            error!("Cannot send the name picker: {e}");
            bot.send_message(chat_id, plain_suggestion_list(&suggestions))
                .await?;
            return Ok(());
        }
    };
    pending_picks.lock().await.insert(
        chat_id,
        sent.id.0,
        PendingPick {
            document: target.document,
            suggestions,
        },
    );
    Ok(())
}

/// Await `request`, running `warn_user` once if it is still pending after
/// `after`. The request keeps running whether or not the warning is delivered.
async fn await_with_slow_warning<T, W, E>(
    request: impl Future<Output = T>,
    after: Duration,
    warn_user: impl FnOnce() -> W,
) -> T
where
    W: Future<Output = Result<(), E>>,
    E: Display,
{
    tokio::pin!(request);
    tokio::select! {
        result = &mut request => result,
        _ = tokio::time::sleep(after) => {
            warn!("AI service is slow to respond, still waiting");
            if let Err(e) = warn_user().await {
                warn!("Cannot send the slow response warning: {e}");
            }
            request.await
        }
    }
}

/// Fallback when the formatted picker is rejected: names only, no markup.
fn plain_suggestion_list(suggestions: &[NameSuggestion]) -> String {
    let names = suggestions
        .iter()
        .enumerate()
        .map(|(index, suggestion)| format!("{}. {}", index + 1, suggestion.name))
        .collect::<Vec<_>>()
        .join("\n");
    format!("Could not show the name picker. Suggested names:\n{names}")
}

/// Language tag of the first code block in a message, if it has one.
fn code_block_language(msg: &Message) -> Option<String> {
    msg.entities()?.iter().find_map(|entity| match &entity.kind {
        MessageEntityKind::Pre {
            language: Some(language),
        } if !language.is_empty() => Some(language.clone()),
        _ => None,
    })
}

async fn handle_pick(
    bot: Bot,
    q: CallbackQuery,
    pending_picks: PendingPicksRef,
) -> ResponseResult<()> {
    bot.answer_callback_query(q.id.clone()).await?;

    let (Some(data), Some(message)) = (q.data.as_deref(), q.message.as_ref()) else {
        return Ok(());
    };
    let Some(index) = parse_pick_data(data) else {
        return Ok(());
    };

    let pick = pending_picks
        .lock()
        .await
        .remove(message.chat.id, message.id.0);
    let Some(pick) = pick else {
        bot.send_message(message.chat.id, "This suggestion list is no longer active.")
            .await?;
        return Ok(());
    };
    let Some(chosen) = pick.suggestions.get(index) else {
        return Ok(());
    };

    info!("User picked {}", chosen.name);
    bot.edit_message_reply_markup(message.chat.id, message.id)
        .await?;

    let reply = match &pick.document {
        Some((document, range)) => format!(
            "Replaced with `{}`:\n```\n{}\n```",
            escape_markdown_v2_code(&chosen.name),
            escape_markdown_v2_code(&replace_selection(document, range, &chosen.name))
        ),
        None => format!(
            "{} `{}`",
            escape_markdown_v2_reserved_chars("Picked:"),
            escape_markdown_v2_code(&chosen.name)
        ),
    };
    bot.send_message(message.chat.id, reply)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    Ok(())
}
