//! Main chat loop.
//!
//! The first message opens the conversation and is answered in the
//! foreground under a spinner. Every later line becomes an inbound message
//! handled on its own task, so the user can keep typing while a run is in
//! flight; debounce and staleness checks decide which lines get answered.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use comfy_table::{presets, ContentArrangement, Table};
use console::style;
use dashmap::DashMap;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use threadbot_core::conversation::StartConversation;
use threadbot_types::error::StartError;
use threadbot_types::platform::InboundMessage;
use threadbot_types::session::ConversationId;

use crate::state::{AppState, ConsoleConversationService};

use super::banner::write_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::platform::ConsolePlatform;

/// Options given on the command line.
#[derive(Debug, Default)]
pub struct ChatOptions {
    pub message: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub debounce_secs: Option<u64>,
}

/// Messages being answered, keyed by message id.
type InFlight = Arc<DashMap<String, Instant>>;

pub async fn run_chat_loop(state: &AppState, options: ChatOptions) -> anyhow::Result<()> {
    let mut config = state.config.clone();
    if let Some(secs) = options.debounce_secs {
        config.debounce_secs = secs;
    }

    let desired = config.session_config(options.model.clone(), options.temperature, options.max_tokens);
    if let Err(e) = desired.validate(&config.allowed_models) {
        eprintln!("\n  {} {e}\n", style("✗").red().bold());
        return Ok(());
    }

    let author = author_name();
    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut input, mut writer) =
        ChatInput::new(prompt).map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    let platform = Arc::new(ConsolePlatform::new(writer.clone(), author.clone()));
    let service = Arc::new(state.conversation_service(config, platform.clone()));

    write_banner(&mut writer, state.client.assistant_id(), &desired)?;

    let first_message = match options.message.filter(|m| !m.trim().is_empty()) {
        Some(message) => message,
        None => match read_first_message(&mut input, &mut writer).await? {
            Some(message) => message,
            None => {
                input.finish();
                return Ok(());
            }
        },
    };

    platform.stage_opening_message(&first_message);
    let spinner = thinking_spinner();
    let started = service
        .start_conversation(StartConversation {
            author_name: author.clone(),
            first_message,
            model: options.model,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        })
        .await;
    spinner.finish_and_clear();

    let started = match started {
        Ok(started) => started,
        Err(StartError::InvalidConfig(e)) => {
            writeln!(writer, "\n  {} {e}\n", style("✗").red().bold())?;
            input.finish();
            return Ok(());
        }
        Err(e) => {
            input.finish();
            return Err(e.into());
        }
    };
    let conversation = started.conversation_id;
    debug!(
        conversation_id = %conversation,
        disposition = ?started.disposition,
        "First message handled"
    );

    let cancel = CancellationToken::new();
    if service.registry().is_closed(&conversation) {
        cancel.cancel();
    }
    let in_flight: InFlight = Arc::new(DashMap::new());
    let mut tasks = JoinSet::new();

    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => break,
            event = input.read_line() => event,
        };

        match event {
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                writeln!(writer, "  {}", style("Press Ctrl+D to exit, or keep chatting.").dim())?;
            }
            InputEvent::Message(text) if text.is_empty() => {}
            InputEvent::Message(text) => {
                if let Some(command) = commands::parse(&text) {
                    match command {
                        ChatCommand::Help => commands::write_help(&mut writer)?,
                        ChatCommand::Status => {
                            write_status(&mut writer, &service, &conversation, in_flight.len())?
                        }
                        ChatCommand::Clear => input.clear(),
                        ChatCommand::Exit => break,
                        ChatCommand::Unknown(name) => writeln!(
                            writer,
                            "  {} Unknown command: {}. Type /help for available commands.",
                            style("?").yellow().bold(),
                            style(name).dim()
                        )?,
                    }
                    continue;
                }

                let message = match platform.record_user_message(&conversation, &author, &text) {
                    Ok(message) => message,
                    Err(e) => {
                        writeln!(writer, "  {} {e}", style("✗").red().bold())?;
                        break;
                    }
                };
                in_flight.insert(message.id.clone(), Instant::now());
                tasks.spawn(answer_message(
                    service.clone(),
                    message,
                    in_flight.clone(),
                    cancel.clone(),
                ));
            }
        }

        while let Some(joined) = tasks.try_join_next() {
            if let Err(e) = joined {
                warn!(error = %e, "Message task failed");
            }
        }
    }

    if !tasks.is_empty() {
        writeln!(
            writer,
            "  {}",
            style(format!(
                "Waiting for {} pending message(s)... Ctrl+D to abandon.",
                tasks.len()
            ))
            .dim()
        )?;
        loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    Some(Err(e)) => warn!(error = %e, "Message task failed"),
                    Some(Ok(())) => {}
                    None => break,
                },
                event = input.read_line() => {
                    if matches!(event, InputEvent::Eof | InputEvent::Interrupted) {
                        tasks.abort_all();
                        break;
                    }
                }
            }
        }
    }

    let reason = if service.registry().is_closed(&conversation) {
        "Conversation closed."
    } else {
        "Conversation ended."
    };
    writeln!(writer, "\n  {}", style(reason).dim())?;
    input.finish();
    Ok(())
}

/// Handle one inbound message and stop the loop if it closed the conversation.
async fn answer_message(
    service: Arc<ConsoleConversationService>,
    message: InboundMessage,
    in_flight: InFlight,
    cancel: CancellationToken,
) {
    let result = service.handle_message(&message).await;
    let elapsed_ms = in_flight
        .remove(&message.id)
        .map(|(_, started)| u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX));

    match result {
        Ok(disposition) => debug!(
            message_id = %message.id,
            disposition = ?disposition,
            elapsed_ms,
            "Message handled"
        ),
        Err(e) => warn!(message_id = %message.id, error = %e, "Failed to handle message"),
    }

    if service.registry().is_closed(&message.conversation_id) {
        cancel.cancel();
    }
}

/// Prompt until the user types something that is not a command.
async fn read_first_message(
    input: &mut ChatInput,
    writer: &mut impl Write,
) -> std::io::Result<Option<String>> {
    writeln!(writer, "  {}", style("What would you like to ask?").bold())?;
    loop {
        match input.read_line().await {
            InputEvent::Eof | InputEvent::Interrupted => return Ok(None),
            InputEvent::Message(text) if text.is_empty() => {}
            InputEvent::Message(text) => match commands::parse(&text) {
                None => return Ok(Some(text)),
                Some(ChatCommand::Exit) => return Ok(None),
                Some(ChatCommand::Help) => commands::write_help(writer)?,
                Some(_) => writeln!(
                    writer,
                    "  {}",
                    style("Start the conversation with a message first.").dim()
                )?,
            },
        }
    }
}

fn write_status(
    out: &mut impl Write,
    service: &ConsoleConversationService,
    conversation: &ConversationId,
    pending: usize,
) -> std::io::Result<()> {
    let Some(session) = service.registry().get(conversation) else {
        return writeln!(out, "  {}", style("No session for this conversation.").dim());
    };
    let config = session.config();

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Conversation".to_string(), conversation.to_string()]);
    table.add_row(vec![
        "Remote session".to_string(),
        session.remote_session_id().to_string(),
    ]);
    table.add_row(vec!["Model".to_string(), config.model.clone()]);
    table.add_row(vec!["Temperature".to_string(), config.temperature.to_string()]);
    table.add_row(vec!["Max tokens".to_string(), config.max_tokens.to_string()]);
    table.add_row(vec!["Turns".to_string(), session.turns_processed().to_string()]);
    table.add_row(vec![
        "Started".to_string(),
        session.created_at().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    ]);
    table.add_row(vec!["Pending messages".to_string(), pending.to_string()]);
    table.add_row(vec!["Closed".to_string(), session.is_closed().to_string()]);

    writeln!(out)?;
    for line in table.to_string().lines() {
        writeln!(out, "  {line}")?;
    }
    writeln!(out)
}

fn thinking_spinner() -> indicatif::ProgressBar {
    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_style(
        indicatif::ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner()),
    );
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

fn author_name() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "you".to_string())
}
