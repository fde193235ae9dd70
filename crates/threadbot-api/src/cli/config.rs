//! `threadbot config`: show the effective configuration.
//!
//! Credentials are reported as present or missing, never printed.

use std::path::Path;

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use threadbot_infra::config::{
    load_bot_config, resolve_credentials, resolve_data_dir, validate, API_KEY_ENV, CONFIG_FILE_NAME,
};
use threadbot_types::config::BotConfig;

pub async fn show_config(json: bool) -> Result<()> {
    let data_dir = resolve_data_dir();
    let config = load_bot_config(&data_dir).await;
    let credentials = resolve_credentials(&config, |key| std::env::var(key).ok());
    let problem = match (&validate(&config), &credentials) {
        (Err(e), _) | (_, Err(e)) => Some(e.to_string()),
        _ => None,
    };

    if json {
        let report = serde_json::json!({
            "config_file": data_dir.join(CONFIG_FILE_NAME),
            "api_key_set": std::env::var(API_KEY_ENV).is_ok_and(|v| !v.trim().is_empty()),
            "assistant_id": credentials.as_ref().ok().map(|c| c.assistant_id.clone()),
            "problem": problem,
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_table(&data_dir, &config, credentials.is_ok(), problem.as_deref());
    Ok(())
}

fn print_table(data_dir: &Path, config: &BotConfig, ready: bool, problem: Option<&str>) {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    let rows: Vec<(&str, String)> = vec![
        ("config file", data_dir.join(CONFIG_FILE_NAME).display().to_string()),
        ("api_base", config.api_base.clone()),
        (
            "assistant_id",
            config.assistant_id.clone().unwrap_or_else(|| "(not set)".to_string()),
        ),
        ("allowed_models", config.allowed_models.join(", ")),
        ("default_model", config.default_model.clone()),
        ("default_temperature", config.default_temperature.to_string()),
        ("default_max_tokens", config.default_max_tokens.to_string()),
        ("max_conversation_messages", config.max_conversation_messages.to_string()),
        ("debounce_secs", config.debounce_secs.to_string()),
        ("poll_interval_ms", config.poll_interval_ms.to_string()),
        ("run_deadline_secs", config.run_deadline_secs.to_string()),
        ("max_segment_chars", config.max_segment_chars.to_string()),
        ("moderation", if config.moderation.enabled { "enabled" } else { "disabled" }.to_string()),
    ];
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }

    println!();
    println!("{table}");
    println!();
    match problem {
        None if ready => println!("  {} Ready to chat", style("✓").green().bold()),
        None => {}
        Some(problem) => println!("  {} {problem}", style("✗").red().bold()),
    }
    println!();
}
