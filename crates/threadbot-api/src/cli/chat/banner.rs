//! Banner shown when a conversation starts.

use std::io::Write;

use console::style;

use threadbot_types::session::SessionConfig;

pub fn write_banner(
    out: &mut impl Write,
    assistant_id: &str,
    config: &SessionConfig,
) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  🤖 {}", style("threadbot").cyan().bold())?;
    writeln!(out)?;
    writeln!(out, "  {}  {}", style("Assistant:").bold(), style(assistant_id).dim())?;
    writeln!(
        out,
        "  {}      {}",
        style("Model:").bold(),
        style(format!(
            "{} (temperature {}, max tokens {})",
            config.model, config.temperature, config.max_tokens
        ))
        .dim()
    )?;
    writeln!(out)?;
    writeln!(out, "  {}", style("Type /help for commands, Ctrl+D to exit").dim())?;
    writeln!(out, "  {}", style("---").dim())
}
