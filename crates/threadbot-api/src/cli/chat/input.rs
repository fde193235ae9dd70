//! Async readline input handling for the chat loop.
//!
//! Wraps `rustyline_async::Readline` so output written through the returned
//! `SharedWriter` never interferes with the prompt, which matters because
//! replies arrive from background tasks while the user is typing.

use rustyline_async::{Readline, ReadlineError, ReadlineEvent, SharedWriter};

/// Events produced by the input handler.
#[derive(Debug, PartialEq)]
pub enum InputEvent {
    /// User submitted a line (trimmed).
    Message(String),
    /// End of file (Ctrl+D).
    Eof,
    /// Interrupt signal (Ctrl+C).
    Interrupted,
}

impl From<ReadlineEvent> for InputEvent {
    fn from(event: ReadlineEvent) -> Self {
        match event {
            ReadlineEvent::Line(line) => InputEvent::Message(line.trim().to_string()),
            ReadlineEvent::Eof => InputEvent::Eof,
            ReadlineEvent::Interrupted => InputEvent::Interrupted,
        }
    }
}

pub struct ChatInput {
    rl: Readline,
}

impl ChatInput {
    /// Returns the input handler and a writer for output printed above the prompt.
    pub fn new(prompt: String) -> Result<(Self, SharedWriter), ReadlineError> {
        let (rl, stdout) = Readline::new(prompt)?;
        Ok((Self { rl }, stdout))
    }

    /// Read a line of input. Readline errors end input like Ctrl+D.
    pub async fn read_line(&mut self) -> InputEvent {
        match self.rl.readline().await {
            Ok(event) => {
                if let ReadlineEvent::Line(line) = &event {
                    let _ = self.rl.add_history_entry(line.clone());
                }
                event.into()
            }
            Err(e) => {
                tracing::debug!(error = %e, "Readline failed, treating as end of input");
                InputEvent::Eof
            }
        }
    }

    pub fn clear(&mut self) {
        let _ = self.rl.clear();
    }

    /// Restore the terminal and flush pending output.
    pub fn finish(mut self) {
        let _ = self.rl.flush();
    }
}
