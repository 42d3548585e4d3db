//! Terminal-backed [`InputSource`] with optional preset answers.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Stdin, Stdout, Write};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use askmail_core::InputSource;
use askmail_shared::{AskmailError, Result};

struct Console<R, W> {
    reader: R,
    writer: W,
}

/// Answers prompts from a preset queue first, then from the reader.
///
/// Presets are consumed in prompt order; a `None` entry falls through to
/// the reader for that prompt.
pub(crate) struct TerminalInput<R, W> {
    presets: Mutex<VecDeque<Option<String>>>,
    console: Arc<Mutex<Console<R, W>>>,
}

impl TerminalInput<BufReader<Stdin>, Stdout> {
    pub(crate) fn stdio(presets: impl IntoIterator<Item = Option<String>>) -> Self {
        Self::new(presets, BufReader::new(std::io::stdin()), std::io::stdout())
    }
}

impl<R, W> TerminalInput<R, W>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    pub(crate) fn new(
        presets: impl IntoIterator<Item = Option<String>>,
        reader: R,
        writer: W,
    ) -> Self {
        Self {
            presets: Mutex::new(presets.into_iter().collect()),
            console: Arc::new(Mutex::new(Console { reader, writer })),
        }
    }

    fn next_preset(&self) -> Result<Option<String>> {
        let mut presets = self
            .presets
            .lock()
            .map_err(|_| AskmailError::InputUnavailable("preset queue poisoned".into()))?;
        Ok(presets.pop_front().flatten())
    }
}

fn prompt_and_read<R: BufRead, W: Write>(
    console: &Mutex<Console<R, W>>,
    prompt: &str,
    preset: Option<String>,
) -> Result<String> {
    let mut console = console
        .lock()
        .map_err(|_| AskmailError::InputUnavailable("console poisoned".into()))?;
    let Console { reader, writer } = &mut *console;

    let closed = |e: std::io::Error| AskmailError::InputUnavailable(e.to_string());

    if let Some(value) = preset {
        writeln!(writer, "{prompt}{value}").map_err(closed)?;
        writer.flush().map_err(closed)?;
        return Ok(value);
    }

    write!(writer, "{prompt}").map_err(closed)?;
    writer.flush().map_err(closed)?;

    let mut line = String::new();
    if reader.read_line(&mut line).map_err(closed)? == 0 {
        return Err(AskmailError::InputUnavailable("end of input".into()));
    }
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(line)
}

#[async_trait]
impl<R, W> InputSource for TerminalInput<R, W>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    async fn read_line(&self, prompt: &str) -> Result<String> {
        let preset = self.next_preset()?;
        let console = Arc::clone(&self.console);
        let prompt = prompt.to_string();

        tokio::task::spawn_blocking(move || prompt_and_read(&console, &prompt, preset))
            .await
            .map_err(|e| AskmailError::InputUnavailable(format!("input task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn no_presets() -> Vec<Option<String>> {
        Vec::new()
    }

    fn transcript(input: &TerminalInput<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        let console = input.console.lock().unwrap();
        String::from_utf8(console.writer.clone()).unwrap()
    }

    #[tokio::test]
    async fn reads_lines_without_line_endings() {
        let input = TerminalInput::new(
            no_presets(),
            Cursor::new(b"What is 2+2?\r\nuser@example.com\n".to_vec()),
            Vec::new(),
        );

        assert_eq!(input.read_line("Q: ").await.unwrap(), "What is 2+2?");
        assert_eq!(input.read_line("To: ").await.unwrap(), "user@example.com");
        assert_eq!(transcript(&input), "Q: To: ");
    }

    #[tokio::test]
    async fn end_of_input_is_unavailable() {
        let input = TerminalInput::new(no_presets(), Cursor::new(Vec::new()), Vec::new());
        let err = input.read_line("Q: ").await.unwrap_err();
        assert!(matches!(err, AskmailError::InputUnavailable(_)));
    }

    #[tokio::test]
    async fn presets_are_consumed_in_prompt_order() {
        let input = TerminalInput::new(
            [None, Some("user@example.com".to_string())],
            Cursor::new(b"typed question\n".to_vec()),
            Vec::new(),
        );

        assert_eq!(input.read_line("Q: ").await.unwrap(), "typed question");
        assert_eq!(input.read_line("To: ").await.unwrap(), "user@example.com");
        assert_eq!(transcript(&input), "Q: To: user@example.com\n");
    }

    #[tokio::test]
    async fn exhausted_presets_fall_back_to_reader() {
        let input = TerminalInput::new(
            [Some("preset question".to_string())],
            Cursor::new(b"typed@example.com\n".to_vec()),
            Vec::new(),
        );

        assert_eq!(input.read_line("Q: ").await.unwrap(), "preset question");
        assert_eq!(input.read_line("To: ").await.unwrap(), "typed@example.com");
    }

    #[tokio::test]
    async fn empty_line_is_a_valid_answer() {
        let input = TerminalInput::new(no_presets(), Cursor::new(b"\n".to_vec()), Vec::new());
        assert_eq!(input.read_line("Q: ").await.unwrap(), "");
    }
}
