//! Operator-facing input and output.
//!
//! Every step writes through a [`Console`] passed in by the caller, and
//! every prompt returns an [`Answer`], so cancellation is a value instead of
//! an empty string.
//!
//! Input is read asynchronously. Tokio serves stdin from its blocking pool,
//! so a pending prompt never occupies a runtime worker and Ctrl-C stays
//! observable while the operator is typing.

use std::fmt::Display;
use std::io::{self, Stdout, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};

/// Result of a single prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer<T> {
    Answered(T),
    Cancelled,
}

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), io::stdout())
    }
}

impl<R: AsyncBufRead + Unpin, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    // ── Display ──

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }

    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.output)
    }

    pub fn step(&mut self, number: u8, title: &str) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "[Step {number}] {title}")?;
        writeln!(self.output, "{}", "─".repeat(60))
    }

    pub fn success(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "  ✓ {message}")
    }

    pub fn failure(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "  ✗ {message}")
    }

    pub fn note(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "  {message}")
    }

    pub fn summary(&mut self, title: &str, rows: &[(&str, String)]) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{title}")?;
        writeln!(self.output, "{}", "═".repeat(60))?;
        for (label, value) in rows {
            writeln!(self.output, "  {label:<20}{value}")?;
        }
        writeln!(self.output, "{}", "═".repeat(60))
    }

    // ── Prompts ──

    /// Free-text prompt, re-asked until `parse` accepts the answer.
    ///
    /// Empty input takes `default`; with no default it cancels.
    pub async fn text<T, E, F>(
        &mut self,
        question: &str,
        default: Option<&str>,
        parse: F,
    ) -> io::Result<Answer<T>>
    where
        E: Display,
        F: Fn(&str) -> Result<T, E>,
    {
        loop {
            match default {
                Some(d) => write!(self.output, "? {question} [{d}]: ")?,
                None => write!(self.output, "? {question}: ")?,
            }

            let Some(reply) = self.read_reply().await? else {
                return Ok(Answer::Cancelled);
            };

            let candidate = match (reply.as_str(), default) {
                ("", Some(d)) => d,
                ("", None) => return Ok(Answer::Cancelled),
                (r, _) => r,
            };

            match parse(candidate) {
                Ok(value) => return Ok(Answer::Answered(value)),
                Err(e) => self.failure(&e.to_string())?,
            }
        }
    }

    /// Numbered single choice. Empty input cancels.
    pub async fn select<T: Display + Clone>(
        &mut self,
        question: &str,
        choices: &[T],
    ) -> io::Result<Answer<T>> {
        writeln!(self.output, "? {question}")?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {:>2}) {choice}", i + 1)?;
        }

        loop {
            write!(self.output, "  Choice [1-{}]: ", choices.len())?;

            let Some(reply) = self.read_reply().await? else {
                return Ok(Answer::Cancelled);
            };
            if reply.is_empty() {
                return Ok(Answer::Cancelled);
            }

            match reply.parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => {
                    return Ok(Answer::Answered(choices[n - 1].clone()));
                }
                _ => self.failure(&format!(
                    "Enter a number between 1 and {}.",
                    choices.len()
                ))?,
            }
        }
    }

    /// Yes/no prompt. Empty input takes `default`.
    pub async fn confirm(&mut self, question: &str, default: bool) -> io::Result<Answer<bool>> {
        let hint = if default { "Y/n" } else { "y/N" };

        loop {
            write!(self.output, "? {question} [{hint}]: ")?;

            let Some(reply) = self.read_reply().await? else {
                return Ok(Answer::Cancelled);
            };

            match reply.to_ascii_lowercase().as_str() {
                "" => return Ok(Answer::Answered(default)),
                "y" | "yes" => return Ok(Answer::Answered(true)),
                "n" | "no" => return Ok(Answer::Answered(false)),
                _ => self.failure("Please answer y or n.")?,
            }
        }
    }

    /// One trimmed line of input; `None` at end of input.
    async fn read_reply(&mut self) -> io::Result<Option<String>> {
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }
}
