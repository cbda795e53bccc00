//! Interactive prompts.
//!
//! Prompts are written to stderr so stdout only ever carries the report.

use std::io::{self, BufRead, IsTerminal, Write};

use super::{is_valid_date, DateRange};

/// Line-oriented prompter over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
    masked: bool,
}

impl Prompter<io::StdinLock<'static>, io::Stderr> {
    /// Prompter reading stdin and writing to stderr. Secrets are read
    /// without echo when stdin is a terminal.
    pub fn stdio() -> Self {
        let masked = io::stdin().is_terminal();
        Self { masked, ..Self::new(io::stdin().lock(), io::stderr()) }
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output, masked: false }
    }

    fn read_line(&mut self) -> anyhow::Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            anyhow::bail!("Input closed while waiting for an answer");
        }
        Ok(line.trim().to_string())
    }

    /// Ask for a value, falling back to `default` on an empty answer.
    /// Re-asks while the answer is empty and there is no default.
    pub fn input(&mut self, label: &str, default: Option<&str>) -> anyhow::Result<String> {
        loop {
            match default {
                Some(d) if !d.is_empty() => write!(self.output, "{} [{}]: ", label, d)?,
                _ => write!(self.output, "{}: ", label)?,
            }
            self.output.flush()?;

            let answer = self.read_line()?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            if let Some(d) = default.filter(|d| !d.is_empty()) {
                return Ok(d.to_string());
            }
        }
    }

    /// Ask for a credential. On a terminal the answer is not echoed.
    pub fn secret(&mut self, label: &str) -> anyhow::Result<String> {
        loop {
            let answer = if self.masked {
                rpassword::prompt_password(format!("{}: ", label))?.trim().to_string()
            } else {
                write!(self.output, "{}: ", label)?;
                self.output.flush()?;
                self.read_line()?
            };
            if !answer.is_empty() {
                return Ok(answer);
            }
        }
    }

    /// Ask a yes/no question.
    pub fn confirm(&mut self, label: &str, default: bool) -> anyhow::Result<bool> {
        write!(self.output, "{} {} ", label, if default { "[Y/n]" } else { "[y/N]" })?;
        self.output.flush()?;

        let answer = self.read_line()?;
        if answer.is_empty() {
            return Ok(default);
        }
        Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    }

    /// Ask for a comma-separated list.
    pub fn list(&mut self, label: &str, default: &[String]) -> anyhow::Result<Vec<String>> {
        let joined = default.join(", ");
        let answer = self.input(label, Some(&joined))?;
        Ok(split_list(&answer))
    }

    /// Ask for a single date, re-asking until it is valid.
    pub fn date(&mut self, label: &str, default: &str) -> anyhow::Result<String> {
        loop {
            let answer = self.input(label, Some(default))?;
            if is_valid_date(&answer) {
                return Ok(answer);
            }
            writeln!(self.output, "Invalid date '{}', expected YYYY-MM-DD", answer)?;
        }
    }

    /// Ask for a reporting window, offering `default` for both ends.
    pub fn date_range(&mut self, default: &DateRange) -> anyhow::Result<DateRange> {
        let from = self.date("From (YYYY-MM-DD)", &default.from)?;
        let to = self.date("To (YYYY-MM-DD)", &default.to)?;
        Ok(DateRange::new(from, to))
    }
}

/// Split a comma-separated list, dropping blank entries.
pub fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
}
