//! Terminal prompts that loop until the user supplies an acceptable value.

use rust_decimal::Decimal;
use std::fmt::Display;
use std::io::Write;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Why a prompt could not produce a value. Invalid input is never an error.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("input closed")]
    Closed,

    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Prompt loop over an async line source and a terminal writer.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R, W> Prompter<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print a full line.
    pub fn say(&mut self, text: &str) -> Result<(), PromptError> {
        writeln!(self.output, "{}", text)?;
        self.output.flush()?;
        Ok(())
    }

    /// Show `prompt` and return the next line, trimmed.
    pub async fn line(&mut self, prompt: &str) -> Result<String, PromptError> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut buf = String::new();
        if self.input.read_line(&mut buf).await? == 0 {
            return Err(PromptError::Closed);
        }
        Ok(buf.trim().to_string())
    }

    /// Ask until the answer matches one of `options` (case-insensitive).
    pub async fn choice<T>(&mut self, prompt: &str, options: &[T]) -> Result<T, PromptError>
    where
        T: Copy + Display,
    {
        loop {
            let answer = self.line(prompt).await?.to_uppercase();
            if let Some(option) = options.iter().find(|o| o.to_string() == answer) {
                return Ok(*option);
            }
            let listed: Vec<String> = options.iter().map(ToString::to_string).collect();
            self.say(&format!("Invalid input. Choose from [{}]", listed.join(", ")))?;
        }
    }

    /// Ask until the answer is a number strictly greater than zero.
    pub async fn positive_decimal(&mut self, prompt: &str) -> Result<Decimal, PromptError> {
        loop {
            let answer = self.line(prompt).await?;
            match parse_decimal(&answer) {
                Some(value) if value > Decimal::ZERO => return Ok(value),
                Some(_) => self.say("Value must be positive.")?,
                None => self.say("Please enter a valid number.")?,
            }
        }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }
}

/// Parse plain (`0.01`) or scientific (`1e-2`) notation.
///
/// Values that would need rounding to fit 28 significant digits are refused.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str_exact(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}
