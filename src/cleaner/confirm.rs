//! Confirmation before destructive actions.

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crate::error::Result;

/// Phrase the operator must type to allow a deletion.
pub const CONFIRM_PHRASE: &str = "yes I do";

pub trait Confirm {
    /// Ask `question`; `true` only when the operator agreed.
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Line-based prompt. Anything but the confirmation phrase, `no` or an
/// empty answer asks again; end of input counts as `no`.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl LinePrompt<StdinLock<'static>, Stdout> {
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirm for LinePrompt<R, W> {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        loop {
            write!(self.output, "{question} [{CONFIRM_PHRASE}/no] (no): ")?;
            self.output.flush()?;

            let mut answer = String::new();
            if self.input.read_line(&mut answer)? == 0 {
                writeln!(self.output)?;
                return Ok(false);
            }

            match answer.trim() {
                CONFIRM_PHRASE => return Ok(true),
                "" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please type '{CONFIRM_PHRASE}' or 'no'.")?,
            }
        }
    }
}

/// Agrees to everything; backs `--yes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _question: &str) -> Result<bool> {
        Ok(true)
    }
}
