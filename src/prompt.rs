//! Operator confirmation before each rename in interactive mode.

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use tracing::warn;

use crate::rename::RenameOp;

/// Asks whether one rename should go ahead
pub trait Confirmer {
    fn confirm(&mut self, op: &RenameOp) -> bool;
}

/// Says yes to everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirmer for AlwaysConfirm {
    fn confirm(&mut self, _op: &RenameOp) -> bool {
        true
    }
}

/// Shows the old and new name and reads a y/n answer.
///
/// An answer starting with `y` or `Y` confirms; anything else, including
/// end of input, declines.
pub struct PromptConfirmer<R, W> {
    input: R,
    output: W,
}

impl PromptConfirmer<StdinLock<'static>, Stdout> {
    pub fn stdin() -> Self {
        Self::with_io(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> PromptConfirmer<R, W> {
    pub fn with_io(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, op: &RenameOp) -> io::Result<bool> {
        writeln!(self.output, "Old: {}", op.source)?;
        writeln!(self.output, "New: {}", op.target)?;
        write!(self.output, "Are you sure? y/n | ")?;
        self.output.flush()?;

        let mut answer = String::new();
        let read = self.input.read_line(&mut answer)?;

        writeln!(self.output, "------------")?;

        if read == 0 {
            writeln!(self.output)?;
            return Ok(false);
        }

        Ok(matches!(answer.trim_start().chars().next(), Some('y' | 'Y')))
    }
}

impl<R: BufRead, W: Write> Confirmer for PromptConfirmer<R, W> {
    fn confirm(&mut self, op: &RenameOp) -> bool {
        match self.ask(op) {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Cannot read confirmation for '{}': {}", op.source, e);
                false
            }
        }
    }
}
