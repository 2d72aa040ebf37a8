//! Single-character status bar
//!
//! Prints one character per completed test, wrapping every
//! [`MAX_PER_LINE`] characters with a `(completed/total)` annotation.

use std::io::{self, Write};
use tokio::task::JoinHandle;
use tracing::trace;

use super::{EventReceiver, RunEvent};
use crate::models::OutcomeKind;

/// Characters printed before a line wraps
pub const MAX_PER_LINE: usize = 10;

/// Progress indicator writing to a single output stream
#[derive(Debug)]
pub struct StatusBar<W: Write> {
    out: W,
    total: usize,
    current: usize,
}

impl<W: Write> StatusBar<W> {
    pub fn new(out: W, total: usize) -> Self {
        Self {
            out,
            total,
            current: 0,
        }
    }

    /// Completions seen so far
    #[cfg(test)]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Print the symbol of one completed item
    pub fn tick(&mut self, kind: OutcomeKind) -> io::Result<()> {
        let symbol = kind.symbol();
        self.current += 1;
        if self.current % MAX_PER_LINE == 0 {
            writeln!(self.out, "{symbol} ({}/{})", self.current, self.total)?;
        } else {
            write!(self.out, "{symbol}")?;
        }
        self.out.flush()
    }

    /// Terminate the current line, padding it to the wrap width
    pub fn finish(&mut self) -> io::Result<()> {
        let column = self.current % MAX_PER_LINE;
        if column == 0 {
            // already at a line end
            writeln!(self.out)?;
        } else {
            let spaces = " ".repeat(MAX_PER_LINE - column);
            writeln!(self.out, "{spaces} ({}/{})", self.current, self.total)?;
            writeln!(self.out)?;
        }
        self.out.flush()
    }

    pub fn handle(&mut self, event: &RunEvent) -> io::Result<()> {
        match event {
            RunEvent::ItemCompleted { item, kind } => {
                trace!("{} {}", kind, item);
                self.tick(*kind)
            }
            RunEvent::RunFinished { total } => {
                trace!("Run finished with {} items", total);
                self.finish()
            }
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Render events on stdout until the scheduler drops its sender
pub fn spawn_status_printer(
    mut events: EventReceiver,
    total: usize,
) -> JoinHandle<io::Result<()>> {
    tokio::spawn(async move {
        let mut bar = StatusBar::new(io::stdout(), total);
        while let Some(event) = events.recv().await {
            bar.handle(&event)?;
        }
        Ok(())
    })
}
