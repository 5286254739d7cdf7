use std::io::{self, Write};

use tracing::{info, warn};

use roles_model::Reporter;

use crate::logging::RUN_LOG_TARGET;

/// Prints operator messages and mirrors each one into the run log.
#[derive(Debug)]
pub struct ConsoleReporter<W = io::Stdout> {
    out: W,
}

impl ConsoleReporter {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report(&mut self, message: &str) {
        info!(target: RUN_LOG_TARGET, "{message}");
        if let Err(error) = writeln!(self.out, "{message}") {
            warn!(%error, "console write failed");
        }
    }

    fn flush(&mut self) {
        if let Err(error) = self.out.flush() {
            warn!(%error, "console flush failed");
        }
    }
}
