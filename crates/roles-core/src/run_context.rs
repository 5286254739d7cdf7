//! Run-scoped state shared by every stage of a pass.
//!
//! A [`RunContext`] is created when a run starts and dropped when it ends.
//! It owns the tally and the location comparator, and holds the reporter so
//! that every stage reports through the same channel. The reporter is flushed
//! when the context is dropped, including on early `?` returns.

use tracing::warn;

use roles_model::{Reporter, RunTally, TypeCoercionWarning};

use crate::location::ProximityComparator;

pub struct RunContext<'a> {
    reporter: &'a mut dyn Reporter,
    pub tally: RunTally,
    pub proximity: ProximityComparator,
}

impl<'a> RunContext<'a> {
    pub fn new(reporter: &'a mut dyn Reporter) -> Self {
        Self {
            reporter,
            tally: RunTally::default(),
            proximity: ProximityComparator::default(),
        }
    }

    #[must_use]
    pub fn with_tally(mut self, tally: RunTally) -> Self {
        self.tally = tally;
        self
    }

    /// Send an operator-facing message.
    pub fn report(&mut self, message: impl AsRef<str>) {
        self.reporter.report(message.as_ref());
    }

    /// Report a value that could not be coerced; the caller skips or defaults it.
    pub fn coercion_warning(&mut self, location: &str, warning: &TypeCoercionWarning) {
        self.tally.coercion_warnings += 1;
        warn!(location, found = %warning.found, expected = warning.expected, "type coercion");
        self.reporter.report(&format!("{} at {location}", capitalize(&warning.to_string())));
    }

    /// Split the reporter borrow from the comparator for location checks.
    pub(crate) fn proximity_parts(&mut self) -> (&mut ProximityComparator, &mut dyn Reporter) {
        (&mut self.proximity, &mut *self.reporter)
    }

    pub fn into_tally(mut self) -> RunTally {
        std::mem::take(&mut self.tally)
    }
}

impl Drop for RunContext<'_> {
    fn drop(&mut self) {
        self.reporter.flush();
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
