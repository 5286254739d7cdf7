/// Operator-facing message sink.
///
/// Implementations mirror each message to the console and the run log.
pub trait Reporter {
    fn report(&mut self, message: &str);

    fn flush(&mut self) {}
}

/// Collects messages in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryReporter {
    pub messages: Vec<String>,
    pub flushed: bool,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|message| message.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn report(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn flush(&mut self) {
        self.flushed = true;
    }
}
