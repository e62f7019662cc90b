/// Maximum number of log lines carried by a single frame.
pub const MAX_LOG_MESSAGES_PER_STEP: usize = 50;

/// Append-only log shared by every tracer kind.
///
/// The buffer keeps the whole run; frames only receive the most recent
/// [`MAX_LOG_MESSAGES_PER_STEP`] lines, taken at snapshot time.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    messages: Vec<String>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::trace!(target: "algoviz::log", "{}", message);
        self.messages.push(message);
    }

    /// Returns the last lines logged so far, oldest first.
    pub fn window(&self) -> Vec<String> {
        let start = self.messages.len().saturating_sub(MAX_LOG_MESSAGES_PER_STEP);
        self.messages[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
