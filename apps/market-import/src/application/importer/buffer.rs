//! Pending messages awaiting a flush.

use std::mem;

use crate::domain::messages::Message;

/// Default number of buffered messages that triggers an eager flush.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 1000;

/// Insertion-ordered pending messages.
#[derive(Debug)]
pub struct ImportBuffer {
    messages: Vec<Message>,
    threshold: usize,
}

impl ImportBuffer {
    /// Buffer flushing once `threshold` messages are pending (at least one).
    #[must_use]
    pub fn new(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            messages: Vec::with_capacity(threshold),
            threshold,
        }
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Pending count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Nothing pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The threshold has been reached.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.messages.len() >= self.threshold
    }

    /// Remove and return everything pending.
    pub fn take(&mut self) -> Vec<Message> {
        mem::take(&mut self.messages)
    }
}

impl Default for ImportBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_FLUSH_THRESHOLD)
    }
}
