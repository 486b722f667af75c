//! Import driver.
//!
//! Pulls messages from a [`CsvParser`], upserts securities and boards
//! inline, and buffers everything else. A flush groups the buffer by
//! security, resolves each group's canonical identifier (creating a
//! placeholder security when unknown), orders it by server time and hands
//! it to that security's sink.

mod buffer;
mod progress;

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use tokio_util::sync::CancellationToken;

pub use buffer::{DEFAULT_FLUSH_THRESHOLD, ImportBuffer};
pub use progress::ProgressTracker;

use crate::application::parser::{CsvParser, ImportInput, ParserSettings};
use crate::application::ports::{BoardProviderPort, SecurityRegistryPort, StoragePort};
use crate::domain::mapping::FieldSet;
use crate::domain::messages::{BoardRecord, Message, SecurityRecord};
use crate::domain::shared::SecurityId;
use crate::error::ImportError;

/// Callback invoked for every stored security with `is_new`.
pub type SecurityListener = Box<dyn FnMut(&SecurityRecord, bool) + Send>;

/// Importer settings.
#[derive(Debug, Clone)]
pub struct ImporterSettings {
    /// Tokenizer and row settings.
    pub parser: ParserSettings,
    /// Merge duplicate security rows onto the stored record instead of dropping them.
    pub update_duplicate_securities: bool,
    /// Buffered messages that trigger an eager flush.
    pub flush_threshold: usize,
}

impl Default for ImporterSettings {
    fn default() -> Self {
        Self {
            parser: ParserSettings::default(),
            update_duplicate_securities: true,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
        }
    }
}

/// Outcome of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Messages stored: securities, boards and flushed market data.
    ///
    /// Buffered messages dropped on cancellation are not counted.
    pub count: u64,
    /// Server time of the last buffered message.
    pub last_time: Option<DateTime<FixedOffset>>,
    /// The run stopped on cancellation.
    pub cancelled: bool,
}

/// Drives one or more imports against the registry and storage ports.
pub struct Importer<S, B, T>
where
    S: SecurityRegistryPort,
    B: BoardProviderPort,
    T: StoragePort,
{
    securities: Arc<S>,
    boards: Arc<B>,
    storage: Arc<T>,
    settings: ImporterSettings,
    listener: Option<SecurityListener>,
}

impl<S, B, T> Importer<S, B, T>
where
    S: SecurityRegistryPort,
    B: BoardProviderPort,
    T: StoragePort,
{
    /// Create an importer.
    pub fn new(securities: Arc<S>, boards: Arc<B>, storage: Arc<T>, settings: ImporterSettings) -> Self {
        Self {
            securities,
            boards,
            storage,
            settings,
            listener: None,
        }
    }

    /// Register a callback for stored securities.
    #[must_use]
    pub fn with_security_listener(mut self, listener: SecurityListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Import settings.
    pub const fn settings(&self) -> &ImporterSettings {
        &self.settings
    }

    /// Import one stream.
    ///
    /// `progress` receives each new whole percentage when the input length
    /// is known, and a final 100 once any progress was reported. After
    /// cancellation nothing more is stored, buffered messages included.
    pub fn import<R: Read>(
        &mut self,
        input: ImportInput<R>,
        fields: &mut FieldSet,
        progress: &mut dyn FnMut(u8),
        cancel: &CancellationToken,
    ) -> Result<ImportSummary, ImportError> {
        let schema = fields.schema();
        tracing::info!(schema = %schema, length = ?input.length, "Starting import");

        let mut tracker = ProgressTracker::new(input.length);
        let mut buffer = ImportBuffer::new(self.settings.flush_threshold);
        let mut summary = ImportSummary::default();
        let mut parser = CsvParser::new(input.reader, fields, &self.settings.parser, cancel.clone());

        loop {
            let Some(item) = parser.next() else {
                break;
            };
            self.handle(item?, &mut buffer, &mut summary)?;
            if buffer.is_full() {
                summary.count += self.flush(&mut buffer)?;
            }
            if let Some(percent) = tracker.update(parser.bytes_read()) {
                progress(percent);
            }
        }

        if parser.is_cancelled() || cancel.is_cancelled() {
            tracing::info!(
                schema = %schema,
                count = summary.count,
                discarded = buffer.len(),
                "Import cancelled"
            );
            summary.cancelled = true;
            return Ok(summary);
        }

        summary.count += self.flush(&mut buffer)?;
        if let Some(percent) = tracker.finish() {
            progress(percent);
        }

        tracing::info!(
            schema = %schema,
            count = summary.count,
            last_time = ?summary.last_time,
            "Import finished"
        );
        Ok(summary)
    }

    fn handle(
        &mut self,
        message: Message,
        buffer: &mut ImportBuffer,
        summary: &mut ImportSummary,
    ) -> Result<(), ImportError> {
        match message {
            Message::Security(security) => {
                if self.save_security(security)? {
                    summary.count += 1;
                }
            }
            Message::SecurityMapping(mapping) => {
                self.securities.save_mapping(&mapping)?;
            }
            Message::Board(board) => {
                self.boards.get_or_create_board(&board)?;
                summary.count += 1;
            }
            other => {
                if let Some(time) = other.server_time() {
                    summary.last_time = Some(time);
                }
                buffer.push(other);
            }
        }
        Ok(())
    }

    /// Returns whether the record was stored.
    fn save_security(&mut self, security: SecurityRecord) -> Result<bool, ImportError> {
        let (record, is_new) = match self.securities.lookup_by_id(&security.security_id)? {
            None => (security, true),
            Some(_) if !self.settings.update_duplicate_securities => {
                tracing::info!(
                    security_id = %security.security_id,
                    "Skipping duplicate security"
                );
                return Ok(false);
            }
            Some(mut existing) => {
                existing.merge(&security);
                (existing, false)
            }
        };

        self.securities.save(&record, !is_new)?;
        self.notify(&record, is_new);
        Ok(true)
    }

    fn notify(&mut self, record: &SecurityRecord, is_new: bool) {
        if let Some(listener) = self.listener.as_mut() {
            listener(record, is_new);
        }
    }

    /// Returns the number of messages saved.
    fn flush(&mut self, buffer: &mut ImportBuffer) -> Result<u64, ImportError> {
        let messages = buffer.take();
        if messages.is_empty() {
            return Ok(0);
        }
        let total = messages.len();
        let (groups, unowned) = group_by_security(messages);
        let group_count = groups.len();

        for (id, mut batch) in groups {
            let canonical = self.resolve_security(&id)?;
            for message in &mut batch {
                message.set_security_id(canonical.clone());
            }
            sort_by_time(&mut batch);
            self.storage.sink(Some(&canonical))?.save(&batch)?;
        }

        if !unowned.is_empty() {
            let mut unowned = unowned;
            sort_by_time(&mut unowned);
            self.storage.sink(None)?.save(&unowned)?;
        }

        tracing::debug!(messages = total, securities = group_count, "Flushed import buffer");
        Ok(total as u64)
    }

    fn resolve_security(&mut self, id: &SecurityId) -> Result<SecurityId, ImportError> {
        if let Some(existing) = self.securities.lookup_by_id(id)? {
            return Ok(existing.security_id);
        }

        self.boards
            .get_or_create_board(&BoardRecord::new(id.board_code.clone()))?;
        let placeholder = SecurityRecord::placeholder(id.clone());
        self.securities.save(&placeholder, false)?;
        tracing::info!(security_id = %id, "Created security for unknown identifier");
        self.notify(&placeholder, true);
        Ok(placeholder.security_id)
    }
}

/// Group by identifier in first-seen order; messages without one are returned apart.
fn group_by_security(messages: Vec<Message>) -> (Vec<(SecurityId, Vec<Message>)>, Vec<Message>) {
    let mut index: HashMap<SecurityId, usize> = HashMap::new();
    let mut groups: Vec<(SecurityId, Vec<Message>)> = Vec::new();
    let mut unowned = Vec::new();

    for message in messages {
        let Some(id) = message.security_id().cloned() else {
            unowned.push(message);
            continue;
        };
        let slot = *index.entry(id.clone()).or_insert_with(|| {
            groups.push((id, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(message);
    }
    (groups, unowned)
}

/// Stable: equal times keep input order.
fn sort_by_time(messages: &mut [Message]) {
    messages.sort_by_key(Message::server_time);
}

impl<S, B, T> fmt::Debug for Importer<S, B, T>
where
    S: SecurityRegistryPort,
    B: BoardProviderPort,
    T: StoragePort,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Importer")
            .field("settings", &self.settings)
            .field("listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::domain::messages::Tick;

    fn tick(code: &str, secs: i64) -> Message {
        Message::Tick(Tick {
            security_id: SecurityId::new(code, "TQBR"),
            server_time: DateTime::<FixedOffset>::default() + TimeDelta::seconds(secs),
            ..Tick::default()
        })
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let (groups, unowned) = group_by_security(vec![
            tick("GAZP", 1),
            tick("SBER", 2),
            tick("GAZP", 3),
            Message::News(crate::domain::messages::NewsItem::default()),
        ]);

        let codes: Vec<_> = groups.iter().map(|(id, _)| id.security_code.as_str()).collect();
        assert_eq!(codes, vec!["GAZP", "SBER"]);
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(unowned.len(), 1);
    }

    #[test]
    fn sort_is_stable() {
        let mut messages = vec![tick("C", 2), tick("A", 1), tick("B", 2)];
        sort_by_time(&mut messages);
        let codes: Vec<_> = messages
            .iter()
            .filter_map(Message::security_id)
            .map(|id| id.security_code.clone())
            .collect();
        assert_eq!(codes, vec!["A", "C", "B"]);
    }
}
