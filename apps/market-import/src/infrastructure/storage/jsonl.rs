//! JSON-lines storage: one append-only file per security.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::application::ports::{MessageSink, StorageError, StoragePort};
use crate::domain::messages::Message;
use crate::domain::shared::SecurityId;

/// File stem of the sink for messages without a security.
pub const DEFAULT_SINK: &str = "_default";

/// Writes each message as one JSON line under a root directory.
///
/// Files are named `<CODE@BOARD>.jsonl`; messages without a security go to
/// `_default.jsonl`. Existing files are appended to.
#[derive(Debug, Clone)]
pub struct JsonLinesStorage {
    root: PathBuf,
}

impl JsonLinesStorage {
    /// Storage rooted at `root`; the directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File a security's messages are written to.
    #[must_use]
    pub fn path_for(&self, security: Option<&SecurityId>) -> PathBuf {
        let stem = security.map_or_else(|| DEFAULT_SINK.to_string(), |id| sanitize(&id.lookup_key()));
        self.root.join(format!("{stem}.jsonl"))
    }
}

/// Keep file names portable: anything but ASCII alphanumerics and `@._-` becomes `_`.
fn sanitize(stem: &str) -> String {
    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

struct JsonLinesSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl MessageSink for JsonLinesSink {
    fn save(&mut self, messages: &[Message]) -> Result<(), StorageError> {
        for message in messages {
            serde_json::to_writer(&mut self.writer, message)?;
            self.writer.write_all(b"\n").map_err(|source| self.io_error(source))?;
        }
        self.writer.flush().map_err(|source| self.io_error(source))
    }
}

impl JsonLinesSink {
    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            target: self.path.display().to_string(),
            source,
        }
    }
}

impl StoragePort for JsonLinesStorage {
    fn sink(&self, security: Option<&SecurityId>) -> Result<Box<dyn MessageSink + '_>, StorageError> {
        let io_error = |source| StorageError::Io {
            target: self.root.display().to_string(),
            source,
        };
        fs::create_dir_all(&self.root).map_err(io_error)?;

        let path = self.path_for(security);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| StorageError::Io {
                target: path.display().to_string(),
                source,
            })?;
        Ok(Box::new(JsonLinesSink {
            path,
            writer: BufWriter::new(file),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::messages::{BoardRecord, Tick};

    #[test]
    fn writes_one_line_per_message_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonLinesStorage::new(dir.path().join("out"));
        let id = SecurityId::new("SBER", "TQBR");
        let tick = Message::Tick(Tick {
            security_id: id.clone(),
            ..Tick::default()
        });

        storage.sink(Some(&id)).unwrap().save(&[tick.clone(), tick.clone()]).unwrap();
        storage.sink(Some(&id)).unwrap().save(&[tick]).unwrap();

        let text = fs::read_to_string(storage.path_for(Some(&id))).unwrap();
        assert_eq!(text.lines().count(), 3);
        let first: Message = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(first.security_id(), Some(&id));
    }

    #[test]
    fn default_sink_and_sanitized_names() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonLinesStorage::new(dir.path());

        assert!(storage.path_for(None).ends_with("_default.jsonl"));
        assert!(storage
            .path_for(Some(&SecurityId::new("BR/F", "spb fut")))
            .ends_with("BR_F@SPB_FUT.jsonl"));

        storage
            .sink(None)
            .unwrap()
            .save(&[Message::Board(BoardRecord::new("TQBR"))])
            .unwrap();
        assert!(storage.path_for(None).exists());
    }
}
