//! One row through the field set.

use std::collections::{BTreeMap, VecDeque};

use csv::StringRecord;
use tokio_util::sync::CancellationToken;

use super::quote_aggregator::QuoteAggregator;
use crate::domain::mapping::{FieldDescriptor, FieldSet, ReferenceZone};
use crate::domain::messages::{Message, SecurityIdMapping};
use crate::error::{FieldConversionError, ImportError};

/// Result of processing one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    /// Row handled (messages may or may not have been emitted).
    Processed,
    /// Cancellation was observed between fields.
    Cancelled,
}

/// Applies descriptors to rows and emits the resulting messages.
#[derive(Debug)]
pub struct RowProcessor {
    zone: ReferenceZone,
    ignore_non_id_securities: bool,
    quotes: QuoteAggregator,
}

impl RowProcessor {
    /// Create a processor.
    #[must_use]
    pub fn new(zone: ReferenceZone, ignore_non_id_securities: bool) -> Self {
        Self {
            zone,
            ignore_non_id_securities,
            quotes: QuoteAggregator::new(),
        }
    }

    /// Convert one row, pushing emitted messages onto `out`.
    ///
    /// Adapter mappings for the row are pushed ahead of the primary message.
    pub fn process(
        &mut self,
        fields: &mut FieldSet,
        line: u64,
        row: &StringRecord,
        cancel: &CancellationToken,
        out: &mut VecDeque<Message>,
    ) -> Result<RowOutcome, ImportError> {
        let schema = fields.schema();
        let mut message = schema.blank_message();
        let mut mappings: BTreeMap<String, Message> = BTreeMap::new();

        for field in fields.iter_mut() {
            if cancel.is_cancelled() {
                return Ok(RowOutcome::Cancelled);
            }

            let raw = match field.column() {
                Some(column) => row.get(column).ok_or_else(|| FieldConversionError {
                    line,
                    column: Some(column),
                    field: field.display_name().to_string(),
                    value: String::new(),
                    reason: format!("row has only {} columns", row.len()),
                })?,
                None if field.is_required() => "",
                None => continue,
            };

            let target = if field.is_adapter_field() {
                let Some(adapter) = field.adapter() else {
                    continue;
                };
                mappings
                    .entry(adapter.to_string())
                    .or_insert_with(|| Message::SecurityMapping(SecurityIdMapping::new(adapter)))
            } else {
                &mut message
            };

            field
                .apply_file_value(target, raw, &self.zone)
                .map_err(|reason| conversion_error(field, line, raw, reason))?;
        }

        schema.finalize(&mut message).map_err(|name| {
            let field = fields.get(name);
            FieldConversionError {
                line,
                column: field.and_then(FieldDescriptor::column),
                field: field.map_or(name, FieldDescriptor::display_name).to_string(),
                value: String::new(),
                reason: "value is required".to_string(),
            }
        })?;

        let unidentified = match &message {
            Message::Security(security) if !security.security_id.is_identified() => {
                Some(&security.security_id)
            }
            _ => None,
        };
        if let Some(security_id) = unidentified {
            if self.ignore_non_id_securities {
                tracing::warn!(
                    line,
                    security_id = %security_id,
                    "Skipping security row without identifier"
                );
                return Ok(RowOutcome::Processed);
            }
            return Err(ImportError::SecurityIdentity {
                line,
                security_id: security_id.to_string(),
            });
        }

        if let Some(primary) = message.security_id().filter(|id| id.is_identified()) {
            for mapping in mappings.into_values() {
                let Message::SecurityMapping(mut mapping) = mapping else {
                    continue;
                };
                if mapping.adapter_id.security_code.trim().is_empty() {
                    continue;
                }
                if mapping.adapter_id.board_code.trim().is_empty() {
                    mapping.adapter_id.board_code.clone_from(&primary.board_code);
                }
                mapping.security_id = primary.clone();
                out.push_back(Message::SecurityMapping(mapping));
            }
        }

        match message {
            Message::QuoteLevel(level) => {
                if let Some(snapshot) = self.quotes.push(level) {
                    out.push_back(Message::QuoteSnapshot(snapshot));
                }
            }
            other => out.push_back(other),
        }
        Ok(RowOutcome::Processed)
    }

    /// Emit the snapshot still being accumulated at end of input.
    pub fn finish(&mut self, out: &mut VecDeque<Message>) {
        if let Some(snapshot) = self.quotes.finish() {
            out.push_back(Message::QuoteSnapshot(snapshot));
        }
    }

    /// Drop partial state after cancellation.
    pub fn abandon(&mut self) {
        self.quotes.clear();
    }
}

fn conversion_error(field: &FieldDescriptor, line: u64, raw: &str, reason: String) -> FieldConversionError {
    FieldConversionError {
        line,
        column: field.column(),
        field: field.display_name().to_string(),
        value: raw.to_string(),
        reason,
    }
}
