//! Field descriptor: one column's coercion and target-application policy.

use std::fmt;
use std::sync::Arc;

use super::coercion::{CompiledFormat, parse_bool, parse_decimal, parse_integer};
use super::value::{FieldType, FieldValue, ValueType};
use super::zone::ReferenceZone;
use crate::domain::messages::{Message, RowTarget};

/// Closure writing a converted value onto a message.
pub type ApplyFn = Arc<dyn Fn(&mut Message, FieldValue) -> Result<(), String> + Send + Sync>;

/// A file value translated to a domain value before any other coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueMapping {
    /// Raw cell text (matched case-insensitively).
    pub file_value: String,
    /// Converted domain value.
    pub domain_value: FieldValue,
}

/// Coercion steps, tried in order until one resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoercionStep {
    ValueMapping,
    EnumName,
    Generic,
}

const COERCION_POLICY: [CoercionStep; 3] = [
    CoercionStep::ValueMapping,
    CoercionStep::EnumName,
    CoercionStep::Generic,
];

enum StepOutcome {
    Resolved(FieldValue),
    /// Converted to nothing; leave the target untouched.
    Skip,
    NotApplicable,
}

/// Describes how one file column becomes one message field.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: &'static str,
    display_name: &'static str,
    description: &'static str,
    value_type: ValueType,
    column: Option<usize>,
    required: bool,
    default_value: Option<String>,
    format: Option<String>,
    zero_as_null: bool,
    value_mappings: Vec<ValueMapping>,
    adapter_field: bool,
    adapter: Option<String>,
    apply: ApplyFn,
    cache: Option<CompiledFormat>,
}

impl FieldDescriptor {
    /// Create a descriptor writing values of type `V` onto messages of type `T`.
    pub fn new<T, V, F>(name: &'static str, display_name: &'static str, apply: F) -> Self
    where
        T: RowTarget,
        V: FieldType,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let apply: ApplyFn = Arc::new(move |message: &mut Message, value: FieldValue| {
            let kind = message.kind();
            let target = T::from_message(message)
                .ok_or_else(|| format!("field does not apply to {kind} messages"))?;
            let value = V::from_value(value)
                .ok_or_else(|| format!("value does not match the {:?} field type", V::VALUE_TYPE))?;
            apply(target, value);
            Ok(())
        });

        Self {
            name,
            display_name,
            description: "",
            value_type: V::VALUE_TYPE,
            column: None,
            required: false,
            default_value: None,
            format: None,
            zero_as_null: false,
            value_mappings: Vec::new(),
            adapter_field: false,
            adapter: None,
            apply,
            cache: None,
        }
    }

    /// Mark as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark as an adapter field (instantiated once per adapter).
    #[must_use]
    pub const fn adapter_field(mut self) -> Self {
        self.adapter_field = true;
        self
    }

    /// Attach a description.
    #[must_use]
    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Configuration key.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Human readable name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        self.display_name
    }

    /// Longer description.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.description
    }

    /// Declared value type.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Bound column, `None` when disabled.
    #[must_use]
    pub const fn column(&self) -> Option<usize> {
        self.column
    }

    /// Required fields get their default applied even without a column.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Default raw value for empty cells.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Date/time format or epoch sentinel.
    #[must_use]
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Zero numeric results are treated as absent.
    #[must_use]
    pub const fn zero_as_null(&self) -> bool {
        self.zero_as_null
    }

    /// Configured value mappings.
    #[must_use]
    pub fn value_mappings(&self) -> &[ValueMapping] {
        &self.value_mappings
    }

    /// Writes to the per-adapter mapping instead of the message.
    #[must_use]
    pub const fn is_adapter_field(&self) -> bool {
        self.adapter_field
    }

    /// Adapter this instance is bound to.
    #[must_use]
    pub fn adapter(&self) -> Option<&str> {
        self.adapter.as_deref()
    }

    /// A format parser has been compiled and cached.
    #[must_use]
    pub const fn has_cached_format(&self) -> bool {
        self.cache.is_some()
    }

    /// Bind to a column (or disable with `None`).
    pub const fn set_column(&mut self, column: Option<usize>) {
        self.column = column;
    }

    /// Set the format; drops the cached parser.
    pub fn set_format(&mut self, format: Option<String>) {
        self.format = format;
        self.cache = None;
    }

    /// Set the default raw value.
    pub fn set_default_value(&mut self, default_value: Option<String>) {
        self.default_value = default_value;
    }

    /// Enable or disable zero-as-null.
    pub const fn set_zero_as_null(&mut self, zero_as_null: bool) {
        self.zero_as_null = zero_as_null;
    }

    /// Replace the value mappings.
    pub fn set_value_mappings(&mut self, mappings: Vec<ValueMapping>) {
        self.value_mappings = mappings;
    }

    /// Bind an adapter field instance to its adapter.
    pub fn set_adapter(&mut self, adapter: Option<String>) {
        self.adapter = adapter;
    }

    /// Drop cached format parsers; they are rebuilt on next use.
    pub fn reset(&mut self) {
        self.cache = None;
    }

    /// Convert a configured domain value with this field's type and format.
    pub fn convert_domain_value(&self, raw: &str) -> Result<FieldValue, String> {
        let mut cache = None;
        match enum_name_step(self.value_type, raw.trim()) {
            StepOutcome::Resolved(value) => return Ok(value),
            StepOutcome::Skip | StepOutcome::NotApplicable => {}
        }
        match convert_generic(
            self.value_type,
            self.format.as_deref(),
            &mut cache,
            raw.trim(),
            &ReferenceZone::Utc,
        )? {
            StepOutcome::Resolved(value) => Ok(value),
            StepOutcome::Skip | StepOutcome::NotApplicable => {
                Err("value converts to nothing".to_string())
            }
        }
    }

    /// Convert a raw cell and write it onto `target`.
    ///
    /// Empty cells fall back to the default value; an empty default, a
    /// normalized-away number or a zero under zero-as-null leave the target
    /// untouched.
    pub fn apply_file_value(
        &mut self,
        target: &mut Message,
        raw: &str,
        zone: &ReferenceZone,
    ) -> Result<(), String> {
        let cell = raw.trim();
        if cell.is_empty() {
            return match self.default_value.clone() {
                Some(default) if !default.trim().is_empty() => {
                    self.apply_file_value(target, &default, zone)
                }
                _ => Ok(()),
            };
        }

        let Some(value) = self.coerce(cell, zone)? else {
            return Ok(());
        };
        if self.zero_as_null && value.is_zero() {
            return Ok(());
        }
        (self.apply)(target, value)
    }

    fn coerce(&mut self, cell: &str, zone: &ReferenceZone) -> Result<Option<FieldValue>, String> {
        for step in COERCION_POLICY {
            let outcome = match step {
                CoercionStep::ValueMapping => self.mapping_step(cell),
                CoercionStep::EnumName => enum_name_step(self.value_type, cell),
                CoercionStep::Generic => convert_generic(
                    self.value_type,
                    self.format.as_deref(),
                    &mut self.cache,
                    cell,
                    zone,
                )?,
            };
            match outcome {
                StepOutcome::Resolved(value) => return Ok(Some(value)),
                StepOutcome::Skip => return Ok(None),
                StepOutcome::NotApplicable => {}
            }
        }
        Ok(None)
    }

    fn mapping_step(&self, cell: &str) -> StepOutcome {
        self.value_mappings
            .iter()
            .find(|m| m.file_value.trim().eq_ignore_ascii_case(cell))
            .map_or(StepOutcome::NotApplicable, |m| {
                StepOutcome::Resolved(m.domain_value.clone())
            })
    }
}

fn enum_name_step(value_type: ValueType, cell: &str) -> StepOutcome {
    match value_type {
        ValueType::Enum(kind) => kind
            .lookup(cell)
            .map_or(StepOutcome::NotApplicable, |v| {
                StepOutcome::Resolved(FieldValue::Enum(v))
            }),
        _ => StepOutcome::NotApplicable,
    }
}

fn convert_generic(
    value_type: ValueType,
    format: Option<&str>,
    cache: &mut Option<CompiledFormat>,
    cell: &str,
    zone: &ReferenceZone,
) -> Result<StepOutcome, String> {
    let resolved = |value: Option<FieldValue>| value.map_or(StepOutcome::Skip, StepOutcome::Resolved);

    match value_type {
        ValueType::Decimal => Ok(resolved(parse_decimal(cell)?.map(FieldValue::Decimal))),
        ValueType::Integer => Ok(resolved(parse_integer(cell)?.map(FieldValue::Integer))),
        ValueType::Bool => parse_bool(cell).map(|b| StepOutcome::Resolved(FieldValue::Bool(b))),
        ValueType::String => Ok(StepOutcome::Resolved(FieldValue::Text(cell.to_string()))),
        ValueType::DateTime => {
            let compiled = cached_format(cache, format, false)?;
            compiled
                .parse_datetime(cell, zone)
                .map(|dt| StepOutcome::Resolved(FieldValue::DateTime(dt)))
        }
        ValueType::TimeSpan => {
            let compiled = cached_format(cache, format, true)?;
            compiled
                .parse_timespan(cell)
                .map(|span| StepOutcome::Resolved(FieldValue::TimeSpan(span)))
        }
        ValueType::Enum(kind) => cell
            .parse::<usize>()
            .ok()
            .and_then(|ordinal| kind.member_at(ordinal))
            .map(|v| StepOutcome::Resolved(FieldValue::Enum(v)))
            .ok_or_else(|| format!("'{cell}' is not a {kind} value")),
    }
}

fn cached_format<'a>(
    cache: &'a mut Option<CompiledFormat>,
    format: Option<&str>,
    span: bool,
) -> Result<&'a CompiledFormat, String> {
    if cache.is_none() {
        *cache = Some(CompiledFormat::compile(format, span)?);
    }
    cache.as_ref().ok_or_else(|| "format parser unavailable".to_string())
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("column", &self.column)
            .field("required", &self.required)
            .field("default_value", &self.default_value)
            .field("format", &self.format)
            .field("zero_as_null", &self.zero_as_null)
            .field("value_mappings", &self.value_mappings.len())
            .field("adapter", &self.adapter)
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}
