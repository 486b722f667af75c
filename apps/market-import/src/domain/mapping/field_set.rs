//! Ordered descriptor collection for one schema.

use super::descriptor::{FieldDescriptor, ValueMapping};
use super::registry;
use super::schema::DataSchema;
use super::settings::FieldSettings;
use crate::error::ConfigurationError;

/// The descriptors of one schema, in application order.
///
/// Built once per run. A parser resets it before use so cached format
/// parsers never leak between runs.
#[derive(Debug, Clone)]
pub struct FieldSet {
    schema: DataSchema,
    fields: Vec<FieldDescriptor>,
}

impl FieldSet {
    /// Canonical field set for a schema.
    #[must_use]
    pub fn build(schema: DataSchema) -> Self {
        Self {
            schema,
            fields: registry::descriptors(schema),
        }
    }

    /// Canonical field set for a schema tag such as `ticks` or `candles:60`.
    pub fn for_tag(tag: &str) -> Result<Self, ConfigurationError> {
        tag.parse().map(Self::build)
    }

    /// Schema the set was built for.
    #[must_use]
    pub const fn schema(&self) -> DataSchema {
        self.schema
    }

    /// Descriptors in application order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    /// Mutable descriptors in application order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FieldDescriptor> {
        self.fields.iter_mut()
    }

    /// First descriptor with the given name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Mutable access to the first descriptor with the given name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldDescriptor> {
        self.fields
            .iter_mut()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Number of descriptors, including per-adapter instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Never true for a built set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Clear every descriptor's cached format parser.
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.reset();
        }
    }

    /// Apply user settings by field name.
    ///
    /// Adapter fields are instantiated once per named adapter; settings for
    /// an adapter already seen update that instance.
    pub fn configure(&mut self, settings: &[FieldSettings]) -> Result<(), ConfigurationError> {
        for entry in settings {
            let index = self.resolve(entry)?;
            let field = &mut self.fields[index];

            field.set_column(entry.column);
            field.set_format(entry.format.clone());
            field.set_default_value(entry.default_value.clone());
            field.set_zero_as_null(entry.zero_as_null);

            let mappings = entry
                .value_mappings
                .iter()
                .map(|m| {
                    field
                        .convert_domain_value(&m.domain_value)
                        .map(|domain_value| ValueMapping {
                            file_value: m.file_value.clone(),
                            domain_value,
                        })
                        .map_err(|reason| ConfigurationError::InvalidValueMapping {
                            field: field.name().to_string(),
                            value: m.domain_value.clone(),
                            reason,
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            field.set_value_mappings(mappings);
        }
        Ok(())
    }

    fn resolve(&mut self, entry: &FieldSettings) -> Result<usize, ConfigurationError> {
        let template = self
            .fields
            .iter()
            .position(|f| f.adapter().is_none() && f.name().eq_ignore_ascii_case(&entry.name))
            .ok_or_else(|| ConfigurationError::UnknownField {
                schema: self.schema.tag(),
                field: entry.name.clone(),
            })?;
        let name = self.fields[template].name();

        match (self.fields[template].is_adapter_field(), entry.adapter.as_deref()) {
            (false, None) => Ok(template),
            (false, Some(adapter)) => Err(ConfigurationError::InvalidSetting {
                name: format!("{name}.adapter"),
                value: adapter.to_string(),
                reason: "not an adapter field".to_string(),
            }),
            (true, None) => Err(ConfigurationError::MissingAdapter(name.to_string())),
            (true, Some(adapter)) => {
                let existing = self.fields.iter().position(|f| {
                    f.name() == name && f.adapter().is_some_and(|a| a.eq_ignore_ascii_case(adapter))
                });
                Ok(existing.unwrap_or_else(|| {
                    let mut instance = self.fields[template].clone();
                    instance.set_adapter(Some(adapter.to_string()));
                    self.fields.push(instance);
                    self.fields.len() - 1
                }))
            }
        }
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a FieldDescriptor;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
