//! Per-field user settings, as stored in configuration files.

use serde::{Deserialize, Serialize};

/// A file value to domain value translation, before conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueMappingSettings {
    /// Raw cell text.
    pub file_value: String,
    /// Domain value, converted with the field's own type and format.
    pub domain_value: String,
}

/// User settings for one field.
///
/// Fields not named in any settings entry keep their defaults: no column,
/// no format and no mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSettings {
    /// Field name, matched case-insensitively.
    pub name: String,
    /// Zero-based column; `None` disables the field.
    #[serde(default)]
    pub column: Option<usize>,
    /// Date/time format or epoch sentinel.
    #[serde(default)]
    pub format: Option<String>,
    /// Raw value used for empty cells.
    #[serde(default)]
    pub default_value: Option<String>,
    /// Treat numeric zero as absent.
    #[serde(default)]
    pub zero_as_null: bool,
    /// Value translations.
    #[serde(default)]
    pub value_mappings: Vec<ValueMappingSettings>,
    /// Adapter an adapter field is bound to.
    #[serde(default)]
    pub adapter: Option<String>,
}

impl FieldSettings {
    /// Settings for the named field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Bind to a column.
    #[must_use]
    pub const fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    /// Set the format.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Set the default raw value.
    #[must_use]
    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    /// Treat numeric zero as absent.
    #[must_use]
    pub const fn zero_as_null(mut self) -> Self {
        self.zero_as_null = true;
        self
    }

    /// Add a value mapping.
    #[must_use]
    pub fn with_mapping(mut self, file_value: impl Into<String>, domain_value: impl Into<String>) -> Self {
        self.value_mappings.push(ValueMappingSettings {
            file_value: file_value.into(),
            domain_value: domain_value.into(),
        });
        self
    }

    /// Bind an adapter field to an adapter.
    #[must_use]
    pub fn for_adapter(mut self, adapter: impl Into<String>) -> Self {
        self.adapter = Some(adapter.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let yaml = r"
name: trade_price
column: 3
";
        let settings: FieldSettings = serde_yaml_bw::from_str(yaml).unwrap();
        assert_eq!(settings, FieldSettings::new("trade_price").with_column(3));
    }

    #[test]
    fn deserializes_mappings() {
        let yaml = r#"
name: side
column: 5
value_mappings:
  - file_value: "B"
    domain_value: "Buy"
  - file_value: "S"
    domain_value: "Sell"
"#;
        let settings: FieldSettings = serde_yaml_bw::from_str(yaml).unwrap();
        assert_eq!(settings.value_mappings.len(), 2);
        assert_eq!(settings.value_mappings[1].domain_value, "Sell");
    }
}
