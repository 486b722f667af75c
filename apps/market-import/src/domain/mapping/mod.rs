//! Field mapping: how file columns become message fields.
//!
//! A [`FieldSet`] holds one [`FieldDescriptor`] per target field of a
//! [`DataSchema`]. Each descriptor converts a raw cell through an ordered
//! coercion policy (value mappings, enum names, generic conversion) and
//! writes the result with a closure bound to the concrete message type.

pub mod coercion;
pub mod descriptor;
pub mod field_set;
pub mod registry;
pub mod schema;
pub mod settings;
pub mod value;
pub mod zone;

pub use coercion::CompiledFormat;
pub use descriptor::{FieldDescriptor, ValueMapping};
pub use field_set::FieldSet;
pub use schema::DataSchema;
pub use settings::{FieldSettings, ValueMappingSettings};
pub use value::{FieldType, FieldValue, ValueType};
pub use zone::ReferenceZone;
