//! Static declarations
//!
//! A declaration lists every partition of one logical record. It can be
//! written as TOML or JSON:
//!
//! ```toml
//! [[partitions]]
//! id = "Task"
//! is_primary = true
//! identity_fields = ["Id"]
//!
//! [[partitions.fields]]
//! name = "Id"
//! scalar_type = "int32"
//! generated_on_add = true
//! ```

use crate::composed::ComposedSchema;
use crate::composer::{compose, ComposeOptions};
use crate::error::SchemaResult;
use crate::model::PartitionDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeclarationError {
    #[error("Invalid TOML declaration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON declaration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown key '{key}' on field '{field}' of partition '{partition}'")]
    UnknownFieldKey {
        partition: String,
        field: String,
        key: String,
    },
}

/// Keys a field entry may carry. Attributes are flattened into the field
/// entry, so serde cannot reject unknown keys there.
const FIELD_KEYS: &[&str] = &[
    "name",
    "identity",
    "scalar_type",
    "nullable",
    "generated_on_add",
    "concurrency_token",
    "storage_name",
    "storage_type",
    "max_length",
    "precision",
    "scale",
    "unicode",
    "default_value",
    "default_expression",
    "computed_expression",
    "converter",
    "comparer",
    "value_generator",
    "before_save",
    "after_save",
    "provider_type",
    "annotations",
];

fn check_field_keys(document: &Value) -> Result<(), DeclarationError> {
    let partitions = document
        .get("partitions")
        .and_then(Value::as_array)
        .into_iter()
        .flatten();
    for partition in partitions {
        let fields = partition
            .get("fields")
            .and_then(Value::as_array)
            .into_iter()
            .flatten();
        for field in fields.filter_map(Value::as_object) {
            if let Some(key) = field.keys().find(|k| !FIELD_KEYS.contains(&k.as_str())) {
                let text = |entry: Option<&Value>| {
                    entry.and_then(Value::as_str).unwrap_or_default().to_string()
                };
                return Err(DeclarationError::UnknownFieldKey {
                    partition: text(partition.get("id")),
                    field: text(field.get("name")),
                    key: key.clone(),
                });
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDeclaration {
    #[serde(default)]
    pub partitions: Vec<PartitionDescriptor>,
}

impl SchemaDeclaration {
    pub fn new(partitions: Vec<PartitionDescriptor>) -> Self {
        Self { partitions }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, DeclarationError> {
        let declaration = toml::from_str(source)?;
        check_field_keys(&toml::from_str::<Value>(source)?)?;
        Ok(declaration)
    }

    pub fn from_json_str(source: &str) -> Result<Self, DeclarationError> {
        let declaration = serde_json::from_str(source)?;
        check_field_keys(&serde_json::from_str::<Value>(source)?)?;
        Ok(declaration)
    }

    pub fn primary(&self) -> Option<&PartitionDescriptor> {
        self.partitions.iter().find(|p| p.is_primary)
    }

    pub fn compose(self, options: ComposeOptions) -> SchemaResult<ComposedSchema> {
        compose(self.partitions, options)
    }
}
