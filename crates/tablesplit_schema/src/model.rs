//! Partition descriptor model
//!
//! Passive data describing one logical record split across several
//! partitions. Descriptors are built once from static declarations,
//! consumed by the composer, and never touched again afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Not;

/// Type identity of a partition (e.g. "Task", "TaskRequired").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionId(String);

impl PartitionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PartitionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PartitionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Logical scalar type of a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Boolean,
    Int32,
    Int64,
    Float64,
    Decimal,
    #[default]
    String,
    Date,
    DateTime,
    Guid,
    Binary,
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Boolean => "boolean",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Float64 => "float64",
            ScalarType::Decimal => "decimal",
            ScalarType::String => "string",
            ScalarType::Date => "date",
            ScalarType::DateTime => "date_time",
            ScalarType::Guid => "guid",
            ScalarType::Binary => "binary",
        };
        write!(f, "{}", name)
    }
}

/// What the storage layer does with a store-generated value around a save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveBehavior {
    #[default]
    Save,
    Ignore,
    Throw,
}

/// Physical representation of a field.
///
/// Owned by the primary partition. Secondary partitions receive a full copy
/// of this struct during mirroring; nothing here is merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldAttributes {
    pub scalar_type: ScalarType,
    #[serde(skip_serializing_if = "Not::not")]
    pub nullable: bool,
    #[serde(skip_serializing_if = "Not::not")]
    pub generated_on_add: bool,
    #[serde(skip_serializing_if = "Not::not")]
    pub concurrency_token: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unicode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed_expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_generator: Option<String>,
    pub before_save: SaveBehavior,
    pub after_save: SaveBehavior,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_type: Option<String>,
    /// Free-form annotations, opaque to composition.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, serde_json::Value>,
}

/// A single field on a partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name (unique within a partition)
    pub name: String,

    /// Physical attributes, mirrored wholesale from the primary
    #[serde(flatten)]
    pub attributes: FieldAttributes,

    /// Partition-local marker: field is part of the shared identity.
    /// Never mirrored.
    #[serde(default, skip_serializing_if = "Not::not")]
    pub identity: bool,
}

impl FieldDescriptor {
    /// Create a non-nullable field of the given type
    pub fn new(name: impl Into<String>, scalar_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            attributes: FieldAttributes {
                scalar_type,
                ..FieldAttributes::default()
            },
            identity: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.attributes.nullable = true;
        self
    }

    pub fn generated_on_add(mut self) -> Self {
        self.attributes.generated_on_add = true;
        self
    }

    pub fn concurrency_token(mut self) -> Self {
        self.attributes.concurrency_token = true;
        self
    }

    pub fn with_storage_name(mut self, name: impl Into<String>) -> Self {
        self.attributes.storage_name = Some(name.into());
        self
    }

    pub fn with_storage_type(mut self, storage_type: impl Into<String>) -> Self {
        self.attributes.storage_type = Some(storage_type.into());
        self
    }

    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.attributes.max_length = Some(max_length);
        self
    }

    pub fn with_precision(mut self, precision: u8, scale: u8) -> Self {
        self.attributes.precision = Some(precision);
        self.attributes.scale = Some(scale);
        self
    }

    pub fn with_unicode(mut self, unicode: bool) -> Self {
        self.attributes.unicode = Some(unicode);
        self
    }

    pub fn with_default_value(mut self, value: serde_json::Value) -> Self {
        self.attributes.default_value = Some(value);
        self
    }

    pub fn with_default_expression(mut self, expression: impl Into<String>) -> Self {
        self.attributes.default_expression = Some(expression.into());
        self
    }

    pub fn with_computed_expression(mut self, expression: impl Into<String>) -> Self {
        self.attributes.computed_expression = Some(expression.into());
        self
    }

    pub fn with_converter(mut self, converter: impl Into<String>) -> Self {
        self.attributes.converter = Some(converter.into());
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.annotations.insert(key.into(), value);
        self
    }
}

/// A named group of fields a partition type implements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    pub name: String,
    pub fields: Vec<String>,
}

impl CapabilityDescriptor {
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// The navigation a secondary uses to reach the primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityNavigation {
    pub name: String,
    pub target: PartitionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub fields: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Not::not")]
    pub unique: bool,

    /// Opaque filter expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl IndexDescriptor {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            name: None,
            unique: false,
            filter: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

impl fmt::Display for IndexDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields.join(", ");
        if let Some(name) = &self.name {
            write!(f, "{} ", name)?;
        }
        if self.unique {
            write!(f, "UNIQUE ({})", fields)
        } else {
            write!(f, "({})", fields)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteBehavior {
    Cascade,
    Restrict,
    SetNull,
    ClientSetNull,
    #[default]
    NoAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyDescriptor {
    pub fields: Vec<String>,
    pub principal: PartitionId,
    pub principal_key: Vec<String>,

    #[serde(default)]
    pub delete_behavior: DeleteBehavior,

    #[serde(default, skip_serializing_if = "Not::not")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Not::not")]
    pub unique: bool,

    #[serde(default, skip_serializing_if = "Not::not")]
    pub ownership: bool,

    #[serde(default, skip_serializing_if = "Not::not")]
    pub required_dependent: bool,

    /// Storage constraint name; unset names are derived per table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_name: Option<String>,
}

impl ForeignKeyDescriptor {
    pub fn new<I, K, S, T>(fields: I, principal: impl Into<PartitionId>, principal_key: K) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        K: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            principal: principal.into(),
            principal_key: principal_key.into_iter().map(Into::into).collect(),
            delete_behavior: DeleteBehavior::default(),
            required: false,
            unique: false,
            ownership: false,
            required_dependent: false,
            constraint_name: None,
        }
    }

    pub fn on_delete(mut self, behavior: DeleteBehavior) -> Self {
        self.delete_behavior = behavior;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn ownership(mut self) -> Self {
        self.ownership = true;
        self
    }

    pub fn required_dependent(mut self) -> Self {
        self.required_dependent = true;
        self
    }
}

impl fmt::Display for ForeignKeyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}) -> {}({})",
            self.fields.join(", "),
            self.principal,
            self.principal_key.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationDescriptor {
    pub name: String,
    pub target: PartitionId,

    /// Field that backs the navigation; defaults to the navigation name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backing_field: Option<String>,
}

impl NavigationDescriptor {
    pub fn new(name: impl Into<String>, target: impl Into<PartitionId>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            backing_field: None,
        }
    }

    pub fn backed_by(mut self, field: impl Into<String>) -> Self {
        self.backing_field = Some(field.into());
        self
    }

    pub fn backing_field_name(&self) -> &str {
        self.backing_field.as_deref().unwrap_or(&self.name)
    }
}

/// Kind of secondary structure declared on the primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    Index,
    ForeignKey,
    Navigation,
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureKind::Index => write!(f, "index"),
            StructureKind::ForeignKey => write!(f, "foreign key"),
            StructureKind::Navigation => write!(f, "navigation"),
        }
    }
}

/// One physical partition of the logical record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionDescriptor {
    pub id: PartitionId,

    #[serde(default)]
    pub is_primary: bool,

    /// Storage table name; defaults to the partition identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Ordered identity fields (primary only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identity_fields: Vec<String>,

    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<CapabilityDescriptor>,

    /// Secondary only: navigation referencing the primary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_navigation: Option<IdentityNavigation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<IndexDescriptor>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKeyDescriptor>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub navigations: Vec<NavigationDescriptor>,
}

impl PartitionDescriptor {
    fn empty(id: impl Into<PartitionId>, is_primary: bool) -> Self {
        Self {
            id: id.into(),
            is_primary,
            table: None,
            identity_fields: Vec::new(),
            fields: Vec::new(),
            capabilities: Vec::new(),
            identity_navigation: None,
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            navigations: Vec::new(),
        }
    }

    /// Create an empty primary partition
    pub fn primary(id: impl Into<PartitionId>) -> Self {
        Self::empty(id, true)
    }

    /// Create an empty secondary partition
    pub fn secondary(id: impl Into<PartitionId>) -> Self {
        Self::empty(id, false)
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_identity<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identity_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_capability(mut self, capability: CapabilityDescriptor) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn with_identity_navigation(
        mut self,
        name: impl Into<String>,
        target: impl Into<PartitionId>,
    ) -> Self {
        self.identity_navigation = Some(IdentityNavigation {
            name: name.into(),
            target: target.into(),
        });
        self
    }

    pub fn with_index(mut self, index: IndexDescriptor) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn with_foreign_key(mut self, foreign_key: ForeignKeyDescriptor) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    pub fn with_navigation(mut self, navigation: NavigationDescriptor) -> Self {
        self.navigations.push(navigation);
        self
    }

    /// Storage table name (explicit or the partition identity)
    pub fn table_name(&self) -> &str {
        self.table.as_deref().unwrap_or(self.id.as_str())
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldDescriptor> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn capability(&self, name: &str) -> Option<&CapabilityDescriptor> {
        self.capabilities.iter().find(|c| c.name == name)
    }

    /// First field name that appears more than once, if any
    pub fn duplicate_field(&self) -> Option<&str> {
        let mut seen = std::collections::BTreeSet::new();
        self.fields
            .iter()
            .map(|f| f.name.as_str())
            .find(|name| !seen.insert(*name))
    }
}
