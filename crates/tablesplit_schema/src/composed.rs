//! Composed schema
//!
//! The frozen output of composition, handed to the storage-mapping layer.
//! It has no mutating API: once built it is shared read-only.

use crate::model::{
    FieldDescriptor, ForeignKeyDescriptor, IndexDescriptor, NavigationDescriptor,
    PartitionDescriptor, PartitionId, StructureKind,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Version of the composed-schema contract.
pub const SCHEMA_FORMAT_VERSION: u32 = 1;

/// Required one-to-one link from a partition to the partition it shares
/// identity with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityLink {
    pub principal: PartitionId,

    /// Navigation on the dependent side; sibling links have none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation: Option<String>,

    pub key_fields: Vec<String>,
    pub required: bool,
    pub unique: bool,
}

impl IdentityLink {
    pub fn new(principal: PartitionId, navigation: Option<String>, key_fields: Vec<String>) -> Self {
        Self {
            principal,
            navigation,
            key_fields,
            required: true,
            unique: true,
        }
    }
}

/// Where one primary structure ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationRecord {
    pub kind: StructureKind,
    /// Human-readable label of the structure
    pub structure: String,
    pub fields: Vec<String>,
    /// Empty when no secondary covers the structure
    pub targets: Vec<PartitionId>,
}

impl ReplicationRecord {
    pub fn is_replicated(&self) -> bool {
        !self.targets.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedPartition {
    id: PartitionId,
    is_primary: bool,
    table: String,
    identity_fields: Vec<String>,
    fields: Vec<FieldDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    capabilities: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    identity_links: Vec<IdentityLink>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    indexes: Vec<IndexDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    foreign_keys: Vec<ForeignKeyDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    navigations: Vec<NavigationDescriptor>,
}

impl ComposedPartition {
    pub(crate) fn freeze(
        partition: PartitionDescriptor,
        identity_fields: &[String],
        identity_links: Vec<IdentityLink>,
    ) -> Self {
        Self {
            table: partition.table_name().to_string(),
            id: partition.id,
            is_primary: partition.is_primary,
            identity_fields: identity_fields.to_vec(),
            fields: partition.fields,
            capabilities: partition.capabilities.into_iter().map(|c| c.name).collect(),
            identity_links,
            indexes: partition.indexes,
            foreign_keys: partition.foreign_keys,
            navigations: partition.navigations,
        }
    }

    pub fn id(&self) -> &PartitionId {
        &self.id
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn identity_fields(&self) -> &[String] {
        &self.identity_fields
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    pub fn identity_links(&self) -> &[IdentityLink] {
        &self.identity_links
    }

    pub fn indexes(&self) -> &[IndexDescriptor] {
        &self.indexes
    }

    pub fn foreign_keys(&self) -> &[ForeignKeyDescriptor] {
        &self.foreign_keys
    }

    pub fn navigations(&self) -> &[NavigationDescriptor] {
        &self.navigations
    }
}

/// Immutable mapping from partition identity to its finalized descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedSchema {
    format_version: u32,
    primary: PartitionId,
    partitions: BTreeMap<PartitionId, ComposedPartition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    replications: Vec<ReplicationRecord>,
}

impl ComposedSchema {
    pub(crate) fn new(
        primary: ComposedPartition,
        secondaries: Vec<ComposedPartition>,
        replications: Vec<ReplicationRecord>,
    ) -> Self {
        let primary_id = primary.id.clone();
        let mut partitions = BTreeMap::new();
        partitions.insert(primary_id.clone(), primary);
        for secondary in secondaries {
            partitions.insert(secondary.id.clone(), secondary);
        }
        Self {
            format_version: SCHEMA_FORMAT_VERSION,
            primary: primary_id,
            partitions,
            replications,
        }
    }

    pub fn format_version(&self) -> u32 {
        self.format_version
    }

    pub fn primary_id(&self) -> &PartitionId {
        &self.primary
    }

    pub fn primary(&self) -> Option<&ComposedPartition> {
        self.partitions.get(&self.primary)
    }

    pub fn partition(&self, id: &str) -> Option<&ComposedPartition> {
        self.partitions.get(&PartitionId::from(id))
    }

    /// All partitions, ordered by identity
    pub fn partitions(&self) -> impl Iterator<Item = &ComposedPartition> {
        self.partitions.values()
    }

    pub fn secondaries(&self) -> impl Iterator<Item = &ComposedPartition> {
        self.partitions.values().filter(|p| !p.is_primary)
    }

    pub fn replications(&self) -> &[ReplicationRecord] {
        &self.replications
    }

    /// Canonical pretty JSON form
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// SHA-256 of the canonical JSON form. Structurally identical
    /// compositions produce identical fingerprints.
    pub fn fingerprint(&self) -> serde_json::Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}
