//! Composition errors
//!
//! Every error is detected while composing, never at query time. The first
//! violation aborts composition; errors are never aggregated.

use crate::composer::ComposerState;
use crate::model::{PartitionId, StructureKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("No primary partition registered")]
    MissingPrimary,

    #[error("Partition '{duplicate}' is marked primary but '{existing}' is already the primary")]
    DuplicatePrimary {
        existing: PartitionId,
        duplicate: PartitionId,
    },

    #[error("Primary partition '{0}' declares no identity fields")]
    MissingPrimaryKey(PartitionId),

    #[error(
        "Capability '{capability}' on partition '{partition}' is not covered by the primary: missing {}",
        .missing_fields.join(", ")
    )]
    MissingCapabilityCoverage {
        capability: String,
        partition: PartitionId,
        missing_fields: Vec<String>,
    },

    #[error(
        "Capability '{capability}' on partition '{partition}' lists ({}) but was registered with ({})",
        .conflicting.join(", "),
        .registered.join(", ")
    )]
    ConflictingCapability {
        capability: String,
        partition: PartitionId,
        registered: Vec<String>,
        conflicting: Vec<String>,
    },

    #[error("Secondary partition '{partition}' has no identity navigation to primary '{primary}'")]
    MissingIdentityNavigation {
        partition: PartitionId,
        primary: PartitionId,
    },

    #[error(
        "Capability '{capability}' on partition '{partition}' lists field '{field}' which the partition does not declare"
    )]
    MissingMirrorTarget {
        partition: PartitionId,
        capability: String,
        field: String,
    },

    #[error("The {kind} '{structure}' on partition '{partition}' references no fields")]
    UnsupportedDegenerateStructure {
        partition: PartitionId,
        kind: StructureKind,
        structure: String,
    },

    #[error("Partition '{0}' is registered more than once")]
    DuplicatePartition(PartitionId),

    #[error("Partition '{partition}' declares field '{field}' more than once")]
    DuplicateField { partition: PartitionId, field: String },

    #[error("Partition '{partition}' has no field '{field}'")]
    UnknownField { partition: PartitionId, field: String },

    #[error("Composer is {state}; no further operations are accepted")]
    ComposerClosed { state: ComposerState },
}

impl SchemaError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::MissingPrimary => "MISSING_PRIMARY",
            SchemaError::DuplicatePrimary { .. } => "DUPLICATE_PRIMARY",
            SchemaError::MissingPrimaryKey(_) => "MISSING_PRIMARY_KEY",
            SchemaError::MissingCapabilityCoverage { .. } => "MISSING_CAPABILITY_COVERAGE",
            SchemaError::ConflictingCapability { .. } => "CONFLICTING_CAPABILITY",
            SchemaError::MissingIdentityNavigation { .. } => "MISSING_IDENTITY_NAVIGATION",
            SchemaError::MissingMirrorTarget { .. } => "MISSING_MIRROR_TARGET",
            SchemaError::UnsupportedDegenerateStructure { .. } => {
                "UNSUPPORTED_DEGENERATE_STRUCTURE"
            }
            SchemaError::DuplicatePartition(_) => "DUPLICATE_PARTITION",
            SchemaError::DuplicateField { .. } => "DUPLICATE_FIELD",
            SchemaError::UnknownField { .. } => "UNKNOWN_FIELD",
            SchemaError::ComposerClosed { .. } => "COMPOSER_CLOSED",
        }
    }

    /// Partition the error is about, when there is one
    pub fn partition(&self) -> Option<&PartitionId> {
        match self {
            SchemaError::MissingPrimary | SchemaError::ComposerClosed { .. } => None,
            SchemaError::DuplicatePrimary { duplicate, .. } => Some(duplicate),
            SchemaError::MissingPrimaryKey(partition) | SchemaError::DuplicatePartition(partition) => {
                Some(partition)
            }
            SchemaError::MissingCapabilityCoverage { partition, .. }
            | SchemaError::ConflictingCapability { partition, .. }
            | SchemaError::MissingIdentityNavigation { partition, .. }
            | SchemaError::MissingMirrorTarget { partition, .. }
            | SchemaError::UnsupportedDegenerateStructure { partition, .. }
            | SchemaError::DuplicateField { partition, .. }
            | SchemaError::UnknownField { partition, .. } => Some(partition),
        }
    }
}

/// Result type for composition operations
pub type SchemaResult<T> = Result<T, SchemaError>;
