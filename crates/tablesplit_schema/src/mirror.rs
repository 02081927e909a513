//! Field mirroring
//!
//! Physical representation is owned by the primary. For every field a
//! secondary exposes through a capability, the secondary's attributes are
//! replaced wholesale by the primary's. Annotations are replaced as a whole
//! map, never merged key by key.

use crate::error::{SchemaError, SchemaResult};
use crate::model::{FieldDescriptor, PartitionDescriptor};
use std::collections::BTreeSet;
use tracing::debug;

/// Summary of one mirroring pass over a secondary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorOutcome {
    /// Fields whose attributes changed
    pub copied: usize,
    /// Fields already identical to the primary
    pub unchanged: usize,
}

pub struct FieldMirror<'a> {
    primary: &'a PartitionDescriptor,
}

impl<'a> FieldMirror<'a> {
    pub fn new(primary: &'a PartitionDescriptor) -> Self {
        Self { primary }
    }

    /// Mirror every capability field of `secondary` from the primary.
    ///
    /// All targets are checked before anything is written, so a failing
    /// secondary is left as it was. Running this twice is a no-op the
    /// second time.
    pub fn mirror(&self, secondary: &mut PartitionDescriptor) -> SchemaResult<MirrorOutcome> {
        let mut targets = BTreeSet::new();
        for capability in &secondary.capabilities {
            for field in &capability.fields {
                if !secondary.has_field(field) {
                    return Err(SchemaError::MissingMirrorTarget {
                        partition: secondary.id.clone(),
                        capability: capability.name.clone(),
                        field: field.clone(),
                    });
                }
                if !self.primary.has_field(field) {
                    return Err(SchemaError::MissingCapabilityCoverage {
                        capability: capability.name.clone(),
                        partition: secondary.id.clone(),
                        missing_fields: vec![field.clone()],
                    });
                }
                targets.insert(field.clone());
            }
        }

        let mut outcome = MirrorOutcome::default();
        for name in &targets {
            let Some(target) = secondary.field_mut(name) else {
                continue;
            };
            if self.mirror_field(target) {
                outcome.copied += 1;
            } else {
                outcome.unchanged += 1;
            }
        }

        debug!(
            partition = %secondary.id,
            copied = outcome.copied,
            unchanged = outcome.unchanged,
            "Mirrored capability fields"
        );
        Ok(outcome)
    }

    /// Overwrite `target`'s attributes with the primary's field of the same
    /// name. Returns whether anything changed. The partition-local identity
    /// marker is left alone.
    pub fn mirror_field(&self, target: &mut FieldDescriptor) -> bool {
        let Some(source) = self.primary.field(&target.name) else {
            return false;
        };
        if target.attributes == source.attributes {
            return false;
        }
        target.attributes = source.attributes.clone();
        true
    }
}
