//! Structure replication
//!
//! Indexes, foreign keys and navigations declared on the primary are copied
//! onto exactly those secondaries whose fields cover every field the
//! structure references. Candidates are narrowed by intersection, one
//! referenced field at a time; an empty result is valid and simply means
//! the structure stays on the primary alone.

use crate::composed::ReplicationRecord;
use crate::error::{SchemaError, SchemaResult};
use crate::model::{
    ForeignKeyDescriptor, IndexDescriptor, NavigationDescriptor, PartitionDescriptor, PartitionId,
    StructureKind,
};
use crate::registry::CapabilityRegistry;
use std::collections::BTreeSet;
use tracing::{debug, info};

pub struct StructureReplicator<'a> {
    primary: &'a PartitionDescriptor,
    registry: &'a CapabilityRegistry,
}

impl<'a> StructureReplicator<'a> {
    pub fn new(primary: &'a PartitionDescriptor, registry: &'a CapabilityRegistry) -> Self {
        Self { primary, registry }
    }

    /// Secondary partitions carrying every one of `fields`.
    pub fn plan(
        &self,
        kind: StructureKind,
        structure: &str,
        fields: &[String],
    ) -> SchemaResult<BTreeSet<PartitionId>> {
        let Some((first, rest)) = fields.split_first() else {
            return Err(SchemaError::UnsupportedDegenerateStructure {
                partition: self.primary.id.clone(),
                kind,
                structure: structure.to_string(),
            });
        };
        if let Some(unknown) = fields.iter().find(|f| !self.primary.has_field(f)) {
            return Err(SchemaError::UnknownField {
                partition: self.primary.id.clone(),
                field: unknown.clone(),
            });
        }

        let mut candidates = self
            .registry
            .partitions_with_field(first)
            .cloned()
            .unwrap_or_default();
        for field in rest {
            if candidates.is_empty() {
                break;
            }
            match self.registry.partitions_with_field(field) {
                Some(carriers) => candidates.retain(|id| carriers.contains(id)),
                None => candidates.clear(),
            }
        }
        Ok(candidates)
    }

    pub fn replicate_index(
        &self,
        index: &IndexDescriptor,
        secondaries: &mut [PartitionDescriptor],
    ) -> SchemaResult<ReplicationRecord> {
        let label = index.to_string();
        let targets = self.plan(StructureKind::Index, &label, &index.fields)?;

        for secondary in secondaries.iter_mut().filter(|s| targets.contains(&s.id)) {
            if !secondary.indexes.contains(index) {
                secondary.indexes.push(index.clone());
            }
        }
        Ok(record(StructureKind::Index, label, &index.fields, targets))
    }

    /// Replicated foreign keys keep principal, key and every flag. The
    /// constraint name is left unset so each table derives its own.
    pub fn replicate_foreign_key(
        &self,
        foreign_key: &ForeignKeyDescriptor,
        secondaries: &mut [PartitionDescriptor],
    ) -> SchemaResult<ReplicationRecord> {
        let label = foreign_key.to_string();
        let targets = self.plan(StructureKind::ForeignKey, &label, &foreign_key.fields)?;

        let replica = ForeignKeyDescriptor {
            constraint_name: None,
            ..foreign_key.clone()
        };
        for secondary in secondaries.iter_mut().filter(|s| targets.contains(&s.id)) {
            let present = secondary
                .foreign_keys
                .iter()
                .any(|fk| fk.fields == replica.fields && fk.principal == replica.principal);
            if !present {
                secondary.foreign_keys.push(replica.clone());
            }
        }
        Ok(record(StructureKind::ForeignKey, label, &foreign_key.fields, targets))
    }

    /// Navigations are registered by name only on every secondary carrying
    /// the backing field. A backing field the primary does not declare
    /// (a navigation named after its target, say) has no carriers.
    pub fn replicate_navigation(
        &self,
        navigation: &NavigationDescriptor,
        secondaries: &mut [PartitionDescriptor],
    ) -> SchemaResult<ReplicationRecord> {
        let backing = navigation.backing_field_name();
        let fields: Vec<String> = if backing.is_empty() {
            Vec::new()
        } else {
            vec![backing.to_string()]
        };
        let targets = if !fields.is_empty() && !self.primary.has_field(backing) {
            BTreeSet::new()
        } else {
            self.plan(StructureKind::Navigation, &navigation.name, &fields)?
        };

        for secondary in secondaries.iter_mut().filter(|s| targets.contains(&s.id)) {
            if !secondary.navigations.iter().any(|n| n.name == navigation.name) {
                secondary.navigations.push(navigation.clone());
            }
        }
        Ok(record(StructureKind::Navigation, navigation.name.clone(), &fields, targets))
    }
}

fn record(
    kind: StructureKind,
    structure: String,
    fields: &[String],
    targets: BTreeSet<PartitionId>,
) -> ReplicationRecord {
    if targets.is_empty() {
        info!(kind = %kind, structure = %structure, "No secondary covers structure; not replicated");
    } else {
        debug!(kind = %kind, structure = %structure, targets = targets.len(), "Replicated structure");
    }
    ReplicationRecord {
        kind,
        structure,
        fields: fields.to_vec(),
        targets: targets.into_iter().collect(),
    }
}
