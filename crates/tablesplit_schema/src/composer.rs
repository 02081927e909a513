//! Schema composer
//!
//! Drives one composition attempt through its states:
//!
//! ```text
//! Unconfigured -> PrimaryRegistered -> SecondariesRegistered -> Composed
//!        \                 \                     \
//!         `-----------------`---------------------`----------> Failed
//! ```
//!
//! `Composed` and `Failed` are terminal. Every check is fail-fast: the first
//! violation moves the composer to `Failed` and is returned again for any
//! later call. No partial schema is ever handed out.

use crate::composed::{ComposedPartition, ComposedSchema, IdentityLink, ReplicationRecord};
use crate::error::{SchemaError, SchemaResult};
use crate::mirror::FieldMirror;
use crate::model::{PartitionDescriptor, PartitionId};
use crate::naming::{apply_convention, NamingConvention};
use crate::registry::CapabilityRegistry;
use crate::replicate::StructureReplicator;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComposerState {
    Unconfigured,
    PrimaryRegistered,
    SecondariesRegistered,
    Composed,
    Failed,
}

impl ComposerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ComposerState::Composed | ComposerState::Failed)
    }
}

impl fmt::Display for ComposerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposerState::Unconfigured => write!(f, "unconfigured"),
            ComposerState::PrimaryRegistered => write!(f, "primary registered"),
            ComposerState::SecondariesRegistered => write!(f, "secondaries registered"),
            ComposerState::Composed => write!(f, "composed"),
            ComposerState::Failed => write!(f, "failed"),
        }
    }
}

/// Options for a composition run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeOptions {
    /// Convention applied to unset storage names
    pub naming: NamingConvention,

    /// Also link each secondary to the one registered before it
    pub sibling_chaining: bool,
}

impl ComposeOptions {
    pub fn with_naming(mut self, naming: NamingConvention) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_sibling_chaining(mut self, enabled: bool) -> Self {
        self.sibling_chaining = enabled;
        self
    }
}

pub struct SchemaComposer {
    options: ComposeOptions,
    state: ComposerState,
    primary: Option<PartitionDescriptor>,
    /// Registration order is preserved
    secondaries: Vec<PartitionDescriptor>,
    registry: CapabilityRegistry,
    failure: Option<SchemaError>,
}

impl SchemaComposer {
    pub fn new(options: ComposeOptions) -> Self {
        Self {
            options,
            state: ComposerState::Unconfigured,
            primary: None,
            secondaries: Vec::new(),
            registry: CapabilityRegistry::new(),
            failure: None,
        }
    }

    pub fn state(&self) -> ComposerState {
        self.state
    }

    pub fn options(&self) -> &ComposeOptions {
        &self.options
    }

    /// The error that moved the composer to `Failed`
    pub fn failure(&self) -> Option<&SchemaError> {
        self.failure.as_ref()
    }

    /// Register a partition according to its `is_primary` flag
    pub fn register(&mut self, partition: PartitionDescriptor) -> SchemaResult<()> {
        if partition.is_primary {
            self.register_primary(partition)
        } else {
            self.register_secondary(partition)
        }
    }

    pub fn register_primary(&mut self, mut partition: PartitionDescriptor) -> SchemaResult<()> {
        self.ensure_open()?;

        if let Some(existing) = &self.primary {
            let err = SchemaError::DuplicatePrimary {
                existing: existing.id.clone(),
                duplicate: partition.id,
            };
            return Err(self.fail(err));
        }
        if let Some(field) = partition.duplicate_field() {
            let err = SchemaError::DuplicateField {
                partition: partition.id.clone(),
                field: field.to_string(),
            };
            return Err(self.fail(err));
        }

        partition.is_primary = true;
        debug!(partition = %partition.id, "Registered primary partition");
        self.primary = Some(partition);
        self.transition(ComposerState::PrimaryRegistered);
        Ok(())
    }

    pub fn register_secondary(&mut self, partition: PartitionDescriptor) -> SchemaResult<()> {
        self.ensure_open()?;

        let Some(primary) = &self.primary else {
            return Err(self.fail(SchemaError::MissingPrimary));
        };
        if partition.is_primary {
            let err = SchemaError::DuplicatePrimary {
                existing: primary.id.clone(),
                duplicate: partition.id,
            };
            return Err(self.fail(err));
        }
        if primary.id == partition.id || self.secondaries.iter().any(|s| s.id == partition.id) {
            return Err(self.fail(SchemaError::DuplicatePartition(partition.id)));
        }
        if let Some(field) = partition.duplicate_field() {
            let err = SchemaError::DuplicateField {
                partition: partition.id.clone(),
                field: field.to_string(),
            };
            return Err(self.fail(err));
        }
        if let Err(err) = self.registry.register(&partition) {
            return Err(self.fail(err));
        }

        self.secondaries.push(partition);
        self.transition(ComposerState::SecondariesRegistered);
        Ok(())
    }

    /// Run the full composition. Succeeds at most once.
    pub fn compose(&mut self) -> SchemaResult<ComposedSchema> {
        self.ensure_open()?;

        match self.run() {
            Ok(schema) => {
                self.transition(ComposerState::Composed);
                info!(
                    primary = %schema.primary_id(),
                    partitions = schema.partitions().count(),
                    replications = schema.replications().len(),
                    "Schema composed"
                );
                Ok(schema)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn run(&mut self) -> SchemaResult<ComposedSchema> {
        // 1. Exactly one primary (duplicates are rejected at registration)
        let mut primary = self.primary.take().ok_or(SchemaError::MissingPrimary)?;
        let mut secondaries = std::mem::take(&mut self.secondaries);

        // 2. Primary identity
        if primary.identity_fields.is_empty() {
            return Err(SchemaError::MissingPrimaryKey(primary.id));
        }
        let identity = primary.identity_fields.clone();
        if let Some(missing) = identity.iter().find(|name| !primary.has_field(name)) {
            return Err(SchemaError::UnknownField {
                partition: primary.id.clone(),
                field: missing.clone(),
            });
        }
        for field in primary.fields.iter_mut().filter(|f| identity.contains(&f.name)) {
            field.identity = true;
        }

        // 3. Capability coverage
        if let Some(gap) = self.registry.coverage_check(&primary).into_iter().next() {
            return Err(gap.into());
        }
        for capability in &primary.capabilities {
            if let Some(registered) = self.registry.capability(&capability.name) {
                if registered.fields() != capability.fields.as_slice() {
                    return Err(SchemaError::ConflictingCapability {
                        capability: capability.name.clone(),
                        partition: primary.id.clone(),
                        registered: registered.fields().to_vec(),
                        conflicting: capability.fields.clone(),
                    });
                }
            }
        }

        // 4. Identity links; secondaries carry the primary's identity fields
        let mirror = FieldMirror::new(&primary);
        let ids: Vec<PartitionId> = secondaries.iter().map(|s| s.id.clone()).collect();
        let mut links: Vec<Vec<IdentityLink>> = Vec::with_capacity(secondaries.len());
        for (position, secondary) in secondaries.iter_mut().enumerate() {
            let navigation = match &secondary.identity_navigation {
                Some(nav) if nav.target == primary.id => nav.name.clone(),
                _ => {
                    return Err(SchemaError::MissingIdentityNavigation {
                        partition: secondary.id.clone(),
                        primary: primary.id.clone(),
                    });
                }
            };

            for name in &identity {
                match secondary.field_mut(name) {
                    Some(field) => {
                        mirror.mirror_field(field);
                        field.identity = true;
                    }
                    None => {
                        if let Some(source) = primary.field(name) {
                            let mut field = source.clone();
                            field.identity = true;
                            secondary.fields.push(field);
                        }
                    }
                }
                self.registry.record_field(&secondary.id, name);
            }

            let mut partition_links = vec![IdentityLink::new(
                primary.id.clone(),
                Some(navigation),
                identity.clone(),
            )];
            if self.options.sibling_chaining && position > 0 {
                partition_links.push(IdentityLink::new(
                    ids[position - 1].clone(),
                    None,
                    identity.clone(),
                ));
            }
            debug!(
                partition = %secondary.id,
                links = partition_links.len(),
                "Established identity relationship"
            );
            links.push(partition_links);
        }

        // 5. Mirror capability fields
        for secondary in &mut secondaries {
            mirror.mirror(secondary)?;
        }

        // 6. Replicate primary structures
        let replicator = StructureReplicator::new(&primary, &self.registry);
        let mut replications: Vec<ReplicationRecord> = Vec::new();
        for index in &primary.indexes {
            replications.push(replicator.replicate_index(index, &mut secondaries)?);
        }
        for foreign_key in &primary.foreign_keys {
            replications.push(replicator.replicate_foreign_key(foreign_key, &mut secondaries)?);
        }
        for navigation in &primary.navigations {
            replications.push(replicator.replicate_navigation(navigation, &mut secondaries)?);
        }

        // 7. Naming, then freeze
        apply_convention(self.options.naming, &mut primary);
        for secondary in &mut secondaries {
            apply_convention(self.options.naming, secondary);
        }

        let frozen_secondaries = secondaries
            .into_iter()
            .zip(links)
            .map(|(secondary, links)| ComposedPartition::freeze(secondary, &identity, links))
            .collect();
        let frozen_primary = ComposedPartition::freeze(primary, &identity, Vec::new());

        Ok(ComposedSchema::new(frozen_primary, frozen_secondaries, replications))
    }

    fn ensure_open(&self) -> SchemaResult<()> {
        match self.state {
            ComposerState::Failed => Err(self
                .failure
                .clone()
                .unwrap_or(SchemaError::ComposerClosed { state: self.state })),
            ComposerState::Composed => Err(SchemaError::ComposerClosed { state: self.state }),
            _ => Ok(()),
        }
    }

    fn transition(&mut self, next: ComposerState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "Composer state transition");
            self.state = next;
        }
    }

    fn fail(&mut self, err: SchemaError) -> SchemaError {
        warn!(code = err.code(), error = %err, "Schema composition failed");
        self.transition(ComposerState::Failed);
        self.failure = Some(err.clone());
        err
    }
}

impl Default for SchemaComposer {
    fn default() -> Self {
        Self::new(ComposeOptions::default())
    }
}

/// Compose a full declaration in one call.
///
/// The primary is registered first regardless of its position in
/// `partitions`; secondaries keep their relative order.
pub fn compose(
    partitions: impl IntoIterator<Item = PartitionDescriptor>,
    options: ComposeOptions,
) -> SchemaResult<ComposedSchema> {
    let (primaries, secondaries): (Vec<_>, Vec<_>) =
        partitions.into_iter().partition(|p| p.is_primary);

    let mut composer = SchemaComposer::new(options);
    let mut primaries = primaries.into_iter();
    let Some(primary) = primaries.next() else {
        return Err(SchemaError::MissingPrimary);
    };
    composer.register_primary(primary)?;
    for extra in primaries {
        composer.register_primary(extra)?;
    }
    for secondary in secondaries {
        composer.register_secondary(secondary)?;
    }
    composer.compose()
}
