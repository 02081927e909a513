//! Capability registry
//!
//! Tracks, per capability name, the field list it contributes and the
//! secondary partitions that declare it, plus a field-name index used to
//! decide where secondary structures can be replicated.

use crate::error::{SchemaError, SchemaResult};
use crate::model::{PartitionDescriptor, PartitionId};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// A capability as first registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredCapability {
    fields: Vec<String>,
    /// Declaring partitions, in registration order
    partitions: Vec<PartitionId>,
}

impl RegisteredCapability {
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn partitions(&self) -> &[PartitionId] {
        &self.partitions
    }
}

/// A secondary capability the primary does not fully cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageGap {
    pub capability: String,
    /// First partition (by registration) declaring the capability
    pub partition: PartitionId,
    pub missing_fields: Vec<String>,
}

impl From<CoverageGap> for SchemaError {
    fn from(gap: CoverageGap) -> Self {
        SchemaError::MissingCapabilityCoverage {
            capability: gap.capability,
            partition: gap.partition,
            missing_fields: gap.missing_fields,
        }
    }
}

#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    capabilities: BTreeMap<String, RegisteredCapability>,
    field_index: BTreeMap<String, BTreeSet<PartitionId>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a secondary partition's capabilities and fields.
    ///
    /// The first declaration of a capability fixes its field list. An
    /// identical re-declaration is accepted; a different list fails with
    /// `ConflictingCapability` and leaves the registry untouched.
    pub fn register(&mut self, partition: &PartitionDescriptor) -> SchemaResult<()> {
        let mut staged: BTreeMap<&str, &[String]> = BTreeMap::new();
        for capability in &partition.capabilities {
            let registered = self
                .capabilities
                .get(&capability.name)
                .map(|c| c.fields.as_slice())
                .or_else(|| staged.get(capability.name.as_str()).copied());

            match registered {
                Some(fields) if fields != capability.fields.as_slice() => {
                    return Err(SchemaError::ConflictingCapability {
                        capability: capability.name.clone(),
                        partition: partition.id.clone(),
                        registered: fields.to_vec(),
                        conflicting: capability.fields.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    staged.insert(&capability.name, &capability.fields);
                }
            }
        }

        for capability in &partition.capabilities {
            let entry = self
                .capabilities
                .entry(capability.name.clone())
                .or_insert_with(|| RegisteredCapability {
                    fields: capability.fields.clone(),
                    partitions: Vec::new(),
                });
            if !entry.partitions.contains(&partition.id) {
                entry.partitions.push(partition.id.clone());
            }
        }

        for field in &partition.fields {
            self.record_field(&partition.id, &field.name);
        }

        debug!(
            partition = %partition.id,
            capabilities = partition.capabilities.len(),
            fields = partition.fields.len(),
            "Registered secondary partition"
        );
        Ok(())
    }

    /// Note that `partition` carries `field` (e.g. identity fields added
    /// during composition).
    pub fn record_field(&mut self, partition: &PartitionId, field: &str) {
        self.field_index
            .entry(field.to_string())
            .or_default()
            .insert(partition.clone());
    }

    /// Capabilities declared by any secondary that the primary does not
    /// cover. An empty result means coverage holds.
    ///
    /// A field is covered when the primary declares the same capability
    /// listing that field, and the primary actually carries the field.
    pub fn coverage_check(&self, primary: &PartitionDescriptor) -> Vec<CoverageGap> {
        let mut gaps = Vec::new();
        for (name, registered) in &self.capabilities {
            let declared = primary.capability(name);
            let missing_fields: Vec<String> = registered
                .fields
                .iter()
                .filter(|field| {
                    let listed = declared.is_some_and(|c| c.fields.contains(field));
                    !(listed && primary.has_field(field))
                })
                .cloned()
                .collect();

            if missing_fields.is_empty() {
                continue;
            }
            let Some(partition) = registered.partitions.first() else {
                continue;
            };
            gaps.push(CoverageGap {
                capability: name.clone(),
                partition: partition.clone(),
                missing_fields,
            });
        }
        gaps
    }

    pub fn capability(&self, name: &str) -> Option<&RegisteredCapability> {
        self.capabilities.get(name)
    }

    pub fn capability_names(&self) -> impl Iterator<Item = &str> {
        self.capabilities.keys().map(String::as_str)
    }

    /// Secondary partitions carrying `field`
    pub fn partitions_with_field(&self, field: &str) -> Option<&BTreeSet<PartitionId>> {
        self.field_index.get(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CapabilityDescriptor, FieldDescriptor, ScalarType};

    fn secondary(id: &str, capability: CapabilityDescriptor) -> PartitionDescriptor {
        let mut partition = PartitionDescriptor::secondary(id);
        for field in &capability.fields {
            partition = partition.with_field(FieldDescriptor::new(field.clone(), ScalarType::String));
        }
        partition.with_capability(capability)
    }

    #[test]
    fn test_register_builds_field_index() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register(&secondary("S1", CapabilityDescriptor::new("AB", ["A", "B"])))
            .unwrap();
        registry
            .register(&secondary("S2", CapabilityDescriptor::new("A", ["A"])))
            .unwrap();

        let with_a = registry.partitions_with_field("A").unwrap();
        assert_eq!(with_a.len(), 2);
        let with_b = registry.partitions_with_field("B").unwrap();
        assert!(with_b.contains(&PartitionId::from("S1")));
        assert!(!with_b.contains(&PartitionId::from("S2")));
        assert!(registry.partitions_with_field("C").is_none());
    }

    #[test]
    fn test_identical_redeclaration_is_ignored() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register(&secondary("S1", CapabilityDescriptor::new("Info", ["Name"])))
            .unwrap();
        registry
            .register(&secondary("S2", CapabilityDescriptor::new("Info", ["Name"])))
            .unwrap();

        let info = registry.capability("Info").unwrap();
        assert_eq!(info.fields(), ["Name".to_string()]);
        assert_eq!(info.partitions().len(), 2);
    }

    #[test]
    fn test_conflicting_redeclaration_fails() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register(&secondary("S1", CapabilityDescriptor::new("Info", ["Name"])))
            .unwrap();

        let err = registry
            .register(&secondary("S2", CapabilityDescriptor::new("Info", ["Name", "Description"])))
            .unwrap_err();

        match err {
            SchemaError::ConflictingCapability {
                capability,
                partition,
                registered,
                conflicting,
            } => {
                assert_eq!(capability, "Info");
                assert_eq!(partition.as_str(), "S2");
                assert_eq!(registered, vec!["Name"]);
                assert_eq!(conflicting, vec!["Name", "Description"]);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Rejected partition left no trace
        assert_eq!(registry.capability("Info").unwrap().partitions().len(), 1);
        assert!(registry.partitions_with_field("Description").is_none());
    }

    #[test]
    fn test_conflict_within_one_partition() {
        let partition = PartitionDescriptor::secondary("S1")
            .with_field(FieldDescriptor::new("A", ScalarType::String))
            .with_field(FieldDescriptor::new("B", ScalarType::String))
            .with_capability(CapabilityDescriptor::new("X", ["A"]))
            .with_capability(CapabilityDescriptor::new("X", ["B"]));

        let mut registry = CapabilityRegistry::new();
        let err = registry.register(&partition).unwrap_err();
        assert_eq!(err.code(), "CONFLICTING_CAPABILITY");
    }

    #[test]
    fn test_coverage_check_reports_missing_fields() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register(&secondary(
                "TaskGeneral",
                CapabilityDescriptor::new("TaskInfo", ["Name", "Description"]),
            ))
            .unwrap();

        let primary = PartitionDescriptor::primary("Task")
            .with_field(FieldDescriptor::new("Name", ScalarType::String))
            .with_capability(CapabilityDescriptor::new("TaskInfo", ["Name"]));

        let gaps = registry.coverage_check(&primary);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].capability, "TaskInfo");
        assert_eq!(gaps[0].partition.as_str(), "TaskGeneral");
        assert_eq!(gaps[0].missing_fields, vec!["Description"]);
    }

    #[test]
    fn test_coverage_check_requires_primary_declaration() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register(&secondary("S1", CapabilityDescriptor::new("Dates", ["StartDate"])))
            .unwrap();

        // Field exists on the primary but the capability is not declared there
        let primary = PartitionDescriptor::primary("Task")
            .with_field(FieldDescriptor::new("StartDate", ScalarType::DateTime));

        let gaps = registry.coverage_check(&primary);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].missing_fields, vec!["StartDate"]);

        let primary = primary.with_capability(CapabilityDescriptor::new("Dates", ["StartDate"]));
        assert!(registry.coverage_check(&primary).is_empty());
    }
}
