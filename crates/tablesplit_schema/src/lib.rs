//! Table-Splitting Schema Composition
//!
//! One logical record, several physical partitions, one shared identity.
//!
//! Given a primary partition and any number of secondary partitions that
//! implement named capabilities (groups of fields), composition:
//!
//! 1. Validates that the primary covers every secondary capability
//! 2. Links each secondary to the primary with a required one-to-one
//!    identity relationship
//! 3. Mirrors physical field attributes from the primary onto secondaries
//! 4. Replicates primary indexes, foreign keys and navigations onto exactly
//!    the secondaries whose fields cover them
//!
//! The result is a frozen [`ComposedSchema`]. Composition never performs
//! I/O and never returns a partial schema.
//!
//! # Modules
//!
//! - [`model`]: Partition, field and structure descriptors
//! - [`registry`]: Capability registry and field index
//! - [`mirror`]: Field attribute mirroring
//! - [`replicate`]: Minimal structure replication
//! - [`composer`]: Fail-fast orchestration and state machine
//! - [`composed`]: The frozen, versioned output contract
//! - [`naming`]: Storage naming conventions
//! - [`declaration`]: TOML/JSON declarations

pub mod composed;
pub mod composer;
pub mod declaration;
pub mod error;
pub mod mirror;
pub mod model;
pub mod naming;
pub mod registry;
pub mod replicate;

pub use composed::{
    ComposedPartition, ComposedSchema, IdentityLink, ReplicationRecord, SCHEMA_FORMAT_VERSION,
};
pub use composer::{compose, ComposeOptions, ComposerState, SchemaComposer};
pub use declaration::{DeclarationError, SchemaDeclaration};
pub use error::{SchemaError, SchemaResult};
pub use model::*;
pub use naming::NamingConvention;
pub use registry::{CapabilityRegistry, CoverageGap};
