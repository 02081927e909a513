//! CLI command implementations

pub mod check;
pub mod compose;
pub mod config;
pub mod error;
pub mod group;
pub mod output;

use anyhow::Result;
use error::HelpfulError;
use std::path::Path;
use tablesplit_schema::{ComposeOptions, ComposedSchema, SchemaDeclaration};
use tracing::info;

/// Read a declaration file. `.json` files are parsed as JSON, everything
/// else as TOML.
pub fn read_declaration(path: &Path) -> Result<SchemaDeclaration> {
    if !path.is_file() {
        return Err(HelpfulError::file_not_found(path).into());
    }
    let source = std::fs::read_to_string(path)
        .map_err(|err| HelpfulError::cannot_read_file(path, &err.to_string()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        SchemaDeclaration::from_json_str(&source)
    } else {
        SchemaDeclaration::from_toml_str(&source)
    };
    let declaration =
        parsed.map_err(|err| HelpfulError::invalid_declaration(path, &err.to_string()))?;

    info!(
        path = %path.display(),
        partitions = declaration.partitions.len(),
        "Read declaration"
    );
    Ok(declaration)
}

/// Read and compose a declaration file.
pub fn compose_file(path: &Path, options: ComposeOptions) -> Result<ComposedSchema> {
    let declaration = read_declaration(path)?;
    declaration
        .compose(options)
        .map_err(|err| HelpfulError::composition_failed(path, &err).into())
}
