//! `tablesplit compose`

use super::config::CliConfig;
use super::output::{join_or_dash, print_json, print_table};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tablesplit_schema::{ComposeOptions, ComposedSchema, NamingConvention};

#[derive(Debug, Args)]
pub struct ComposeArgs {
    /// Declaration file (.toml or .json)
    pub file: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Naming convention for unset storage names (preserve, upper_snake)
    #[arg(long)]
    pub naming: Option<NamingConvention>,

    /// Also link each secondary to the one declared before it
    #[arg(long)]
    pub sibling_chaining: bool,
}

/// Flags win over the config file
pub fn effective_options(
    config: &ComposeOptions,
    naming: Option<NamingConvention>,
    sibling_chaining: bool,
) -> ComposeOptions {
    let mut options = *config;
    if let Some(naming) = naming {
        options = options.with_naming(naming);
    }
    if sibling_chaining {
        options = options.with_sibling_chaining(true);
    }
    options
}

pub fn run(args: ComposeArgs, config: &CliConfig) -> Result<()> {
    let options = effective_options(&config.compose, args.naming, args.sibling_chaining);
    let schema = super::compose_file(&args.file, options)?;
    let fingerprint = schema.fingerprint()?;

    if args.json {
        return print_json(&serde_json::json!({
            "fingerprint": fingerprint,
            "schema": schema,
        }));
    }

    print_schema(&schema);
    println!();
    println!("Fingerprint: {}", fingerprint);
    Ok(())
}

fn role(is_primary: bool) -> &'static str {
    if is_primary {
        "primary"
    } else {
        "secondary"
    }
}

fn print_schema(schema: &ComposedSchema) {
    let rows = schema
        .partitions()
        .map(|partition| {
            let links = partition
                .identity_links()
                .iter()
                .map(|link| link.principal.to_string())
                .collect::<Vec<_>>();
            vec![
                partition.id().to_string(),
                role(partition.is_primary()).to_string(),
                partition.table().to_string(),
                join_or_dash(partition.fields().iter().map(|f| f.name.as_str())),
                join_or_dash(links),
                partition.indexes().len().to_string(),
                partition.foreign_keys().len().to_string(),
                partition.navigations().len().to_string(),
            ]
        })
        .collect();
    print_table(
        &["Partition", "Role", "Table", "Fields", "Links to", "Indexes", "FKs", "Navigations"],
        rows,
    );

    if schema.replications().is_empty() {
        return;
    }
    println!();
    let rows = schema
        .replications()
        .iter()
        .map(|record| {
            vec![
                record.kind.to_string(),
                record.structure.clone(),
                join_or_dash(record.targets.iter().map(|t| t.as_str())),
            ]
        })
        .collect();
    print_table(&["Kind", "Structure", "Replicated to"], rows);
}
