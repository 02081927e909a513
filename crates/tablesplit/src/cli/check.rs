//! `tablesplit check`

use super::compose::effective_options;
use super::config::CliConfig;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tablesplit_schema::NamingConvention;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Declaration file (.toml or .json)
    pub file: PathBuf,

    /// Naming convention for unset storage names (preserve, upper_snake)
    #[arg(long)]
    pub naming: Option<NamingConvention>,

    /// Also link each secondary to the one declared before it
    #[arg(long)]
    pub sibling_chaining: bool,
}

pub fn run(args: CheckArgs, config: &CliConfig) -> Result<()> {
    let options = effective_options(&config.compose, args.naming, args.sibling_chaining);
    let schema = super::compose_file(&args.file, options)?;

    let replicated = schema
        .replications()
        .iter()
        .filter(|r| r.is_replicated())
        .count();
    println!(
        "OK: {} composes (primary '{}', {} secondaries, {} of {} structures replicated)",
        args.file.display(),
        schema.primary_id(),
        schema.secondaries().count(),
        replicated,
        schema.replications().len()
    );
    Ok(())
}
