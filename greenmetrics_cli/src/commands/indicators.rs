use anyhow::Result;
use clap::Args;
use greenmetrics_lib::rows_for_innovation;

use crate::config::AppPaths;
use crate::output::{print_json, print_mapping_table, OutputFormat};

#[derive(Args)]
pub struct IndicatorsArgs {
    /// Innovation display name
    pub name: String,
}

pub fn run(args: &IndicatorsArgs, paths: &AppPaths, format: &OutputFormat) -> Result<()> {
    let bundle = super::load_bundle(paths)?;

    let rows = rows_for_innovation(&bundle, &args.name);
    if rows.is_empty() {
        println!("no indicators linked to innovation '{}'", args.name);
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_mapping_table(&bundle, &rows),
        OutputFormat::Json => print_json(&rows)?,
    }
    Ok(())
}
