use anyhow::Result;
use clap::Args;
use greenmetrics_lib::Innovation;

use crate::config::AppPaths;
use crate::output::{print_innovations_table, print_json, OutputFormat};

#[derive(Args)]
pub struct InnovationsArgs {
    /// Only innovations carrying this tag (case-insensitive)
    #[arg(long)]
    pub tag: Option<String>,
}

pub fn run(args: &InnovationsArgs, paths: &AppPaths, format: &OutputFormat) -> Result<()> {
    let bundle = super::load_bundle(paths)?;

    let mut selected: Vec<&Innovation> = match &args.tag {
        Some(tag) => bundle.innovations_with_tag(tag),
        None => bundle.innovations.iter().collect(),
    };
    selected.sort_by(|a, b| a.name.cmp(&b.name));

    if selected.is_empty() {
        println!("no innovations match");
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_innovations_table(&selected),
        OutputFormat::Json => print_json(&selected)?,
    }
    Ok(())
}
