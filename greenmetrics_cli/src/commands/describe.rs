use anyhow::{bail, Result};
use clap::Args;

use crate::config::AppPaths;
use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct DescribeArgs {
    /// Innovation display name (as listed by `innovations`)
    pub name: String,
}

pub fn run(args: &DescribeArgs, paths: &AppPaths, format: &OutputFormat) -> Result<()> {
    let bundle = super::load_bundle(paths)?;

    let Some(innovation) = bundle.innovation(&args.name) else {
        bail!("innovation '{}' not found in the catalog", args.name);
    };

    match format {
        OutputFormat::Json => print_json(innovation)?,
        OutputFormat::Table => {
            println!("{}", innovation.name);
            println!();
            println!("{}", innovation.description);
            if let Some(engagement) = &innovation.engagement {
                println!();
                println!("Engagement: {}", engagement);
            }
            if !innovation.tags.is_empty() {
                println!();
                println!("Tags: {}", innovation.tags.join(", "));
            }
        }
    }
    Ok(())
}
