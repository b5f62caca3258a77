use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Args;
use greenmetrics_lib::{rows_for_innovation, CommitError, ResultsStore, Session};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::AppPaths;
use crate::output::{print_json, print_problems_table, print_results_table, OutputFormat};

#[derive(Args)]
pub struct SubmitArgs {
    /// Innovation the values belong to
    #[arg(long)]
    pub innovation: String,

    /// Project / use-case name recorded with every value
    #[arg(long, default_value = "")]
    pub project: String,

    /// CSV file of measured values: columns `Indicator,Value` and an
    /// optional `Fraction` column (true when a percentage is given as 0-1)
    #[arg(long)]
    pub values: PathBuf,
}

/// One line of the values file.
struct ValueEntry {
    raw: String,
    fraction: bool,
}

fn read_values_file(path: &PathBuf) -> Result<HashMap<String, ValueEntry>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open values file {}", path.display()))?;
    let headers = rdr.headers()?.clone();
    let indicator_col = headers
        .iter()
        .position(|h| h.trim() == "Indicator")
        .context("values file is missing required column 'Indicator'")?;
    let value_col = headers
        .iter()
        .position(|h| h.trim() == "Value")
        .context("values file is missing required column 'Value'")?;
    let fraction_col = headers.iter().position(|h| h.trim() == "Fraction");

    let mut values = HashMap::new();
    for record in rdr.records() {
        let record = record?;
        let indicator = record.get(indicator_col).unwrap_or("").trim().to_string();
        if indicator.is_empty() {
            continue;
        }
        let raw = record.get(value_col).unwrap_or("").trim().to_string();
        let fraction = fraction_col
            .and_then(|i| record.get(i))
            .map(|cell| {
                matches!(
                    cell.trim().to_lowercase().as_str(),
                    "true" | "yes" | "1"
                )
            })
            .unwrap_or(false);
        values.insert(indicator, ValueEntry { raw, fraction });
    }
    Ok(values)
}

pub fn run(args: &SubmitArgs, paths: &AppPaths, format: &OutputFormat) -> Result<()> {
    let bundle = super::load_bundle(paths)?;
    let values = read_values_file(&args.values)?;

    let rows = rows_for_innovation(&bundle, &args.innovation);
    if rows.is_empty() {
        bail!(
            "no indicators linked to innovation '{}' in the link catalog",
            args.innovation
        );
    }

    let mut session = Session::new(args.project.clone());
    for (i, row) in rows.iter().enumerate() {
        if let Some(entry) = values.get(row.display_label()) {
            session.record_entry(row, i, &entry.raw, entry.fraction);
        }
    }

    let records = match session.commit(&bundle, &args.innovation, Local::now().naive_local()) {
        Ok(records) => records,
        Err(CommitError::Incomplete(problems)) => {
            eprintln!("commit rejected: invalid or missing values, nothing was saved");
            match format {
                OutputFormat::Table => print_problems_table(&problems),
                OutputFormat::Json => print_json(&problems.iter().map(|p| {
                    serde_json::json!({ "Indicator": p.indicator, "Problem": p.problem })
                }).collect::<Vec<_>>())?,
            }
            bail!("{} indicator(s) need correction", problems.len());
        }
        Err(err) => return Err(err.into()),
    };

    let store = ResultsStore::new(&paths.results);
    let total = store.append(&records)?;

    let committed: Vec<&greenmetrics_lib::ResultRecord> = records.iter().collect();
    match format {
        OutputFormat::Table => print_results_table(&committed),
        OutputFormat::Json => print_json(&committed)?,
    }
    println!(
        "saved {} value(s) for '{}' to {} ({} total records)",
        records.len(),
        args.innovation,
        store.path().display(),
        total
    );
    Ok(())
}
