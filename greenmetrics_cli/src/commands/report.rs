use anyhow::Result;
use clap::Args;
use greenmetrics_lib::{
    count_by_category, filter_records, mean_by_category, ReportFilter, ResultsStore,
};
use serde::Serialize;

use crate::config::AppPaths;
use crate::output::{
    print_counts_table, print_json, print_means_table, print_results_table, OutputFormat,
};

#[derive(Args)]
pub struct ReportArgs {
    /// Only records from this project
    #[arg(long)]
    pub project: Option<String>,

    /// Only records for this innovation
    #[arg(long)]
    pub innovation: Option<String>,
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    records: Vec<&'a greenmetrics_lib::ResultRecord>,
    mean_by_category: Vec<greenmetrics_lib::report::CategoryMean>,
    count_by_category: Vec<greenmetrics_lib::report::CategoryCount>,
}

pub fn run(args: &ReportArgs, paths: &AppPaths, format: &OutputFormat) -> Result<()> {
    let store = ResultsStore::new(&paths.results);
    let all = store.load()?;

    let filter = ReportFilter {
        project: args.project.clone(),
        innovation: args.innovation.clone(),
    };
    let selected = filter_records(&all, &filter);

    if selected.is_empty() {
        println!("no stored results match the selected filters");
        return Ok(());
    }

    let means = mean_by_category(&selected);
    let counts = count_by_category(&selected);

    match format {
        OutputFormat::Json => print_json(&ReportDocument {
            records: selected,
            mean_by_category: means,
            count_by_category: counts,
        })?,
        OutputFormat::Table => {
            println!("Recorded values");
            print_results_table(&selected);
            println!();
            println!("Mean value by category");
            print_means_table(&means);
            println!();
            println!("Filled indicators by category");
            print_counts_table(&counts);
        }
    }
    Ok(())
}
