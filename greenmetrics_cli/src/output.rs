use anyhow::Result;
use greenmetrics_lib::{
    CatalogBundle, IndicatorRow, Innovation, ResultRecord,
};
use greenmetrics_lib::report::{CategoryCount, CategoryMean};
use greenmetrics_lib::session::EntryProblem;
use serde::Serialize;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Tabled, Serialize)]
struct InnovationRow {
    #[tabled(rename = "Innovation")]
    #[serde(rename = "Innovation")]
    name: String,
    #[tabled(rename = "Tags")]
    #[serde(rename = "Tags")]
    tags: String,
    #[tabled(rename = "Engagement")]
    #[serde(rename = "Engagement")]
    engagement: String,
}

#[derive(Tabled, Serialize)]
struct MappingRow {
    #[tabled(rename = "Indicator (PT)")]
    #[serde(rename = "Indicator (PT)")]
    pt_label: String,
    #[tabled(rename = "Mapped Reference")]
    #[serde(rename = "Mapped Reference")]
    reference: String,
    #[tabled(rename = "Method")]
    #[serde(rename = "Method")]
    method: String,
    #[tabled(rename = "Domain")]
    #[serde(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Measurement (model)")]
    #[serde(rename = "Measurement (model)")]
    measurement: String,
}

#[derive(Tabled, Serialize)]
struct ProblemRow {
    #[tabled(rename = "Indicator")]
    #[serde(rename = "Indicator")]
    indicator: String,
    #[tabled(rename = "Problem")]
    #[serde(rename = "Problem")]
    problem: String,
}

#[derive(Tabled, Serialize)]
struct ResultRow {
    #[tabled(rename = "Innovation")]
    #[serde(rename = "Innovation")]
    innovation: String,
    #[tabled(rename = "Category")]
    #[serde(rename = "Category")]
    category: String,
    #[tabled(rename = "Indicator (PT)")]
    #[serde(rename = "Indicator (PT)")]
    indicator_pt: String,
    #[tabled(rename = "Indicator (model/reference)")]
    #[serde(rename = "Indicator (model/reference)")]
    indicator_reference: String,
    #[tabled(rename = "Normalized Value")]
    #[serde(rename = "Normalized Value")]
    value: String,
    #[tabled(rename = "Measurement (model)")]
    #[serde(rename = "Measurement (model)")]
    model_measurement: String,
    #[tabled(rename = "Reference Measurement")]
    #[serde(rename = "Reference Measurement")]
    reference_measurement: String,
}

#[derive(Tabled, Serialize)]
struct MeanRow {
    #[tabled(rename = "Category")]
    #[serde(rename = "Category")]
    category: String,
    #[tabled(rename = "Mean Value")]
    #[serde(rename = "Mean Value")]
    mean: String,
    #[tabled(rename = "Indicators")]
    #[serde(rename = "Indicators")]
    count: usize,
}

#[derive(Tabled, Serialize)]
struct CountRow {
    #[tabled(rename = "Category")]
    #[serde(rename = "Category")]
    category: String,
    #[tabled(rename = "Filled Indicators")]
    #[serde(rename = "Filled Indicators")]
    count: usize,
}

// -- Row builders --

fn build_innovation_rows(innovations: &[&Innovation]) -> Vec<InnovationRow> {
    innovations
        .iter()
        .map(|i| InnovationRow {
            name: i.name.clone(),
            tags: i.tags.join("; "),
            engagement: i.engagement.clone().unwrap_or_default(),
        })
        .collect()
}

fn build_mapping_rows(bundle: &CatalogBundle, rows: &[IndicatorRow]) -> Vec<MappingRow> {
    rows.iter()
        .map(|row| MappingRow {
            pt_label: row.pt_label.clone(),
            reference: row.reference_label.clone().unwrap_or_default(),
            method: bundle
                .mapping_for(&row.pt_label)
                .map(|m| m.method.as_str())
                .unwrap_or("none")
                .to_string(),
            domain: row.domain().as_str().to_string(),
            measurement: row.model_measurement.clone().unwrap_or_default(),
        })
        .collect()
}

fn build_problem_rows(problems: &[EntryProblem]) -> Vec<ProblemRow> {
    problems
        .iter()
        .map(|p| ProblemRow {
            indicator: p.indicator.clone(),
            problem: p.problem.clone(),
        })
        .collect()
}

fn build_result_rows(records: &[&ResultRecord]) -> Vec<ResultRow> {
    records
        .iter()
        .map(|r| ResultRow {
            innovation: r.innovation.clone(),
            category: r.category.clone(),
            indicator_pt: r.indicator_pt.clone(),
            indicator_reference: r.indicator_reference.clone(),
            value: format_value(r.normalized_value),
            model_measurement: r.model_measurement.clone(),
            reference_measurement: r.reference_measurement.clone(),
        })
        .collect()
}

fn build_mean_rows(means: &[CategoryMean]) -> Vec<MeanRow> {
    means
        .iter()
        .map(|m| MeanRow {
            category: m.category.clone(),
            mean: format_value(m.mean),
            count: m.count,
        })
        .collect()
}

fn build_count_rows(counts: &[CategoryCount]) -> Vec<CountRow> {
    counts
        .iter()
        .map(|c| CountRow {
            category: c.category.clone(),
            count: c.count,
        })
        .collect()
}

/// Trim trailing zeros off a normalized value for display.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

// -- Table output --

pub fn print_innovations_table(innovations: &[&Innovation]) {
    println!("{}", Table::new(build_innovation_rows(innovations)));
}

pub fn print_mapping_table(bundle: &CatalogBundle, rows: &[IndicatorRow]) {
    println!("{}", Table::new(build_mapping_rows(bundle, rows)));
}

pub fn print_problems_table(problems: &[EntryProblem]) {
    println!("{}", Table::new(build_problem_rows(problems)));
}

pub fn print_results_table(records: &[&ResultRecord]) {
    println!("{}", Table::new(build_result_rows(records)));
}

pub fn print_means_table(means: &[CategoryMean]) {
    println!("{}", Table::new(build_mean_rows(means)));
}

pub fn print_counts_table(counts: &[CategoryCount]) {
    println!("{}", Table::new(build_count_rows(counts)));
}

// -- JSON output --

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_value_integral() {
        assert_eq!(format_value(25.0), "25");
    }

    #[test]
    fn format_value_fractional() {
        assert_eq!(format_value(120.5), "120.50");
    }

    #[test]
    fn innovation_rows_join_tags() {
        let innovation = Innovation {
            name: "Smart Irrigation".to_string(),
            description: "Precision watering".to_string(),
            engagement: None,
            tags: vec!["water".to_string(), "climate".to_string()],
        };
        let rows = build_innovation_rows(&[&innovation]);
        assert_eq!(rows[0].tags, "water; climate");
        assert_eq!(rows[0].engagement, "");
    }
}
