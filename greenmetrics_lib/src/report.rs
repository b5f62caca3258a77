//! Aggregation over stored result records for the reporting views.
//!
//! Pure computation: filtering by project and innovation, then group-by
//! over the category column for the two dashboard summaries (mean value
//! per category, count of filled indicators per category).

use serde::Serialize;
use std::collections::HashMap;

use crate::store::ResultRecord;

/// Optional project / innovation filters; `None` means "all".
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub project: Option<String>,
    pub innovation: Option<String>,
}

impl ReportFilter {
    fn matches(&self, record: &ResultRecord) -> bool {
        if let Some(project) = &self.project {
            if &record.project != project {
                return false;
            }
        }
        if let Some(innovation) = &self.innovation {
            if &record.innovation != innovation {
                return false;
            }
        }
        true
    }
}

/// Records passing the filter, in stored order.
pub fn filter_records<'a>(records: &'a [ResultRecord], filter: &ReportFilter) -> Vec<&'a ResultRecord> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CategoryMean {
    pub category: String,
    pub mean: f64,
    pub count: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Mean normalized value per category, sorted by mean descending, then by
/// category name for a deterministic order on ties.
pub fn mean_by_category(records: &[&ResultRecord]) -> Vec<CategoryMean> {
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for record in records {
        let entry = sums.entry(record.category.as_str()).or_insert((0.0, 0));
        entry.0 += record.normalized_value;
        entry.1 += 1;
    }

    let mut rows: Vec<CategoryMean> = sums
        .into_iter()
        .map(|(category, (sum, count))| CategoryMean {
            category: category.to_string(),
            mean: sum / count as f64,
            count,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.mean
            .partial_cmp(&a.mean)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    rows
}

/// Number of filled indicators per category, sorted by count descending,
/// then by category name.
pub fn count_by_category(records: &[&ResultRecord]) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.category.as_str()).or_insert(0) += 1;
    }

    let mut rows: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    rows
}
