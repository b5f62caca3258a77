//! Per-session measurement entry state and the all-or-nothing commit.
//!
//! A session owns one mutable map from (innovation, row index) to the
//! outcome of the last edit of that field. Value and error are mutually
//! exclusive by construction: a key is either empty, valid with a
//! normalized value, or invalid with the rejection message. Nothing here
//! outlives the session except through a successful commit.

use chrono::NaiveDateTime;
use std::collections::HashMap;
use thiserror::Error;

use crate::catalog::CatalogBundle;
use crate::join::{rows_for_innovation, IndicatorRow};
use crate::metric::validate_value;
use crate::store::ResultRecord;

/// Composite key for one entry field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
    pub innovation: String,
    pub row_index: usize,
}

/// Outcome of the last edit of an entry field.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryState {
    Empty,
    Valid(f64),
    Invalid(String),
}

/// One rejected row in a failed commit.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryProblem {
    pub indicator: String,
    pub problem: String,
}

/// A commit is all-or-nothing at per-innovation granularity: one bad row
/// rejects the whole set, with every problem reported at once.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("innovation '{0}' has no linked indicators")]
    NoIndicators(String),
    #[error("{} indicator(s) have invalid or missing values", .0.len())]
    Incomplete(Vec<EntryProblem>),
}

/// Interactive session state: the project name and the entry map.
#[derive(Debug, Default)]
pub struct Session {
    pub project_name: String,
    entries: HashMap<EntryKey, EntryState>,
}

impl Session {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            entries: HashMap::new(),
        }
    }

    /// Validate `raw` against the row's measurement text and record the
    /// outcome, overwriting any previous state for the same key. Blank
    /// input clears the field back to `Empty`.
    pub fn record_entry(
        &mut self,
        row: &IndicatorRow,
        row_index: usize,
        raw: &str,
        fraction: bool,
    ) -> EntryState {
        let state = if raw.trim().is_empty() {
            EntryState::Empty
        } else {
            match validate_value(raw, row.model_measurement.as_deref(), fraction) {
                Ok(value) => EntryState::Valid(value),
                Err(err) => EntryState::Invalid(err.to_string()),
            }
        };
        self.entries.insert(
            EntryKey {
                innovation: row.innovation.clone(),
                row_index,
            },
            state.clone(),
        );
        state
    }

    pub fn entry(&self, innovation: &str, row_index: usize) -> Option<&EntryState> {
        self.entries.get(&EntryKey {
            innovation: innovation.to_string(),
            row_index,
        })
    }

    /// Build the persistable records for one innovation.
    ///
    /// Every linked indicator must carry a valid value; otherwise the whole
    /// commit is rejected with the consolidated problem list and nothing is
    /// produced.
    pub fn commit(
        &self,
        bundle: &CatalogBundle,
        innovation: &str,
        now: NaiveDateTime,
    ) -> Result<Vec<ResultRecord>, CommitError> {
        let rows = rows_for_innovation(bundle, innovation);
        if rows.is_empty() {
            return Err(CommitError::NoIndicators(innovation.to_string()));
        }

        let timestamp = now.format("%Y-%m-%d %H:%M:%S").to_string();
        let mut problems = Vec::new();
        let mut records = Vec::new();

        for (i, row) in rows.iter().enumerate() {
            match self.entry(innovation, i) {
                Some(EntryState::Valid(value)) => {
                    records.push(ResultRecord {
                        project: self.project_name.clone(),
                        innovation: row.innovation.clone(),
                        indicator_pt: row.pt_label.clone(),
                        indicator_reference: row.reference_label.clone().unwrap_or_default(),
                        model_description: row.model_description.clone().unwrap_or_default(),
                        model_measurement: row.model_measurement.clone().unwrap_or_default(),
                        category: row.category.clone().unwrap_or_default(),
                        reference_description: row
                            .reference_description
                            .clone()
                            .unwrap_or_default(),
                        reference_measurement: row
                            .reference_measurement
                            .clone()
                            .unwrap_or_default(),
                        normalized_value: *value,
                        timestamp: timestamp.clone(),
                    });
                }
                Some(EntryState::Invalid(problem)) => problems.push(EntryProblem {
                    indicator: row.display_label().to_string(),
                    problem: problem.clone(),
                }),
                Some(EntryState::Empty) | None => problems.push(EntryProblem {
                    indicator: row.display_label().to_string(),
                    problem: "no value provided".to_string(),
                }),
            }
        }

        if !problems.is_empty() {
            return Err(CommitError::Incomplete(problems));
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{read_links, read_metadata, CatalogBundle};
    use crate::mapping::SimilarityMatcher;
    use chrono::NaiveDate;

    fn bundle() -> CatalogBundle {
        let metadata = read_metadata(
            "Indicators,Description,Measurement,Category\n\
             Return on Investment (ROI),Profitability,% per year,Economic\n\
             Patents Filed (PAT),Patent output,Nº de patentes,Innovation\n"
                .as_bytes(),
            "m",
        )
        .unwrap();
        let links = read_links(
            "Innovation,Indicator\n\
             Smart Irrigation,Retorno do Investimento (ROI)\n\
             ,Patentes Registadas (PAT)\n"
                .as_bytes(),
            "l",
        )
        .unwrap();
        CatalogBundle::assemble(
            Vec::new(),
            metadata,
            Vec::new(),
            links,
            &SimilarityMatcher::default(),
        )
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    }

    #[test]
    fn valid_entry_then_commit() {
        let bundle = bundle();
        let rows = rows_for_innovation(&bundle, "Smart Irrigation");
        let mut session = Session::new("Douro pilot");

        assert_eq!(
            session.record_entry(&rows[0], 0, "0.25", true),
            EntryState::Valid(25.0)
        );
        assert_eq!(
            session.record_entry(&rows[1], 1, "3,0", false),
            EntryState::Valid(3.0)
        );

        let records = session.commit(&bundle, "Smart Irrigation", noon()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].project, "Douro pilot");
        assert_eq!(records[0].normalized_value, 25.0);
        assert_eq!(records[0].category, "Economic");
        assert_eq!(records[0].timestamp, "2026-03-14 12:30:00");
        assert_eq!(records[1].normalized_value, 3.0);
    }

    #[test]
    fn commit_rejects_with_consolidated_problems() {
        let bundle = bundle();
        let rows = rows_for_innovation(&bundle, "Smart Irrigation");
        let mut session = Session::new("");

        // One invalid field, one never filled.
        session.record_entry(&rows[0], 0, "150", false);

        let err = session.commit(&bundle, "Smart Irrigation", noon()).unwrap_err();
        match err {
            CommitError::Incomplete(problems) => {
                assert_eq!(problems.len(), 2);
                assert!(problems[0].problem.contains("between 0 and 100"));
                assert_eq!(problems[1].problem, "no value provided");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reentry_overwrites_previous_error() {
        let bundle = bundle();
        let rows = rows_for_innovation(&bundle, "Smart Irrigation");
        let mut session = Session::new("");

        session.record_entry(&rows[0], 0, "150", false);
        assert!(matches!(
            session.entry("Smart Irrigation", 0),
            Some(EntryState::Invalid(_))
        ));

        session.record_entry(&rows[0], 0, "50", false);
        assert_eq!(
            session.entry("Smart Irrigation", 0),
            Some(&EntryState::Valid(50.0))
        );
    }

    #[test]
    fn blank_input_clears_to_empty() {
        let bundle = bundle();
        let rows = rows_for_innovation(&bundle, "Smart Irrigation");
        let mut session = Session::new("");

        session.record_entry(&rows[0], 0, "50", false);
        session.record_entry(&rows[0], 0, "  ", false);
        assert_eq!(
            session.entry("Smart Irrigation", 0),
            Some(&EntryState::Empty)
        );
    }

    #[test]
    fn commit_without_links_is_rejected() {
        let bundle = bundle();
        let session = Session::new("");
        let err = session.commit(&bundle, "Unknown", noon()).unwrap_err();
        assert!(matches!(err, CommitError::NoIndicators(_)));
    }
}
