//! Flattened per-indicator rows for one innovation.
//!
//! Joins the link table through the PT→reference mapping to the metadata
//! and 114-reference catalogs. All joins are left joins: an unmapped or
//! unmatched indicator keeps its row with the reference fields empty, so
//! the entry form never silently drops an indicator.

use serde::Serialize;

use crate::catalog::CatalogBundle;
use crate::metric::{infer_domain, MetricDomain};

/// One entry-form row: the PT label plus whatever model and reference
/// context the joins could attach to it.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub innovation: String,
    pub pt_label: String,
    pub reference_label: Option<String>,
    pub model_description: Option<String>,
    pub model_measurement: Option<String>,
    pub category: Option<String>,
    pub reference_description: Option<String>,
    pub reference_measurement: Option<String>,
}

impl IndicatorRow {
    /// The label shown to the user: PT form, falling back to the mapped
    /// reference label when the PT cell was blank in the source.
    pub fn display_label(&self) -> &str {
        if !self.pt_label.is_empty() {
            &self.pt_label
        } else {
            self.reference_label.as_deref().unwrap_or("")
        }
    }

    /// Domain inferred from the model measurement text.
    pub fn domain(&self) -> MetricDomain {
        infer_domain(self.model_measurement.as_deref())
    }
}

/// Build the flattened row set for `innovation`, in link-table order.
/// Empty when the innovation has no linked indicators.
pub fn rows_for_innovation(bundle: &CatalogBundle, innovation: &str) -> Vec<IndicatorRow> {
    bundle
        .links_for(innovation)
        .into_iter()
        .map(|link| {
            let reference_label = bundle
                .mapping_for(&link.indicator)
                .and_then(|m| m.reference_label.clone());
            let meta = reference_label
                .as_deref()
                .and_then(|label| bundle.metadata_for(label));
            let reference = reference_label
                .as_deref()
                .and_then(|label| bundle.reference_for(label));

            IndicatorRow {
                innovation: link.innovation.clone(),
                pt_label: link.indicator.clone(),
                reference_label,
                model_description: meta.map(|m| m.description.clone()),
                model_measurement: meta.map(|m| m.measurement.clone()),
                category: meta.map(|m| m.category.clone()),
                reference_description: reference.map(|r| r.description.clone()),
                reference_measurement: reference.map(|r| r.measurement.clone()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        read_links, read_metadata, read_reference, CatalogBundle,
    };
    use crate::mapping::SimilarityMatcher;

    fn bundle() -> CatalogBundle {
        let metadata = read_metadata(
            "Indicators,Description,Measurement,Category\n\
             Return on Investment (ROI),Profitability,% per year,Economic\n"
                .as_bytes(),
            "m",
        )
        .unwrap();
        let reference = read_reference(
            "Indicators,Description,Measurement\n\
             Return on Investment (ROI),Official ROI definition,% net gain / cost\n"
                .as_bytes(),
            "r",
        )
        .unwrap();
        let links = read_links(
            "Innovation,Indicator\n\
             Smart Irrigation,Retorno do Investimento (ROI)\n\
             ,Custo Total\n"
                .as_bytes(),
            "l",
        )
        .unwrap();
        CatalogBundle::assemble(
            Vec::new(),
            metadata,
            reference,
            links,
            &SimilarityMatcher::default(),
        )
    }

    #[test]
    fn mapped_indicator_carries_model_and_reference_fields() {
        let rows = rows_for_innovation(&bundle(), "Smart Irrigation");
        assert_eq!(rows.len(), 2);

        let roi = &rows[0];
        assert_eq!(roi.pt_label, "Retorno do Investimento (ROI)");
        assert_eq!(
            roi.reference_label.as_deref(),
            Some("Return on Investment (ROI)")
        );
        assert_eq!(roi.model_measurement.as_deref(), Some("% per year"));
        assert_eq!(roi.category.as_deref(), Some("Economic"));
        assert_eq!(
            roi.reference_measurement.as_deref(),
            Some("% net gain / cost")
        );
        assert_eq!(roi.domain(), MetricDomain::Percent);
    }

    #[test]
    fn unmatched_indicator_keeps_its_row_with_empty_reference_fields() {
        let rows = rows_for_innovation(&bundle(), "Smart Irrigation");
        let custo = &rows[1];
        assert_eq!(custo.pt_label, "Custo Total");
        assert_eq!(custo.reference_label, None);
        assert_eq!(custo.model_measurement, None);
        assert_eq!(custo.category, None);
        // No measurement text at all: the value is validated as free-form.
        assert_eq!(custo.domain(), MetricDomain::Free);
    }

    #[test]
    fn unknown_innovation_yields_no_rows() {
        assert!(rows_for_innovation(&bundle(), "Nope").is_empty());
    }
}
