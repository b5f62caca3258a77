//! Two-tier reconciliation of link-table indicator labels (PT) against the
//! model-metadata reference labels.
//!
//! Tier 1 matches on a shared parenthetical abbreviation and is deliberately
//! conservative: an abbreviation carried by two or more reference labels is
//! treated as no match rather than risking a silent mis-mapping. Tier 2
//! falls back to fuzzy similarity over normalized keys.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::textkey::{extract_abbrev_token, normalize_key};

/// Default acceptance threshold for the similarity tier.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// How a PT label was reconciled to a reference label.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MappingMethod {
    Abbrev,
    Similar,
    None,
}

impl MappingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abbrev => "abbrev",
            Self::Similar => "similar",
            Self::None => "none",
        }
    }
}

/// One mapping row: a PT label and the reference label it resolved to, if any.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IndicatorMapping {
    pub pt_label: String,
    pub reference_label: Option<String>,
    pub method: MappingMethod,
}

/// Fuzzy matching strategy for the similarity tier.
///
/// The scoring algorithm and threshold are configuration, not control flow;
/// swap the scorer or tune the cutoff without touching the tier logic.
#[derive(Clone)]
pub struct SimilarityMatcher {
    scorer: fn(&str, &str) -> f64,
    threshold: f64,
}

impl Default for SimilarityMatcher {
    fn default() -> Self {
        Self {
            scorer: strsim::jaro_winkler,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl SimilarityMatcher {
    pub fn new(scorer: fn(&str, &str) -> f64, threshold: f64) -> Self {
        Self { scorer, threshold }
    }

    /// Best candidate at or above the threshold, with its score.
    /// Ties break toward the earlier candidate for determinism.
    pub fn best_match<'a>(&self, key: &str, candidates: &[&'a str]) -> Option<(&'a str, f64)> {
        let mut best: Option<(&'a str, f64)> = None;
        for &candidate in candidates {
            let score = (self.scorer)(key, candidate);
            if score < self.threshold {
                continue;
            }
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((candidate, score)),
            }
        }
        best
    }
}

/// Build one mapping row per distinct PT label, in first-seen order.
///
/// Tier 1: the PT label's abbreviation token matches the abbreviation of
/// exactly one reference label. Tier 2: best fuzzy match over normalized
/// keys at or above the matcher's threshold. Otherwise the label carries no
/// reference mapping.
pub fn build_indicator_mapping(
    pt_labels: &[String],
    reference_labels: &[String],
    matcher: &SimilarityMatcher,
) -> Vec<IndicatorMapping> {
    // Reverse index: abbreviation token -> reference labels carrying it.
    let mut by_abbrev: HashMap<String, Vec<&String>> = HashMap::new();
    for label in reference_labels {
        if let Some(token) = extract_abbrev_token(label) {
            by_abbrev.entry(token).or_default().push(label);
        }
    }

    let norm_keys: Vec<String> = reference_labels.iter().map(|l| normalize_key(l)).collect();
    let norm_refs: Vec<&str> = norm_keys.iter().map(String::as_str).collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut rows = Vec::new();

    for pt_label in pt_labels {
        if !seen.insert(pt_label.as_str()) {
            continue;
        }

        let mut chosen: Option<&String> = None;
        let mut method = MappingMethod::None;

        if let Some(token) = extract_abbrev_token(pt_label) {
            if let Some(owners) = by_abbrev.get(&token) {
                if owners.len() == 1 {
                    chosen = Some(owners[0]);
                    method = MappingMethod::Abbrev;
                }
            }
        }

        if chosen.is_none() {
            let key = normalize_key(pt_label);
            if let Some((best, score)) = matcher.best_match(&key, &norm_refs) {
                let idx = norm_refs.iter().position(|k| *k == best).unwrap_or(0);
                chosen = Some(&reference_labels[idx]);
                method = MappingMethod::Similar;
                debug!(pt = %pt_label, reference = %reference_labels[idx], score, "similarity match");
            }
        }

        rows.push(IndicatorMapping {
            pt_label: pt_label.clone(),
            reference_label: chosen.cloned(),
            method,
        });
    }

    debug!(
        total = rows.len(),
        matched = rows.iter().filter(|r| r.reference_label.is_some()).count(),
        "indicator mapping built"
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unique_abbreviation_matches() {
        let pt = labels(&["Retorno do Investimento (ROI)"]);
        let refs = labels(&["Return on Investment (ROI)", "Total Cost"]);
        let mapping = build_indicator_mapping(&pt, &refs, &SimilarityMatcher::default());

        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping[0].method, MappingMethod::Abbrev);
        assert_eq!(
            mapping[0].reference_label.as_deref(),
            Some("Return on Investment (ROI)")
        );
    }

    #[test]
    fn ambiguous_abbreviation_is_not_an_abbrev_match() {
        let pt = labels(&["Retorno do Investimento (ROI)"]);
        let refs = labels(&["Return on Investment (ROI)", "Rate of Improvement (ROI)"]);
        let mapping = build_indicator_mapping(&pt, &refs, &SimilarityMatcher::default());

        assert_ne!(mapping[0].method, MappingMethod::Abbrev);
    }

    #[test]
    fn similarity_fallback_on_near_identical_labels() {
        let pt = labels(&["Emissões de CO2 evitadas"]);
        let refs = labels(&["Emissoes de CO2 evitadas"]);
        let mapping = build_indicator_mapping(&pt, &refs, &SimilarityMatcher::default());

        assert_eq!(mapping[0].method, MappingMethod::Similar);
        assert_eq!(
            mapping[0].reference_label.as_deref(),
            Some("Emissoes de CO2 evitadas")
        );
    }

    #[test]
    fn dissimilar_labels_map_to_none() {
        let pt = labels(&["Custo Total"]);
        let refs = labels(&["Total Cost"]);
        let mapping = build_indicator_mapping(&pt, &refs, &SimilarityMatcher::default());

        assert_eq!(mapping[0].method, MappingMethod::None);
        assert_eq!(mapping[0].reference_label, None);
    }

    #[test]
    fn duplicate_pt_labels_collapse_to_one_row() {
        let pt = labels(&["Custo Total", "Custo Total"]);
        let refs = labels(&["Total Cost"]);
        let mapping = build_indicator_mapping(&pt, &refs, &SimilarityMatcher::default());
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn multiple_pt_labels_may_share_one_reference() {
        let pt = labels(&[
            "Retorno do Investimento (ROI)",
            "Taxa de Retorno (ROI)",
        ]);
        let refs = labels(&["Return on Investment (ROI)"]);
        let mapping = build_indicator_mapping(&pt, &refs, &SimilarityMatcher::default());

        assert_eq!(mapping.len(), 2);
        for row in &mapping {
            assert_eq!(row.method, MappingMethod::Abbrev);
            assert_eq!(
                row.reference_label.as_deref(),
                Some("Return on Investment (ROI)")
            );
        }
    }

    #[test]
    fn matcher_ignores_candidates_below_threshold() {
        let matcher = SimilarityMatcher::default();
        let got = matcher.best_match("custo total", &["total cost"]);
        assert!(got.is_none());
    }

    #[test]
    fn matcher_threshold_is_configurable() {
        let matcher = SimilarityMatcher::new(strsim::jaro_winkler, 0.0);
        let got = matcher.best_match("custo total", &["total cost"]);
        assert!(got.is_some());
    }
}
