//! Library layer for Smart Green Innovation Indicators: catalog loading,
//! PT↔reference indicator mapping, measurement validation, and reporting.
//!
//! The pipeline runs catalogs → indicator mapping → per-indicator join →
//! value validation → results store → aggregation. Catalogs are immutable
//! reference data cached once per source; entry state belongs to a
//! [`session::Session`] and only reaches disk through an explicit commit.

pub mod catalog;
pub mod join;
pub mod mapping;
pub mod metric;
pub mod report;
pub mod session;
pub mod store;
pub mod textkey;

pub use catalog::{CatalogBundle, CatalogCache, CatalogError, CatalogPaths, Innovation};
pub use join::{rows_for_innovation, IndicatorRow};
pub use mapping::{build_indicator_mapping, IndicatorMapping, MappingMethod, SimilarityMatcher};
pub use metric::{infer_domain, validate_value, MetricDomain, ValidationError};
pub use report::{count_by_category, filter_records, mean_by_category, ReportFilter};
pub use session::{CommitError, EntryState, Session};
pub use store::{ResultRecord, ResultsStore, StoreError};
