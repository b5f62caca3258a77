//! Reference-catalog loading and the process-wide load-once cache.
//!
//! Four CSV catalogs drive the system: innovations (name, description,
//! tags), indicator metadata (the innovation model), the 114-indicator
//! reference table, and the innovation↔indicator link table. All are
//! immutable reference data: loaded once per source directory, schema
//! checked against required column names, and never reloaded within a
//! process (a change to the files on disk is not observed until restart).

use dashmap::DashMap;
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::mapping::{build_indicator_mapping, IndicatorMapping, SimilarityMatcher};

/// Fixed file names inside a catalog directory.
pub const INNOVATIONS_FILE: &str = "innovations.csv";
pub const METADATA_FILE: &str = "indicator_metadata.csv";
pub const REFERENCE_FILE: &str = "indicators_reference_114.csv";
pub const LINKS_FILE: &str = "innovation_indicators.csv";

/// Errors raised while loading a catalog. All of these are fatal for the
/// session that triggered the load; none is retried automatically.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog file not found: {0}")]
    NotFound(String),
    #[error("catalog {file} is missing required column '{column}'")]
    MissingColumn { file: String, column: String },
    #[error("failed to read catalog {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
    #[error("failed to open catalog {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

/// A catalog item: a named green/sustainability practice under evaluation.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Innovation {
    pub name: String,
    pub description: String,
    pub engagement: Option<String>,
    pub tags: Vec<String>,
}

/// An indicator as described by the innovation-model metadata catalog.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct IndicatorMeta {
    pub label: String,
    pub description: String,
    pub measurement: String,
    pub category: String,
}

/// An indicator as described by the 114-indicator reference catalog.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ReferenceIndicator {
    pub label: String,
    pub description: String,
    pub measurement: String,
}

/// One innovation↔indicator link, after forward-filling the innovation
/// column across blank continuation rows.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LinkRow {
    pub innovation: String,
    pub indicator: String,
}

/// Split a raw tags cell on `;` and `,` into trimmed, non-empty tags.
fn split_tags(raw: &str) -> Vec<String> {
    raw.split([';', ','])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve the index of each named column, or fail with the first missing one.
fn required_columns(
    headers: &csv::StringRecord,
    file: &str,
    names: &[&str],
) -> Result<Vec<usize>, CatalogError> {
    names
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| h.trim() == *name)
                .ok_or_else(|| CatalogError::MissingColumn {
                    file: file.to_string(),
                    column: name.to_string(),
                })
        })
        .collect()
}

fn optional_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn cell(record: &csv::StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or("").trim().to_string()
}

fn reader_for<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new().flexible(true).from_reader(source)
}

fn open(path: &Path) -> Result<File, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::NotFound(path.display().to_string()));
    }
    File::open(path).map_err(|source| CatalogError::Io {
        file: path.display().to_string(),
        source,
    })
}

fn csv_err(file: &str) -> impl Fn(csv::Error) -> CatalogError + '_ {
    move |source| CatalogError::Csv {
        file: file.to_string(),
        source,
    }
}

/// Parse the innovation catalog: `Innovation`, `Description`, `Tags`
/// required, `Engagement` optional.
pub fn read_innovations<R: Read>(source: R, file: &str) -> Result<Vec<Innovation>, CatalogError> {
    let mut rdr = reader_for(source);
    let headers = rdr.headers().map_err(csv_err(file))?.clone();
    let cols = required_columns(&headers, file, &["Innovation", "Description", "Tags"])?;
    let engagement_col = optional_column(&headers, "Engagement");

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_err(file))?;
        let name = cell(&record, cols[0]);
        if name.is_empty() {
            continue;
        }
        let engagement = engagement_col.map(|i| cell(&record, i)).filter(|e| !e.is_empty());
        rows.push(Innovation {
            name,
            description: cell(&record, cols[1]),
            engagement,
            tags: split_tags(&cell(&record, cols[2])),
        });
    }
    Ok(rows)
}

/// Parse the indicator-metadata catalog: `Indicators`, `Description`,
/// `Measurement`, `Category`, all required.
pub fn read_metadata<R: Read>(source: R, file: &str) -> Result<Vec<IndicatorMeta>, CatalogError> {
    let mut rdr = reader_for(source);
    let headers = rdr.headers().map_err(csv_err(file))?.clone();
    let cols = required_columns(
        &headers,
        file,
        &["Indicators", "Description", "Measurement", "Category"],
    )?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_err(file))?;
        let label = cell(&record, cols[0]);
        if label.is_empty() {
            continue;
        }
        rows.push(IndicatorMeta {
            label,
            description: cell(&record, cols[1]),
            measurement: cell(&record, cols[2]),
            category: cell(&record, cols[3]),
        });
    }
    Ok(rows)
}

/// Parse the 114-indicator reference catalog: `Indicators`, `Description`,
/// `Measurement`, all required. Fields are kept under reference-specific
/// names so they never collide with the metadata catalog in joins.
pub fn read_reference<R: Read>(
    source: R,
    file: &str,
) -> Result<Vec<ReferenceIndicator>, CatalogError> {
    let mut rdr = reader_for(source);
    let headers = rdr.headers().map_err(csv_err(file))?.clone();
    let cols = required_columns(&headers, file, &["Indicators", "Description", "Measurement"])?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_err(file))?;
        let label = cell(&record, cols[0]);
        if label.is_empty() {
            continue;
        }
        rows.push(ReferenceIndicator {
            label,
            description: cell(&record, cols[1]),
            measurement: cell(&record, cols[2]),
        });
    }
    Ok(rows)
}

/// Parse the link catalog: `Innovation`, `Indicator` required. The
/// innovation column is forward-filled: a blank cell continues the group
/// started by the previous non-blank row.
pub fn read_links<R: Read>(source: R, file: &str) -> Result<Vec<LinkRow>, CatalogError> {
    let mut rdr = reader_for(source);
    let headers = rdr.headers().map_err(csv_err(file))?.clone();
    let cols = required_columns(&headers, file, &["Innovation", "Indicator"])?;

    let mut rows = Vec::new();
    let mut current_innovation = String::new();
    for record in rdr.records() {
        let record = record.map_err(csv_err(file))?;
        let innovation = cell(&record, cols[0]);
        if !innovation.is_empty() {
            current_innovation = innovation;
        }
        let indicator = cell(&record, cols[1]);
        if indicator.is_empty() || current_innovation.is_empty() {
            continue;
        }
        rows.push(LinkRow {
            innovation: current_innovation.clone(),
            indicator,
        });
    }
    Ok(rows)
}

/// Paths to the four catalog files.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogPaths {
    pub innovations: PathBuf,
    pub metadata: PathBuf,
    pub reference: PathBuf,
    pub links: PathBuf,
}

impl CatalogPaths {
    /// The canonical layout: all four files under one directory.
    pub fn from_dir(dir: &Path) -> Self {
        Self {
            innovations: dir.join(INNOVATIONS_FILE),
            metadata: dir.join(METADATA_FILE),
            reference: dir.join(REFERENCE_FILE),
            links: dir.join(LINKS_FILE),
        }
    }

    fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.innovations.display(),
            self.metadata.display(),
            self.reference.display(),
            self.links.display()
        )
    }
}

/// The loaded, immutable reference data for one catalog source, including
/// the PT→reference indicator mapping derived from the link and metadata
/// tables at load time.
#[derive(Debug, Clone)]
pub struct CatalogBundle {
    pub innovations: Vec<Innovation>,
    pub metadata: Vec<IndicatorMeta>,
    pub reference: Vec<ReferenceIndicator>,
    pub links: Vec<LinkRow>,
    pub mapping: Vec<IndicatorMapping>,
}

impl CatalogBundle {
    /// Assemble a bundle from already-parsed tables and compute the mapping.
    pub fn assemble(
        innovations: Vec<Innovation>,
        metadata: Vec<IndicatorMeta>,
        reference: Vec<ReferenceIndicator>,
        links: Vec<LinkRow>,
        matcher: &SimilarityMatcher,
    ) -> Self {
        let pt_labels: Vec<String> = links.iter().map(|l| l.indicator.clone()).collect();
        let reference_labels: Vec<String> = metadata.iter().map(|m| m.label.clone()).collect();
        let mapping = build_indicator_mapping(&pt_labels, &reference_labels, matcher);
        Self {
            innovations,
            metadata,
            reference,
            links,
            mapping,
        }
    }

    /// Load all four catalogs from disk and assemble the bundle.
    pub fn load(paths: &CatalogPaths) -> Result<Self, CatalogError> {
        let innovations = read_innovations(
            open(&paths.innovations)?,
            &paths.innovations.display().to_string(),
        )?;
        let metadata = read_metadata(open(&paths.metadata)?, &paths.metadata.display().to_string())?;
        let reference = read_reference(
            open(&paths.reference)?,
            &paths.reference.display().to_string(),
        )?;
        let links = read_links(open(&paths.links)?, &paths.links.display().to_string())?;

        info!(
            innovations = innovations.len(),
            metadata = metadata.len(),
            reference = reference.len(),
            links = links.len(),
            "catalogs loaded"
        );
        Ok(Self::assemble(
            innovations,
            metadata,
            reference,
            links,
            &SimilarityMatcher::default(),
        ))
    }

    /// Look up an innovation by exact display name.
    pub fn innovation(&self, name: &str) -> Option<&Innovation> {
        self.innovations.iter().find(|i| i.name == name)
    }

    /// All innovation names, sorted.
    pub fn innovation_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.innovations.iter().map(|i| i.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Distinct tags across all innovations, sorted.
    pub fn all_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .innovations
            .iter()
            .flat_map(|i| i.tags.iter().cloned())
            .collect();
        tags.sort_unstable();
        tags.dedup();
        tags
    }

    /// Innovations whose tag list contains `tag`, case-insensitively.
    pub fn innovations_with_tag(&self, tag: &str) -> Vec<&Innovation> {
        let needle = tag.to_lowercase();
        self.innovations
            .iter()
            .filter(|i| i.tags.iter().any(|t| t.to_lowercase().contains(&needle)))
            .collect()
    }

    /// Link rows for one innovation, in catalog order.
    pub fn links_for(&self, innovation: &str) -> Vec<&LinkRow> {
        self.links
            .iter()
            .filter(|l| l.innovation == innovation)
            .collect()
    }

    /// The mapping row for a PT indicator label, if any.
    pub fn mapping_for(&self, pt_label: &str) -> Option<&IndicatorMapping> {
        self.mapping.iter().find(|m| m.pt_label == pt_label)
    }

    pub fn metadata_for(&self, label: &str) -> Option<&IndicatorMeta> {
        self.metadata.iter().find(|m| m.label == label)
    }

    pub fn reference_for(&self, label: &str) -> Option<&ReferenceIndicator> {
        self.reference.iter().find(|r| r.label == label)
    }
}

/// Process-wide load-once cache of catalog bundles, keyed by source paths.
///
/// There is no TTL and no invalidation: the first successful load for a
/// given source wins for the lifetime of the process. Two sessions racing
/// on the first load may both read the files; both reads are pure and
/// produce identical bundles, so either insertion is acceptable.
#[derive(Default)]
pub struct CatalogCache {
    store: DashMap<String, Arc<CatalogBundle>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached bundle for `paths`, loading it on first access.
    /// Load failures are not cached; a later call retries the load.
    pub fn load_or_init(&self, paths: &CatalogPaths) -> Result<Arc<CatalogBundle>, CatalogError> {
        let key = paths.cache_key();
        if let Some(bundle) = self.store.get(&key) {
            return Ok(Arc::clone(&bundle));
        }
        let bundle = Arc::new(CatalogBundle::load(paths)?);
        let entry = self
            .store
            .entry(key)
            .or_insert_with(|| Arc::clone(&bundle));
        Ok(Arc::clone(&entry))
    }
}
