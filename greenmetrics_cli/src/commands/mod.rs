//! CLI subcommand implementations.

pub mod describe;
pub mod indicators;
pub mod innovations;
pub mod report;
pub mod submit;

use anyhow::{Context, Result};
use greenmetrics_lib::{CatalogBundle, CatalogCache};
use std::sync::{Arc, OnceLock};

use crate::config::AppPaths;

fn catalog_cache() -> &'static CatalogCache {
    static CACHE: OnceLock<CatalogCache> = OnceLock::new();
    CACHE.get_or_init(CatalogCache::new)
}

/// Load (or fetch the cached) catalog bundle for the configured data dir.
pub(crate) fn load_bundle(paths: &AppPaths) -> Result<Arc<CatalogBundle>> {
    catalog_cache()
        .load_or_init(&paths.catalogs)
        .context("failed to load catalogs")
}
