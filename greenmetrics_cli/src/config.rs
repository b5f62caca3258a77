//! Data-directory resolution: flag, then environment, then `./data`.

use greenmetrics_lib::CatalogPaths;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "GREENMETRICS_DATA_DIR";
pub const RESULTS_FILE: &str = "results.csv";

/// Resolved locations of the catalog files and the results store.
pub struct AppPaths {
    pub catalogs: CatalogPaths,
    pub results: PathBuf,
}

pub fn resolve(data_dir: Option<&str>) -> AppPaths {
    let dir = data_dir
        .map(PathBuf::from)
        .or_else(|| std::env::var(DATA_DIR_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data"));
    from_dir(&dir)
}

pub fn from_dir(dir: &Path) -> AppPaths {
    AppPaths {
        catalogs: CatalogPaths::from_dir(dir),
        results: dir.join(RESULTS_FILE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_takes_precedence() {
        let paths = resolve(Some("/tmp/catalogs"));
        assert_eq!(paths.results, PathBuf::from("/tmp/catalogs/results.csv"));
        assert_eq!(
            paths.catalogs.innovations,
            PathBuf::from("/tmp/catalogs/innovations.csv")
        );
    }
}
