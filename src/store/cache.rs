//! Load-once cache for the persisted feature tables.
//!
//! The cache is an explicit object handed to the presentation layer. Loaded
//! tables are shared as `Arc<FeatureTables>` and never mutated; `invalidate`
//! drops the cached copy so the next `get_or_load` reads the files again.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::domain::FeatureTables;
use crate::io::tables::{LoadError, load_feature_tables};

#[derive(Debug)]
pub struct TableCache {
    dir: PathBuf,
    slot: RwLock<Option<Arc<FeatureTables>>>,
    loads: AtomicUsize,
}

impl TableCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            slot: RwLock::new(None),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cached tables, loading them from disk on first use.
    pub fn get_or_load(&self) -> Result<Arc<FeatureTables>, LoadError> {
        if let Some(tables) = self.slot.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            return Ok(Arc::clone(tables));
        }

        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        // Another holder may have loaded while we waited for the write lock.
        if let Some(tables) = slot.as_ref() {
            return Ok(Arc::clone(tables));
        }
        let tables = Arc::new(load_feature_tables(&self.dir)?);
        self.loads.fetch_add(1, Ordering::Relaxed);
        *slot = Some(Arc::clone(&tables));
        Ok(tables)
    }

    /// Forget the cached tables. Outstanding `Arc`s stay valid.
    pub fn invalidate(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            debug!(dir = %self.dir.display(), "feature table cache invalidated");
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Number of times the tables were read from disk.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Indicator, IndicatorRecord};
    use crate::features::engineer_features;
    use crate::io::tables::write_feature_tables;

    fn write_tables(dir: &Path, gdp: f64) {
        let records = vec![
            IndicatorRecord::new("France", Some("FRA".into()), 2020)
                .with(Indicator::GdpPerCapita, gdp),
        ];
        write_feature_tables(dir, &engineer_features(records, None, 3)).unwrap();
    }

    #[test]
    fn loads_once_until_invalidated() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(dir.path(), 1.0);
        let cache = TableCache::new(dir.path());

        let first = cache.get_or_load().unwrap();
        let second = cache.get_or_load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.load_count(), 1);

        write_tables(dir.path(), 2.0);
        cache.invalidate();
        assert!(!cache.is_loaded());
        let third = cache.get_or_load().unwrap();
        assert_eq!(cache.load_count(), 2);
        assert_eq!(third.main_data[0].base.gdp_pc_usd, Some(2.0));
        // The old handle is untouched.
        assert_eq!(first.main_data[0].base.gdp_pc_usd, Some(1.0));
    }

    #[test]
    fn failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TableCache::new(dir.path());
        assert!(cache.get_or_load().is_err());
        assert!(!cache.is_loaded());
    }
}
