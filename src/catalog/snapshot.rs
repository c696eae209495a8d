//! Versioned catalog snapshots
//!
//! Readers clone an `Arc` to the current snapshot and keep it for one operation;
//! a reload swaps the whole snapshot, so a reader never observes a half-replaced catalog.

use super::Catalog;
use parking_lot::RwLock;
use std::ops::Deref;
use std::sync::Arc;

/// An immutable catalog tagged with the reload that produced it
#[derive(Debug)]
pub struct CatalogSnapshot {
    version: u64,
    catalog: Catalog,
}

impl CatalogSnapshot {
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl Deref for CatalogSnapshot {
    type Target = Catalog;

    fn deref(&self) -> &Catalog {
        &self.catalog
    }
}

/// Shared, swappable reference to the current catalog
#[derive(Debug)]
pub struct CatalogHandle {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(CatalogSnapshot {
                version: 1,
                catalog,
            })),
        }
    }

    /// The snapshot valid right now
    #[inline]
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current.read().clone()
    }

    /// Replace the catalog wholesale, returning the new version
    pub fn replace(&self, catalog: Catalog) -> u64 {
        let mut guard = self.current.write();
        let version = guard.version + 1;
        *guard = Arc::new(CatalogSnapshot { version, catalog });
        version
    }
}

impl Default for CatalogHandle {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}
