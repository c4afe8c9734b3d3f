//! One-shot listing iterators.

use super::TabletManager;
use crate::error::CoreResult;
use crate::location::join_path;
use crate::metadata::TabletMetadata;
use crate::txn_log::TxnLog;
use std::sync::Arc;

type Resolve<T> = fn(&TabletManager, &str, bool) -> CoreResult<Arc<T>>;

/// Iterates the blobs found by a listing, resolving each on demand.
///
/// The set of locations is captured when the listing runs; blobs written
/// afterwards are not seen, and a blob deleted in between resolves to a
/// `NotFound` item. Consuming the iterator again requires a new listing.
pub struct ListIter<'a, T> {
    manager: &'a TabletManager,
    locations: std::vec::IntoIter<String>,
    resolve: Resolve<T>,
    fill_cache: bool,
}

/// Listing of tablet snapshots.
pub type MetadataIter<'a> = ListIter<'a, TabletMetadata>;

/// Listing of txn logs.
pub type TxnLogIter<'a> = ListIter<'a, TxnLog>;

impl<'a, T> ListIter<'a, T> {
    pub(crate) fn new(
        manager: &'a TabletManager,
        locations: Vec<String>,
        resolve: Resolve<T>,
    ) -> Self {
        Self {
            manager,
            locations: locations.into_iter(),
            resolve,
            fill_cache: manager.config().fill_cache_on_list,
        }
    }

    /// Number of locations not yet resolved.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.locations.len()
    }

    /// Returns the unresolved locations without reading them.
    #[must_use]
    pub fn into_locations(self) -> Vec<String> {
        self.locations.collect()
    }
}

impl<T> Iterator for ListIter<'_, T> {
    type Item = CoreResult<Arc<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        let location = self.locations.next()?;
        Some((self.resolve)(self.manager, &location, self.fill_cache))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.locations.size_hint()
    }
}

impl<T> ExactSizeIterator for ListIter<'_, T> {}

impl TabletManager {
    /// Lists blobs in `dir` whose names start with `prefix`, sorted by name.
    pub(crate) fn list_locations(&self, dir: &str, prefix: &str) -> CoreResult<Vec<String>> {
        let mut locations = Vec::new();
        self.store().iterate_dir(dir, &mut |name| {
            if name.starts_with(prefix) {
                locations.push(join_path(dir, name));
            }
            true
        })?;
        locations.sort();
        Ok(locations)
    }
}
