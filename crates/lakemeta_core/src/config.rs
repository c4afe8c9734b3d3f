//! Tablet manager configuration.

/// Configuration for a [`crate::TabletManager`].
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Byte budget of the metadata cache. Zero disables caching.
    pub metacache_capacity: usize,

    /// Whether written blobs are synced to durable storage on close.
    pub sync_on_close: bool,

    /// Whether snapshots and logs resolved through listing iterators are
    /// inserted into the cache.
    pub fill_cache_on_list: bool,

    /// Blobs larger than this many bytes are reported as corrupt.
    pub max_blob_size: u64,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            metacache_capacity: 64 * 1024 * 1024, // 64 MB
            sync_on_close: true,
            fill_cache_on_list: false,
            max_blob_size: i32::MAX as u64,
        }
    }
}

impl ManagerConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the metadata cache byte budget.
    #[must_use]
    pub const fn metacache_capacity(mut self, bytes: usize) -> Self {
        self.metacache_capacity = bytes;
        self
    }

    /// Sets whether written blobs are synced on close.
    #[must_use]
    pub const fn sync_on_close(mut self, value: bool) -> Self {
        self.sync_on_close = value;
        self
    }

    /// Sets whether listing iterators fill the cache.
    #[must_use]
    pub const fn fill_cache_on_list(mut self, value: bool) -> Self {
        self.fill_cache_on_list = value;
        self
    }

    /// Sets the largest accepted blob size.
    #[must_use]
    pub const fn max_blob_size(mut self, bytes: u64) -> Self {
        self.max_blob_size = bytes;
        self
    }
}
