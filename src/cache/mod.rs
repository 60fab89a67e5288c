pub mod sqlite;

use std::time::Duration;

use crate::error::Result;

/// Key/value store with per-entry TTL. A miss is `Ok(None)`, so callers can
/// tell "absent" apart from a failing backend.
pub trait Cache: Send + Sync {
    fn put(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
}

impl<C: Cache + ?Sized> Cache for Box<C> {
    fn put(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        (**self).put(key, value, ttl)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }
}

/// Cache that doesn't store anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopCache;

impl Cache for NoopCache {
    fn put(&self, _key: &str, _value: &[u8], _ttl: Duration) -> Result<()> {
        Ok(()) // Discard
    }

    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Ok(None) // Always miss
    }
}
