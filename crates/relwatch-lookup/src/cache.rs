//! ETag-validated release cache.

use parking_lot::RwLock;

use crate::release::Release;

#[derive(Debug, Default)]
struct CacheState {
    etag: String,
    releases: Vec<Release>,
}

/// Cache of the last full releases response and its validation token.
///
/// Token and releases live behind one lock. [`ConditionalCache::set`] swaps
/// both in a single write, so a reader never sees the token of one response
/// paired with the releases of another.
#[derive(Debug, Default)]
pub struct ConditionalCache {
    state: RwLock<CacheState>,
}

impl ConditionalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace token and releases together.
    pub fn set(&self, etag: impl Into<String>, releases: Vec<Release>) {
        let mut state = self.state.write();
        state.etag = etag.into();
        state.releases = releases;
    }

    pub fn set_token(&self, etag: impl Into<String>) {
        self.state.write().etag = etag.into();
    }

    /// Current token. Empty until the first full response.
    pub fn token(&self) -> String {
        self.state.read().etag.clone()
    }

    pub fn releases(&self) -> Vec<Release> {
        self.state.read().releases.clone()
    }

    /// Token and releases read under one lock.
    pub fn snapshot(&self) -> (String, Vec<Release>) {
        let state = self.state.read();
        (state.etag.clone(), state.releases.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_empty_cache() {
        let cache = ConditionalCache::new();
        assert_eq!(cache.token(), "");
        assert!(cache.releases().is_empty());
    }

    #[test]
    fn test_set_replaces_both() {
        let cache = ConditionalCache::new();
        cache.set("abc", vec![Release::new("v1.0.0")]);
        cache.set("def", vec![Release::new("v2.0.0"), Release::new("v1.0.0")]);

        let (etag, releases) = cache.snapshot();
        assert_eq!(etag, "def");
        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0].tag_name, "v2.0.0");
    }

    #[test]
    fn test_set_token_keeps_releases() {
        let cache = ConditionalCache::new();
        cache.set("abc", vec![Release::new("v1.0.0")]);
        cache.set_token("xyz");
        assert_eq!(cache.token(), "xyz");
        assert_eq!(cache.releases(), vec![Release::new("v1.0.0")]);
    }

    #[test]
    fn test_snapshot_never_mixed() {
        let cache = Arc::new(ConditionalCache::new());
        cache.set("0", vec![Release::new("0")]);

        let writer = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 1..500 {
                    let tag = i.to_string();
                    cache.set(tag.clone(), vec![Release::new(tag)]);
                }
            })
        };

        for _ in 0..500 {
            let (etag, releases) = cache.snapshot();
            assert_eq!(releases[0].tag_name, etag);
        }
        writer.join().unwrap();
    }
}
