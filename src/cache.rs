use std::collections::HashMap;

/// In-memory verdicts keyed by the address exactly as it was submitted.
///
/// Entries are never evicted and never expire, the cache lives exactly as
/// long as the validator that owns it. There is no internal locking; wrap
/// the owner in a mutex to share it between tasks.
#[derive(Debug, Default, Clone)]
pub struct ValidationCache {
    verdicts: HashMap<String, bool>,
}

impl ValidationCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the verdict for `address`.
    ///
    /// # Returns
    /// `Some(verdict)` if the address was checked before, `None` otherwise.
    /// The lookup is case-sensitive.
    pub fn get(&self, address: &str) -> Option<bool> {
        self.verdicts.get(address).copied()
    }

    /// Stores `verdict` for `address`, replacing any earlier one.
    pub fn put(&mut self, address: impl Into<String>, verdict: bool) {
        self.verdicts.insert(address.into(), verdict);
    }

    pub fn contains(&self, address: &str) -> bool {
        self.verdicts.contains_key(address)
    }

    /// Number of addresses with a verdict.
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    /// Drops every verdict.
    pub fn clear(&mut self) {
        self.verdicts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let cache = ValidationCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.get("user@example.com"), None);
    }

    #[test]
    fn test_put_and_get() {
        let mut cache = ValidationCache::new();
        cache.put("good@example.com", true);
        cache.put("bad-address", false);

        assert_eq!(cache.get("good@example.com"), Some(true));
        assert_eq!(cache.get("bad-address"), Some(false));
        assert!(cache.contains("bad-address"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_keys_are_verbatim() {
        let mut cache = ValidationCache::new();
        cache.put("User@Example.com", true);

        assert_eq!(cache.get("user@example.com"), None);
        assert_eq!(cache.get(" User@Example.com"), None);
        assert_eq!(cache.get("User@Example.com"), Some(true));
    }

    #[test]
    fn test_clear() {
        let mut cache = ValidationCache::new();
        cache.put("a@x.com", true);
        cache.clear();

        assert!(cache.is_empty());
        assert!(!cache.contains("a@x.com"));
    }
}
