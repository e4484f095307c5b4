use std::collections::HashSet;
use std::hash::Hash;

use crate::config::DedupMode;

/// Ordered collector that keeps the first value seen for each key.
///
/// A collector built with [`Deduplicator::passthrough`] keeps every value,
/// which is how primary entities and relations behave in lenient mode.
#[derive(Debug)]
pub struct Deduplicator<K, V> {
    seen: Option<HashSet<K>>,
    items: Vec<V>,
    dropped: usize,
}

impl<K: Eq + Hash, V> Deduplicator<K, V> {
    /// First occurrence of each key wins
    pub fn unique() -> Self {
        Self {
            seen: Some(HashSet::new()),
            items: Vec::new(),
            dropped: 0,
        }
    }

    /// Every offered value is kept
    pub fn passthrough() -> Self {
        Self {
            seen: None,
            items: Vec::new(),
            dropped: 0,
        }
    }

    pub fn for_mode(mode: DedupMode) -> Self {
        match mode {
            DedupMode::Lenient => Self::passthrough(),
            DedupMode::Strict => Self::unique(),
        }
    }

    /// Offers a candidate; returns `true` when it was kept
    pub fn offer(&mut self, key: K, value: V) -> bool {
        self.offer_with(key, || value)
    }

    /// Like [`Deduplicator::offer`], but only builds the value when the key is new
    pub fn offer_with(&mut self, key: K, build: impl FnOnce() -> V) -> bool {
        if let Some(seen) = self.seen.as_mut() {
            if !seen.insert(key) {
                self.dropped += 1;
                return false;
            }
        }
        self.items.push(build());
        true
    }

    pub fn items(&self) -> &[V] {
        &self.items
    }

    /// Number of candidates rejected as repeats
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn into_items(self) -> Vec<V> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_keeps_first_value() {
        let mut genres = Deduplicator::unique();
        assert!(genres.offer(16, "Animation"));
        assert!(genres.offer(35, "Comedy"));
        assert!(!genres.offer(16, "Cartoons"));

        assert_eq!(genres.items(), &["Animation", "Comedy"]);
        assert_eq!(genres.dropped(), 1);
    }

    #[test]
    fn test_passthrough_keeps_duplicates() {
        let mut edges = Deduplicator::passthrough();
        assert!(edges.offer((862, 16), (862, 16)));
        assert!(edges.offer((862, 16), (862, 16)));

        assert_eq!(edges.into_items().len(), 2);
    }

    #[test]
    fn test_offer_with_skips_builder_for_known_key() {
        let mut users = Deduplicator::unique();
        users.offer_with(7, || "Generated User #7".to_string());

        let mut built = false;
        users.offer_with(7, || {
            built = true;
            "other".to_string()
        });

        assert!(!built);
        assert_eq!(users.items().len(), 1);
    }

    #[test]
    fn test_for_mode() {
        let mut lenient: Deduplicator<i64, i64> = Deduplicator::for_mode(DedupMode::Lenient);
        lenient.offer(1, 1);
        lenient.offer(1, 1);
        assert_eq!(lenient.items().len(), 2);

        let mut strict: Deduplicator<i64, i64> = Deduplicator::for_mode(DedupMode::Strict);
        strict.offer(1, 1);
        strict.offer(1, 1);
        assert_eq!(strict.items().len(), 1);
        assert_eq!(strict.dropped(), 1);
    }
}
