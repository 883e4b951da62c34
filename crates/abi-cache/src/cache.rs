//! The bounded ABI cache itself: dual-indexed by account and by
//! last-access timestamp so eviction is `O(log n)` and touch is `O(log n)`.
//!
//! Only ever touched from the consumer thread (invariant: the ABI cache and
//! processing buffers are consumer-thread-exclusive), so no locking lives
//! here at all.

use std::collections::{BTreeMap, HashMap};

use shared_types::AccountName;
use tracing::debug;

use crate::descriptor::{decode_descriptor_bytes, AbiDescriptor};
use crate::store_port::AccountAbiLookup;

/// One entry in the cache: the account it describes, when it was last
/// touched, and its decoded ABI (absent is modeled but never actually
/// constructed by [`AbiCache::resolve`] — a failed lookup caches nothing).
#[derive(Debug, Clone)]
pub struct AbiCacheEntry {
    pub account: AccountName,
    pub last_accessed: u64,
    pub descriptor: Option<AbiDescriptor>,
}

/// A bounded, consumer-thread-exclusive cache of per-account ABI
/// descriptors. At most `bound` entries are held at quiescence; the entry
/// with the smallest `last_accessed` is evicted to make room.
pub struct AbiCache {
    bound: usize,
    by_account: HashMap<AccountName, AbiCacheEntry>,
    by_last_access: BTreeMap<(u64, AccountName), ()>,
    hits: u64,
    misses: u64,
}

impl AbiCache {
    pub fn new(bound: usize) -> Self {
        Self {
            bound,
            by_account: HashMap::new(),
            by_last_access: BTreeMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.by_account.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_account.is_empty()
    }

    /// Cumulative cache hits since construction, for the `abi_cache_hits`
    /// counter. Callers poll and diff rather than this resetting, since a
    /// `prometheus::IntCounter` only ever goes up.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Cumulative cache misses (including failed/absent lookups) since
    /// construction.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Resolves `account`'s ABI descriptor, touching the entry's
    /// last-access timestamp on a hit or populating the cache from the
    /// store on a miss. `now` is an explicit millisecond timestamp rather
    /// than a wall-clock read, so eviction order is deterministic in tests.
    pub fn resolve(
        &mut self,
        account: &AccountName,
        now: u64,
        store: &impl AccountAbiLookup,
    ) -> Option<AbiDescriptor> {
        if let Some(entry) = self.by_account.get(account) {
            let previous_access = entry.last_accessed;
            let descriptor = entry.descriptor.clone();
            self.touch(account.clone(), previous_access, now);
            self.hits += 1;
            return descriptor;
        }

        self.misses += 1;
        let raw = match store.find_account_abi(account) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                debug!(%account, error = %e, "abi lookup failed, treating as absent");
                return None;
            }
        };
        let descriptor = decode_descriptor_bytes(&raw)?;
        self.insert(account.clone(), now, descriptor.clone());
        Some(descriptor)
    }

    fn touch(&mut self, account: AccountName, previous_access: u64, now: u64) {
        self.by_last_access.remove(&(previous_access, account.clone()));
        self.by_last_access.insert((now, account.clone()), ());
        if let Some(entry) = self.by_account.get_mut(&account) {
            entry.last_accessed = now;
        }
    }

    fn insert(&mut self, account: AccountName, now: u64, descriptor: AbiDescriptor) {
        if self.by_account.len() >= self.bound {
            self.evict_oldest();
        }
        self.by_last_access.insert((now, account.clone()), ());
        self.by_account.insert(
            account.clone(),
            AbiCacheEntry {
                account,
                last_accessed: now,
                descriptor: Some(descriptor),
            },
        );
    }

    fn evict_oldest(&mut self) {
        if let Some((&(_, ref account), _)) = self.by_last_access.iter().next() {
            let account = account.clone();
            self.by_last_access.remove(&(self.by_account[&account].last_accessed, account.clone()));
            self.by_account.remove(&account);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::encode_descriptor;
    use es_document_store::StoreError;

    struct FakeStore {
        abis: HashMap<String, AbiDescriptor>,
    }

    impl AccountAbiLookup for FakeStore {
        fn find_account_abi(&self, account: &AccountName) -> Result<Option<Vec<u8>>, StoreError> {
            Ok(self
                .abis
                .get(account.as_str())
                .map(|d| serde_json::to_vec(&encode_descriptor(d)).unwrap()))
        }
    }

    fn descriptor_for(name: &str) -> AbiDescriptor {
        AbiDescriptor {
            version: format!("{name}-v1"),
            ..Default::default()
        }
    }

    fn store_with(accounts: &[&str]) -> FakeStore {
        FakeStore {
            abis: accounts.iter().map(|a| (a.to_string(), descriptor_for(a))).collect(),
        }
    }

    #[test]
    fn miss_populates_the_cache_from_the_store() {
        let mut cache = AbiCache::new(10);
        let store = store_with(&["alice"]);
        let descriptor = cache.resolve(&"alice".into(), 1, &store).unwrap();
        assert_eq!(descriptor.version, "alice-v1");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn absent_account_is_not_cached() {
        let mut cache = AbiCache::new(10);
        let store = store_with(&[]);
        assert!(cache.resolve(&"ghost".into(), 1, &store).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn hits_and_misses_are_counted() {
        let mut cache = AbiCache::new(10);
        let store = store_with(&["alice"]);
        cache.resolve(&"alice".into(), 1, &store); // miss, populates
        cache.resolve(&"alice".into(), 2, &store); // hit
        cache.resolve(&"ghost".into(), 3, &store); // miss, absent
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn hit_touches_last_accessed_without_requerying() {
        let mut cache = AbiCache::new(10);
        let store = store_with(&["alice"]);
        cache.resolve(&"alice".into(), 1, &store);
        cache.resolve(&"alice".into(), 50, &store);
        assert_eq!(cache.by_account[&AccountName::from("alice")].last_accessed, 50);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn bound_is_never_exceeded() {
        let mut cache = AbiCache::new(2);
        let store = store_with(&["a", "b", "c"]);
        cache.resolve(&"a".into(), 1, &store);
        cache.resolve(&"b".into(), 2, &store);
        cache.resolve(&"c".into(), 3, &store);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn eviction_removes_the_least_recently_accessed_entry() {
        // Access order A, B, C, A, D with bound 3 -> D evicts B (spec scenario 6).
        let mut cache = AbiCache::new(3);
        let store = store_with(&["a", "b", "c", "d"]);
        cache.resolve(&"a".into(), 1, &store);
        cache.resolve(&"b".into(), 2, &store);
        cache.resolve(&"c".into(), 3, &store);
        cache.resolve(&"a".into(), 4, &store); // touch: a is now most recent
        cache.resolve(&"d".into(), 5, &store); // evicts b, the oldest untouched
        assert_eq!(cache.len(), 3);
        assert!(cache.by_account.contains_key(&AccountName::from("a")));
        assert!(!cache.by_account.contains_key(&AccountName::from("b")));
        assert!(cache.by_account.contains_key(&AccountName::from("c")));
        assert!(cache.by_account.contains_key(&AccountName::from("d")));
    }
}
