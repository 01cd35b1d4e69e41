//! Per-destination bundle storage with dedup-by-id and expiry sweeping.

use std::collections::{HashMap, HashSet};

use dtn_core::{AgentId, Tick};

use crate::bundle::Bundle;

/// Store-and-forward queue, keyed by destination.
///
/// Invariants (checked by tests, not at runtime — see spec.md §3/§4.4):
/// 1. If `dest_id` is a key, its list is non-empty.
/// 2. A bundle id is in `seen_bundle_ids` iff it was ever accepted locally.
/// 3. After [`Storage::refresh`], every stored bundle has `expiration_ts > now`.
#[derive(Debug, Default)]
pub struct Storage {
    stored: HashMap<AgentId, Vec<Bundle>>,
    seen_bundle_ids: HashSet<String>,
}

impl Storage {
    pub fn new() -> Self {
        Self {
            stored: HashMap::new(),
            seen_bundle_ids: HashSet::new(),
        }
    }

    pub fn seen_before(&self, bundle: &Bundle) -> bool {
        self.seen_bundle_ids.contains(&bundle.bundle_id)
    }

    /// Insert `bundle` under `dest_id` unless it has been seen before.
    /// Returns `true` if the bundle was a duplicate and nothing changed.
    pub fn store_bundle(&mut self, dest_id: AgentId, bundle: Bundle) -> bool {
        if self.seen_before(&bundle) {
            return true;
        }
        self.seen_bundle_ids.insert(bundle.bundle_id.clone());
        self.stored.entry(dest_id).or_default().push(bundle);
        false
    }

    pub fn all_bundle_dest_ids(&self) -> Vec<AgentId> {
        self.stored.keys().cloned().collect()
    }

    pub fn all_bundles(&self) -> Vec<&Bundle> {
        self.stored.values().flatten().collect()
    }

    pub fn bundles_for_dest(&self, dest_id: &AgentId) -> Option<&[Bundle]> {
        self.stored.get(dest_id).map(|v| v.as_slice())
    }

    /// Remove and return every bundle queued for `dest_id`; the key is
    /// dropped entirely (not left as an empty list).
    pub fn remove_all_bundles_for_dest(&mut self, dest_id: &AgentId) -> Option<Vec<Bundle>> {
        self.stored.remove(dest_id)
    }

    /// Drop every bundle whose `expiration_ts <= now`; keys left empty by the
    /// sweep are removed entirely.
    pub fn refresh(&mut self, now: Tick) {
        let mut empty_keys = Vec::new();
        for (dest_id, bundles) in self.stored.iter_mut() {
            bundles.retain(|b| !b.is_expired(now));
            if bundles.is_empty() {
                empty_keys.push(dest_id.clone());
            }
        }
        for key in empty_keys {
            self.stored.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{ClientBeaconPayload, Payload};

    fn aid(s: &str) -> AgentId {
        AgentId::new(s)
    }

    fn bundle(id: &str, dest: &str, expiry: u64) -> Bundle {
        Bundle::new(
            id.to_string(),
            aid(dest),
            Payload::ClientBeacon(ClientBeaconPayload { client_id: aid("c0") }),
            Tick::ZERO,
            expiry,
        )
    }

    #[test]
    fn duplicate_insert_is_ignored() {
        let mut storage = Storage::new();
        assert!(!storage.store_bundle(aid("d"), bundle("b0", "d", 100)));
        assert!(storage.store_bundle(aid("d"), bundle("b0", "d", 100)));
        assert_eq!(storage.bundles_for_dest(&aid("d")).unwrap().len(), 1);
    }

    #[test]
    fn remove_all_drops_the_key() {
        let mut storage = Storage::new();
        storage.store_bundle(aid("d"), bundle("b0", "d", 100));
        let removed = storage.remove_all_bundles_for_dest(&aid("d")).unwrap();
        assert_eq!(removed.len(), 1);
        assert!(storage.bundles_for_dest(&aid("d")).is_none());
        assert!(!storage.all_bundle_dest_ids().contains(&aid("d")));
    }

    #[test]
    fn refresh_drops_expired_and_empties_key() {
        let mut storage = Storage::new();
        storage.store_bundle(aid("d"), bundle("b0", "d", 5));
        storage.refresh(Tick(10));
        assert!(storage.bundles_for_dest(&aid("d")).is_none());
        assert!(storage.all_bundle_dest_ids().is_empty());
    }

    #[test]
    fn refresh_keeps_unexpired_bundles() {
        let mut storage = Storage::new();
        storage.store_bundle(aid("d"), bundle("b0", "d", 100));
        storage.refresh(Tick(10));
        assert_eq!(storage.bundles_for_dest(&aid("d")).unwrap().len(), 1);
    }
}
