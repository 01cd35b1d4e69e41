//! `RoutingState` — a protocol-agnostic snapshot used by metrics and the
//! engine's per-tick history log.

#[derive(Debug, Clone, Default)]
pub struct RoutingState {
    pub num_stored_bundles: usize,
    pub num_bundle_sends: u64,
    pub num_repeated_bundle_receives: u64,
    pub num_bundle_reached_destination: u64,
}
