//! The `RoutingProtocol` trait — the pluggable forwarding-decision seam
//! shared by CGR, Epidemic, and Spray-and-Wait.
//!
//! # Why a `sink` callback instead of mutable neighbor references?
//!
//! Spec.md §5 requires that every side effect produced by agent *i* in a
//! tick is visible to agent *j > i* within that same tick — routing refresh
//! must call straight into a neighbor's own `handle_bundle`, synchronously,
//! not queue an intent for a later apply phase. A protocol implementation
//! does not itself hold references to other agents (that would make
//! `dtn-routing` depend on `dtn-agent`, an upward dependency this workspace
//! avoids). Instead `refresh` accepts a `sink` closure that the caller
//! (`dtn-agent` / `dtn-sim`, which does have access to every agent) supplies;
//! the protocol only decides *which* bundle goes to *which* neighbor, tagged
//! with *how* it should be ingested there.

use dtn_bundle::Bundle;
use dtn_core::{AgentId, SimRng, Tick};

use crate::state::RoutingState;

/// How an outgoing bundle should be ingested by the receiving neighbor.
///
/// Only Spray-and-Wait distinguishes between these; CGR and Epidemic treat
/// every ingest as [`IngestKind::Direct`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestKind {
    /// Normal handoff: CGR/Epidemic forwarding, or a newly originated bundle.
    Direct,
    /// Spray-and-Wait "wait" role: the neighbor was sprayed with this bundle
    /// and should hold it until it meets the final destination.
    Spray,
    /// Final delivery: the receiving neighbor *is* the bundle's destination
    /// and should dispatch its payload unconditionally.
    Final,
}

/// Result of handing a bundle to a protocol's ingress (`handle_bundle`).
#[derive(Debug)]
pub enum HandleOutcome {
    /// The bundle's destination is this node; the caller should dispatch
    /// its payload (see dtn-handshake).
    Delivered(Bundle),
    /// The bundle was accepted and queued/stored locally.
    Stored,
    /// The bundle's id had already been seen; nothing changed.
    Repeated,
}

/// A destination a protocol wants to hand a bundle to during `refresh`,
/// along with how the receiver should ingest it.
pub struct Outgoing {
    pub neighbor: AgentId,
    pub bundle: Bundle,
    pub kind: IngestKind,
}

/// Where outgoing bundles produced during `refresh` go. The caller supplies
/// an implementation that looks up the neighbor agent and calls its
/// `handle_bundle` with the given [`IngestKind`].
pub trait NeighborSink {
    fn send(&mut self, outgoing: Outgoing);
}

impl<F: FnMut(Outgoing)> NeighborSink for F {
    fn send(&mut self, outgoing: Outgoing) {
        (self)(outgoing)
    }
}

pub trait RoutingProtocol {
    /// Ingress: a bundle has just arrived, either from a neighbor's
    /// `refresh` (tagged with the `kind` it was sent with) or from the local
    /// payload handler originating it (always `IngestKind::Direct`).
    fn handle_bundle(
        &mut self,
        local_id: &AgentId,
        kind: IngestKind,
        bundle: Bundle,
        now: Tick,
    ) -> HandleOutcome;

    /// Per-tick forwarding attempt. `connected_neighbors` are the currently
    /// radio-connected router-role neighbor ids (client agents never
    /// participate in routing). `rng` is the simulation's shared PRNG —
    /// Spray-and-Wait's neighbor shuffle draws from it (see spec.md §9:
    /// the original's `np.random.shuffle` uses the process-global RNG, not
    /// a per-agent one); CGR and Epidemic ignore it.
    fn refresh(
        &mut self,
        local_id: &AgentId,
        now: Tick,
        connected_neighbors: &[AgentId],
        sink: &mut dyn NeighborSink,
        rng: &mut SimRng,
    );

    fn get_state(&self) -> RoutingState;
}
