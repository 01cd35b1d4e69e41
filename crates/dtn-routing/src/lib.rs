//! Pluggable routing protocols.
//!
//! | Module            | Contents                                          |
//! |--------------------|----------------------------------------------------|
//! | `protocol`         | `RoutingProtocol` trait, `IngestKind`, `NeighborSink` |
//! | `cgr`              | `Cgr` — Contact-Graph Routing                     |
//! | `epidemic`         | `Epidemic` — flood-and-dedup                      |
//! | `spray_and_wait`   | `SprayAndWait` — bounded spray + wait-for-meeting |
//! | `state`            | `RoutingState` — protocol-agnostic metrics snapshot |
//! | `error`            | `RoutingError` / `RoutingResult`                  |

mod cgr;
mod epidemic;
mod error;
mod protocol;
mod spray_and_wait;
mod state;

pub use cgr::Cgr;
pub use epidemic::Epidemic;
pub use error::{RoutingError, RoutingResult};
pub use protocol::{HandleOutcome, IngestKind, NeighborSink, Outgoing, RoutingProtocol};
pub use spray_and_wait::{SprayAndWait, NUM_NODES_TO_SPRAY};
pub use state::RoutingState;
