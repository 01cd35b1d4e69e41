//! Bundle and payload envelope types, plus per-destination store-and-forward
//! storage.
//!
//! | Module     | Contents                                               |
//! |------------|---------------------------------------------------------|
//! | `payload`  | `Payload` variants: `ClientPayload`, beacons, mapping gossip |
//! | `bundle`   | `Bundle` — the store-and-forward envelope               |
//! | `storage`  | `Storage` — per-destination queues, dedup, expiry sweep  |

mod bundle;
mod payload;
mod storage;

pub use bundle::Bundle;
pub use payload::{ClientBeaconPayload, ClientMappingDictPayload, ClientPayload, Payload, CLIENT_PAYLOAD_LIFESPAN};
pub use storage::Storage;
