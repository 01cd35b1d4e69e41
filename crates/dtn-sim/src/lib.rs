//! `dtn-sim` — the single-threaded tick loop tying every other crate
//! together: data-drop scheduling, per-agent radio/protocol/handshake
//! refresh in strict insertion order, RSSI-gradient pursuit movement,
//! contact-plan capture, and cumulative metrics.
//!
//! | Module             | Contents                                          |
//! |--------------------|----------------------------------------------------|
//! | `sim`              | `Sim` — the tick loop itself (spec.md §4.11)      |
//! | `drops`            | `DropSchedule` — scheduled data drops (§4.9)      |
//! | `contact_capture`  | `ContactCapture` — `--make-contact-plan` support  |
//! | `metrics`          | `Metrics` / `Summary` — cumulative run metrics (§4.12) |
//! | `observer`         | `SimObserver` / `NoopObserver`                    |
//! | `error`            | `SimError` / `SimResult`                          |

mod contact_capture;
mod drops;
mod error;
mod metrics;
mod observer;
mod sim;

pub use contact_capture::ContactCapture;
pub use drops::{DataDrop, DropSchedule, DropScheduleEntry, DROP_PICKUP_RANGE};
pub use error::{SimError, SimResult};
pub use metrics::{Metrics, Summary};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
