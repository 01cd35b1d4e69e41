//! Contact plan and Schrouter.
//!
//! | Module          | Contents                                               |
//! |-----------------|---------------------------------------------------------|
//! | `contact`       | `Contact` — a scheduled directed transmission opportunity |
//! | `schrouter`      | `ContactPlan` — mutable contact set + earliest-arrival Dijkstra |
//! | `persistence`    | JSON/CSV contact-plan file I/O                         |
//! | `error`          | `ContactError` / `ContactResult`                        |

mod contact;
mod error;
mod persistence;
mod schrouter;

pub use contact::Contact;
pub use error::{ContactError, ContactResult};
pub use persistence::{load_contacts_csv, load_contacts_json, save_contacts_csv, save_contacts_json};
pub use schrouter::{ContactPlan, Route};
