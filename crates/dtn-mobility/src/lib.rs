//! Declarative movement patterns and the per-agent movement state machine.
//!
//! | Module       | Contents                                                    |
//! |--------------|--------------------------------------------------------------|
//! | `waypoints`  | `WaypointsPattern` — index-cycling traversal of a point list |
//! | `pattern`    | `FixedPattern`, `MovementPattern`, circle/spiral/spline/arc   |
//! | `movement`   | `Movement` — per-agent position + pattern-following step     |
//! | `error`      | `MobilityError` / `MobilityResult`                          |

mod error;
mod movement;
mod pattern;
mod waypoints;

pub use error::{MobilityError, MobilityResult};
pub use movement::Movement;
pub use pattern::{arc_pattern, circle_pattern, spiral_pattern, spline_pattern, FixedPattern, MovementPattern};
pub use waypoints::WaypointsPattern;
