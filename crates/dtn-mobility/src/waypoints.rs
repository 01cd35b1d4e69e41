//! `WaypointsPattern` — cycles through a precomputed list of positions.
//!
//! Circle, spiral, and spline patterns all materialize their full waypoint
//! list up front and then reduce to this same traversal machinery, matching
//! the source simulator's approach of building dense waypoint lists rather
//! than evaluating the curve analytically every step.

use dtn_core::Position;

#[derive(Clone, Debug)]
pub struct WaypointsPattern {
    waypoints: Vec<Position>,
    index: usize,
    forward: bool,
    repeat: bool,
    bounce: bool,
    just_teleported: bool,
}

impl WaypointsPattern {
    pub fn new(waypoints: Vec<Position>, start_index: usize, forward: bool, repeat: bool, bounce: bool) -> Self {
        assert!(!waypoints.is_empty(), "waypoints pattern requires at least one point");
        Self {
            index: start_index % waypoints.len(),
            waypoints,
            forward,
            repeat,
            bounce,
            just_teleported: false,
        }
    }

    pub fn starting_pos(&self) -> Position {
        self.waypoints[self.index]
    }

    /// Advance to (and return) the next waypoint, applying bounce/repeat
    /// semantics at the ends of the list.
    pub fn next(&mut self) -> Position {
        let len = self.waypoints.len() as i64;
        let mut next_index = self.index as i64 + if self.forward { 1 } else { -1 };
        self.just_teleported = false;

        if next_index >= len || next_index < 0 {
            if self.repeat {
                if self.bounce {
                    self.forward = !self.forward;
                    next_index = if self.forward { 1 } else { len - 2 };
                } else {
                    next_index = 0;
                    self.just_teleported = true;
                }
            } else {
                next_index = self.index as i64;
            }
        }

        self.index = next_index.clamp(0, len - 1) as usize;
        self.waypoints[self.index]
    }

    /// True if the wraparound performed by the most recent `next()` call
    /// should reposition the agent directly rather than have it crawl
    /// there bounded by speed — a non-bounce loop closing back to its
    /// first waypoint.
    pub fn should_teleport(&self) -> bool {
        self.just_teleported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn repeats_from_start_without_bounce() {
        let mut pattern = WaypointsPattern::new(vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)], 0, true, true, false);
        assert_eq!(pattern.next(), p(1.0, 0.0));
        assert_eq!(pattern.next(), p(2.0, 0.0));
        assert_eq!(pattern.next(), p(0.0, 0.0));
    }

    #[test]
    fn bounces_at_ends() {
        let mut pattern = WaypointsPattern::new(vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)], 0, true, true, true);
        assert_eq!(pattern.next(), p(1.0, 0.0));
        assert_eq!(pattern.next(), p(2.0, 0.0));
        // bounced: forward flips false, next_index = len-2 = 1
        assert_eq!(pattern.next(), p(1.0, 0.0));
        assert_eq!(pattern.next(), p(0.0, 0.0));
    }

    #[test]
    fn non_bounce_wrap_reports_teleport_but_bounce_does_not() {
        let mut wrapping = WaypointsPattern::new(vec![p(0.0, 0.0), p(1.0, 0.0)], 0, true, true, false);
        wrapping.next(); // -> 1.0, no wrap
        assert!(!wrapping.should_teleport());
        wrapping.next(); // wraps back to 0.0
        assert!(wrapping.should_teleport());

        let mut bouncing = WaypointsPattern::new(vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)], 0, true, true, true);
        bouncing.next();
        bouncing.next();
        bouncing.next(); // bounces, does not wrap to start
        assert!(!bouncing.should_teleport());
    }

    #[test]
    fn stops_at_end_without_repeat() {
        let mut pattern = WaypointsPattern::new(vec![p(0.0, 0.0), p(1.0, 0.0)], 0, true, false, false);
        assert_eq!(pattern.next(), p(1.0, 0.0));
        assert_eq!(pattern.next(), p(1.0, 0.0));
    }
}
