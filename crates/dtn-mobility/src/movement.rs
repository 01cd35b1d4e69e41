//! Per-agent movement state machine: advance a [`MovementPattern`] and
//! step the agent's actual position toward the pattern's current target,
//! bounded by a maximum speed, the model-wide speed limit, and the space's
//! bounds.

use dtn_core::{Bounds, Position};

use crate::error::MobilityError;
use crate::pattern::MovementPattern;

const CLOSE_ENOUGH_EPSILON: f32 = 0.01;

/// Tolerance applied to the `model_speed_limit` check (spec.md §7).
const SPEED_LIMIT_EPSILON: f32 = 0.01;

#[derive(Clone, Debug)]
pub struct Movement {
    pattern: MovementPattern,
    pos: Position,
    target_pos: Position,
    max_speed: f32,
    model_speed_limit: f32,
}

impl Movement {
    pub fn new(pattern: MovementPattern, max_speed: f32, model_speed_limit: f32) -> Self {
        let start = pattern.starting_pos();
        Self {
            pattern,
            pos: start,
            target_pos: start,
            max_speed,
            model_speed_limit,
        }
    }

    pub fn pos(&self) -> Position {
        self.pos
    }

    pub fn is_close_to_point(&self, point: Position) -> bool {
        self.pos.distance(point) <= CLOSE_ENOUGH_EPSILON
    }

    /// Reposition directly to `pos`, bypassing bounds/speed checks — used
    /// when a waypoint loop wraps and the pattern reports
    /// [`MovementPattern::should_teleport`] (spec.md §4.2).
    fn teleport(&mut self, pos: Position) {
        self.pos = pos;
    }

    /// Take one step toward `target`, clamped to `min(max_speed,
    /// model_speed_limit)` and suppressed (logged, position unchanged) if
    /// it would still exceed the model-wide cap or leave `bounds` (spec.md
    /// §7's `OutOfBounds`/`SpeedLimitExceeded` error kinds).
    fn move_towards(&mut self, target: Position, bounds: Bounds) {
        let dx = target.x - self.pos.x;
        let dy = target.y - self.pos.y;
        let dist = (dx * dx + dy * dy).sqrt();

        let candidate = if dist <= self.max_speed || dist == 0.0 {
            target
        } else {
            let scale = self.max_speed / dist;
            self.pos.add(dx * scale, dy * scale)
        };

        let step_len = self.pos.distance(candidate);
        if step_len > self.model_speed_limit + SPEED_LIMIT_EPSILON {
            let err = MobilityError::SpeedLimitExceeded {
                requested: step_len,
                limit: self.model_speed_limit,
            };
            log::warn!("{err}; move suppressed");
            return;
        }

        if bounds.out_of_bounds(candidate) {
            let err = MobilityError::OutOfBounds(candidate);
            log::warn!("{err}; move suppressed");
            return;
        }

        self.pos = candidate;
    }

    /// Advance one tick: pull a new target from the pattern once the
    /// current target has been reached, then either teleport onto it (if
    /// the pattern just wrapped and reports `should_teleport`) or take one
    /// bounded step toward it.
    pub fn step(&mut self, bounds: Bounds) {
        if self.is_close_to_point(self.target_pos) {
            self.target_pos = self.pattern.next();
            if self.pattern.should_teleport() {
                self.teleport(self.target_pos);
                return;
            }
        }
        self.move_towards(self.target_pos, bounds);
    }

    /// Advance one tick toward an externally supplied target, bypassing the
    /// pattern entirely. Used by RSSI-gradient pursuit (spec.md §4.10),
    /// which re-estimates its target every tick rather than following a
    /// fixed pattern.
    pub fn step_towards(&mut self, target: Position, bounds: Bounds) {
        self.move_towards(target, bounds);
        self.target_pos = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::FixedPattern;
    use crate::waypoints::WaypointsPattern;

    const OPEN: Bounds = Bounds { width: 1000.0, height: 1000.0 };

    #[test]
    fn fixed_pattern_agent_does_not_move() {
        let mut movement = Movement::new(MovementPattern::Fixed(FixedPattern::new(Position::new(1.0, 1.0))), 5.0, f32::MAX);
        movement.step(OPEN);
        assert_eq!(movement.pos(), Position::new(1.0, 1.0));
    }

    #[test]
    fn step_is_bounded_by_max_speed() {
        let mut movement = Movement::new(MovementPattern::Fixed(FixedPattern::new(Position::new(0.0, 0.0))), 1.0, f32::MAX);
        movement.target_pos = Position::new(100.0, 0.0);
        movement.step(OPEN);
        assert!((movement.pos().x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn reaches_target_exactly_when_within_speed() {
        let mut movement = Movement::new(MovementPattern::Fixed(FixedPattern::new(Position::new(0.0, 0.0))), 5.0, f32::MAX);
        movement.target_pos = Position::new(2.0, 0.0);
        movement.step(OPEN);
        assert_eq!(movement.pos(), Position::new(2.0, 0.0));
    }

    #[test]
    fn step_towards_ignores_the_pattern() {
        let mut movement = Movement::new(MovementPattern::Fixed(FixedPattern::new(Position::new(0.0, 0.0))), 1.0, f32::MAX);
        movement.step_towards(Position::new(10.0, 0.0), OPEN);
        assert!((movement.pos().x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn step_is_further_clamped_by_model_speed_limit() {
        let mut movement = Movement::new(MovementPattern::Fixed(FixedPattern::new(Position::new(0.0, 0.0))), 5.0, 1.0);
        movement.target_pos = Position::new(100.0, 0.0);
        movement.step(OPEN);
        assert!((movement.pos().x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn move_exceeding_model_speed_limit_is_suppressed() {
        // max_speed alone would take a 5.0 step; model_speed_limit caps it
        // to 1.0, which is itself what gets requested and taken — so push
        // the limit below reach entirely by asking for an unreachable target
        // at max_speed while the limit is smaller than even the clamped step.
        let mut movement = Movement::new(MovementPattern::Fixed(FixedPattern::new(Position::new(0.0, 0.0))), 5.0, 0.0);
        movement.target_pos = Position::new(100.0, 0.0);
        movement.step(OPEN);
        assert_eq!(movement.pos(), Position::new(0.0, 0.0));
    }

    #[test]
    fn move_exiting_bounds_is_suppressed() {
        let mut movement = Movement::new(MovementPattern::Fixed(FixedPattern::new(Position::new(99.0, 0.0))), 5.0, f32::MAX);
        movement.target_pos = Position::new(104.0, 0.0);
        let small = Bounds::new(100.0, 100.0);
        movement.step(small);
        assert_eq!(movement.pos(), Position::new(99.0, 0.0));
    }

    #[test]
    fn wrapping_waypoint_loop_teleports_instead_of_crawling() {
        let waypoints = WaypointsPattern::new(vec![Position::new(0.0, 0.0), Position::new(500.0, 0.0)], 0, true, true, false);
        let mut movement = Movement::new(MovementPattern::Waypoints(waypoints), 1.0, f32::MAX);
        movement.step(OPEN); // 0,0 -> 500,0 (bounded crawl, no wrap yet)
        movement.target_pos = Position::new(500.0, 0.0);
        movement.pos = Position::new(500.0, 0.0);
        movement.step(OPEN); // reached; pattern.next() wraps back to 0,0 and teleports
        assert_eq!(movement.pos(), Position::new(0.0, 0.0));
    }
}
