//! Movement patterns: fixed points and the waypoint-list generators
//! (circle, spiral, spline, arc) that all reduce to [`WaypointsPattern`].

use std::f32::consts::PI;

use dtn_core::Position;

use crate::waypoints::WaypointsPattern;

/// A single, unmoving point.
#[derive(Clone, Copy, Debug)]
pub struct FixedPattern {
    pos: Position,
}

impl FixedPattern {
    pub fn new(pos: Position) -> Self {
        Self { pos }
    }

    pub fn starting_pos(&self) -> Position {
        self.pos
    }

    pub fn next(&mut self) -> Position {
        self.pos
    }
}

/// The family of movement patterns an agent may be assigned.
#[derive(Clone, Debug)]
pub enum MovementPattern {
    Fixed(FixedPattern),
    Waypoints(WaypointsPattern),
}

impl MovementPattern {
    pub fn starting_pos(&self) -> Position {
        match self {
            MovementPattern::Fixed(p) => p.starting_pos(),
            MovementPattern::Waypoints(p) => p.starting_pos(),
        }
    }

    pub fn next(&mut self) -> Position {
        match self {
            MovementPattern::Fixed(p) => p.next(),
            MovementPattern::Waypoints(p) => p.next(),
        }
    }

    /// True when the most recent [`Self::next`] call wrapped a non-bounce
    /// waypoint loop back to its first point — the engine repositions the
    /// agent directly onto that point rather than crawling there bounded
    /// by speed (spec.md §4.2).
    pub fn should_teleport(&self) -> bool {
        match self {
            MovementPattern::Fixed(_) => false,
            MovementPattern::Waypoints(p) => p.should_teleport(),
        }
    }
}

fn pol_to_cart(center: Position, radius: f32, angle: f32) -> Position {
    Position::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}

/// A circle of the given radius centered on `center`, traced at roughly
/// `speed` units of arc length per waypoint step.
pub fn circle_pattern(center: Position, radius: f32, speed: f32, repeat: bool) -> MovementPattern {
    let n_waypoints = ((2.0 * PI * radius / speed.max(0.001)) as usize + 1).max(3);
    let waypoints: Vec<Position> = (0..n_waypoints)
        .map(|i| {
            let angle = 2.0 * PI * (i as f32) / (n_waypoints as f32);
            pol_to_cart(center, radius, angle)
        })
        .collect();
    MovementPattern::Waypoints(WaypointsPattern::new(waypoints, 0, true, repeat, false))
}

/// An Archimedean spiral growing outward from `center` until its radius
/// exceeds 1000 units, never repeating.
pub fn spiral_pattern(center: Position, growth: f32, speed: f32) -> MovementPattern {
    let mut waypoints = Vec::new();
    let mut angle = 0.0f32;
    let mut radius = 0.0f32;
    while radius <= 1000.0 {
        waypoints.push(pol_to_cart(center, radius, angle));
        radius += growth;
        let step = speed / radius.max(0.001);
        angle += step;
    }
    if waypoints.len() < 2 {
        waypoints.push(pol_to_cart(center, growth, 0.0));
    }
    MovementPattern::Waypoints(WaypointsPattern::new(waypoints, 0, true, false, false))
}

/// Catmull-Rom spline through `control_points`, resampled at roughly
/// constant arc-length `speed` between output waypoints.
///
/// The original simulator fits a B-spline via `scipy.interpolate.splprep`;
/// scipy is unavailable here, so the curve is instead built from
/// Catmull-Rom segments (a cubic interpolating spline requiring no
/// external numerics) and resampled the same way: densely evaluate, then
/// walk the dense curve accumulating arc length and emit a waypoint every
/// `speed` units.
pub fn spline_pattern(control_points: &[Position], speed: f32, repeat: bool) -> MovementPattern {
    assert!(control_points.len() >= 2, "spline pattern requires at least two control points");

    let dense = catmull_rom_dense(control_points, 40);
    let waypoints = resample_at_constant_spacing(&dense, speed.max(0.001));
    MovementPattern::Waypoints(WaypointsPattern::new(waypoints, 0, true, repeat, false))
}

fn catmull_rom_dense(points: &[Position], samples_per_segment: usize) -> Vec<Position> {
    if points.len() == 2 {
        let mut out = Vec::with_capacity(samples_per_segment + 1);
        for i in 0..=samples_per_segment {
            let t = i as f32 / samples_per_segment as f32;
            out.push(Position::new(
                points[0].x + (points[1].x - points[0].x) * t,
                points[0].y + (points[1].y - points[0].y) * t,
            ));
        }
        return out;
    }

    let get = |i: i64| -> Position {
        let idx = i.clamp(0, points.len() as i64 - 1) as usize;
        points[idx]
    };

    let mut out = Vec::new();
    for seg in 0..points.len() - 1 {
        let p0 = get(seg as i64 - 1);
        let p1 = get(seg as i64);
        let p2 = get(seg as i64 + 1);
        let p3 = get(seg as i64 + 2);

        for i in 0..samples_per_segment {
            let t = i as f32 / samples_per_segment as f32;
            out.push(catmull_rom_point(p0, p1, p2, p3, t));
        }
    }
    out.push(*points.last().unwrap());
    out
}

fn catmull_rom_point(p0: Position, p1: Position, p2: Position, p3: Position, t: f32) -> Position {
    let t2 = t * t;
    let t3 = t2 * t;
    let x = 0.5
        * ((2.0 * p1.x)
            + (-p0.x + p2.x) * t
            + (2.0 * p0.x - 5.0 * p1.x + 4.0 * p2.x - p3.x) * t2
            + (-p0.x + 3.0 * p1.x - 3.0 * p2.x + p3.x) * t3);
    let y = 0.5
        * ((2.0 * p1.y)
            + (-p0.y + p2.y) * t
            + (2.0 * p0.y - 5.0 * p1.y + 4.0 * p2.y - p3.y) * t2
            + (-p0.y + 3.0 * p1.y - 3.0 * p2.y + p3.y) * t3);
    Position::new(x, y)
}

fn resample_at_constant_spacing(dense: &[Position], spacing: f32) -> Vec<Position> {
    let mut out = vec![dense[0]];
    let mut carry = 0.0f32;
    for window in dense.windows(2) {
        let (a, b) = (window[0], window[1]);
        let seg_len = a.distance(b);
        if seg_len <= 0.0 {
            continue;
        }
        let mut pos_along = spacing - carry;
        while pos_along < seg_len {
            let t = pos_along / seg_len;
            out.push(Position::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t));
            pos_along += spacing;
        }
        carry = seg_len - (pos_along - spacing);
    }
    let last = *dense.last().unwrap();
    if out.last().map(|p| p.distance(last)).unwrap_or(f32::MAX) > 1e-6 {
        out.push(last);
    }
    out
}

/// A quadratic arc through exactly three control points (start, through,
/// end), sampled at constant arc-length step like [`spline_pattern`].
///
/// No source-simulator counterpart exists for this pattern; it is designed
/// from scratch using Lagrange quadratic interpolation, the natural
/// generalization of `spline_pattern`'s constant-speed resampling to a
/// single smooth quadratic segment instead of a full Catmull-Rom chain.
pub fn arc_pattern(start: Position, through: Position, end: Position, speed: f32, repeat: bool) -> MovementPattern {
    let samples = 60;
    let dense: Vec<Position> = (0..=samples)
        .map(|i| {
            let t = i as f32 / samples as f32;
            lagrange_quadratic(start, through, end, t)
        })
        .collect();
    let waypoints = resample_at_constant_spacing(&dense, speed.max(0.001));
    MovementPattern::Waypoints(WaypointsPattern::new(waypoints, 0, true, repeat, false))
}

fn lagrange_quadratic(p0: Position, p1: Position, p2: Position, t: f32) -> Position {
    // Nodes at t=0, t=0.5, t=1 for p0, p1, p2 respectively.
    let l0 = (t - 0.5) * (t - 1.0) / ((0.0 - 0.5) * (0.0 - 1.0));
    let l1 = (t - 0.0) * (t - 1.0) / ((0.5 - 0.0) * (0.5 - 1.0));
    let l2 = (t - 0.0) * (t - 0.5) / ((1.0 - 0.0) * (1.0 - 0.5));
    Position::new(
        p0.x * l0 + p1.x * l1 + p2.x * l2,
        p0.y * l0 + p1.y * l1 + p2.y * l2,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_pattern_never_moves() {
        let mut pattern = FixedPattern::new(Position::new(3.0, 4.0));
        assert_eq!(pattern.starting_pos(), Position::new(3.0, 4.0));
        assert_eq!(pattern.next(), Position::new(3.0, 4.0));
    }

    #[test]
    fn circle_pattern_stays_near_radius() {
        let center = Position::new(0.0, 0.0);
        let mut pattern = circle_pattern(center, 10.0, 2.0, true);
        for _ in 0..20 {
            let p = pattern.next();
            let r = p.distance(center);
            assert!((r - 10.0).abs() < 0.5, "radius drifted to {r}");
        }
    }

    #[test]
    fn spiral_pattern_grows_outward_and_stops() {
        let mut pattern = spiral_pattern(Position::new(0.0, 0.0), 5.0, 3.0);
        let mut last_r = 0.0f32;
        for _ in 0..50 {
            let p = pattern.next();
            let r = p.distance(Position::new(0.0, 0.0));
            assert!(r >= last_r - 0.01);
            last_r = r;
        }
    }

    #[test]
    fn spline_pattern_interpolates_between_controls() {
        let controls = vec![Position::new(0.0, 0.0), Position::new(10.0, 0.0), Position::new(10.0, 10.0)];
        let mut pattern = spline_pattern(&controls, 1.0, false);
        let mut last = pattern.starting_pos();
        for _ in 0..5 {
            let p = pattern.next();
            assert!(p.distance(last) < 5.0);
            last = p;
        }
    }

    #[test]
    fn arc_pattern_passes_near_midpoint_control() {
        let start = Position::new(0.0, 0.0);
        let through = Position::new(5.0, 5.0);
        let end = Position::new(10.0, 0.0);
        let p = lagrange_quadratic(start, through, end, 0.5);
        assert_eq!(p, through);
    }
}
