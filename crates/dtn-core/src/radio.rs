//! RSSI channel model and neighbor detection.
//!
//! Pure function of state — there is no failure mode here (spec: "Failure
//! model: none; pure function of state"). The default `PathLoss` source
//! models a free-space path-loss curve with additive Gaussian noise drawn
//! from the owning agent's [`AgentRng`]. Two alternates are provided as
//! pluggable `RssiSource` implementors so a fourth model can be added later
//! without touching `Radio` or the engine: `RealData` (a precomputed grid
//! lookup) and `Shadowing` (grid lookup plus a wall-count penalty derived
//! from a Bresenham walk of an obstacle grid).

use crate::position::Position;
use crate::rng::AgentRng;
use crate::AgentId;

/// Per-agent radio configuration: the two RSSI thresholds that classify a
/// neighbor as merely *detected* versus fully *connected*.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RadioParams {
    pub detection_thresh: f32,
    pub connection_thresh: f32,
}

impl Default for RadioParams {
    fn default() -> Self {
        Self {
            detection_thresh: -90.0,
            connection_thresh: -70.0,
        }
    }
}

/// A pluggable RSSI computation. All sources consume the caller's
/// [`AgentRng`] so that noise draws remain reproducible under the
/// simulation's single-seed determinism guarantee.
pub trait RssiSource {
    fn rssi(&self, a: Position, b: Position, rng: &mut AgentRng) -> f32;
}

/// Default RSSI source: `25 * log10(1/d) + N(0, sigma^2)`, `0` at `d = 0`.
#[derive(Copy, Clone, Debug)]
pub struct PathLoss {
    pub noise_stdev: f32,
}

impl RssiSource for PathLoss {
    fn rssi(&self, a: Position, b: Position, rng: &mut AgentRng) -> f32 {
        let d = a.distance(b);
        if d == 0.0 {
            return 0.0;
        }
        let base = 25.0 * (1.0 / d).log10();
        base + self.noise_stdev * rng.sample_normal()
    }
}

/// A precomputed 2-D RSSI grid, indexed by integer cell coordinates.
/// The interpolation math behind populating such a grid from real captured
/// data is out of scope for this crate; callers supply the finished grid.
#[derive(Clone, Debug)]
pub struct RssiGrid {
    pub cell_size: f32,
    pub values: Vec<Vec<f32>>,
}

impl RssiGrid {
    fn lookup(&self, p: Position) -> f32 {
        let cx = (p.x / self.cell_size) as usize;
        let cy = (p.y / self.cell_size) as usize;
        self.values
            .get(cy)
            .and_then(|row| row.get(cx))
            .copied()
            .unwrap_or(f32::NEG_INFINITY)
    }
}

/// RSSI source backed by a precomputed grid, indexed by the midpoint of the
/// two endpoints (approximating "the RSSI you'd measure around here").
pub struct RealData(pub RssiGrid);

impl RssiSource for RealData {
    fn rssi(&self, a: Position, b: Position, _rng: &mut AgentRng) -> f32 {
        let mid = Position::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        self.0.lookup(mid)
    }
}

/// Binary obstacle grid: `true` = wall present in that cell.
#[derive(Clone, Debug)]
pub struct ObstacleGrid {
    pub cell_size: f32,
    pub walls: Vec<Vec<bool>>,
}

impl ObstacleGrid {
    /// Count obstacle cells crossed on the straight line from `a` to `b`
    /// using a Bresenham walk over grid cells.
    pub fn walls_between(&self, a: Position, b: Position) -> u32 {
        let (mut x0, mut y0) = (
            (a.x / self.cell_size) as i64,
            (a.y / self.cell_size) as i64,
        );
        let (x1, y1) = (
            (b.x / self.cell_size) as i64,
            (b.y / self.cell_size) as i64,
        );

        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        let mut walls = 0u32;
        loop {
            if self
                .walls
                .get(y0.max(0) as usize)
                .and_then(|row| row.get(x0.max(0) as usize))
                .copied()
                .unwrap_or(false)
            {
                walls += 1;
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
        walls
    }
}

/// RSSI source combining a grid lookup with a per-wall penalty.
pub struct Shadowing {
    pub grid: RssiGrid,
    pub obstacles: ObstacleGrid,
}

impl RssiSource for Shadowing {
    fn rssi(&self, a: Position, b: Position, _rng: &mut AgentRng) -> f32 {
        let mid = Position::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        let base = self.grid.lookup(mid);
        let walls = self.obstacles.walls_between(a, b) as f32;
        base - 100.0 * walls
    }
}

/// One entry in an agent's observed neighborhood.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NeighborReport {
    pub id: AgentId,
    pub rssi: f32,
    pub connected: bool,
}

/// An agent's radio peripheral: thresholds plus the last-computed
/// neighborhood snapshot (refreshed once per tick).
#[derive(Clone, Debug)]
pub struct Radio {
    pub params: RadioParams,
    neighborhood: Vec<NeighborReport>,
}

impl Radio {
    pub fn new(params: RadioParams) -> Self {
        Self {
            params,
            neighborhood: Vec::new(),
        }
    }

    /// Recompute the neighborhood against every other agent's position.
    /// Mirrors the source's `get_neighbors`: a full pairwise scan, included
    /// when `rssi >= detection_thresh`, marked `connected` when
    /// `rssi >= connection_thresh`.
    pub fn refresh(
        &mut self,
        my_pos: Position,
        others: impl Iterator<Item = (AgentId, Position)>,
        source: &dyn RssiSource,
        rng: &mut AgentRng,
    ) {
        self.neighborhood.clear();
        for (id, pos) in others {
            let rssi = source.rssi(my_pos, pos, rng);
            if rssi >= self.params.detection_thresh {
                self.neighborhood.push(NeighborReport {
                    id,
                    rssi,
                    connected: rssi >= self.params.connection_thresh,
                });
            }
        }
    }

    pub fn neighborhood(&self) -> &[NeighborReport] {
        &self.neighborhood
    }

    /// `true` if `target` is connected, or if `target == "all"` and any
    /// neighbor is connected (mirrors the source's `target == "all"`
    /// sentinel used by the RSSI-gradient localization behavior).
    pub fn is_connected(&self, target: &str) -> bool {
        self.neighborhood
            .iter()
            .any(|n| n.connected && (target == "all" || n.id.as_str() == target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_is_zero_rssi() {
        let source = PathLoss { noise_stdev: 0.0 };
        let mut rng = AgentRng::new(0, &AgentId::new("a"));
        let p = Position::new(5.0, 5.0);
        assert_eq!(source.rssi(p, p, &mut rng), 0.0);
    }

    #[test]
    fn closer_is_stronger() {
        let source = PathLoss { noise_stdev: 0.0 };
        let mut rng = AgentRng::new(0, &AgentId::new("a"));
        let origin = Position::new(0.0, 0.0);
        let near = source.rssi(origin, Position::new(1.0, 0.0), &mut rng);
        let far = source.rssi(origin, Position::new(10.0, 0.0), &mut rng);
        assert!(near > far);
    }

    #[test]
    fn neighborhood_classification() {
        let mut radio = Radio::new(RadioParams {
            detection_thresh: -50.0,
            connection_thresh: -10.0,
        });
        let source = PathLoss { noise_stdev: 0.0 };
        let mut rng = AgentRng::new(0, &AgentId::new("self"));
        let others = vec![
            (AgentId::new("near"), Position::new(1.0, 0.0)),
            (AgentId::new("far"), Position::new(1000.0, 0.0)),
        ];
        radio.refresh(
            Position::new(0.0, 0.0),
            others.into_iter(),
            &source,
            &mut rng,
        );
        let near = radio
            .neighborhood()
            .iter()
            .find(|n| n.id.as_str() == "near")
            .unwrap();
        assert!(near.connected);
        assert!(radio.neighborhood().iter().all(|n| n.id.as_str() != "far"));
    }
}
