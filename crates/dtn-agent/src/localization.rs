//! RSSI-gradient localization: estimate an unconnected target's position
//! from a windowed history of `(position, rssi)` observations.
//!
//! The source simulator fits `rssi = 10*c*log10(1/distance(pos, target))`
//! via `scipy.optimize.leastsq` (Levenberg-Marquardt) seeded at `(0,0,0)`.
//! `nalgebra` has no bundled nonlinear solver, so the same fit is driven by
//! hand-rolled Gauss-Newton iteration over `nalgebra`'s `DMatrix`/`DVector`
//! linear-algebra primitives — a few iterations converge quickly since the
//! model is smooth away from the singularity at `distance == 0`.

use nalgebra::{DMatrix, DVector};

use dtn_core::Position;

/// History window applied to RSSI-gradient localization; distinct from
/// [`crate::history::MAX_HISTORY_LENGTH`], which bounds the whole agent
/// history kept for output.
pub const LOCALIZATION_WINDOW: usize = 100;

/// Minimum sample count required before attempting a fit.
pub const MIN_SAMPLES: usize = 10;

const MAX_ITERATIONS: usize = 50;
const CONVERGENCE_EPS: f64 = 1e-6;

#[derive(Clone, Copy, Debug)]
pub struct Sample {
    pub pos: Position,
    pub rssi: f32,
}

/// A fitted `(a, b, c)` estimate of the target's position and the model's
/// path-loss exponent scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Estimate {
    pub pos: Position,
    pub c: f32,
}

fn model(x: f64, y: f64, a: f64, b: f64, c: f64) -> f64 {
    let dist = ((a - x).powi(2) + (b - y).powi(2)).sqrt();
    if dist <= f64::EPSILON {
        return 0.0;
    }
    10.0 * c * (1.0 / dist).log10()
}

/// Partial derivatives of `model` with respect to `(a, b, c)`, used to build
/// the Gauss-Newton Jacobian.
fn model_gradient(x: f64, y: f64, a: f64, b: f64, c: f64) -> (f64, f64, f64) {
    let dx = a - x;
    let dy = b - y;
    let dist_sq = dx * dx + dy * dy;
    if dist_sq <= f64::EPSILON {
        return (0.0, 0.0, 0.0);
    }
    let dist = dist_sq.sqrt();
    let ln10 = std::f64::consts::LN_10;
    // d/da [10*c*log10(1/dist)] = -10*c/(ln10*dist^2) * dx
    let d_da = -10.0 * c * dx / (ln10 * dist_sq);
    let d_db = -10.0 * c * dy / (ln10 * dist_sq);
    let d_dc = 10.0 * (1.0 / dist).log10();
    (d_da, d_db, d_dc)
}

/// Fit `(a, b, c)` to `samples` via Gauss-Newton, seeded at `(0, 0, 0)` to
/// match the source fit's starting guess.
///
/// Returns `None` if fewer than [`MIN_SAMPLES`] samples are supplied, the
/// Jacobian is singular on some iteration, or the iteration exhausts
/// [`MAX_ITERATIONS`] without reaching [`CONVERGENCE_EPS`] — spec.md §9's
/// "when the optimizer fails to converge, fall back to the default
/// movement pattern and emit no error" requires the caller be able to tell
/// a genuine fit apart from a degenerate, unconverged one.
pub fn fit(samples: &[Sample]) -> Option<Estimate> {
    let windowed: Vec<&Sample> = samples.iter().rev().take(LOCALIZATION_WINDOW).collect();
    if windowed.len() < MIN_SAMPLES {
        return None;
    }

    let n = windowed.len();
    let mut params = DVector::from_vec(vec![0.0f64, 0.0, 0.0]);

    for _ in 0..MAX_ITERATIONS {
        let mut residuals = DVector::zeros(n);
        let mut jacobian = DMatrix::zeros(n, 3);

        let (a, b, c) = (params[0], params[1], params[2]);
        for (i, s) in windowed.iter().enumerate() {
            let x = s.pos.x as f64;
            let y = s.pos.y as f64;
            let predicted = model(x, y, a, b, c);
            residuals[i] = s.rssi as f64 - predicted;

            let (d_da, d_db, d_dc) = model_gradient(x, y, a, b, c);
            // residual = rssi - model, so its gradient is the negation of model's.
            jacobian[(i, 0)] = -d_da;
            jacobian[(i, 1)] = -d_db;
            jacobian[(i, 2)] = -d_dc;
        }

        let jt = jacobian.transpose();
        let jtj = &jt * &jacobian;
        let jtr = &jt * &residuals;

        let Some(jtj_inv) = jtj.clone().try_inverse() else {
            return None;
        };
        let step = jtj_inv * jtr;
        params -= &step;

        if step.norm() < CONVERGENCE_EPS {
            return Some(Estimate {
                pos: Position::new(params[0] as f32, params[1] as f32),
                c: params[2] as f32,
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_few_samples_returns_none() {
        let samples: Vec<Sample> = (0..5)
            .map(|i| Sample {
                pos: Position::new(i as f32, 0.0),
                rssi: -40.0,
            })
            .collect();
        assert!(fit(&samples).is_none());
    }

    #[test]
    fn recovers_target_position_from_noiseless_samples() {
        let target = Position::new(50.0, 30.0);
        let c = 2.5f64;
        let samples: Vec<Sample> = (0..20)
            .map(|i| {
                let x = (i as f32) * 5.0;
                let y = ((i * 3) % 40) as f32;
                let dist = (((target.x - x) as f64).powi(2) + ((target.y - y) as f64).powi(2)).sqrt();
                let rssi = 10.0 * c * (1.0 / dist).log10();
                Sample {
                    pos: Position::new(x, y),
                    rssi: rssi as f32,
                }
            })
            .collect();

        let estimate = fit(&samples).expect("should fit with 20 samples");
        assert!(estimate.pos.distance(target) < 1.0, "estimate {:?} too far from {:?}", estimate.pos, target);
    }
}
