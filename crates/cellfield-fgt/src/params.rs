//! Run parameters: grid resolution, neighbour reach and expansion order.
//!
//! Everything is derived from the normalized bandwidth `δ` and the accuracy
//! `ε`. With boxes of side `r·√(2δ)` a source cluster is well described by
//! a Hermite series of order `p` about its center, and boxes more than `n`
//! boxes away contribute less than `ε` each.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Space dimension.
pub const DIMENSION: usize = 3;

/// Largest accuracy the error bound is derived for.
pub const EPSILON_CEILING: f64 = 0.1;

/// Highest expansion order. Keeps every Hermite order used, up to
/// `2p - 2`, within the tabulated range.
pub const MAX_EXPANSION_ORDER: usize = 11;

/// Parameters of one transform run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunParameters {
    /// Bandwidth in normalized coordinates.
    pub delta: f64,
    /// Accuracy actually used.
    pub epsilon: f64,
    /// Accuracy the configuration asked for.
    pub requested_epsilon: f64,
    /// Whether `epsilon` was lowered to [`EPSILON_CEILING`].
    pub epsilon_clamped: bool,
    /// Boxes per axis, `N_side`.
    pub boxes_per_side: usize,
    /// Box side `r`, in units of `√(2δ)`. Always below 1/2.
    pub box_radius: f64,
    /// Neighbour reach `n`, in boxes, on each axis.
    pub neighbor_reach: usize,
    /// Expansion order `p` (coefficients per axis).
    pub order: usize,
    /// Whether `order` hit [`MAX_EXPANSION_ORDER`] before meeting the bound.
    pub order_clamped: bool,
    /// Sources per box from which a Hermite expansion pays off (`N_F`).
    pub source_cutoff: usize,
    /// Targets per box above which a Taylor expansion pays off (`M_L`).
    pub target_cutoff: usize,
}

impl RunParameters {
    /// Derive the parameters for a normalized bandwidth and requested accuracy.
    ///
    /// `delta` must be positive and finite; `epsilon` positive.
    pub fn derive(delta: f64, requested_epsilon: f64) -> Self {
        debug_assert!(delta > 0.0 && delta.is_finite(), "delta must be positive, got {}", delta);

        let mut epsilon = requested_epsilon;
        let epsilon_clamped = epsilon > EPSILON_CEILING;
        if epsilon_clamped {
            warn!(
                requested = requested_epsilon,
                used = EPSILON_CEILING,
                "epsilon is too large, using epsilon = {} instead",
                EPSILON_CEILING
            );
            epsilon = EPSILON_CEILING;
        }

        let boxes_per_side = (2.0 / delta).sqrt().floor() as usize + 1;
        let box_radius = 1.0 / (boxes_per_side as f64 * (2.0 * delta).sqrt());
        let neighbor_reach = (-0.5 / (box_radius * box_radius) * epsilon.ln())
            .sqrt()
            .floor() as usize;

        let (order, order_clamped) = expansion_order(box_radius, epsilon);
        if order_clamped {
            warn!(
                epsilon,
                order, "Hermite expansion order too large, error may be above tolerance"
            );
        }

        let cutoff = order.pow(DIMENSION as u32 - 1);

        Self {
            delta,
            epsilon,
            requested_epsilon,
            epsilon_clamped,
            boxes_per_side,
            box_radius,
            neighbor_reach,
            order,
            order_clamped,
            source_cutoff: cutoff,
            target_cutoff: cutoff,
        }
    }
}

/// Truncation error bound of an order-`p` expansion, as `ln(E / Q)`.
///
/// `E ≤ Q · (1/p!)^(1/2) · (1 - (1 - r^p)^d) / (1 - r)^d`
pub fn log_error_bound(r: f64, p: usize) -> f64 {
    let d = DIMENSION as i32;
    let ln_factorial: f64 = (2..=p).map(|k| (k as f64).ln()).sum();
    -0.5 * ln_factorial + (1.0 - (1.0 - r.powi(p as i32)).powi(d)).ln() - d as f64 * (1.0 - r).ln()
}

/// Smallest order meeting `ε`, and whether the search ran out of orders.
fn expansion_order(r: f64, epsilon: f64) -> (usize, bool) {
    let target = epsilon.ln();
    (1..=MAX_EXPANSION_ORDER)
        .find(|&p| log_error_bound(r, p) <= target)
        .map_or((MAX_EXPANSION_ORDER, true), |p| (p, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_bandwidth_grid() {
        let params = RunParameters::derive(1.0, 1e-3);
        assert_eq!(params.boxes_per_side, 2);
        assert!((params.box_radius - 1.0 / (2.0 * 2f64.sqrt())).abs() < 1e-12);
        assert_eq!(params.neighbor_reach, 5);
        assert_eq!(params.order, 6);
        assert_eq!(params.source_cutoff, 36);
        assert_eq!(params.target_cutoff, 36);
        assert!(!params.epsilon_clamped);
        assert!(!params.order_clamped);
    }

    #[test]
    fn box_radius_stays_below_half() {
        for &delta in &[4.0, 1.0, 0.3, 0.05, 0.01, 0.0013] {
            let params = RunParameters::derive(delta, 1e-3);
            assert!(params.box_radius < 0.5, "delta {} gave r = {}", delta, params.box_radius);
            assert!(params.boxes_per_side >= 1);
        }
    }

    #[test]
    fn large_epsilon_is_clamped() {
        let params = RunParameters::derive(1.0, 0.5);
        assert!(params.epsilon_clamped);
        assert_eq!(params.epsilon, EPSILON_CEILING);
        assert_eq!(params.requested_epsilon, 0.5);
    }

    #[test]
    fn chosen_order_is_minimal() {
        let params = RunParameters::derive(0.15, 1e-3);
        let target = params.epsilon.ln();
        assert!(log_error_bound(params.box_radius, params.order) <= target);
        if params.order > 1 {
            assert!(log_error_bound(params.box_radius, params.order - 1) > target);
        }
    }

    #[test]
    fn unreachable_accuracy_caps_order() {
        let params = RunParameters::derive(0.15, 1e-30);
        assert_eq!(params.order, MAX_EXPANSION_ORDER);
        assert!(params.order_clamped);
        assert_eq!(params.source_cutoff, 121);
    }
}
