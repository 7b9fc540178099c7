//! Expansion kernels: the four ways a source box reaches a target box.
//!
//! All series are in scaled offsets `u = (x - c) / √δ` about a box center
//! `c`, truncated at order `p` per axis, with coefficients laid out as
//! `β1·p² + β2·p + β3`.
//!
//! - Hermite (far field, about a source center `s_B`):
//!   `G(t) = Σ_α A_α h_α((t - s_B)/√δ)`, `A_α = 1/α! Σ_j q_j ((s_j - s_B)/√δ)^α`
//! - Taylor (near field, about a target center `t_C`):
//!   `G(t) = Σ_β B_β ((t - t_C)/√δ)^β`
//!
//! Multi-indices factor over the three axes, so every kernel builds one
//! table per axis and combines them.

use crate::hermite::{self, FACTORIAL};
use cellfield_core::types::Point3;

/// Per-axis tables, reused across points to keep the hot loops
/// allocation-free.
#[derive(Debug, Clone)]
struct AxisTables {
    axes: [Vec<f64>; 3],
}

impl AxisTables {
    fn new(len: usize) -> Self {
        Self {
            axes: [vec![0.0; len], vec![0.0; len], vec![0.0; len]],
        }
    }

    /// Hermite functions `h_k(u_axis)` for `k < len`.
    fn fill_hermite(&mut self, u: [f64; 3]) {
        for (axis, table) in self.axes.iter_mut().enumerate() {
            hermite::functions_into(u[axis], table);
        }
    }

    /// Monomials `u_axis^k`, optionally divided by `k!`.
    fn fill_powers(&mut self, u: [f64; 3], divide_factorial: bool) {
        for (axis, table) in self.axes.iter_mut().enumerate() {
            let mut power = 1.0;
            for (k, slot) in table.iter_mut().enumerate() {
                *slot = if divide_factorial { power / FACTORIAL[k] } else { power };
                power *= u[axis];
            }
        }
    }
}

/// Gaussian kernel `exp(-|t - s|² / δ)` and its truncated expansions.
#[derive(Debug, Clone, Copy)]
pub struct GaussKernel {
    delta: f64,
    sqrt_delta: f64,
    order: usize,
}

impl GaussKernel {
    pub fn new(delta: f64, order: usize) -> Self {
        debug_assert!(2 * order - 1 <= hermite::MAX_ORDER + 1);
        Self {
            delta,
            sqrt_delta: delta.sqrt(),
            order,
        }
    }

    /// Coefficients per expansion, `p³`.
    pub fn coefficient_count(&self) -> usize {
        self.order * self.order * self.order
    }

    fn scaled(&self, x: &Point3, center: &Point3) -> [f64; 3] {
        [
            (x.x - center.x) / self.sqrt_delta,
            (x.y - center.y) / self.sqrt_delta,
            (x.z - center.z) / self.sqrt_delta,
        ]
    }

    /// Exact kernel value.
    pub fn eval(&self, t: &Point3, s: &Point3) -> f64 {
        (-t.dist2(s) / self.delta).exp()
    }

    /// Sum every source of one box directly into every target of another.
    pub fn direct_direct(
        &self,
        sources: &[Point3],
        weights: &[f64],
        source_ids: &[usize],
        targets: &[Point3],
        target_ids: &[usize],
        values: &mut [f64],
    ) {
        for &i in target_ids {
            let t = &targets[i];
            let mut acc = 0.0;
            for &j in source_ids {
                acc += weights[j] * self.eval(t, &sources[j]);
            }
            values[i] += acc;
        }
    }

    /// Expand each source Gaussian about `center` and accumulate the Taylor
    /// coefficients `B_β += q_j h_β((s_j - c)/√δ) / β!` into `taylor`.
    pub fn direct_taylor(
        &self,
        sources: &[Point3],
        weights: &[f64],
        source_ids: &[usize],
        center: &Point3,
        taylor: &mut [f64],
    ) {
        let p = self.order;
        let mut h = AxisTables::new(p);
        for &j in source_ids {
            h.fill_hermite(self.scaled(&sources[j], center));
            let q = weights[j];
            let [hx, hy, hz] = &h.axes;
            for b1 in 0..p {
                let c1 = q * hx[b1] / FACTORIAL[b1];
                for b2 in 0..p {
                    let c2 = c1 * hy[b2] / FACTORIAL[b2];
                    let row = b1 * p * p + b2 * p;
                    for b3 in 0..p {
                        taylor[row + b3] += c2 * hz[b3] / FACTORIAL[b3];
                    }
                }
            }
        }
    }

    /// Hermite coefficients `A_α` of one source box about its `center`.
    /// Overwrites `hermite`.
    pub fn hermite_coefficients(
        &self,
        sources: &[Point3],
        weights: &[f64],
        source_ids: &[usize],
        center: &Point3,
        hermite: &mut [f64],
    ) {
        let p = self.order;
        hermite.iter_mut().for_each(|a| *a = 0.0);
        let mut m = AxisTables::new(p);
        for &j in source_ids {
            m.fill_powers(self.scaled(&sources[j], center), true);
            let q = weights[j];
            let [mx, my, mz] = &m.axes;
            for a1 in 0..p {
                let c1 = q * mx[a1];
                for a2 in 0..p {
                    let c2 = c1 * my[a2];
                    let row = a1 * p * p + a2 * p;
                    for a3 in 0..p {
                        hermite[row + a3] += c2 * mz[a3];
                    }
                }
            }
        }
    }

    /// Evaluate a Hermite series centered at `source_center` at each target.
    pub fn hermite_direct(
        &self,
        hermite: &[f64],
        source_center: &Point3,
        targets: &[Point3],
        target_ids: &[usize],
        values: &mut [f64],
    ) {
        let p = self.order;
        let mut h = AxisTables::new(p);
        for &i in target_ids {
            h.fill_hermite(self.scaled(&targets[i], source_center));
            let [hx, hy, hz] = &h.axes;
            let mut acc = 0.0;
            for a1 in 0..p {
                for a2 in 0..p {
                    let c12 = hx[a1] * hy[a2];
                    let row = a1 * p * p + a2 * p;
                    for a3 in 0..p {
                        acc += hermite[row + a3] * c12 * hz[a3];
                    }
                }
            }
            values[i] += acc;
        }
    }

    /// Convert a Hermite series about `source_center` into Taylor
    /// coefficients about `target_center`:
    /// `B_β += (-1)^|β| / β! Σ_α A_α h_{α+β}((t_C - s_B)/√δ)`.
    pub fn hermite_taylor(
        &self,
        hermite: &[f64],
        source_center: &Point3,
        target_center: &Point3,
        taylor: &mut [f64],
    ) {
        let p = self.order;
        let mut h = AxisTables::new(2 * p - 1);
        h.fill_hermite(self.scaled(target_center, source_center));
        let [hx, hy, hz] = &h.axes;

        for b1 in 0..p {
            for b2 in 0..p {
                for b3 in 0..p {
                    let mut acc = 0.0;
                    for a1 in 0..p {
                        for a2 in 0..p {
                            let c12 = hx[a1 + b1] * hy[a2 + b2];
                            let row = a1 * p * p + a2 * p;
                            for a3 in 0..p {
                                acc += hermite[row + a3] * c12 * hz[a3 + b3];
                            }
                        }
                    }
                    if (b1 + b2 + b3) % 2 == 1 {
                        acc = -acc;
                    }
                    acc /= FACTORIAL[b1] * FACTORIAL[b2] * FACTORIAL[b3];
                    taylor[b1 * p * p + b2 * p + b3] += acc;
                }
            }
        }
    }

    /// Evaluate accumulated Taylor coefficients about `center` at each target.
    pub fn taylor_evaluate(
        &self,
        taylor: &[f64],
        center: &Point3,
        targets: &[Point3],
        target_ids: &[usize],
        values: &mut [f64],
    ) {
        let p = self.order;
        let mut m = AxisTables::new(p);
        for &i in target_ids {
            m.fill_powers(self.scaled(&targets[i], center), false);
            let [mx, my, mz] = &m.axes;
            let mut acc = 0.0;
            for b1 in 0..p {
                for b2 in 0..p {
                    let c12 = mx[b1] * my[b2];
                    let row = b1 * p * p + b2 * p;
                    for b3 in 0..p {
                        acc += taylor[row + b3] * c12 * mz[b3];
                    }
                }
            }
            values[i] += acc;
        }
    }
}
