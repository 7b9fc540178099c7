//! # Cellfield FGT
//!
//! Fast Gauss transform for diffusible signal fields.
//!
//! Given weighted sources `(s_j, q_j)` and targets `t_i` in 3-D, computes
//! `G_i = Σ_j q_j exp(-|t_i - s_j|² / δ)` to accuracy `ε · Σ|q_j|` in
//! roughly linear time, after Greengard and Strain:
//!
//! - points are normalized into the unit cube and bucketed in a uniform grid
//!   of boxes of side `r·√(2δ)`
//! - crowded source boxes are summarized by a Hermite series, crowded target
//!   boxes collect a Taylor series, everything else is summed directly
//! - boxes farther than `n` boxes apart are ignored
//!
//! ## Quick Start
//!
//! ```rust
//! use cellfield_core::prelude::*;
//! use cellfield_fgt::prelude::*;
//!
//! let mut config = DiffusionConfig::new();
//! config.push(SignalId(0), 1.0, 1e-3).unwrap();
//! let mut fgt = FastGaussTransform::with_config(config).unwrap();
//!
//! let mut cloud = PointCloud::new(
//!     vec![SourcePoint::new(Point3::new(0.0, 0.0, 0.0), 1.0)],
//!     vec![Point3::new(1.0, 0.0, 0.0)],
//! );
//! fgt.ingest(SignalId(0), &cloud).unwrap();
//! fgt.normalize().unwrap();
//! fgt.fast_sum().unwrap();
//! fgt.distribute(&mut cloud).unwrap();
//!
//! assert!((cloud.values[0] - (-1.0f64).exp()).abs() < 1e-9);
//! ```

pub mod config;
pub mod expansion;
pub mod hermite;
pub mod metrics;
pub mod params;
pub mod spatial_box;
pub mod transform;

pub mod prelude {
    pub use crate::config::{DiffusionConfig, DiffusiveSignal};
    pub use crate::metrics::{EvalCounters, EvalPath, TransformReport};
    pub use crate::params::{RunParameters, EPSILON_CEILING, MAX_EXPANSION_ORDER};
    pub use crate::transform::{FastGaussTransform, TransformPhase};
}
