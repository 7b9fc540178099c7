//! # Cellfield
//!
//! Diffusible signal fields between simulated cells, computed with a fast
//! Gauss transform.
//!
//! Cells secrete signals from their positions and sense them at points of
//! their choosing. Each simulation step, the field every cell sees is
//!
//! ```text
//! G(t) = Σ_j q_j · exp(-|t - s_j|² / δ)
//! ```
//!
//! summed over all emitting cells `s_j`, to a guaranteed accuracy
//! `ε · Σ|q_j|` and in roughly linear time.
//!
//! ## Quick Start
//!
//! ```rust
//! use cellfield::prelude::*;
//!
//! let chemokine = SignalId(0);
//!
//! let mut config = DiffusionConfig::new();
//! config.push(chemokine, 4.0, 1e-4).unwrap();
//! let mut field = SignalField::new(config).unwrap();
//!
//! let mut population = CellPopulation::new();
//! let mut secretor = FieldCell::new(Point3::new(0.0, 0.0, 0.0));
//! secretor.emit(chemokine, 1.0);
//! population.spawn(secretor);
//!
//! let mut responder = FieldCell::new(Point3::new(2.0, 0.0, 0.0));
//! responder.sense(chemokine);
//! let responder = population.spawn(responder);
//!
//! field.step(&mut population).unwrap();
//!
//! let seen = population.get(responder).unwrap().field(chemokine)[0];
//! assert!((seen - (-1.0f64).exp()).abs() < 1e-6);
//! ```
//!
//! ## Architecture
//!
//! - [`cellfield_core`] - Shared value types, population contracts, errors
//! - [`cellfield_fgt`] - The transform engine: Hermite expansions, box grid,
//!   parameter selection, configuration checkpoints
//! - [`cellfield_runtime`] - Cells, per-step driver, TOML settings, checkpoint files
//!
//! ## Evaluation Paths
//!
//! | Source box | Target box | Evaluation |
//! |------------|------------|------------|
//! | few sources | few targets | every pair directly |
//! | few sources | many targets | each Gaussian into the target Taylor series |
//! | many sources | few targets | source Hermite series at each target |
//! | many sources | many targets | Hermite series shifted into the Taylor series |
//!
//! "Few" and "many" are decided against `p²`, where `p` is the smallest
//! expansion order meeting the requested accuracy.
//!
//! ## Checkpoints
//!
//! ```rust,ignore
//! use cellfield::prelude::*;
//! use std::path::Path;
//!
//! save_config(field.config(), Path::new("run/diffusion.ckpt"))?;
//! let field = SignalField::new(load_config(Path::new("run/diffusion.ckpt"))?)?;
//! ```

// Re-export all subcrates
pub use cellfield_core as core;
pub use cellfield_fgt as fgt;
pub use cellfield_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust
/// use cellfield::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use cellfield_core::types::{CellId, Point3, SignalId, SourcePoint, Tick};

    // Core traits
    pub use cellfield_core::population::{FieldSink, FieldSource, PointCloud, PointSlices};

    // Error types
    pub use cellfield_core::error::{
        CheckpointError, ConfigError, FieldError, Result, TransformError,
    };

    // Engine
    pub use cellfield_fgt::config::{DiffusionConfig, DiffusiveSignal};
    pub use cellfield_fgt::metrics::{EvalCounters, EvalPath, TransformReport};
    pub use cellfield_fgt::params::{RunParameters, EPSILON_CEILING, MAX_EXPANSION_ORDER};
    pub use cellfield_fgt::transform::{FastGaussTransform, TransformPhase};

    // Runtime
    pub use cellfield_runtime::population::{CellPopulation, FieldCell};
    pub use cellfield_runtime::field_step::{compute_gaussian_fields, SignalField, StepSummary};
    pub use cellfield_runtime::settings::{
        FieldSettings, SettingsError, SettingsResult, SignalSettings, StepSettings,
    };
    pub use cellfield_runtime::checkpoint::{load_config, load_reports, save_config, save_reports};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
