//! Cellfield Runtime Prelude: convenient imports for common usage.
//!
//! ```rust
//! use cellfield_runtime::prelude::*;
//! ```

// Re-export population
pub use crate::population::{CellPopulation, FieldCell};

// Re-export the step driver
pub use crate::field_step::{compute_gaussian_fields, SignalField, StepSummary};

// Re-export settings
pub use crate::settings::{FieldSettings, SettingsError, SettingsResult, SignalSettings, StepSettings};

// Re-export checkpoint helpers
pub use crate::checkpoint::{load_config, load_reports, save_config, save_reports};

// Re-export from the engine
pub use cellfield_core::prelude::*;
pub use cellfield_fgt::prelude::*;
