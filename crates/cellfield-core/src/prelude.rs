//! Cellfield Core Prelude: convenient imports for common usage.
//!
//! ```rust
//! use cellfield_core::prelude::*;
//! ```

// Re-export commonly used types
pub use crate::types::{CellId, Point3, SignalId, SourcePoint, Tick};

// Re-export the population contracts
pub use crate::population::{FieldSink, FieldSource, PointCloud, PointSlices};

// Re-export error types
pub use crate::error::{CheckpointError, ConfigError, FieldError, Result, TransformError};
