//! # Cellfield Runtime
//!
//! Cell population, per-step field computation and settings.
//!
//! The runtime owns the cells. Each step it hands them to the fast Gauss
//! transform once per diffusing signal and collects the field values each
//! cell asked for.

pub mod checkpoint;
pub mod field_step;
pub mod population;
pub mod prelude;
pub mod settings;
