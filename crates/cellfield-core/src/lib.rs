//! # Cellfield Core
//!
//! Core types and collaborator traits for cellfield signal fields.
//!
//! Cells emit diffusible signals from a weighted source point and sense the
//! summed Gaussian field at a set of target points. This crate defines:
//!
//! - **Value types**: [`Point3`](types::Point3), [`SourcePoint`](types::SourcePoint),
//!   [`SignalId`](types::SignalId), [`CellId`](types::CellId)
//! - **Population contracts**: [`FieldSource`](population::FieldSource) for
//!   ingestion and [`FieldSink`](population::FieldSink) for delivery
//! - **Errors**: [`FieldError`](error::FieldError) and its sub-kinds
//!
//! ## Quick Start
//!
//! ```rust
//! use cellfield_core::prelude::*;
//!
//! let source = SourcePoint::new(Point3::new(0.0, 0.0, 0.0), 1.0);
//! let target = Point3::new(1.0, 0.0, 0.0);
//! assert_eq!(source.position.dist2(&target), 1.0);
//!
//! // Deterministic cell ID (for testing)
//! let id = CellId::from_seed(42);
//! ```

pub mod types;
pub mod population;
pub mod error;
pub mod prelude;
