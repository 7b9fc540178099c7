//! Population contracts: how a transform reads cells and hands values back.
//!
//! The transform engine never owns cells. It walks a population through
//! [`FieldSource`] while ingesting points and pushes results through
//! [`FieldSink`] when distributing them. Both sides must enumerate cells in
//! the same stable order: results are matched back by position alone.

use crate::types::*;

/// Read side of a cell population: the ingestion contract.
///
/// Cells are addressed by their position in the population's enumeration
/// order, `0..cell_count()`. That order must not change between ingestion
/// and delivery of one transform cycle.
pub trait FieldSource {
    /// Number of cells in the population.
    fn cell_count(&self) -> usize;

    /// The weighted source point a cell emits for `signal`, if any.
    ///
    /// A source with weight exactly zero is treated as absent.
    fn field_source(&self, cell: usize, signal: SignalId) -> Option<SourcePoint>;

    /// Points at which a cell needs the field value of `signal`.
    fn field_targets(&self, cell: usize, signal: SignalId) -> &[Point3];
}

/// Write side of a cell population: the delivery contract.
pub trait FieldSink {
    /// Hand a cell the field values for its declared targets.
    ///
    /// `values` has one entry per target returned by
    /// [`FieldSource::field_targets`] during ingestion, in the same order.
    /// Called exactly once per cell per cycle, possibly with an empty slice.
    fn deliver_field(&mut self, cell: usize, signal: SignalId, values: &[f64]);
}

/// Plain point lists, for callers that have no cell structure.
///
/// Every source and every target belongs to its own pseudo-cell: sources
/// first, then targets.
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    pub sources: Vec<SourcePoint>,
    pub targets: Vec<Point3>,
    /// Values delivered back, one per target.
    pub values: Vec<f64>,
}

impl PointCloud {
    pub fn new(sources: Vec<SourcePoint>, targets: Vec<Point3>) -> Self {
        Self {
            sources,
            targets,
            values: Vec::new(),
        }
    }
}

impl PointCloud {
    /// Borrow the point lists as a read-only population.
    pub fn as_slices(&self) -> PointSlices<'_> {
        PointSlices::new(&self.sources, &self.targets)
    }
}

impl FieldSource for PointCloud {
    fn cell_count(&self) -> usize {
        self.as_slices().cell_count()
    }

    fn field_source(&self, cell: usize, signal: SignalId) -> Option<SourcePoint> {
        self.as_slices().field_source(cell, signal)
    }

    fn field_targets(&self, cell: usize, _signal: SignalId) -> &[Point3] {
        self.as_slices().targets_of(cell)
    }
}

/// Borrowed point lists, laid out as [`PointCloud`] lays out its own.
#[derive(Debug, Clone, Copy)]
pub struct PointSlices<'a> {
    sources: &'a [SourcePoint],
    targets: &'a [Point3],
}

impl<'a> PointSlices<'a> {
    pub fn new(sources: &'a [SourcePoint], targets: &'a [Point3]) -> Self {
        Self { sources, targets }
    }

    /// The single target of a target pseudo-cell; empty for source cells.
    pub fn targets_of(&self, cell: usize) -> &'a [Point3] {
        match cell.checked_sub(self.sources.len()) {
            Some(t) if t < self.targets.len() => std::slice::from_ref(&self.targets[t]),
            _ => &[],
        }
    }
}

impl FieldSource for PointSlices<'_> {
    fn cell_count(&self) -> usize {
        self.sources.len() + self.targets.len()
    }

    fn field_source(&self, cell: usize, _signal: SignalId) -> Option<SourcePoint> {
        self.sources.get(cell).copied()
    }

    fn field_targets(&self, cell: usize, _signal: SignalId) -> &[Point3] {
        self.targets_of(cell)
    }
}

impl FieldSink for PointCloud {
    fn deliver_field(&mut self, cell: usize, _signal: SignalId, values: &[f64]) {
        if cell == 0 {
            self.values.clear();
        }
        self.values.extend_from_slice(values);
    }
}
