//! Cells and the population that feeds the field transform.
//!
//! A [`FieldCell`] emits signals from its own position and asks for the
//! field value of signals at points of its choosing (its center, points on
//! its membrane, ...). Received values are appended per signal and stay
//! there until [`FieldCell::reset_fields`].

use cellfield_core::population::{FieldSink, FieldSource};
use cellfield_core::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A simulated cell as seen by the signal field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldCell {
    pub id: CellId,
    pub position: Point3,
    /// Emission weight per signal, located at `position`.
    emissions: BTreeMap<SignalId, f64>,
    /// Points where the field of each signal is requested.
    probes: BTreeMap<SignalId, Vec<Point3>>,
    /// Field values received per signal, in probe order.
    #[serde(default)]
    fields: BTreeMap<SignalId, Vec<f64>>,
}

impl FieldCell {
    pub fn new(position: Point3) -> Self {
        Self::with_id(CellId::new(), position)
    }

    pub fn with_id(id: CellId, position: Point3) -> Self {
        Self {
            id,
            position,
            emissions: BTreeMap::new(),
            probes: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Emit `signal` with `weight` from the cell's position.
    ///
    /// A zero weight silences the signal.
    pub fn emit(&mut self, signal: SignalId, weight: f64) {
        if weight == 0.0 {
            self.emissions.remove(&signal);
        } else {
            self.emissions.insert(signal, weight);
        }
    }

    pub fn emission(&self, signal: SignalId) -> f64 {
        self.emissions.get(&signal).copied().unwrap_or(0.0)
    }

    /// Ask for the field of `signal` at the cell's own position.
    pub fn sense(&mut self, signal: SignalId) {
        let at = self.position;
        self.sense_at(signal, at);
    }

    /// Ask for the field of `signal` at an arbitrary point.
    pub fn sense_at(&mut self, signal: SignalId, point: Point3) {
        self.probes.entry(signal).or_default().push(point);
    }

    /// Stop asking for `signal`.
    pub fn clear_probes(&mut self, signal: SignalId) {
        self.probes.remove(&signal);
    }

    pub fn probes(&self, signal: SignalId) -> &[Point3] {
        self.probes.get(&signal).map_or(&[], Vec::as_slice)
    }

    /// Field values received for `signal`, one per probe.
    pub fn field(&self, signal: SignalId) -> &[f64] {
        self.fields.get(&signal).map_or(&[], Vec::as_slice)
    }

    /// Append received values for `signal`.
    pub fn add_field(&mut self, signal: SignalId, values: &[f64]) {
        self.fields.entry(signal).or_default().extend_from_slice(values);
    }

    /// Forget every received field value.
    pub fn reset_fields(&mut self) {
        self.fields.clear();
    }

    /// Move the cell. Probes are absolute points and stay where they are.
    pub fn move_to(&mut self, position: Point3) {
        self.position = position;
    }
}

/// Ordered collection of cells.
///
/// The order of `cells` is the enumeration order the transform relies on
/// between ingestion and delivery.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CellPopulation {
    cells: Vec<FieldCell>,
}

impl CellPopulation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell at the end of the enumeration order.
    pub fn spawn(&mut self, cell: FieldCell) -> CellId {
        let id = cell.id;
        self.cells.push(cell);
        id
    }

    /// Remove a cell, keeping the order of the rest.
    pub fn remove(&mut self, id: CellId) -> Option<FieldCell> {
        let index = self.cells.iter().position(|c| c.id == id)?;
        Some(self.cells.remove(index))
    }

    pub fn get(&self, id: CellId) -> Option<&FieldCell> {
        self.cells.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: CellId) -> Option<&mut FieldCell> {
        self.cells.iter_mut().find(|c| c.id == id)
    }

    pub fn cells(&self) -> &[FieldCell] {
        &self.cells
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FieldCell> {
        self.cells.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn reset_fields(&mut self) {
        self.cells.iter_mut().for_each(FieldCell::reset_fields);
    }

    /// Total emission weight of `signal` over all cells.
    pub fn total_emission(&self, signal: SignalId) -> f64 {
        self.cells.iter().map(|c| c.emission(signal)).sum()
    }
}

impl FieldSource for CellPopulation {
    fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn field_source(&self, cell: usize, signal: SignalId) -> Option<SourcePoint> {
        let cell = self.cells.get(cell)?;
        let weight = *cell.emissions.get(&signal)?;
        Some(SourcePoint::new(cell.position, weight))
    }

    fn field_targets(&self, cell: usize, signal: SignalId) -> &[Point3] {
        self.cells.get(cell).map_or(&[], |c| c.probes(signal))
    }
}

impl FieldSink for CellPopulation {
    fn deliver_field(&mut self, cell: usize, signal: SignalId, values: &[f64]) {
        if let Some(cell) = self.cells.get_mut(cell) {
            cell.add_field(signal, values);
        }
    }
}

impl FromIterator<FieldCell> for CellPopulation {
    fn from_iter<I: IntoIterator<Item = FieldCell>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}
