//! Spatial boxes: the uniform grid that clusters nearby points.
//!
//! The unit cube is cut into `side³` boxes, addressed by the linear index
//! `ix + side·iy + side²·iz`. The arena keeps one slot per index, holding
//! the position of the box in a dense list; only boxes that actually hold
//! a point are ever materialized.

use cellfield_core::types::Point3;
use std::collections::BTreeSet;

/// One grid cell: its members and, optionally, a Taylor coefficient buffer.
#[derive(Debug, Clone)]
pub struct SpatialBox {
    center: Point3,
    points: Vec<usize>,
    coefficients: Vec<f64>,
}

impl SpatialBox {
    pub fn new(center: Point3) -> Self {
        Self {
            center,
            points: Vec::new(),
            coefficients: Vec::new(),
        }
    }

    pub fn center(&self) -> Point3 {
        self.center
    }

    /// Add a point index to the membership list.
    pub fn push(&mut self, point: usize) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[usize] {
        &self.points
    }

    /// Number of member points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn coefficients_mut(&mut self) -> &mut [f64] {
        &mut self.coefficients
    }

    /// Allocate a zeroed buffer of `order³` coefficients.
    pub fn reset_coefficients(&mut self, order: usize) {
        self.coefficients.clear();
        self.coefficients.resize(order * order * order, 0.0);
    }
}

/// Geometry of the uniform grid over the unit cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxGrid {
    side: usize,
}

impl BoxGrid {
    pub fn new(side: usize) -> Self {
        assert!(side > 0, "box grid needs at least one box per side");
        Self { side }
    }

    /// Boxes per axis.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Total number of boxes, `side³`.
    pub fn len(&self) -> usize {
        self.side * self.side * self.side
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Linear index of the box containing a normalized point.
    ///
    /// # Panics
    ///
    /// If the point lies outside `[0, 1)³`. Renormalization guarantees it
    /// never does, so reaching this is a broken invariant, not bad input.
    pub fn box_index(&self, p: &Point3) -> usize {
        let n = self.side as f64;
        let coords = [p.x, p.y, p.z];
        let mut cell = [0usize; 3];
        for (axis, &c) in coords.iter().enumerate() {
            let scaled = (n * c).floor();
            if !(scaled >= 0.0 && scaled < n) {
                panic!(
                    "point ({}, {}, {}) maps outside the {}³ box grid on axis {}",
                    p.x, p.y, p.z, self.side, axis
                );
            }
            cell[axis] = scaled as usize;
        }
        let index = self.linear(cell[0], cell[1], cell[2]);
        assert!(index < self.len(), "box index {} exceeds {}", index, self.len());
        index
    }

    fn linear(&self, ix: usize, iy: usize, iz: usize) -> usize {
        ix + self.side * iy + self.side * self.side * iz
    }

    /// `(ix, iy, iz)` of a linear index.
    pub fn cell_of(&self, index: usize) -> (usize, usize, usize) {
        (
            index % self.side,
            (index / self.side) % self.side,
            index / (self.side * self.side),
        )
    }

    /// Geometric center of a box in normalized coordinates.
    pub fn center_of(&self, index: usize) -> Point3 {
        let (ix, iy, iz) = self.cell_of(index);
        let n = self.side as f64;
        Point3::new(
            (ix as f64 + 0.5) / n,
            (iy as f64 + 0.5) / n,
            (iz as f64 + 0.5) / n,
        )
    }

    /// Every box within `reach` boxes of `index` on all three axes,
    /// clipped to the grid, in ascending index order.
    pub fn interaction_list(&self, index: usize, reach: usize, out: &mut Vec<usize>) {
        out.clear();
        let (ix, iy, iz) = self.cell_of(index);
        let last = self.side - 1;
        let span = |c: usize| (c.saturating_sub(reach), (c + reach).min(last));
        let (x0, x1) = span(ix);
        let (y0, y1) = span(iy);
        let (z0, z1) = span(iz);
        for kz in z0..=z1 {
            for ky in y0..=y1 {
                for kx in x0..=x1 {
                    out.push(self.linear(kx, ky, kz));
                }
            }
        }
    }
}

/// Marks a grid slot with no box behind it.
const VACANT: usize = usize::MAX;

/// Arena of boxes for one side (sources or targets), plus the set of
/// indices that were actually touched.
#[derive(Debug, Clone, Default)]
pub struct BoxArena {
    /// Grid index to position in `boxes`, or [`VACANT`].
    slots: Vec<usize>,
    boxes: Vec<SpatialBox>,
    touched: BTreeSet<usize>,
}

impl BoxArena {
    /// An arena with one vacant slot per grid box.
    pub fn with_grid(grid: &BoxGrid) -> Self {
        Self {
            slots: vec![VACANT; grid.len()],
            boxes: Vec::new(),
            touched: BTreeSet::new(),
        }
    }

    /// Record that `point` lives in box `index`, materializing the box on
    /// first touch with a zeroed `order³` coefficient buffer.
    pub fn insert(&mut self, grid: &BoxGrid, index: usize, point: usize, order: usize) {
        let mut slot = self.slots[index];
        if slot == VACANT {
            let mut b = SpatialBox::new(grid.center_of(index));
            b.reset_coefficients(order);
            slot = self.boxes.len();
            self.boxes.push(b);
            self.slots[index] = slot;
            self.touched.insert(index);
        }
        self.boxes[slot].push(point);
    }

    pub fn get(&self, index: usize) -> Option<&SpatialBox> {
        match self.slots.get(index) {
            Some(&slot) if slot != VACANT => self.boxes.get(slot),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SpatialBox> {
        match self.slots.get(index) {
            Some(&slot) if slot != VACANT => self.boxes.get_mut(slot),
            _ => None,
        }
    }

    /// Materialized boxes, in order of first touch.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Touched box indices, ascending.
    pub fn touched(&self) -> &BTreeSet<usize> {
        &self.touched
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.boxes.clear();
        self.touched.clear();
    }
}
