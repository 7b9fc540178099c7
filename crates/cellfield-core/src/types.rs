//! Shared types used across all cellfield crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, Sub};
use uuid::Uuid;

/// Unique identifier for a cell in the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellId(pub Uuid);

impl CellId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Deterministic identifier, for tests and reproducible setups.
    pub fn from_seed(seed: u64) -> Self {
        Self(Uuid::from_u64_pair(seed, 0))
    }
}

impl Default for CellId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier of a diffusing intercellular signal.
///
/// Stored as 16 bits because the checkpoint format writes it that way.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SignalId(pub u16);

impl SignalId {
    pub fn new(id: u16) -> Self {
        Self(id)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "signal-{}", self.0)
    }
}

/// A point in 3-D space. Pure value, no identity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ORIGIN: Point3 = Point3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared euclidean distance.
    pub fn dist2(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance_to(&self, other: &Point3) -> f64 {
        self.dist2(other).sqrt()
    }

    /// Coordinates as an array, x first.
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn from_array(a: [f64; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    /// Smallest of the three coordinates.
    pub fn min_component(&self) -> f64 {
        self.x.min(self.y).min(self.z)
    }

    /// Largest of the three coordinates.
    pub fn max_component(&self) -> f64 {
        self.x.max(self.y).max(self.z)
    }

    /// Apply the same affine map to every coordinate.
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.x), f(self.y), f(self.z))
    }
}

impl Index<usize> for Point3 {
    type Output = f64;

    /// Component by axis: 0 is x, 1 is y, 2 is z.
    fn index(&self, axis: usize) -> &f64 {
        match axis {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("axis {} out of range for Point3", axis),
        }
    }
}

impl Sub for Point3 {
    type Output = Point3;

    fn sub(self, rhs: Point3) -> Point3 {
        Point3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// A weighted point emitting a Gaussian contribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourcePoint {
    pub position: Point3,
    /// Emission weight. Sources with weight exactly zero are never ingested.
    pub weight: f64,
}

impl SourcePoint {
    pub fn new(position: Point3, weight: f64) -> Self {
        Self { position, weight }
    }

    /// Whether this source contributes anything at all.
    pub fn is_active(&self) -> bool {
        self.weight != 0.0
    }
}

/// Simulation step counter.
pub type Tick = u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dist2_is_squared_distance() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 2.0, 2.0);
        assert_eq!(a.dist2(&b), 9.0);
        assert_eq!(a.distance_to(&b), 3.0);
    }

    #[test]
    fn components_by_axis() {
        let p = Point3::new(1.0, -2.0, 3.5);
        assert_eq!([p[0], p[1], p[2]], p.to_array());
    }

    #[test]
    #[should_panic]
    fn axis_past_z_panics() {
        let _ = Point3::ORIGIN[3];
    }

    #[test]
    fn component_extremes() {
        let p = Point3::new(-1.5, 4.0, 0.25);
        assert_eq!(p.min_component(), -1.5);
        assert_eq!(p.max_component(), 4.0);
    }

    #[test]
    fn zero_weight_source_is_inactive() {
        assert!(!SourcePoint::new(Point3::ORIGIN, 0.0).is_active());
        assert!(SourcePoint::new(Point3::ORIGIN, -0.5).is_active());
    }

    #[test]
    fn seeded_cell_ids_are_stable() {
        assert_eq!(CellId::from_seed(7), CellId::from_seed(7));
        assert_ne!(CellId::from_seed(7), CellId::from_seed(8));
    }
}
