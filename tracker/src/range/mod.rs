mod euclidean;
mod lattice;

pub use euclidean::EuclideanRange;
pub use lattice::LatticeRange;

use crate::Tile;

/// Decides whether a probe tile lies within `radius` of a center tile.
///
/// Implementations must be pure and must not allocate. The radius is passed
/// on every call because the effective range may change between calls.
pub trait RangeStrategy {
    fn in_range(&self, probe: Tile, center: Tile, radius: u32) -> bool;
}

/// Which [`RangeStrategy`] a tracker uses.
///
/// The two shapes disagree near the diagonals: for radius 5 the tile at
/// offset (3, 3) lies inside the Euclidean disk but outside the lattice
/// diamond. Pick the one matching the host's own nearest-source search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RangePolicy {
    /// `|dx| + |dy| <= radius`
    #[default]
    Lattice,
    /// `sqrt(dx² + dy²) <= radius`
    Euclidean,
}

impl RangeStrategy for RangePolicy {
    fn in_range(&self, probe: Tile, center: Tile, radius: u32) -> bool {
        match self {
            RangePolicy::Lattice => LatticeRange.in_range(probe, center, radius),
            RangePolicy::Euclidean => EuclideanRange.in_range(probe, center, radius),
        }
    }
}
