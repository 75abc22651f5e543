use crate::{RangeStrategy, Tile};

/// Disk-shaped range using straight-line distance.
#[derive(Clone, Copy, Debug, Default)]
pub struct EuclideanRange;

impl RangeStrategy for EuclideanRange {
    fn in_range(&self, probe: Tile, center: Tile, radius: u32) -> bool {
        let dx = i128::from(probe.x) - i128::from(center.x);
        let dy = i128::from(probe.y) - i128::from(center.y);
        let radius = i128::from(radius);

        dx * dx + dy * dy <= radius * radius
    }
}
