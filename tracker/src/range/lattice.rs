use crate::{RangeStrategy, Tile};

/// Diamond-shaped range: a tile is in range when walking there along the
/// grid axes takes at most `radius` steps.
#[derive(Clone, Copy, Debug, Default)]
pub struct LatticeRange;

impl RangeStrategy for LatticeRange {
    fn in_range(&self, probe: Tile, center: Tile, radius: u32) -> bool {
        let radius = i64::from(radius);
        let dx = (i64::from(probe.x) - i64::from(center.x)).abs();
        let probe_y = i64::from(probe.y);
        let center_y = i64::from(center.y);

        // cheap square rejection first
        if dx > radius || (probe_y - center_y).abs() > radius {
            return false;
        }

        // Rows nearest the center are the widest and the most likely to hold
        // the probe, so walk outwards from there.
        for k in 0..=radius {
            if probe_y == center_y + k || probe_y == center_y - k {
                return dx <= radius - k;
            }
        }

        false
    }
}
