use common::Pose;

use crate::map::Map;
use crate::scan::Scan;

/// Sentinel cost returned when no beam of `scan` lands inside the map. Lower cost is better
/// everywhere else; this sentinel is the one negative value a caller (or RMHC) ever sees, and
/// is how a degenerate scan is detected without throwing.
pub const INVALID_COST: f64 = -1.0;

/// Scores a candidate pose against the map: transforms each of `scan`'s robot-frame obstacle
/// points into world coordinates under `pose`, looks up the corresponding grid cell, and
/// averages the cell values. Lower is better — a well-matched pose lands its obstacle points
/// on cells the map has already pushed toward 0 (occupied).
///
/// This is the inner loop of localization: its per-call cost is `O(scan.points().len())` grid
/// lookups, so it is invoked up to `max_search_iter` times per `update`.
pub fn distance_scan_to_map(map: &Map, scan: &Scan, pose: Pose) -> f64 {
    let mut total = 0u64;
    let mut count = 0u64;

    for &(x_mm, y_mm) in scan.points() {
        let (world_x_mm, world_y_mm) = pose.transform_point(x_mm, y_mm);
        if let Some(value) = map.cell_value_at_world(world_x_mm, world_y_mm) {
            total += value as u64;
            count += 1;
        }
    }

    if count == 0 {
        return INVALID_COST;
    }

    total as f64 / count as f64
}
