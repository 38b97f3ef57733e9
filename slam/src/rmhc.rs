use common::Pose;

use crate::distance::{distance_scan_to_map, INVALID_COST};
use crate::map::Map;
use crate::prng::Prng;
use crate::scan::Scan;

/// Random-Mutation Hill-Climbing search for a locally optimal pose, starting from `start_pose`.
/// Each iteration proposes a Gaussian-perturbed candidate around `last_best`, accepts it as the
/// new best iff it both lands at least one beam on the map and scores lower than the current
/// best, and otherwise periodically re-centers `last_best` on `best` every other iteration (the
/// "likelihood" pairing from `spec.md` §4.G) so the search doesn't wander away from a good
/// pose it failed to improve on.
///
/// If `start_pose` itself is degenerate (no beam of `distance_scan` lands on the map), the
/// search is skipped entirely and `start_pose` is returned unchanged — this is the
/// `DegenerateScan` outcome from `spec.md` §7: logged, not raised.
pub fn rmhc_position_search(
    start_pose: Pose,
    map: &Map,
    distance_scan: &Scan,
    sigma_xy_mm: f64,
    sigma_theta_deg: f64,
    max_iter: u32,
    prng: &mut Prng,
) -> Pose {
    let mut best = start_pose;
    let mut best_cost = distance_scan_to_map(map, distance_scan, best);

    if best_cost == INVALID_COST {
        tracing::warn!("RMHC search skipped: seed pose scores a degenerate (empty) scan");
        return start_pose;
    }

    let mut last_best = best;

    for i in 0..max_iter {
        let candidate = Pose::new(
            last_best.x_mm + sigma_xy_mm * prng.normal(),
            last_best.y_mm + sigma_xy_mm * prng.normal(),
            last_best.theta_deg + sigma_theta_deg * prng.normal(),
        );

        let cost = distance_scan_to_map(map, distance_scan, candidate);

        if cost != INVALID_COST && cost < best_cost {
            best = candidate;
            best_cost = cost;
            last_best = candidate;
        } else if i % 2 == 1 {
            // even iteration (1-indexed): re-center the search on the current best.
            last_best = best;
        }
        // odd iteration (1-indexed): leave last_best where it is and keep exploring from there.
    }

    best
}
