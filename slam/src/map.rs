use common::Pose;

use crate::error::{Result, SlamError};
use crate::scan::Scan;

/// Square occupancy grid: `side_pixels` x `side_pixels` cells of `u8` in `[0, 255]`, row-major,
/// covering a `side_mm` x `side_mm` square of the world. 0 means "definitely occupied", 255
/// means "definitely free", and the initial value 127 means "unknown".
///
/// Orientation: grid row increases with world `y`, grid column increases with world `x`
/// (`row = y_mm * scale`, `col = x_mm * scale`). The mapper (`update`) and the distance
/// function (`cell_value_at_world`, used by `distance_scan_to_map`) both go through
/// `to_cell`, so this is the single place that convention is defined — keeping the two
/// consistent is what avoids a mirror-image map (see `spec.md` §9).
#[derive(Clone)]
pub struct Map {
    side_pixels: usize,
    side_mm: f64,
    scale: f64,
    cells: Vec<u8>,
}

impl Map {
    pub fn new(side_pixels: usize, side_mm: f64) -> Result<Self> {
        if side_pixels == 0 {
            return Err(SlamError::InvalidMapConfig("map_size_pixels must be > 0"));
        }
        if side_mm <= 0.0 {
            return Err(SlamError::InvalidMapConfig("map_size_meters must be > 0"));
        }

        Ok(Map {
            side_pixels,
            side_mm,
            scale: side_pixels as f64 / side_mm,
            cells: vec![127u8; side_pixels * side_pixels],
        })
    }

    pub fn side_pixels(&self) -> usize {
        self.side_pixels
    }

    fn to_cell(&self, x_mm: f64, y_mm: f64) -> Option<(usize, usize)> {
        let col = (x_mm * self.scale).floor();
        let row = (y_mm * self.scale).floor();
        if col < 0.0 || row < 0.0 {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        if col >= self.side_pixels || row >= self.side_pixels {
            return None;
        }
        Some((row, col))
    }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.side_pixels + col
    }

    /// Looks up the cell under a world-frame point, or `None` if the point falls outside the
    /// map.
    pub fn cell_value_at_world(&self, x_mm: f64, y_mm: f64) -> Option<u8> {
        self.to_cell(x_mm, y_mm)
            .map(|(row, col)| self.cells[self.index(row, col)])
    }

    /// Copies the current grid into `out`, row-major, one byte per pixel.
    pub fn get(&self, out: &mut [u8]) -> Result<()> {
        if out.len() != self.cells.len() {
            return Err(SlamError::MapBufferLengthMismatch {
                expected: self.cells.len(),
                expected_side: self.side_pixels,
                actual: out.len(),
            });
        }
        out.copy_from_slice(&self.cells);
        Ok(())
    }

    /// Replaces the current grid with `data`, e.g. to resume from a persisted map.
    pub fn set(&mut self, data: &[u8]) -> Result<()> {
        if data.len() != self.cells.len() {
            return Err(SlamError::MapBufferLengthMismatch {
                expected: self.cells.len(),
                expected_side: self.side_pixels,
                actual: data.len(),
            });
        }
        self.cells.copy_from_slice(data);
        Ok(())
    }

    /// Integrates a build scan (stride 3) into the map at `pose`: each ray is walked from the
    /// pose's position to its world-frame endpoint (plus a hole-width margin beyond it), and
    /// every traversed cell is nudged toward 255 (free, short of the hole) or toward 0
    /// (occupied, inside the hole band, weighted by a triangle peaking at the endpoint) by an
    /// exponential moving average at rate `quality / 255`.
    pub fn update(&mut self, build_scan: &Scan, pose: Pose, quality: u8, hole_width_mm: f64) {
        for &(local_x_mm, local_y_mm) in build_scan.points() {
            let (world_x_mm, world_y_mm) = pose.transform_point(local_x_mm, local_y_mm);
            self.integrate_ray(
                pose.x_mm,
                pose.y_mm,
                world_x_mm,
                world_y_mm,
                quality,
                hole_width_mm,
            );
        }
    }

    fn integrate_ray(
        &mut self,
        x0_mm: f64,
        y0_mm: f64,
        x1_mm: f64,
        y1_mm: f64,
        quality: u8,
        hole_width_mm: f64,
    ) {
        let ray_len_mm = (x1_mm - x0_mm).hypot(y1_mm - y0_mm);
        if ray_len_mm <= 0.0 {
            return;
        }

        let half_hole_mm = (hole_width_mm / 2.0).max(0.0);
        let total_len_mm = ray_len_mm + half_hole_mm;

        let (dir_x, dir_y) = ((x1_mm - x0_mm) / ray_len_mm, (y1_mm - y0_mm) / ray_len_mm);
        let (x1_ext_mm, y1_ext_mm) = (
            x1_mm + dir_x * half_hole_mm,
            y1_mm + dir_y * half_hole_mm,
        );

        let (x0_px, y0_px) = (x0_mm * self.scale, y0_mm * self.scale);
        let (x1_px, y1_px) = (x1_ext_mm * self.scale, y1_ext_mm * self.scale);
        let additional_steps = (half_hole_mm * self.scale).ceil().max(0.0) as usize;

        let quality_frac = quality as f64 / 255.0;
        if quality_frac <= 0.0 {
            return;
        }

        for (row, col, t) in RayWalk::new(x0_px, y0_px, x1_px, y1_px, additional_steps) {
            if row < 0 || col < 0 {
                continue;
            }
            let (row, col) = (row as usize, col as usize);
            if row >= self.side_pixels || col >= self.side_pixels {
                continue;
            }

            let d_mm = t * total_len_mm;
            let (target, weight) = if d_mm <= ray_len_mm - half_hole_mm {
                (255.0, 1.0)
            } else if d_mm <= ray_len_mm + half_hole_mm {
                let w = 1.0 - (d_mm - ray_len_mm).abs() / half_hole_mm.max(f64::EPSILON);
                (0.0, w.clamp(0.0, 1.0))
            } else {
                continue;
            };

            let idx = self.index(row, col);
            let cell = self.cells[idx] as f64;
            let updated = cell + (target - cell) * quality_frac * weight;
            self.cells[idx] = updated.round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Bresenham-style DDA line walk from `(x0, y0)` to `(x1, y1)` (grid/pixel coordinates),
/// continuing `additional_steps` cells past the endpoint. Yields `(row, col, t)` where `t` is
/// the walked fraction in `[0, 1]` of the full (endpoint + additional_steps) distance —
/// ported from the teacher's `GridRayIterator`, including its tie-break convention (initial
/// error from the fractional start position, step the major axis, conditionally step the
/// minor axis).
struct RayWalk {
    delta: (f64, f64),
    increment: (isize, isize),
    error: f64,
    x: isize,
    y: isize,
    remaining: usize,
    total_steps: usize,
}

impl RayWalk {
    fn new(x0: f64, y0: f64, x1: f64, y1: f64, additional_steps: usize) -> Self {
        let delta = ((x1 - x0).abs(), (y1 - y0).abs());

        let x = x0.floor() as isize;
        let y = y0.floor() as isize;

        let mut n = 1 + additional_steps as isize;

        let x_inc;
        let mut error;
        if delta.0 == 0.0 {
            x_inc = 0;
            error = f64::INFINITY;
        } else if x1 > x0 {
            x_inc = 1;
            n += x1.floor() as isize - x;
            error = (x0.floor() + 1.0 - x0) * delta.1;
        } else {
            x_inc = -1;
            n += x - x1.floor() as isize;
            error = (x0 - x0.floor()) * delta.1;
        }

        let y_inc;
        if delta.1 == 0.0 {
            y_inc = 0;
            error -= f64::INFINITY;
        } else if y1 > y0 {
            y_inc = 1;
            n += y1.floor() as isize - y;
            error -= (y0.floor() + 1.0 - y0) * delta.0;
        } else {
            y_inc = -1;
            n += y - y1.floor() as isize;
            error -= (y0 - y0.floor()) * delta.0;
        }

        let total_steps = n.max(1) as usize;

        RayWalk {
            delta,
            increment: (x_inc, y_inc),
            error,
            x,
            y,
            remaining: total_steps,
            total_steps,
        }
    }
}

impl Iterator for RayWalk {
    type Item = (isize, isize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let step_index = self.total_steps - self.remaining;
        let t = if self.total_steps > 1 {
            step_index as f64 / (self.total_steps - 1) as f64
        } else {
            0.0
        };
        let cell = (self.y, self.x);

        if self.error > 0.0 {
            self.y += self.increment.1;
            self.error -= self.delta.0;
        } else {
            self.x += self.increment.0;
            self.error += self.delta.1;
        }

        self.remaining -= 1;
        Some((cell.0, cell.1, t))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sensor::Sensor;

    #[test]
    fn fresh_map_is_all_unknown() {
        let map = Map::new(10, 1_000.0).unwrap();
        let mut buf = vec![0u8; 100];
        map.get(&mut buf).unwrap();
        assert!(buf.iter().all(|&v| v == 127));
    }

    #[test]
    fn get_rejects_wrong_length_buffer() {
        let map = Map::new(10, 1_000.0).unwrap();
        let mut buf = vec![0u8; 5];
        assert!(map.get(&mut buf).is_err());
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut map = Map::new(4, 400.0).unwrap();
        let data: Vec<u8> = (0..16).map(|i| (i * 16) as u8).collect();
        map.set(&data).unwrap();
        let mut out = vec![0u8; 16];
        map.get(&mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn rejects_zero_pixels() {
        assert!(Map::new(0, 1000.0).is_err());
    }

    #[test]
    fn rejects_nonpositive_size_mm() {
        assert!(Map::new(10, 0.0).is_err());
    }

    #[test]
    fn values_stay_in_range_after_update() {
        let mut map = Map::new(100, 10_000.0).unwrap();
        let sensor = crate::sensor::Sensor::new(8, 10.0, 270.0, 4000.0, 0, 0.0).unwrap();
        let mut scan = crate::scan::Scan::new(3);
        scan.update(&sensor, &[1000.0; 8], (0.0, 0.0), None).unwrap();

        let pose = Pose::new(5000.0, 5000.0, 0.0);
        for _ in 0..20 {
            map.update(&scan, pose, 255, 200.0);
        }

        let mut buf = vec![0u8; 100 * 100];
        map.get(&mut buf).unwrap();
        assert!(buf.iter().all(|&v| v <= 255));
    }

    #[test]
    fn wall_is_pushed_toward_occupied_and_near_side_toward_free() {
        let mut map = Map::new(400, 4_000.0).unwrap();
        // a single beam (scan_size 1 falls back to angle 0, i.e. straight ahead)
        let sensor = Sensor::new(1, 10.0, 180.0, 4000.0, 0, 0.0).unwrap();
        let mut scan = crate::scan::Scan::new(1);
        scan.update(&sensor, &[1000.0], (0.0, 0.0), None).unwrap();

        let pose = Pose::new(2000.0, 2000.0, 0.0);
        map.update(&scan, pose, 255, 200.0);

        // near the robot, well short of the wall, cells should be pushed free
        let near = map.cell_value_at_world(2500.0, 2000.0).unwrap();
        assert!(near > 127, "near cell was {near}");

        // right at the wall (1000mm out along +x), pushed occupied
        let at_wall = map.cell_value_at_world(3000.0, 2000.0).unwrap();
        assert!(at_wall < 127, "at-wall cell was {at_wall}");
    }
}
