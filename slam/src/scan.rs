use crate::error::{Result, SlamError};
use crate::sensor::Sensor;

/// Perpendicular offset applied to the two extra rays of a stride-3 (map-build) scan, so a
/// single LIDAR beam paints a wall with some width instead of an infinitely thin line. The
/// original C core ties this to its `Scan` "span" machinery; the specification leaves the
/// exact geometry open, so this is a fixed engineering constant (see `DESIGN.md`).
const LATERAL_OFFSET_MM: f64 = 25.0;

/// A single revolution's worth of LIDAR returns, preprocessed into a robot-frame obstacle
/// point set. Rebuilt in place on every `update`; invalid beams (zero range, at/above
/// `max_range_mm`, or inside the detection margin) simply contribute no points.
///
/// `stride` is 1 for the scan used by the distance function (one ray per valid beam) and 3
/// for the scan used to integrate into the map (three parallel rays per valid beam, for a
/// thicker trace). Encoding the stride as a field rather than two types keeps both variants
/// going through the same preprocessing code path.
pub struct Scan {
    stride: usize,
    points: Vec<(f64, f64)>,
}

impl Scan {
    pub fn new(stride: usize) -> Self {
        Scan {
            stride,
            points: Vec::new(),
        }
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Robot-frame obstacle endpoints (x_mm, y_mm) contributed by the most recent `update`.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Rebuilds the point set from raw beam distances.
    ///
    /// `velocities` is `(v_xy_mm_per_s, v_theta_deg_per_s)`, used to motion-compensate each
    /// beam by the fraction of the revolution it was acquired at. `scan_angles_deg`, if
    /// given, replaces the sensor's uniform geometric beam spacing; motion compensation is
    /// still applied on top of it.
    pub fn update(
        &mut self,
        sensor: &Sensor,
        distances_mm: &[f64],
        velocities: (f64, f64),
        scan_angles_deg: Option<&[f64]>,
    ) -> Result<()> {
        let n = sensor.scan_size();

        if distances_mm.len() != n {
            return Err(SlamError::ScanLengthMismatch {
                expected: n,
                actual: distances_mm.len(),
            });
        }
        if let Some(angles) = scan_angles_deg {
            if angles.len() != n {
                return Err(SlamError::ScanAngleLengthMismatch {
                    expected: n,
                    actual: angles.len(),
                });
            }
        }

        self.points.clear();

        let (v_xy, v_theta) = velocities;
        let margin = sensor.detection_margin();

        for i in margin..(n - margin) {
            let d = distances_mm[i];
            if d <= 0.0 || d >= sensor.max_range_mm() {
                continue;
            }

            let f = i as f64 / n as f64;
            let geometric_angle_deg = geometric_beam_angle_deg(sensor, i);
            let base_angle_deg = scan_angles_deg.map(|a| a[i]).unwrap_or(geometric_angle_deg);
            let alpha_deg = base_angle_deg + v_theta * f / sensor.scan_rate_hz();
            let alpha = alpha_deg.to_radians();

            let d_eff = d + v_xy * f / sensor.scan_rate_hz() * alpha.cos();

            let (x, y) = (d_eff * alpha.cos(), d_eff * alpha.sin());
            self.push_rays(x, y, alpha);
        }

        Ok(())
    }

    fn push_rays(&mut self, x: f64, y: f64, alpha: f64) {
        self.points.push((x, y));

        if self.stride >= 3 {
            let (perp_x, perp_y) = (-alpha.sin(), alpha.cos());
            self.points.push((
                x + perp_x * LATERAL_OFFSET_MM,
                y + perp_y * LATERAL_OFFSET_MM,
            ));
            self.points.push((
                x - perp_x * LATERAL_OFFSET_MM,
                y - perp_y * LATERAL_OFFSET_MM,
            ));
        }
    }
}

/// Beam `i`'s angle under the sensor's uniform geometric spacing, centered on the forward
/// axis: `-span/2 + span * i/(scan_size-1)`.
fn geometric_beam_angle_deg(sensor: &Sensor, i: usize) -> f64 {
    let n = sensor.scan_size();
    if n <= 1 {
        return 0.0;
    }
    -sensor.detection_angle_deg() / 2.0 + sensor.detection_angle_deg() * i as f64 / (n - 1) as f64
}

#[cfg(test)]
mod test {
    use super::*;

    fn sensor() -> Sensor {
        Sensor::new(4, 10.0, 180.0, 4000.0, 0, 0.0).unwrap()
    }

    #[test]
    fn rejects_wrong_length_scan() {
        let mut scan = Scan::new(1);
        let err = scan
            .update(&sensor(), &[1.0, 2.0, 3.0], (0.0, 0.0), None)
            .unwrap_err();
        assert!(matches!(err, SlamError::ScanLengthMismatch { .. }));
    }

    #[test]
    fn rejects_wrong_length_angle_override() {
        let mut scan = Scan::new(1);
        let err = scan
            .update(
                &sensor(),
                &[1000.0, 1000.0, 1000.0, 1000.0],
                (0.0, 0.0),
                Some(&[0.0, 1.0]),
            )
            .unwrap_err();
        assert!(matches!(err, SlamError::ScanAngleLengthMismatch { .. }));
    }

    #[test]
    fn zero_and_max_range_readings_contribute_nothing() {
        let mut scan = Scan::new(1);
        scan.update(&sensor(), &[0.0, 0.0, 0.0, 0.0], (0.0, 0.0), None)
            .unwrap();
        assert!(scan.points().is_empty());

        scan.update(&sensor(), &[4000.0, 4000.0, 4000.0, 4000.0], (0.0, 0.0), None)
            .unwrap();
        assert!(scan.points().is_empty());
    }

    #[test]
    fn valid_beams_produce_one_point_per_beam_at_stride_one() {
        let mut scan = Scan::new(1);
        scan.update(
            &sensor(),
            &[1000.0, 1000.0, 1000.0, 1000.0],
            (0.0, 0.0),
            None,
        )
        .unwrap();
        assert_eq!(scan.points().len(), 4);
    }

    #[test]
    fn valid_beams_produce_three_points_per_beam_at_stride_three() {
        let mut scan = Scan::new(3);
        scan.update(
            &sensor(),
            &[1000.0, 1000.0, 1000.0, 1000.0],
            (0.0, 0.0),
            None,
        )
        .unwrap();
        assert_eq!(scan.points().len(), 12);
    }

    #[test]
    fn detection_margin_excludes_outer_beams() {
        let sensor = Sensor::new(6, 10.0, 180.0, 4000.0, 1, 0.0).unwrap();
        let mut scan = Scan::new(1);
        scan.update(&sensor, &[1000.0; 6], (0.0, 0.0), None).unwrap();
        // beams 0 and 5 are excluded by the margin of 1 on each side
        assert_eq!(scan.points().len(), 4);
    }

    #[test]
    fn motion_compensation_shifts_later_beams_more() {
        // detection_angle 90 keeps every beam's angle away from +/-90 degrees, where cos()
        // vanishes and would mask the v_xy contribution regardless of motion compensation.
        let sensor = Sensor::new(4, 1.0, 90.0, 4000.0, 0, 0.0).unwrap();
        let mut scan = Scan::new(1);
        scan.update(&sensor, &[1000.0; 4], (1000.0, 0.0), None)
            .unwrap();
        // beam 0 (f=0) is unaffected by v_xy; beam 3 (f=0.75) is pushed further along its axis
        let (x0, y0) = scan.points()[0];
        let (x3, y3) = scan.points()[3];
        let d0 = x0.hypot(y0);
        let d3 = x3.hypot(y3);
        assert_relative_eq_approx(d0, 1000.0);
        assert!(d3 - d0 > 1e-6);
    }

    fn assert_relative_eq_approx(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }
}
