/// Differential-drive wheel-encoder odometry: converts successive (timestamp, left ticks,
/// right ticks) samples into a pose-change triple `(dxy_mm, dtheta_deg, dt_s)`.
///
/// No failure mode: the first sample after construction (or after a gap) has no previous
/// reading to difference against, so it reports zero motion, matching the original's
/// `None`-until-first-sample behavior. A non-positive `dt` is reported as-is; it is the
/// orchestrator's job to treat `dt <= 0` as "no velocity" (see `spec.md` §4.H).
pub struct WheeledOdometry {
    wheel_radius_mm: f64,
    half_axle_mm: f64,
    ticks_per_cycle: f64,
    previous: Option<Sample>,
}

#[derive(Clone, Copy)]
struct Sample {
    timestamp_s: f64,
    left_deg: f64,
    right_deg: f64,
}

impl WheeledOdometry {
    pub fn new(wheel_radius_mm: f64, half_axle_mm: f64, ticks_per_cycle: f64) -> Self {
        WheeledOdometry {
            wheel_radius_mm,
            half_axle_mm,
            ticks_per_cycle,
            previous: None,
        }
    }

    /// `timestamp_us` is a monotonically increasing microsecond timestamp; `left_ticks` and
    /// `right_ticks` are raw encoder counts since power-on (or any other common reference).
    pub fn compute_pose_change(
        &mut self,
        timestamp_us: u64,
        left_ticks: i64,
        right_ticks: i64,
    ) -> (f64, f64, f64) {
        let current = Sample {
            timestamp_s: timestamp_us as f64 / 1_000_000.0,
            left_deg: left_ticks as f64 * 180.0 / self.ticks_per_cycle,
            right_deg: right_ticks as f64 * 180.0 / self.ticks_per_cycle,
        };

        let change = match self.previous {
            None => (0.0, 0.0, 0.0),
            Some(prev) => {
                let dleft_deg = current.left_deg - prev.left_deg;
                let dright_deg = current.right_deg - prev.right_deg;

                let dxy_mm =
                    self.wheel_radius_mm * (dleft_deg.to_radians() + dright_deg.to_radians());
                let dtheta_deg =
                    (self.wheel_radius_mm / self.half_axle_mm) * (dright_deg - dleft_deg);
                let dt_s = current.timestamp_s - prev.timestamp_s;

                (dxy_mm, dtheta_deg, dt_s)
            }
        };

        self.previous = Some(current);
        change
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_sample_reports_zero_motion() {
        let mut odom = WheeledOdometry::new(30.0, 100.0, 360.0);
        let (dxy, dtheta, dt) = odom.compute_pose_change(1_000_000, 0, 0);
        assert_eq!((dxy, dtheta, dt), (0.0, 0.0, 0.0));
    }

    #[test]
    fn straight_line_motion_has_zero_rotation() {
        let mut odom = WheeledOdometry::new(30.0, 100.0, 360.0);
        odom.compute_pose_change(0, 0, 0);
        let (dxy, dtheta, dt) = odom.compute_pose_change(1_000_000, 360, 360);
        // one full wheel revolution each side: dxy = wheel_radius * 2*pi * 2 (both wheels)
        assert_relative_eq!(dxy, 30.0 * 2.0 * std::f64::consts::PI * 2.0, epsilon = 1e-6);
        assert_relative_eq!(dtheta, 0.0, epsilon = 1e-9);
        assert_relative_eq!(dt, 1.0);
    }

    #[test]
    fn pure_rotation_has_zero_translation() {
        let mut odom = WheeledOdometry::new(30.0, 100.0, 360.0);
        odom.compute_pose_change(0, 0, 0);
        let (dxy, dtheta, _dt) = odom.compute_pose_change(1_000_000, -180, 180);
        assert_relative_eq!(dxy, 0.0, epsilon = 1e-9);
        assert!(dtheta > 0.0);
    }

    #[test]
    fn nonpositive_dt_is_reported_as_is() {
        let mut odom = WheeledOdometry::new(30.0, 100.0, 360.0);
        odom.compute_pose_change(1_000_000, 0, 0);
        let (_, _, dt) = odom.compute_pose_change(1_000_000, 10, 10);
        assert_eq!(dt, 0.0);
    }
}
