/// The pose of a robot in the 2D plane: position in millimeters and heading in degrees,
/// measured counter-clockwise from the +x axis. Copy semantics: a `Pose` is a value, never
/// shared by reference between the modules that read and write it.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pose {
    pub x_mm: f64,
    pub y_mm: f64,
    pub theta_deg: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Pose {
            x_mm: 0.0,
            y_mm: 0.0,
            theta_deg: 0.0,
        }
    }
}

impl Pose {
    pub fn new(x_mm: f64, y_mm: f64, theta_deg: f64) -> Self {
        Pose {
            x_mm,
            y_mm,
            theta_deg,
        }
    }

    pub fn theta_rad(&self) -> f64 {
        self.theta_deg.to_radians()
    }

    /// Returns a new pose obtained by moving `dxy_mm` along the current heading and then
    /// turning by `dtheta_deg`. This is the motion model used to derive the RMHC seed from a
    /// pose-change reading, and independently to advance by a fixed offset (e.g. the lidar
    /// mount offset), so it is exposed as the one primitive rather than duplicated.
    pub fn advanced(&self, dxy_mm: f64, dtheta_deg: f64) -> Pose {
        let theta = self.theta_rad();
        Pose {
            x_mm: self.x_mm + dxy_mm * theta.cos(),
            y_mm: self.y_mm + dxy_mm * theta.sin(),
            theta_deg: self.theta_deg + dtheta_deg,
        }
    }

    /// Transforms a point given in this pose's local (robot) frame into world coordinates:
    /// rotate by `theta_deg`, then translate by `(x_mm, y_mm)`.
    pub fn transform_point(&self, local_x_mm: f64, local_y_mm: f64) -> (f64, f64) {
        let theta = self.theta_rad();
        let (s, c) = theta.sin_cos();
        (
            self.x_mm + local_x_mm * c - local_y_mm * s,
            self.y_mm + local_x_mm * s + local_y_mm * c,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn advance_along_zero_heading_moves_along_x() {
        let p = Pose::default().advanced(1000.0, 0.0);
        assert_relative_eq!(p.x_mm, 1000.0);
        assert_relative_eq!(p.y_mm, 0.0, epsilon = 1e-9);
        assert_relative_eq!(p.theta_deg, 0.0);
    }

    #[test]
    fn advance_along_ninety_degrees_moves_along_y() {
        let p = Pose::new(0.0, 0.0, 90.0).advanced(1000.0, 0.0);
        assert_relative_eq!(p.x_mm, 0.0, epsilon = 1e-9);
        assert_relative_eq!(p.y_mm, 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn transform_point_identity_pose_is_noop() {
        let p = Pose::default();
        assert_eq!(p.transform_point(12.0, -34.0), (12.0, -34.0));
    }

    #[test]
    fn transform_point_rotates_then_translates() {
        let p = Pose::new(100.0, 0.0, 90.0);
        let (x, y) = p.transform_point(10.0, 0.0);
        assert_relative_eq!(x, 100.0, epsilon = 1e-9);
        assert_relative_eq!(y, 10.0, epsilon = 1e-9);
    }
}
