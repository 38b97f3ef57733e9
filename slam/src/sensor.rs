use crate::error::{Result, SlamError};

/// Static geometry of a scanning laser rangefinder. Immutable once constructed, shared
/// read-only by `Scan`, `distance_scan_to_map`, and the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Sensor {
    scan_size: usize,
    scan_rate_hz: f64,
    detection_angle_deg: f64,
    max_range_mm: f64,
    detection_margin: usize,
    offset_mm: f64,
}

impl Sensor {
    pub fn new(
        scan_size: usize,
        scan_rate_hz: f64,
        detection_angle_deg: f64,
        max_range_mm: f64,
        detection_margin: usize,
        offset_mm: f64,
    ) -> Result<Self> {
        if scan_size < 1 {
            return Err(SlamError::InvalidSensorConfig("scan_size must be >= 1"));
        }
        if detection_angle_deg <= 0.0 {
            return Err(SlamError::InvalidSensorConfig(
                "detection_angle_deg must be > 0",
            ));
        }
        if max_range_mm <= 0.0 {
            return Err(SlamError::InvalidSensorConfig("max_range_mm must be > 0"));
        }
        if detection_margin * 2 >= scan_size {
            return Err(SlamError::InvalidSensorConfig(
                "detection_margin leaves no beams after trimming both sides",
            ));
        }

        Ok(Sensor {
            scan_size,
            scan_rate_hz,
            detection_angle_deg,
            max_range_mm,
            detection_margin,
            offset_mm,
        })
    }

    /// Hokuyo URG-04LX: 682 beams, 10 Hz, 240 degree span, 4 m range.
    pub fn urg_04lx(detection_margin: usize, offset_mm: f64) -> Self {
        Sensor::new(682, 10.0, 240.0, 4000.0, detection_margin, offset_mm)
            .expect("URG-04LX preset parameters are valid by construction")
    }

    /// GetSurreal XV Lidar: 360 beams, 5.5 Hz, full 360 degree span, 6 m range.
    pub fn xv_lidar(detection_margin: usize, offset_mm: f64) -> Self {
        Sensor::new(360, 5.5, 360.0, 6000.0, detection_margin, offset_mm)
            .expect("XV Lidar preset parameters are valid by construction")
    }

    /// Slamtec RPLidar A1: 360 beams, 5.5 Hz, full 360 degree span, 12 m range.
    pub fn rplidar_a1(detection_margin: usize, offset_mm: f64) -> Self {
        Sensor::new(360, 5.5, 360.0, 12000.0, detection_margin, offset_mm)
            .expect("RPLidar A1 preset parameters are valid by construction")
    }

    pub fn scan_size(&self) -> usize {
        self.scan_size
    }

    pub fn scan_rate_hz(&self) -> f64 {
        self.scan_rate_hz
    }

    pub fn detection_angle_deg(&self) -> f64 {
        self.detection_angle_deg
    }

    pub fn max_range_mm(&self) -> f64 {
        self.max_range_mm
    }

    pub fn detection_margin(&self) -> usize {
        self.detection_margin
    }

    pub fn offset_mm(&self) -> f64 {
        self.offset_mm
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_zero_scan_size() {
        assert!(matches!(
            Sensor::new(0, 10.0, 240.0, 4000.0, 0, 0.0),
            Err(SlamError::InvalidSensorConfig(_))
        ));
    }

    #[test]
    fn rejects_nonpositive_detection_angle() {
        assert!(Sensor::new(360, 5.5, 0.0, 6000.0, 0, 0.0).is_err());
    }

    #[test]
    fn rejects_nonpositive_max_range() {
        assert!(Sensor::new(360, 5.5, 360.0, 0.0, 0, 0.0).is_err());
    }

    #[test]
    fn rejects_margin_that_consumes_all_beams() {
        assert!(Sensor::new(10, 5.5, 360.0, 6000.0, 5, 0.0).is_err());
    }

    #[test]
    fn presets_are_valid() {
        let _ = Sensor::urg_04lx(0, 0.0);
        let _ = Sensor::xv_lidar(0, 0.0);
        let _ = Sensor::rplidar_a1(0, 0.0);
    }
}
