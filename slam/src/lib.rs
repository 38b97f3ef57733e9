//! Core tinySLAM/CoreSLAM-family scan matching and occupancy-grid mapping engine: turns raw
//! LIDAR scans (plus optional wheel odometry) into a refined robot pose and an occupancy grid,
//! with no dependency on any particular sensor driver or UI.

pub mod distance;
pub mod error;
pub mod map;
pub mod odometry;
pub mod orchestrator;
pub mod prng;
pub mod rmhc;
pub mod scan;
pub mod sensor;

pub use distance::{distance_scan_to_map, INVALID_COST};
pub use error::{Result, SlamError};
pub use map::Map;
pub use odometry::WheeledOdometry;
pub use orchestrator::{CoreSlam, Deterministic, PoseSearch, Rmhc, RmhcConfig, SlamConfig};
pub use prng::Prng;
pub use rmhc::rmhc_position_search;
pub use scan::Scan;
pub use sensor::Sensor;
