use std::time::{Instant, SystemTime, UNIX_EPOCH};

use common::{Pose, PerfStats};

use crate::distance::{distance_scan_to_map, INVALID_COST};
use crate::error::Result;
use crate::map::Map;
use crate::prng::Prng;
use crate::rmhc::rmhc_position_search;
use crate::scan::Scan;
use crate::sensor::Sensor;

/// A pluggable pose-search strategy, invoked once per `CoreSlam::update` to refine the
/// odometry-seeded pose against the current map. Kept as a trait rather than a hardcoded
/// RMHC call so a caller can run dead-reckoning only (`Deterministic`) for testing or replay
/// without disturbing the rest of the pipeline.
pub trait PoseSearch {
    fn search(&mut self, seed: Pose, map: &Map, distance_scan: &Scan) -> Pose;
}

/// No search: returns the seed pose unchanged. Useful for verifying odometry integration in
/// isolation, or for open-loop playback of a pre-built map.
#[derive(Debug, Default, Clone, Copy)]
pub struct Deterministic;

impl PoseSearch for Deterministic {
    fn search(&mut self, seed: Pose, _map: &Map, _distance_scan: &Scan) -> Pose {
        seed
    }
}

/// RMHC-backed search, holding its own PRNG stream so results are reproducible across runs
/// given the same seed.
pub struct Rmhc {
    prng: Prng,
    sigma_xy_mm: f64,
    sigma_theta_deg: f64,
    max_iter: u32,
}

impl Rmhc {
    pub fn new(random_seed: u32, sigma_xy_mm: f64, sigma_theta_deg: f64, max_iter: u32) -> Self {
        Rmhc {
            prng: Prng::new(random_seed),
            sigma_xy_mm,
            sigma_theta_deg,
            max_iter,
        }
    }
}

impl PoseSearch for Rmhc {
    fn search(&mut self, seed: Pose, map: &Map, distance_scan: &Scan) -> Pose {
        rmhc_position_search(
            seed,
            map,
            distance_scan,
            self.sigma_xy_mm,
            self.sigma_theta_deg,
            self.max_iter,
            &mut self.prng,
        )
    }
}

/// Configuration for a [`CoreSlam`] instance, deserializable from whatever config format a
/// caller chooses (TOML, YAML, ...) the way the teacher's own config structs are.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SlamConfig {
    #[serde(default = "default_map_quality")]
    pub map_quality: u8,
    #[serde(default = "default_hole_width_mm")]
    pub hole_width_mm: f64,
}

impl Default for SlamConfig {
    fn default() -> Self {
        SlamConfig {
            map_quality: default_map_quality(),
            hole_width_mm: default_hole_width_mm(),
        }
    }
}

fn default_map_quality() -> u8 {
    50
}

fn default_hole_width_mm() -> f64 {
    600.0
}

/// RMHC-specific configuration layered on top of [`SlamConfig`].
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RmhcConfig {
    #[serde(default = "default_sigma_xy_mm")]
    pub sigma_xy_mm: f64,
    #[serde(default = "default_sigma_theta_deg")]
    pub sigma_theta_deg: f64,
    #[serde(default = "default_max_search_iter")]
    pub max_search_iter: u32,
    #[serde(default)]
    pub random_seed: Option<u32>,
}

impl Default for RmhcConfig {
    fn default() -> Self {
        RmhcConfig {
            sigma_xy_mm: default_sigma_xy_mm(),
            sigma_theta_deg: default_sigma_theta_deg(),
            max_search_iter: default_max_search_iter(),
            random_seed: None,
        }
    }
}

fn default_sigma_xy_mm() -> f64 {
    100.0
}

fn default_sigma_theta_deg() -> f64 {
    20.0
}

fn default_max_search_iter() -> u32 {
    1000
}

/// Picks up the low 16 bits of the wall clock as a default RMHC seed, when the caller hasn't
/// pinned one down for reproducibility.
fn wall_clock_seed() -> u32 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    (nanos & 0xFFFF) as u32
}

/// Ties the whole pipeline together: sensor geometry, the two preprocessed scan views
/// (stride 1 for localization, stride 3 for mapping), the occupancy grid, current pose
/// estimate, and a pluggable pose-search strategy. One `update()` call per scan revolution.
pub struct CoreSlam<S: PoseSearch> {
    sensor: Sensor,
    map: Map,
    distance_scan: Scan,
    build_scan: Scan,
    pose: Pose,
    map_quality: u8,
    hole_width_mm: f64,
    search: S,
    perf: PerfStats,
}

impl CoreSlam<Deterministic> {
    pub fn new_deterministic(
        sensor: Sensor,
        map_size_pixels: usize,
        map_size_meters: f64,
        config: SlamConfig,
    ) -> Result<Self> {
        Self::new(sensor, map_size_pixels, map_size_meters, config, Deterministic)
    }
}

impl CoreSlam<Rmhc> {
    pub fn new_rmhc(
        sensor: Sensor,
        map_size_pixels: usize,
        map_size_meters: f64,
        config: SlamConfig,
        rmhc_config: RmhcConfig,
    ) -> Result<Self> {
        let seed = rmhc_config.random_seed.unwrap_or_else(wall_clock_seed);
        let search = Rmhc::new(
            seed,
            rmhc_config.sigma_xy_mm,
            rmhc_config.sigma_theta_deg,
            rmhc_config.max_search_iter,
        );
        Self::new(sensor, map_size_pixels, map_size_meters, config, search)
    }
}

impl<S: PoseSearch> CoreSlam<S> {
    fn new(
        sensor: Sensor,
        map_size_pixels: usize,
        map_size_meters: f64,
        config: SlamConfig,
        search: S,
    ) -> Result<Self> {
        let map = Map::new(map_size_pixels, map_size_meters * 1000.0)?;
        // start the robot in the middle of the map, facing along +x.
        let pose = Pose::new(map_size_meters * 500.0, map_size_meters * 500.0, 0.0);

        Ok(CoreSlam {
            sensor,
            map,
            distance_scan: Scan::new(1),
            build_scan: Scan::new(3),
            pose,
            map_quality: config.map_quality,
            hole_width_mm: config.hole_width_mm,
            search,
            perf: PerfStats::new(),
        })
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn perf(&self) -> &PerfStats {
        &self.perf
    }

    pub fn get_map(&self, out: &mut [u8]) -> Result<()> {
        self.map.get(out)
    }

    pub fn set_map(&mut self, data: &[u8]) -> Result<()> {
        self.map.set(data)
    }

    /// Processes one scan revolution: rebuilds both scan views, seeds a candidate pose from
    /// `pose_change` (if given), refines it against the map via the search strategy, and
    /// (unless `should_update_map` is false) integrates the refined pose's build scan into
    /// the map. `pose_change` is `(dxy_mm, dtheta_deg, dt_s)`, typically from
    /// [`crate::odometry::WheeledOdometry`]; a non-positive `dt_s` is treated as "no velocity
    /// estimate available" rather than an error.
    pub fn update(
        &mut self,
        scans_mm: &[f64],
        pose_change: Option<(f64, f64, f64)>,
        scan_angles_deg: Option<&[f64]>,
        should_update_map: bool,
    ) -> Result<()> {
        let start = Instant::now();

        let (dxy_mm, dtheta_deg, dt_s) = pose_change.unwrap_or((0.0, 0.0, 0.0));
        let (v_xy, v_theta) = if dt_s > 0.0 {
            (dxy_mm / dt_s, dtheta_deg / dt_s)
        } else {
            (0.0, 0.0)
        };

        self.distance_scan
            .update(&self.sensor, scans_mm, (v_xy, v_theta), scan_angles_deg)?;
        self.build_scan
            .update(&self.sensor, scans_mm, (v_xy, v_theta), scan_angles_deg)?;

        // Both the dxy displacement and the laser-mount offset are resolved against the
        // pre-turn heading (`self.pose`'s own theta), matching the source's _costheta()/
        // _sintheta() reads of self.position.theta_degrees before it is reassigned — combine
        // them into one `advanced` call rather than chaining, which would rotate the offset by
        // the already-updated heading.
        let seed = self.pose.advanced(dxy_mm + self.sensor.offset_mm(), dtheta_deg);

        let refined = self.search.search(seed, &self.map, &self.distance_scan);
        self.pose = refined.advanced(-self.sensor.offset_mm(), 0.0);

        if should_update_map {
            if distance_scan_to_map(&self.map, &self.distance_scan, refined) == INVALID_COST {
                tracing::warn!("skipping map update: scan contributed zero beams to the map");
            } else {
                self.map
                    .update(&self.build_scan, refined, self.map_quality, self.hole_width_mm);
            }
        }

        self.perf.update(start.elapsed());
        tracing::debug!(pose = ?self.pose, elapsed = ?self.perf.latest(), "slam update");

        Ok(())
    }
}
