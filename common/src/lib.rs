pub mod perf;
pub mod pose;

pub use perf::PerfStats;
pub use pose::Pose;
