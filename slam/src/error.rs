/// Errors reported synchronously to the caller. State is left unchanged whenever one of these
/// is returned — there is no partial update (`spec.md` §7).
///
/// `DegenerateScan` and `NumericOverflow` from the specification's error taxonomy are
/// deliberately *not* variants here: a scan with zero valid beams is a normal runtime outcome
/// (the distance function returns a sentinel cost and RMHC falls back to the seed pose, logged
/// at `warn!`), and grid-value overflow is prevented by clamping before it can occur. Both are
/// internal control flow, never raised to the caller.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SlamError {
    #[error("scan has {actual} beams, sensor is configured for {expected}")]
    ScanLengthMismatch { expected: usize, actual: usize },

    #[error("scan angle override has {actual} entries, sensor is configured for {expected}")]
    ScanAngleLengthMismatch { expected: usize, actual: usize },

    #[error("map buffer has length {actual}, expected {expected} ({expected_side}x{expected_side})")]
    MapBufferLengthMismatch {
        expected: usize,
        expected_side: usize,
        actual: usize,
    },

    #[error("invalid sensor configuration: {0}")]
    InvalidSensorConfig(&'static str),

    #[error("invalid map configuration: {0}")]
    InvalidMapConfig(&'static str),
}

pub type Result<T> = std::result::Result<T, SlamError>;
