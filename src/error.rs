/// Errors that can occur when configuring a SegmentedMap.
///
/// Key absence is never an error; lookups report it through `Option`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The segment count is invalid (must be a power of two, greater than 0
    /// and at most [`MAX_SEGMENTS`](crate::router::MAX_SEGMENTS)).
    InvalidSegmentCount(usize),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidSegmentCount(count) => write!(
                f,
                "segment count {} must be a power of two between 1 and {}",
                count,
                crate::router::MAX_SEGMENTS
            ),
        }
    }
}

impl std::error::Error for Error {}
