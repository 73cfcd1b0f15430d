use alloc::sync::Arc;

use thiserror::Error;

/// Errors returned by [`crate::DataWindow`] and the types it is built from.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("window size must be greater than zero")]
    InvalidWindowSize,
    #[error("failed to spawn lane `{name}`: {source}")]
    LaneSpawn {
        name: String,
        #[source]
        source: Arc<std::io::Error>,
    },
}
