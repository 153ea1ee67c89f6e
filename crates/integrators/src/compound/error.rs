use tandem_core::BoxError;

/// Errors that can occur when using a compound integrator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("member index {index} is out of range for {len} member(s)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("compound integrator has no members")]
    Empty,

    #[error("compound integrator is not bound to a context")]
    NotBound,

    #[error("members cannot be added while the compound integrator is bound")]
    AlreadyBound,

    #[error("member {index} failed: {source}")]
    Member {
        index: usize,
        #[source]
        source: BoxError,
    },
}

impl Error {
    pub(crate) fn member(index: usize, source: BoxError) -> Self {
        Self::Member { index, source }
    }
}
