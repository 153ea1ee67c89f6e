use crate::compound;

/// Errors that can occur while running a schedule.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("segment {segment} failed: {source}")]
    Segment {
        segment: usize,
        #[source]
        source: compound::Error,
    },
}

impl Error {
    pub(crate) fn segment(segment: usize, source: compound::Error) -> Self {
        Self::Segment { segment, source }
    }
}
