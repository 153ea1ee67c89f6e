/// Indicates how the schedule terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Ran every segment to completion.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// The result of running a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    /// How the schedule terminated.
    pub status: Status,

    /// Number of segments run to completion.
    pub segments: usize,

    /// Total number of steps taken.
    pub steps: usize,
}
