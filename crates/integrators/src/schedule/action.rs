/// Control actions supported by the schedule driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the schedule early and return the progress so far.
    StopEarly,
}
