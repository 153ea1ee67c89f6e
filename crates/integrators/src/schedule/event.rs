use uom::si::f64::MolarEnergy;

/// Event emitted by the schedule driver after each chunk of steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// Index of the segment being run.
    pub segment: usize,

    /// Index of the compound member that took the steps.
    pub member: usize,

    /// Steps taken so far within this segment.
    pub segment_steps: usize,

    /// Steps taken so far across the whole schedule.
    pub total_steps: usize,

    /// Kinetic energy reported by the active member after the chunk.
    pub kinetic_energy: MolarEnergy,
}
