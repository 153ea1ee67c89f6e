use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use tandem_core::{Integrator, KernelNames};
use uom::si::{
    f64::{MolarEnergy, Time},
    molar_energy::kilojoule_per_mole,
    time::picosecond,
};

/// Context shared by every test integrator: a simulated clock in picoseconds.
pub(crate) type Clock = Rc<Cell<f64>>;

/// A chronological record of calls made on [`Recorder`]s.
pub(crate) type Journal = Rc<RefCell<Vec<Entry>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Entry {
    Bind(&'static str),
    Release(&'static str),
    Step(&'static str, usize),
    Drop(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum RecorderError {
    #[error("{0} is not bound")]
    Unbound(&'static str),

    #[error("{0} refused to bind")]
    BindRefused(&'static str),

    #[error("{0} has faulted")]
    Faulted(&'static str),

    #[error("step size must be positive")]
    InvalidStepSize,

    #[error("constraint tolerance must be positive")]
    InvalidTolerance,
}

/// An integrator that journals every lifecycle call and counts its own steps.
///
/// Stepping advances the shared clock by `step_size * steps` and the
/// recorder's own `steps_taken`. Kinetic energy reports `steps_taken` in
/// kJ/mol so tests can tell members apart.
pub(crate) struct Recorder {
    pub name: &'static str,
    pub steps_taken: usize,
    pub dt: Time,
    pub tolerance: f64,
    pub kernels: KernelNames,
    pub refuse_bind: bool,
    pub faulted: bool,
    clock: Option<Clock>,
    journal: Journal,
}

impl Recorder {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            steps_taken: 0,
            dt: Time::new::<picosecond>(0.002),
            tolerance: 1e-5,
            kernels: KernelNames::new(),
            refuse_bind: false,
            faulted: false,
            clock: None,
            journal: Rc::clone(journal),
        }
    }

    pub fn with_kernels(mut self, names: &[&str]) -> Self {
        self.kernels = names.iter().map(ToString::to_string).collect();
        self
    }

    pub fn refusing_bind(mut self) -> Self {
        self.refuse_bind = true;
        self
    }

    /// Makes `step` and `kinetic_energy` fail once bound.
    pub fn faulted(mut self) -> Self {
        self.faulted = true;
        self
    }

    pub fn is_bound(&self) -> bool {
        self.clock.is_some()
    }

    fn record(&self, entry: Entry) {
        self.journal.borrow_mut().push(entry);
    }
}

impl Integrator<Clock> for Recorder {
    type Error = RecorderError;

    fn bind(&mut self, context: &Clock) -> Result<(), Self::Error> {
        if self.refuse_bind {
            return Err(RecorderError::BindRefused(self.name));
        }
        self.clock = Some(Rc::clone(context));
        self.record(Entry::Bind(self.name));
        Ok(())
    }

    fn release(&mut self) {
        self.clock = None;
        self.record(Entry::Release(self.name));
    }

    fn step(&mut self, steps: usize) -> Result<(), Self::Error> {
        let clock = self
            .clock
            .as_ref()
            .ok_or(RecorderError::Unbound(self.name))?;
        if self.faulted {
            return Err(RecorderError::Faulted(self.name));
        }

        #[allow(clippy::cast_precision_loss)]
        let elapsed = self.dt.get::<picosecond>() * steps as f64;
        clock.set(clock.get() + elapsed);
        self.steps_taken += steps;
        self.record(Entry::Step(self.name, steps));
        Ok(())
    }

    fn step_size(&self) -> Time {
        self.dt
    }

    fn set_step_size(&mut self, size: Time) -> Result<(), Self::Error> {
        if size.get::<picosecond>() <= 0.0 {
            return Err(RecorderError::InvalidStepSize);
        }
        self.dt = size;
        Ok(())
    }

    fn constraint_tolerance(&self) -> f64 {
        self.tolerance
    }

    fn set_constraint_tolerance(&mut self, tolerance: f64) -> Result<(), Self::Error> {
        if tolerance <= 0.0 {
            return Err(RecorderError::InvalidTolerance);
        }
        self.tolerance = tolerance;
        Ok(())
    }

    fn kernel_names(&self) -> KernelNames {
        self.kernels.clone()
    }

    fn kinetic_energy(&self) -> Result<MolarEnergy, Self::Error> {
        if self.clock.is_none() {
            return Err(RecorderError::Unbound(self.name));
        }
        if self.faulted {
            return Err(RecorderError::Faulted(self.name));
        }
        #[allow(clippy::cast_precision_loss)]
        let energy = self.steps_taken as f64;
        Ok(MolarEnergy::new::<kilojoule_per_mole>(energy))
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.record(Entry::Drop(self.name));
    }
}

/// Creates an empty journal.
pub(crate) fn journal() -> Journal {
    Journal::default()
}

/// Returns a snapshot of the journal's entries.
pub(crate) fn entries(journal: &Journal) -> Vec<Entry> {
    journal.borrow().clone()
}
