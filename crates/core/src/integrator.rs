use std::{any::Any, collections::BTreeSet, error::Error as StdError};

use uom::si::f64::{MolarEnergy, Time};

/// A boxed, thread-safe error used where member error types are erased.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// The set of compute-kernel names an integrator needs from the backend.
///
/// Kept ordered and deduplicated so unions across integrators are
/// deterministic.
pub type KernelNames = BTreeSet<String>;

/// A strategy for advancing a simulation through time.
///
/// An `Integrator` is attached to a simulation context of type `C` with
/// [`bind`](Integrator::bind), advanced with [`step`](Integrator::step), and
/// detached with [`release`](Integrator::release). The context is typically a
/// shared handle (an `Rc<RefCell<_>>` or similar) that the integrator clones
/// during `bind` and drops during `release`.
///
/// The lifecycle is:
///
/// ```text
/// integrator.bind(&context)?;
/// integrator.step(1000)?;
/// integrator.release();
/// ```
///
/// Step size and constraint tolerance may be read and changed at any time,
/// bound or not.
pub trait Integrator<C> {
    /// The error type returned if an operation fails.
    type Error: StdError + Send + Sync + 'static;

    /// Attaches the integrator to a simulation context.
    ///
    /// Called once per attach cycle, before any call to [`step`](Self::step).
    ///
    /// # Errors
    ///
    /// Returns `Err(Self::Error)` if the integrator cannot be initialised for
    /// this context.
    fn bind(&mut self, context: &C) -> Result<(), Self::Error>;

    /// Detaches the integrator from its context and frees any per-context
    /// resources acquired in [`bind`](Self::bind).
    fn release(&mut self);

    /// Advances the simulation by taking `steps` time steps.
    ///
    /// # Errors
    ///
    /// Returns `Err(Self::Error)` if stepping fails, including when the
    /// integrator is not bound.
    fn step(&mut self, steps: usize) -> Result<(), Self::Error>;

    /// Returns the size of each time step.
    fn step_size(&self) -> Time;

    /// Sets the size of each time step.
    ///
    /// # Errors
    ///
    /// Returns `Err(Self::Error)` if the integrator rejects the value.
    fn set_step_size(&mut self, size: Time) -> Result<(), Self::Error>;

    /// Returns the distance tolerance within which constraints are maintained,
    /// as a fraction of the constrained distance.
    fn constraint_tolerance(&self) -> f64;

    /// Sets the constraint tolerance.
    ///
    /// # Errors
    ///
    /// Returns `Err(Self::Error)` if the integrator rejects the value.
    fn set_constraint_tolerance(&mut self, tolerance: f64) -> Result<(), Self::Error>;

    /// Returns the names of all compute kernels this integrator uses.
    ///
    /// The backend resolves these before any stepping happens. The default
    /// implementation declares no kernels.
    fn kernel_names(&self) -> KernelNames {
        KernelNames::new()
    }

    /// Computes the kinetic energy of the system at the current time.
    ///
    /// # Errors
    ///
    /// Returns `Err(Self::Error)` if the energy cannot be computed, including
    /// when the integrator is not bound.
    fn kinetic_energy(&self) -> Result<MolarEnergy, Self::Error>;
}

/// The object-safe, caller-facing view of an [`Integrator`].
///
/// `Member` carries the stepping, parameter, and query half of the
/// [`Integrator`] capability set with every error boxed into a [`BoxError`],
/// so integrators with different error types can be handed out as
/// `&dyn Member<C>`. It is implemented for every `Integrator<C> + 'static`;
/// there is no reason to implement it by hand.
///
/// [`Integrator::bind`] and [`Integrator::release`] are not part of `Member`:
/// binding belongs to whoever owns the integrator, and a `&mut dyn Member<C>`
/// cannot attach or detach it.
///
/// [`as_any`](Member::as_any) and [`as_any_mut`](Member::as_any_mut) allow
/// callers to recover the concrete integrator type.
pub trait Member<C> {
    /// See [`Integrator::step`].
    ///
    /// # Errors
    ///
    /// Returns the integrator's error, boxed.
    fn step(&mut self, steps: usize) -> Result<(), BoxError>;

    /// See [`Integrator::step_size`].
    fn step_size(&self) -> Time;

    /// See [`Integrator::set_step_size`].
    ///
    /// # Errors
    ///
    /// Returns the integrator's error, boxed.
    fn set_step_size(&mut self, size: Time) -> Result<(), BoxError>;

    /// See [`Integrator::constraint_tolerance`].
    fn constraint_tolerance(&self) -> f64;

    /// See [`Integrator::set_constraint_tolerance`].
    ///
    /// # Errors
    ///
    /// Returns the integrator's error, boxed.
    fn set_constraint_tolerance(&mut self, tolerance: f64) -> Result<(), BoxError>;

    /// See [`Integrator::kernel_names`].
    fn kernel_names(&self) -> KernelNames;

    /// See [`Integrator::kinetic_energy`].
    ///
    /// # Errors
    ///
    /// Returns the integrator's error, boxed.
    fn kinetic_energy(&self) -> Result<MolarEnergy, BoxError>;

    /// Returns `self` as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns `self` as mutable [`Any`] for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C, I> Member<C> for I
where
    I: Integrator<C> + 'static,
{
    fn step(&mut self, steps: usize) -> Result<(), BoxError> {
        Integrator::step(self, steps).map_err(Into::into)
    }

    fn step_size(&self) -> Time {
        Integrator::step_size(self)
    }

    fn set_step_size(&mut self, size: Time) -> Result<(), BoxError> {
        Integrator::set_step_size(self, size).map_err(Into::into)
    }

    fn constraint_tolerance(&self) -> f64 {
        Integrator::constraint_tolerance(self)
    }

    fn set_constraint_tolerance(&mut self, tolerance: f64) -> Result<(), BoxError> {
        Integrator::set_constraint_tolerance(self, tolerance).map_err(Into::into)
    }

    fn kernel_names(&self) -> KernelNames {
        Integrator::kernel_names(self)
    }

    fn kinetic_energy(&self) -> Result<MolarEnergy, BoxError> {
        Integrator::kinetic_energy(self).map_err(Into::into)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
