//! A compound integrator that switches between stepping strategies.
//!
//! # Overview
//!
//! [`CompoundIntegrator`] owns any number of [`Integrator`]s and presents them
//! as one. Exactly one member is active at a time. Stepping, parameter access,
//! and kinetic energy are routed to the active member only; binding, releasing,
//! and kernel-name collection are forwarded to every member.
//!
//! ```ignore
//! let mut compound = CompoundIntegrator::new();
//! let verlet = compound.add(Verlet::new(dt))?;
//! let langevin = compound.add(Langevin::new(temperature, friction, dt))?;
//!
//! compound.bind(&context)?;
//!
//! compound.set_active_index(verlet)?;
//! compound.step(1000)?; // 1000 steps of Verlet dynamics
//! compound.set_active_index(langevin)?;
//! compound.step(1000)?; // 1000 steps of Langevin dynamics
//! ```
//!
//! # Binding
//!
//! All members are bound to the same context in a single [`bind`] call, so
//! switching the active member never binds or releases anything. Because of
//! this, members must be added before binding: [`add`] fails with
//! [`Error::AlreadyBound`] once the compound is bound.
//!
//! If a member fails to bind, the members bound before it are released (in
//! insertion order) and the error is returned. The compound stays unbound.
//!
//! # Kernel names
//!
//! [`kernel_names`] returns the union over all members, not just the active
//! one, so the backend can prepare every kernel a later switch might need.
//!
//! [`bind`]: CompoundIntegrator::bind
//! [`add`]: CompoundIntegrator::add
//! [`kernel_names`]: CompoundIntegrator::kernel_names

mod error;
mod slot;


pub use error::Error;

use std::{any::Any, fmt};

use log::{debug, trace, warn};
use tandem_core::{Integrator, KernelNames, Member};
use uom::si::f64::{MolarEnergy, Time};

use self::slot::Slot;

/// An integrator made of other integrators, one of which is active.
///
/// Members are owned exclusively by the compound and are identified by the
/// index returned from [`add`](Self::add). Indices start at zero, increase by
/// one per member, and never change: members are never removed or reordered.
///
/// Members are lent out as [`Member`] views, which cannot bind or release.
/// Only the compound's own [`bind`](Self::bind) and [`release`](Self::release)
/// attach and detach its members.
pub struct CompoundIntegrator<C> {
    members: Vec<Box<dyn Slot<C>>>,
    active: usize,
    bound: bool,
}

impl<C> CompoundIntegrator<C> {
    /// Creates an empty, unbound compound integrator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            active: 0,
            bound: false,
        }
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if no members have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns `true` if the members are currently bound to a context.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Adds an integrator and returns its index.
    ///
    /// The compound takes ownership of the integrator. The first member added
    /// becomes the active one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyBound`] if the compound is bound to a context.
    /// The integrator is dropped in that case.
    pub fn add<I>(&mut self, integrator: I) -> Result<usize, Error>
    where
        I: Integrator<C> + 'static,
    {
        if self.bound {
            return Err(Error::AlreadyBound);
        }

        self.members.push(Box::new(integrator));
        let index = self.members.len() - 1;
        debug!("added member {index} to compound integrator");

        Ok(index)
    }

    /// Returns the member at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index >= self.len()`.
    pub fn member(&self, index: usize) -> Result<&dyn Member<C>, Error> {
        self.members
            .get(index)
            .map(|slot| slot.view())
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.members.len(),
            })
    }

    /// Returns the member at `index` mutably.
    ///
    /// The returned view can step the member and change its parameters, but
    /// not bind or release it:
    ///
    /// ```compile_fail
    /// # use tandem_integrators::CompoundIntegrator;
    /// fn release_one(compound: &mut CompoundIntegrator<()>) {
    ///     compound.member_mut(0).unwrap().release();
    /// }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index >= self.len()`.
    pub fn member_mut(&mut self, index: usize) -> Result<&mut dyn Member<C>, Error> {
        let len = self.members.len();
        self.members
            .get_mut(index)
            .map(|slot| slot.view_mut())
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    /// Returns the member at `index` as its concrete type.
    ///
    /// Returns `Ok(None)` if the member is not a `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index >= self.len()`.
    pub fn member_as<T: Any>(&self, index: usize) -> Result<Option<&T>, Error> {
        Ok(self.member(index)?.as_any().downcast_ref::<T>())
    }

    /// Returns the member at `index` mutably as its concrete type.
    ///
    /// Returns `Ok(None)` if the member is not a `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index >= self.len()`.
    pub fn member_as_mut<T: Any>(&mut self, index: usize) -> Result<Option<&mut T>, Error> {
        Ok(self.member_mut(index)?.as_any_mut().downcast_mut::<T>())
    }

    /// Iterates over all members in insertion order.
    pub fn members(&self) -> impl Iterator<Item = &dyn Member<C>> {
        self.members.iter().map(|slot| slot.view())
    }

    /// Returns the index of the active member.
    ///
    /// Returns `None` if the compound has no members, since no index is valid.
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        (!self.members.is_empty()).then_some(self.active)
    }

    /// Makes the member at `index` the active one.
    ///
    /// Switching does not bind or release anything; every member was already
    /// bound when the compound was.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index >= self.len()`, leaving
    /// the active member unchanged.
    pub fn set_active_index(&mut self, index: usize) -> Result<(), Error> {
        if index >= self.members.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.members.len(),
            });
        }

        if index != self.active {
            debug!("switching active member from {} to {index}", self.active);
        }
        self.active = index;

        Ok(())
    }

    /// Returns the step size of the active member.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if the compound has no members.
    pub fn step_size(&self) -> Result<Time, Error> {
        Ok(self.active()?.step_size())
    }

    /// Sets the step size of the active member.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if the compound has no members, or
    /// [`Error::Member`] if the active member rejects the value.
    pub fn set_step_size(&mut self, size: Time) -> Result<(), Error> {
        let index = self.active;
        self.active_mut()?
            .set_step_size(size)
            .map_err(|source| Error::member(index, source))
    }

    /// Returns the constraint tolerance of the active member.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if the compound has no members.
    pub fn constraint_tolerance(&self) -> Result<f64, Error> {
        Ok(self.active()?.constraint_tolerance())
    }

    /// Sets the constraint tolerance of the active member.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if the compound has no members, or
    /// [`Error::Member`] if the active member rejects the value.
    pub fn set_constraint_tolerance(&mut self, tolerance: f64) -> Result<(), Error> {
        let index = self.active;
        self.active_mut()?
            .set_constraint_tolerance(tolerance)
            .map_err(|source| Error::member(index, source))
    }

    /// Takes `steps` time steps with the active member.
    ///
    /// No other member is touched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if the compound has no members,
    /// [`Error::NotBound`] if it is not bound to a context, or
    /// [`Error::Member`] if the active member fails.
    pub fn step(&mut self, steps: usize) -> Result<(), Error> {
        if self.members.is_empty() {
            return Err(Error::Empty);
        }
        if !self.bound {
            return Err(Error::NotBound);
        }

        let index = self.active;
        trace!("stepping member {index} by {steps} step(s)");
        self.active_mut()?
            .step(steps)
            .map_err(|source| Error::member(index, source))
    }

    /// Computes the kinetic energy using the active member.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] if the compound has no members,
    /// [`Error::NotBound`] if it is not bound to a context, or
    /// [`Error::Member`] if the active member fails.
    pub fn kinetic_energy(&self) -> Result<MolarEnergy, Error> {
        let member = self.active()?;
        if !self.bound {
            return Err(Error::NotBound);
        }

        member
            .kinetic_energy()
            .map_err(|source| Error::member(self.active, source))
    }

    /// Returns the union of the kernel names of every member.
    ///
    /// The result does not depend on which member is active.
    #[must_use]
    pub fn kernel_names(&self) -> KernelNames {
        self.members
            .iter()
            .flat_map(|slot| slot.view().kernel_names())
            .collect()
    }

    /// Binds every member to `context`, in insertion order.
    ///
    /// If the compound is already bound, every member is released first and
    /// then bound again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Member`] if a member fails to bind. Members bound
    /// before the failing one are released before returning, and the compound
    /// is left unbound.
    pub fn bind(&mut self, context: &C) -> Result<(), Error> {
        if self.bound {
            debug!("rebinding compound integrator");
            self.release();
        }

        for index in 0..self.members.len() {
            if let Err(source) = self.members[index].bind(context) {
                warn!("member {index} failed to bind, releasing {index} bound member(s)");
                self.members[..index]
                    .iter_mut()
                    .for_each(|slot| slot.release());
                return Err(Error::member(index, source));
            }
        }

        self.bound = true;
        debug!("bound {} member(s)", self.members.len());

        Ok(())
    }

    /// Releases every member, in insertion order.
    ///
    /// Does nothing if the compound is not bound.
    pub fn release(&mut self) {
        if !self.bound {
            return;
        }

        self.members.iter_mut().for_each(|slot| slot.release());
        self.bound = false;
        debug!("released {} member(s)", self.members.len());
    }

    fn active(&self) -> Result<&dyn Member<C>, Error> {
        self.members
            .get(self.active)
            .map(|slot| slot.view())
            .ok_or(Error::Empty)
    }

    fn active_mut(&mut self) -> Result<&mut dyn Member<C>, Error> {
        self.members
            .get_mut(self.active)
            .map(|slot| slot.view_mut())
            .ok_or(Error::Empty)
    }
}

impl<C> Default for CompoundIntegrator<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Drop for CompoundIntegrator<C> {
    fn drop(&mut self) {
        if self.bound {
            warn!("compound integrator dropped while bound, releasing members");
            self.release();
        }
    }
}

impl<C> fmt::Debug for CompoundIntegrator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompoundIntegrator")
            .field("members", &self.members.len())
            .field("active", &self.active_index())
            .field("bound", &self.bound)
            .finish()
    }
}
