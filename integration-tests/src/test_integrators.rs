pub mod system {
    use std::{cell::RefCell, rc::Rc};

    use serde::{Deserialize, Serialize};

    /// The simulation context shared by every integrator in a compound.
    pub type System = Rc<RefCell<Particles>>;

    /// One-dimensional particles on harmonic springs anchored at the origin.
    ///
    /// Positions are in nm, velocities in nm/ps, masses in g/mol, and the
    /// spring constant in kJ/mol/nm², so energies come out in kJ/mol.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Particles {
        pub positions: Vec<f64>,
        pub velocities: Vec<f64>,
        pub masses: Vec<f64>,
        pub spring_constant: f64,
    }

    impl Particles {
        /// Returns the force on each particle.
        #[must_use]
        pub fn forces(&self) -> Vec<f64> {
            self.positions
                .iter()
                .map(|x| -self.spring_constant * x)
                .collect()
        }

        #[must_use]
        pub fn kinetic_energy(&self) -> f64 {
            self.velocities
                .iter()
                .zip(&self.masses)
                .map(|(v, m)| 0.5 * m * v * v)
                .sum()
        }

        #[must_use]
        pub fn potential_energy(&self) -> f64 {
            self.positions
                .iter()
                .map(|x| 0.5 * self.spring_constant * x * x)
                .sum()
        }

        #[must_use]
        pub fn total_energy(&self) -> f64 {
            self.kinetic_energy() + self.potential_energy()
        }
    }

    /// Initial conditions for a particle system, as read from a run file.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SystemConfig {
        pub spring_constant: f64,
        pub particles: Vec<ParticleConfig>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ParticleConfig {
        pub mass: f64,
        pub position: f64,
        #[serde(default)]
        pub velocity: f64,
    }

    impl SystemConfig {
        /// Builds a shared system from this config.
        #[must_use]
        pub fn build(&self) -> System {
            let particles = Particles {
                positions: self.particles.iter().map(|p| p.position).collect(),
                velocities: self.particles.iter().map(|p| p.velocity).collect(),
                masses: self.particles.iter().map(|p| p.mass).collect(),
                spring_constant: self.spring_constant,
            };
            Rc::new(RefCell::new(particles))
        }
    }
}

pub mod error {
    /// Errors shared by the toy integrators.
    #[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
    pub enum Error {
        #[error("integrator is not bound to a system")]
        Unbound,

        #[error("step size must be positive and finite, got {0} ps")]
        InvalidStepSize(f64),

        #[error("constraint tolerance must be positive and finite, got {0}")]
        InvalidTolerance(f64),

        #[error("friction must be non-negative and finite, got {0} 1/ps")]
        InvalidFriction(f64),

        #[error("system has no particles")]
        NoParticles,
    }

    pub(crate) fn check_step_size(ps: f64) -> Result<f64, Error> {
        if ps.is_finite() && ps > 0.0 {
            Ok(ps)
        } else {
            Err(Error::InvalidStepSize(ps))
        }
    }

    pub(crate) fn check_friction(friction: f64) -> Result<f64, Error> {
        if friction.is_finite() && friction >= 0.0 {
            Ok(friction)
        } else {
            Err(Error::InvalidFriction(friction))
        }
    }

    pub(crate) fn check_tolerance(tolerance: f64) -> Result<f64, Error> {
        if tolerance.is_finite() && tolerance > 0.0 {
            Ok(tolerance)
        } else {
            Err(Error::InvalidTolerance(tolerance))
        }
    }
}

pub mod verlet {
    use std::rc::Rc;

    use tandem_core::{Integrator, KernelNames};
    use uom::si::{
        f64::{MolarEnergy, Time},
        molar_energy::kilojoule_per_mole,
        time::picosecond,
    };

    use super::{
        error::{Error, check_step_size, check_tolerance},
        system::System,
    };

    /// A velocity Verlet integrator.
    #[derive(Debug)]
    pub struct Verlet {
        dt: f64,
        tolerance: f64,
        steps_taken: usize,
        system: Option<System>,
    }

    impl Verlet {
        /// Creates an integrator with a step size in picoseconds.
        ///
        /// # Errors
        ///
        /// Returns an error if `dt` is not positive and finite.
        pub fn new(dt: f64) -> Result<Self, Error> {
            Ok(Self {
                dt: check_step_size(dt)?,
                tolerance: 1e-5,
                steps_taken: 0,
                system: None,
            })
        }

        /// Returns the number of steps this integrator has taken.
        #[must_use]
        pub fn steps_taken(&self) -> usize {
            self.steps_taken
        }
    }

    impl Integrator<System> for Verlet {
        type Error = Error;

        fn bind(&mut self, system: &System) -> Result<(), Self::Error> {
            if system.borrow().positions.is_empty() {
                return Err(Error::NoParticles);
            }
            self.system = Some(Rc::clone(system));
            Ok(())
        }

        fn release(&mut self) {
            self.system = None;
        }

        fn step(&mut self, steps: usize) -> Result<(), Self::Error> {
            let system = Rc::clone(self.system.as_ref().ok_or(Error::Unbound)?);
            let mut guard = system.borrow_mut();
            let p = &mut *guard;
            let dt = self.dt;

            for _ in 0..steps {
                let forces = p.forces();
                for i in 0..p.positions.len() {
                    let half_kick = 0.5 * dt * forces[i] / p.masses[i];
                    p.velocities[i] += half_kick;
                    p.positions[i] += dt * p.velocities[i];
                }
                let forces = p.forces();
                for i in 0..p.positions.len() {
                    p.velocities[i] += 0.5 * dt * forces[i] / p.masses[i];
                }
            }

            self.steps_taken += steps;
            Ok(())
        }

        fn step_size(&self) -> Time {
            Time::new::<picosecond>(self.dt)
        }

        fn set_step_size(&mut self, size: Time) -> Result<(), Self::Error> {
            self.dt = check_step_size(size.get::<picosecond>())?;
            Ok(())
        }

        fn constraint_tolerance(&self) -> f64 {
            self.tolerance
        }

        fn set_constraint_tolerance(&mut self, tolerance: f64) -> Result<(), Self::Error> {
            self.tolerance = check_tolerance(tolerance)?;
            Ok(())
        }

        fn kernel_names(&self) -> KernelNames {
            ["CalcForces", "IntegrateVerletStep"]
                .into_iter()
                .map(String::from)
                .collect()
        }

        fn kinetic_energy(&self) -> Result<MolarEnergy, Self::Error> {
            let system = self.system.as_ref().ok_or(Error::Unbound)?;
            Ok(MolarEnergy::new::<kilojoule_per_mole>(
                system.borrow().kinetic_energy(),
            ))
        }
    }
}

pub mod langevin {
    use std::rc::Rc;

    use tandem_core::{Integrator, KernelNames};
    use uom::si::{
        f64::{MolarEnergy, Time},
        molar_energy::kilojoule_per_mole,
        time::picosecond,
    };

    use super::{
        error::{Error, check_friction, check_step_size, check_tolerance},
        system::System,
    };

    /// A Langevin integrator in the zero-temperature limit.
    ///
    /// Each step applies a semi-implicit Euler update followed by exponential
    /// velocity damping with the friction coefficient. With no thermal noise
    /// the system relaxes toward its energy minimum.
    #[derive(Debug)]
    pub struct Langevin {
        dt: f64,
        friction: f64,
        tolerance: f64,
        steps_taken: usize,
        system: Option<System>,
    }

    impl Langevin {
        /// Creates an integrator with a friction coefficient in 1/ps and a
        /// step size in picoseconds.
        ///
        /// # Errors
        ///
        /// Returns an error if `dt` is not positive and finite, or if
        /// `friction` is negative or not finite.
        pub fn new(friction: f64, dt: f64) -> Result<Self, Error> {
            Ok(Self {
                dt: check_step_size(dt)?,
                friction: check_friction(friction)?,
                tolerance: 1e-5,
                steps_taken: 0,
                system: None,
            })
        }

        /// Returns the friction coefficient in 1/ps.
        #[must_use]
        pub fn friction(&self) -> f64 {
            self.friction
        }

        /// Sets the friction coefficient in 1/ps. Zero turns off damping.
        ///
        /// # Errors
        ///
        /// Returns an error if `friction` is negative or not finite, leaving
        /// the current value unchanged.
        pub fn set_friction(&mut self, friction: f64) -> Result<(), Error> {
            self.friction = check_friction(friction)?;
            Ok(())
        }

        /// Returns the number of steps this integrator has taken.
        #[must_use]
        pub fn steps_taken(&self) -> usize {
            self.steps_taken
        }
    }

    impl Integrator<System> for Langevin {
        type Error = Error;

        fn bind(&mut self, system: &System) -> Result<(), Self::Error> {
            if system.borrow().positions.is_empty() {
                return Err(Error::NoParticles);
            }
            self.system = Some(Rc::clone(system));
            Ok(())
        }

        fn release(&mut self) {
            self.system = None;
        }

        fn step(&mut self, steps: usize) -> Result<(), Self::Error> {
            let system = Rc::clone(self.system.as_ref().ok_or(Error::Unbound)?);
            let mut guard = system.borrow_mut();
            let p = &mut *guard;
            let dt = self.dt;
            let damping = (-self.friction * dt).exp();

            for _ in 0..steps {
                let forces = p.forces();
                for i in 0..p.positions.len() {
                    let kicked = p.velocities[i] + dt * forces[i] / p.masses[i];
                    p.velocities[i] = kicked * damping;
                    p.positions[i] += dt * p.velocities[i];
                }
            }

            self.steps_taken += steps;
            Ok(())
        }

        fn step_size(&self) -> Time {
            Time::new::<picosecond>(self.dt)
        }

        fn set_step_size(&mut self, size: Time) -> Result<(), Self::Error> {
            self.dt = check_step_size(size.get::<picosecond>())?;
            Ok(())
        }

        fn constraint_tolerance(&self) -> f64 {
            self.tolerance
        }

        fn set_constraint_tolerance(&mut self, tolerance: f64) -> Result<(), Self::Error> {
            self.tolerance = check_tolerance(tolerance)?;
            Ok(())
        }

        fn kernel_names(&self) -> KernelNames {
            ["CalcForces", "IntegrateLangevinStep"]
                .into_iter()
                .map(String::from)
                .collect()
        }

        fn kinetic_energy(&self) -> Result<MolarEnergy, Self::Error> {
            let system = self.system.as_ref().ok_or(Error::Unbound)?;
            Ok(MolarEnergy::new::<kilojoule_per_mole>(
                system.borrow().kinetic_energy(),
            ))
        }
    }
}
