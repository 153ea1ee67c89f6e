//! Integrators that manage other integrators.
//!
//! - [`compound`]: a [`CompoundIntegrator`] that owns several stepping
//!   strategies and routes every call to the active one
//! - [`schedule`]: a driver that runs a sequence of `(member, steps)`
//!   segments through a compound integrator
//!
//! # Features
//!
//! - `serde`: derives `Serialize`/`Deserialize` for [`schedule::Config`] and
//!   [`schedule::Segment`] so schedules can be loaded from files.

pub mod compound;
pub mod schedule;

#[cfg(test)]
mod test_utils;

pub use compound::CompoundIntegrator;
