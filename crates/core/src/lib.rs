//! Core traits for Tandem.
//!
//! This crate defines the shared abstractions that the composite integrator,
//! its drivers, and concrete stepping strategies build on:
//!
//! - [`Integrator`]: the capability set every stepping strategy implements
//! - [`Member`]: the object-safe, error-erased view of an [`Integrator`]
//!   handed out for heterogeneous strategies, without the lifecycle methods
//! - [`Observer`]: receives driver events and optionally returns control actions

mod integrator;
mod observer;

pub use integrator::{BoxError, Integrator, KernelNames, Member};
pub use observer::Observer;
