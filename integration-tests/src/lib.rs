//! Toy integrators and a shared particle system for exercising Tandem end to
//! end.

pub mod test_integrators;
