//! A driver that runs a compound integrator through a fixed schedule.
//!
//! A schedule is a list of [`Segment`]s. Each segment activates one member of a
//! [`CompoundIntegrator`] and takes a number of steps with it:
//!
//! ```ignore
//! use tandem_integrators::schedule::{self, Config, Segment};
//!
//! // 1000 steps of Verlet, then 5000 of Langevin, then 1000 of Verlet again.
//! let config = Config::new(vec![
//!     Segment::new(verlet, 1000),
//!     Segment::new(langevin, 5000),
//!     Segment::new(verlet, 1000),
//! ])?
//! .with_chunk(100)?;
//!
//! let solution = schedule::run_unobserved(&mut compound, &config)?;
//! ```
//!
//! # Observer
//!
//! The observer receives an [`Event`] after each chunk of steps (or after each
//! segment when no chunk size is configured) and may return
//! [`Action::StopEarly`] to end the run.
//!
//! The compound must be bound before running. The active member is left at
//! whatever the last segment selected.

mod action;
mod config;
mod error;
mod event;
mod solution;

pub use action::Action;
pub use config::{Config, ConfigError, Segment};
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Status};

use log::debug;
use tandem_core::Observer;

use crate::CompoundIntegrator;

/// Runs every segment of `config` through `compound`.
///
/// # Algorithm
///
/// For each segment:
/// 1. Make the segment's member active.
/// 2. Step it in chunks of at most `config.chunk()` steps (the whole segment
///    when unset).
/// 3. After each chunk, emit an [`Event`] with the active member's kinetic
///    energy. If the observer returns [`Action::StopEarly`], stop.
///
/// # Errors
///
/// Returns [`Error::Segment`] if a segment names a member the compound does
/// not have, if the compound is not bound, or if the active member fails.
pub fn run<C, Obs>(
    compound: &mut CompoundIntegrator<C>,
    config: &Config,
    mut observer: Obs,
) -> Result<Solution, Error>
where
    Obs: Observer<Event, Action>,
{
    let mut total_steps = 0;

    for (segment, &Segment { member, steps }) in config.segments().iter().enumerate() {
        let fail = move |source| Error::segment(segment, source);

        compound.set_active_index(member).map_err(fail)?;
        debug!("segment {segment}: {steps} step(s) on member {member}");

        let chunk = config.chunk().unwrap_or(steps);
        let mut segment_steps = 0;

        while segment_steps < steps {
            let n = chunk.min(steps - segment_steps);
            compound.step(n).map_err(fail)?;
            segment_steps += n;
            total_steps += n;

            let event = Event {
                segment,
                member,
                segment_steps,
                total_steps,
                kinetic_energy: compound.kinetic_energy().map_err(fail)?,
            };

            if let Some(Action::StopEarly) = observer.observe(&event) {
                debug!("schedule stopped by observer after {total_steps} step(s)");
                let completed = if segment_steps == steps {
                    segment + 1
                } else {
                    segment
                };
                return Ok(Solution {
                    status: Status::StoppedByObserver,
                    segments: completed,
                    steps: total_steps,
                });
            }
        }
    }

    Ok(Solution {
        status: Status::Complete,
        segments: config.segments().len(),
        steps: total_steps,
    })
}

/// Runs a schedule without observation.
///
/// This is a convenience wrapper around [`run`] that discards events.
///
/// # Errors
///
/// Returns an error under the same conditions as [`run`].
pub fn run_unobserved<C>(
    compound: &mut CompoundIntegrator<C>,
    config: &Config,
) -> Result<Solution, Error> {
    run(compound, config, ())
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::molar_energy::kilojoule_per_mole;

    use crate::{
        compound::Error as CompoundError,
        test_utils::{Clock, Entry, Journal, Recorder, entries, journal},
    };

    fn bound_pair(journal: &Journal) -> CompoundIntegrator<Clock> {
        let mut compound = CompoundIntegrator::new();
        compound.add(Recorder::new("verlet", journal)).unwrap();
        compound.add(Recorder::new("langevin", journal)).unwrap();
        compound.bind(&Clock::default()).unwrap();
        journal.borrow_mut().clear();
        compound
    }

    #[test]
    fn runs_segments_in_order() {
        let journal = journal();
        let mut compound = bound_pair(&journal);
        let config = Config::new(vec![
            Segment::new(1, 30),
            Segment::new(0, 20),
            Segment::new(1, 5),
        ])
        .unwrap();

        let solution = run_unobserved(&mut compound, &config).expect("should run");

        assert_eq!(solution.status, Status::Complete);
        assert_eq!(solution.segments, 3);
        assert_eq!(solution.steps, 55);
        assert_eq!(
            entries(&journal),
            vec![
                Entry::Step("langevin", 30),
                Entry::Step("verlet", 20),
                Entry::Step("langevin", 5),
            ]
        );
        assert_eq!(compound.active_index(), Some(1));
    }

    #[test]
    fn splits_segments_into_chunks() {
        let journal = journal();
        let mut compound = bound_pair(&journal);
        let config = Config::new(vec![Segment::new(0, 10)])
            .unwrap()
            .with_chunk(4)
            .unwrap();

        let mut events = Vec::new();
        let solution = run(&mut compound, &config, |event: &Event| {
            events.push(*event);
            None
        })
        .expect("should run");

        assert_eq!(solution.steps, 10);
        let progress: Vec<_> = events
            .iter()
            .map(|event| (event.segment_steps, event.total_steps))
            .collect();
        assert_eq!(progress, vec![(4, 4), (8, 8), (10, 10)]);
        assert_relative_eq!(
            events[2].kinetic_energy.get::<kilojoule_per_mole>(),
            10.0
        );
        assert_eq!(
            entries(&journal),
            vec![
                Entry::Step("verlet", 4),
                Entry::Step("verlet", 4),
                Entry::Step("verlet", 2),
            ]
        );
    }

    #[test]
    fn observer_can_stop_mid_segment() {
        let journal = journal();
        let mut compound = bound_pair(&journal);
        let config = Config::new(vec![Segment::new(0, 10), Segment::new(1, 10)])
            .unwrap()
            .with_chunk(5)
            .unwrap();

        let observer = |event: &Event| (event.total_steps >= 15).then_some(Action::StopEarly);
        let solution = run(&mut compound, &config, observer).expect("should stop early");

        assert_eq!(solution.status, Status::StoppedByObserver);
        assert_eq!(solution.segments, 1);
        assert_eq!(solution.steps, 15);
    }

    #[test]
    fn observer_stopping_at_segment_end_counts_the_segment() {
        let journal = journal();
        let mut compound = bound_pair(&journal);
        let config = Config::new(vec![Segment::new(0, 10), Segment::new(1, 10)]).unwrap();

        let observer = |event: &Event| (event.segment == 0).then_some(Action::StopEarly);
        let solution = run(&mut compound, &config, observer).expect("should stop early");

        assert_eq!(solution.segments, 1);
        assert_eq!(solution.steps, 10);
        assert_eq!(entries(&journal), vec![Entry::Step("verlet", 10)]);
    }

    #[test]
    fn unknown_member_fails_with_segment_index() {
        let journal = journal();
        let mut compound = bound_pair(&journal);
        let config = Config::new(vec![Segment::new(0, 10), Segment::new(4, 10)]).unwrap();

        let error = run_unobserved(&mut compound, &config).unwrap_err();

        assert!(matches!(
            error,
            Error::Segment {
                segment: 1,
                source: CompoundError::IndexOutOfRange { index: 4, len: 2 },
            }
        ));
        assert_eq!(entries(&journal), vec![Entry::Step("verlet", 10)]);
    }

    #[test]
    fn unbound_compound_fails() {
        let journal = journal();
        let mut compound = bound_pair(&journal);
        compound.release();
        let config = Config::new(vec![Segment::new(1, 10)]).unwrap();

        let error = run_unobserved(&mut compound, &config).unwrap_err();

        assert!(matches!(
            error,
            Error::Segment {
                segment: 0,
                source: CompoundError::NotBound,
            }
        ));
    }
}
