/// Receives events from a driver and optionally returns a control action.
///
/// Drivers call [`Observer::observe`] at well-defined points (after each chunk
/// of steps, for example) and act on the returned action, if any. Returning
/// `None` lets the driver continue unchanged.
///
/// Implemented for `()`, which never acts, and for any `FnMut(&E) -> Option<A>`
/// closure.
pub trait Observer<E, A> {
    /// Observes an event and optionally returns an action.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Action {
        Stop,
    }

    fn drive<Obs: Observer<usize, Action>>(mut observer: Obs, events: usize) -> usize {
        for event in 0..events {
            if let Some(Action::Stop) = observer.observe(&event) {
                return event;
            }
        }
        events
    }

    #[test]
    fn unit_observer_never_acts() {
        assert_eq!(drive((), 10), 10);
    }

    #[test]
    fn closure_observer_can_stop() {
        let observer = |event: &usize| (*event == 3).then_some(Action::Stop);
        assert_eq!(drive(observer, 10), 3);
    }

    #[test]
    fn closure_observer_can_capture_state() {
        let mut seen = Vec::new();
        drive(
            |event: &usize| {
                seen.push(*event);
                None
            },
            4,
        );
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }
}
