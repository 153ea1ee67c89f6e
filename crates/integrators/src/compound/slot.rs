use tandem_core::{BoxError, Integrator, Member};

/// An owned compound member, with its lifecycle reachable only from here.
///
/// Callers of the compound see a member through [`Member`], which has no
/// `bind` or `release`. The compound holds `Box<dyn Slot<C>>` so that it alone
/// can attach and detach its members.
pub(super) trait Slot<C> {
    fn bind(&mut self, context: &C) -> Result<(), BoxError>;

    fn release(&mut self);

    fn view(&self) -> &dyn Member<C>;

    fn view_mut(&mut self) -> &mut dyn Member<C>;
}

impl<C, I> Slot<C> for I
where
    I: Integrator<C> + 'static,
{
    fn bind(&mut self, context: &C) -> Result<(), BoxError> {
        Integrator::bind(self, context).map_err(Into::into)
    }

    fn release(&mut self) {
        Integrator::release(self);
    }

    fn view(&self) -> &dyn Member<C> {
        self
    }

    fn view_mut(&mut self) -> &mut dyn Member<C> {
        self
    }
}
