//! UI abstractions shared by both engines.
//!
//! - [`Component`] - interactive building blocks (forms, tables, controls)
//! - [`Handled`] - result of handling an input event

mod component;

pub use component::Component;

/// Result type alias for UI operations.
pub type Result<T> = std::result::Result<T, color_eyre::Report>;

/// Result of handling an input event.
///
/// - `Ignored` - the handler didn't recognize or handle this input
/// - `Consumed` - the input was handled but produced no event
/// - `Event(E)` - the input was handled and produced an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled<E> {
    /// Input was not handled, parent should process it.
    Ignored,
    /// Input was consumed but produced no event.
    Consumed,
    /// Input was consumed and produced an event.
    Event(E),
}

impl<E> Handled<E> {
    /// Returns true if the input was consumed (not ignored).
    pub fn is_consumed(&self) -> bool {
        !matches!(self, Handled::Ignored)
    }

    /// Returns the event if present.
    pub fn event(self) -> Option<E> {
        match self {
            Handled::Event(e) => Some(e),
            _ => None,
        }
    }

    /// Maps the event type using the provided function.
    pub fn map<F, U>(self, f: F) -> Handled<U>
    where
        F: FnOnce(E) -> U,
    {
        match self {
            Handled::Ignored => Handled::Ignored,
            Handled::Consumed => Handled::Consumed,
            Handled::Event(e) => Handled::Event(f(e)),
        }
    }
}

impl<E> From<E> for Handled<E> {
    fn from(event: E) -> Self {
        Handled::Event(event)
    }
}

impl<E> From<Handled<E>> for Result<Handled<E>> {
    fn from(handled: Handled<E>) -> Self {
        Ok(handled)
    }
}
