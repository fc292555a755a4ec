//! Append-only event sinks.
//!
//! Mutating operations append structured records for off-chain mirrors.
//! Nothing in the core ever reads them back.

/// Receives events emitted by mutating operations.
pub trait EventSink<E> {
    /// Append one event.
    fn emit(&mut self, event: E);
}

impl<E> EventSink<E> for Vec<E> {
    fn emit(&mut self, event: E) {
        self.push(event);
    }
}

impl<E, S: EventSink<E> + ?Sized> EventSink<E> for &mut S {
    fn emit(&mut self, event: E) {
        (**self).emit(event);
    }
}

/// An in-memory, append-only event log.
#[derive(Debug, Clone)]
pub struct Journal<E> {
    events: Vec<E>,
}

impl<E> Default for Journal<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> Journal<E> {
    /// An empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event recorded so far, oldest first.
    pub fn events(&self) -> &[E] {
        &self.events
    }

    /// The most recent event.
    pub fn last(&self) -> Option<&E> {
        self.events.last()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Hand every recorded event to a bridge, leaving the journal empty.
    pub fn drain(&mut self) -> impl Iterator<Item = E> + '_ {
        self.events.drain(..)
    }
}

impl<E> EventSink<E> for Journal<E> {
    fn emit(&mut self, event: E) {
        self.events.push(event);
    }
}
