//! # Event Sink
//!
//! Owns the single `ConsumerReference` and delivers events through it.

use crate::consumer::EventConsumer;
use ad_types::{NormalizedEvent, SessionId};
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, error, info};

/// Errors from sink operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The sink was torn down.
    #[error("Event sink closed")]
    Closed,
}

/// Outcome of a delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The consumer received the event.
    Delivered,
    /// No consumer is registered.
    NoConsumer,
    /// The event belongs to a session other than the active consumer's.
    StaleSession,
    /// The sink was torn down.
    Closed,
    /// The consumer panicked while handling the event.
    ConsumerPanicked,
}

impl Delivery {
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Label used in logs and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::NoConsumer => "no_consumer",
            Self::StaleSession => "stale_session",
            Self::Closed => "closed",
            Self::ConsumerPanicked => "consumer_panicked",
        }
    }
}

/// Handle to the registered host listener.
///
/// Releasing (dropping) the reference calls `EventConsumer::on_release`
/// exactly once.
pub struct ConsumerReference {
    session: SessionId,
    consumer: Box<dyn EventConsumer>,
}

impl ConsumerReference {
    pub(crate) fn new(session: SessionId, consumer: Box<dyn EventConsumer>) -> Self {
        Self { session, consumer }
    }

    /// The session that registered this listener.
    #[must_use]
    pub fn session(&self) -> SessionId {
        self.session
    }
}

impl Drop for ConsumerReference {
    fn drop(&mut self) {
        let consumer = &self.consumer;
        if panic::catch_unwind(AssertUnwindSafe(|| consumer.on_release())).is_err() {
            error!(session = %self.session, "Listener panicked during release");
        }
        debug!(session = %self.session, "Listener reference released");
    }
}

impl std::fmt::Debug for ConsumerReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerReference")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Delivers events to at most one consumer.
#[derive(Debug, Default)]
pub struct EventSink {
    /// The active listener.
    active: Option<ConsumerReference>,

    /// Set once on teardown.
    closed: bool,

    /// Events handed to a consumer.
    delivered: u64,

    /// Events that reached no consumer.
    dropped: u64,
}

impl EventSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `consumer` for `session`, releasing any previous listener.
    ///
    /// # Returns
    ///
    /// `true` when a previous listener was replaced.
    pub fn register(
        &mut self,
        session: SessionId,
        consumer: Box<dyn EventConsumer>,
    ) -> Result<bool, SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }

        // Release the old reference before the new one becomes visible.
        let replaced = self.release();
        self.active = Some(ConsumerReference::new(session, consumer));

        info!(session = %session, replaced, "Listener registered");
        Ok(replaced)
    }

    /// Release the active listener, if any.
    pub fn release(&mut self) -> bool {
        match self.active.take() {
            Some(previous) => {
                debug!(session = %previous.session(), "Releasing listener");
                drop(previous);
                true
            }
            None => false,
        }
    }

    /// Deliver `event` on behalf of `session`.
    pub fn deliver(&mut self, session: SessionId, event: &NormalizedEvent) -> Delivery {
        let outcome = self.dispatch(session, event);
        if outcome.is_delivered() {
            self.delivered += 1;
        } else {
            self.dropped += 1;
            debug!(
                session = %session,
                event = %event,
                reason = outcome.as_str(),
                "Event not delivered"
            );
        }
        outcome
    }

    fn dispatch(&self, session: SessionId, event: &NormalizedEvent) -> Delivery {
        if self.closed {
            return Delivery::Closed;
        }
        let Some(reference) = &self.active else {
            return Delivery::NoConsumer;
        };
        if reference.session() != session {
            return Delivery::StaleSession;
        }

        let consumer = &reference.consumer;
        match panic::catch_unwind(AssertUnwindSafe(|| consumer.on_event(event))) {
            Ok(()) => Delivery::Delivered,
            Err(_) => {
                error!(session = %session, event = %event, "Listener panicked while handling event");
                Delivery::ConsumerPanicked
            }
        }
    }

    /// Release the listener and refuse all further work.
    pub fn teardown(&mut self) {
        if self.closed {
            return;
        }
        self.release();
        self.closed = true;
        info!(
            delivered = self.delivered,
            dropped = self.dropped,
            "Event sink torn down"
        );
    }

    /// The session of the active listener.
    #[must_use]
    pub fn active_session(&self) -> Option<SessionId> {
        self.active.as_ref().map(ConsumerReference::session)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[must_use]
    pub fn events_delivered(&self) -> u64 {
        self.delivered
    }

    #[must_use]
    pub fn events_dropped(&self) -> u64 {
        self.dropped
    }
}
