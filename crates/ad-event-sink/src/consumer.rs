//! # Event Consumers
//!
//! The receiving side of the sink: the host listener abstraction plus a
//! channel-backed listener for async hosts and tests.

use ad_types::NormalizedEvent;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tracing::debug;

/// The host listener.
///
/// Implementations are invoked from the bridge's serialized context, one
/// event at a time, never concurrently.
pub trait EventConsumer: Send {
    /// Handle one event.
    fn on_event(&self, event: &NormalizedEvent);

    /// Called once when the reference holding this consumer is released.
    ///
    /// Hosts that pin the listener (e.g. a registry reference in a script
    /// runtime) free it here.
    fn on_release(&self) {}
}

impl<F> EventConsumer for F
where
    F: Fn(&NormalizedEvent) + Send,
{
    fn on_event(&self, event: &NormalizedEvent) {
        self(event)
    }
}

/// Create a listener that forwards events into an `EventStream`.
#[must_use]
pub fn channel() -> (ChannelConsumer, EventStream) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (ChannelConsumer { sender }, EventStream { receiver })
}

/// Listener that forwards every event into an unbounded channel.
pub struct ChannelConsumer {
    sender: mpsc::UnboundedSender<NormalizedEvent>,
}

impl EventConsumer for ChannelConsumer {
    fn on_event(&self, event: &NormalizedEvent) {
        if self.sender.send(event.clone()).is_err() {
            debug!(event = %event, "Event stream dropped, event discarded");
        }
    }
}

/// Receiving half of a `ChannelConsumer`.
///
/// Ends (`None`) once the consumer has been released and dropped by the sink.
pub struct EventStream {
    receiver: mpsc::UnboundedReceiver<NormalizedEvent>,
}

impl EventStream {
    /// Receive the next event.
    ///
    /// # Returns
    ///
    /// - `Some(event)` - The next event
    /// - `None` - The consumer was released
    pub async fn recv(&mut self) -> Option<NormalizedEvent> {
        self.receiver.recv().await
    }

    /// Take the next event without waiting.
    pub fn try_recv(&mut self) -> Option<NormalizedEvent> {
        self.receiver.try_recv().ok()
    }

    /// Drain everything currently buffered.
    pub fn drain(&mut self) -> Vec<NormalizedEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Stream for EventStream {
    type Item = NormalizedEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
