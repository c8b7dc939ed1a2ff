//! # Ad Event Sink - Single-Consumer Event Delivery
//!
//! Delivers `NormalizedEvent`s to exactly one registered host listener.
//!
//! ## Rules
//!
//! - **One Consumer:** registering a listener replaces (and releases) the
//!   previous one; listeners never stack.
//! - **Session Bound:** each `ConsumerReference` carries the session that
//!   registered it; deliveries stamped with any other session are dropped.
//! - **Closed Means Closed:** after teardown nothing is delivered, ever.
//!
//! ```text
//! ┌──────────────┐  deliver(session, event)  ┌──────────────┐
//! │ Bridge task  │ ────────────────────────▶ │  EventSink   │
//! └──────────────┘                           │ [consumer]   │──▶ host listener
//!                                            └──────────────┘
//! ```
//!
//! The sink is not internally synchronized: it is owned by the bridge's
//! serialized context, which is what makes registration, replacement and
//! delivery mutually exclusive.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod consumer;
pub mod sink;

pub use consumer::{channel, ChannelConsumer, EventConsumer, EventStream};
pub use sink::{ConsumerReference, Delivery, EventSink, SinkError};
