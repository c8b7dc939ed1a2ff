//! # Vendor Callback Sink
//!
//! The `VendorCallbackSink` handed to `AdSdkCapability::initialize`. Each
//! session gets its own sink stamped with its `SessionId`, so the runtime can
//! tell a replaced session's callbacks apart from the current one's.
//!
//! Once the runtime has stopped the channel is closed and callbacks are
//! dropped on the vendor thread.

use ad_types::{SessionId, VendorCallback};
use ad_unit::VendorCallbackSink;
use mediation_telemetry::CALLBACKS_DROPPED;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::commands::Command;

/// Marshals vendor callbacks onto the runtime's command channel.
#[derive(Debug, Clone)]
pub struct SessionCallbackSink {
    session: SessionId,
    commands: UnboundedSender<Command>,
}

impl SessionCallbackSink {
    pub(crate) fn new(session: SessionId, commands: UnboundedSender<Command>) -> Self {
        Self { session, commands }
    }
}

impl VendorCallbackSink for SessionCallbackSink {
    fn deliver(&self, callback: VendorCallback) {
        let kind = callback.kind();
        let command = Command::Vendor {
            session: self.session,
            callback,
        };
        if self.commands.send(command).is_err() {
            debug!(session = %self.session, callback = kind, "Bridge torn down, callback dropped");
            CALLBACKS_DROPPED.with_label_values(&["torn_down"]).inc();
        }
    }
}
