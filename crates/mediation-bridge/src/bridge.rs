//! # Mediation Bridge
//!
//! The host-facing handle. Every method returns immediately: work is queued
//! onto the runtime task and results come back as events on the listener.
//!
//! | Host call | Result |
//! |-----------|--------|
//! | `init(options, listener)` | `init/success` or `init/failed` event |
//! | `load(type)` | `loaded` / `available` event, or a load failure |
//! | `show(type, options)` | `show`, `reward`, `closed` events, or `show` error |
//! | `is_available(type)` | answered from the readiness snapshot |
//!
//! Dropping the last clone tears the bridge down.

use ad_event_sink::EventConsumer;
use ad_types::{AdType, InitOptions, SessionId, ShowOptions};
use ad_unit::{AdSdkCapability, AdUnitState};
use mediation_telemetry::USAGE_ERRORS;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use crate::adapters::InstrumentedCapability;
use crate::container::BridgeConfig;
use crate::errors::BridgeError;
use crate::handlers::{BridgeRuntime, ReadinessSnapshot};
use crate::wiring::Command;

struct Shared {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: ReadinessSnapshot,
    last_session: AtomicU64,
}

impl Drop for Shared {
    fn drop(&mut self) {
        // Vendor sinks keep the channel open, so the runtime has to be told.
        if self.commands.send(Command::Teardown(None)).is_ok() {
            debug!("Last bridge handle dropped, tearing down");
        }
    }
}

/// Cloneable handle to one bridge instance.
#[derive(Clone)]
pub struct MediationBridge {
    shared: Arc<Shared>,
}

impl MediationBridge {
    /// Create a bridge and the runtime that must be driven for it to work.
    #[must_use]
    pub fn build(capability: Arc<dyn AdSdkCapability>, config: BridgeConfig) -> (Self, BridgeRuntime) {
        let (commands, receiver) = mpsc::unbounded_channel();
        let snapshot: ReadinessSnapshot = Arc::new(RwLock::new(HashMap::new()));
        let capability: Arc<dyn AdSdkCapability> = Arc::new(InstrumentedCapability::new(capability));

        let runtime = BridgeRuntime::new(
            capability,
            config,
            Arc::clone(&snapshot),
            commands.downgrade(),
            receiver,
        );
        let bridge = Self {
            shared: Arc::new(Shared {
                commands,
                snapshot,
                last_session: AtomicU64::new(0),
            }),
        };
        (bridge, runtime)
    }

    /// Create a bridge and spawn its runtime on the current tokio runtime.
    #[must_use]
    pub fn spawn(capability: Arc<dyn AdSdkCapability>, config: BridgeConfig) -> Self {
        let (bridge, runtime) = Self::build(capability, config);
        tokio::spawn(runtime.run());
        bridge
    }

    fn send(&self, command: Command) -> Result<(), BridgeError> {
        self.shared
            .commands
            .send(command)
            .map_err(|_| BridgeError::ShutDown)
    }

    /// Start a session, replacing the current one.
    ///
    /// # Errors
    ///
    /// `BridgeError::Config` when the options are unusable; nothing is
    /// registered and no event is emitted.
    pub fn init<C>(&self, options: InitOptions, consumer: C) -> Result<SessionId, BridgeError>
    where
        C: EventConsumer + 'static,
    {
        let options = options.validate().map_err(|err| {
            error!(error = %err, "Init rejected");
            USAGE_ERRORS.with_label_values(&["init"]).inc();
            err
        })?;

        let session = SessionId::new(self.shared.last_session.fetch_add(1, Ordering::SeqCst) + 1);
        self.send(Command::Init {
            session,
            options,
            consumer: Box::new(consumer),
        })?;
        Ok(session)
    }

    /// `init` with options decoded from a host table.
    pub fn init_from_host_table<C>(
        &self,
        table: &serde_json::Value,
        consumer: C,
    ) -> Result<SessionId, BridgeError>
    where
        C: EventConsumer + 'static,
    {
        let options = InitOptions::from_host_table(table).map_err(|err| {
            error!(error = %err, "Init options rejected");
            USAGE_ERRORS.with_label_values(&["init"]).inc();
            err
        })?;
        self.init(options, consumer)
    }

    /// Ask the unit for `ad_type` to load.
    pub fn load(&self, ad_type: AdType) -> Result<(), BridgeError> {
        self.send(Command::Load(ad_type))
    }

    /// Show the ad for `ad_type`.
    pub fn show(&self, ad_type: AdType, options: ShowOptions) -> Result<(), BridgeError> {
        self.send(Command::Show {
            ad_type,
            placement: options.placement_name().map(str::to_string),
        })
    }

    /// Whether `ad_type` is ready to show, as of the last handled command.
    #[must_use]
    pub fn is_available(&self, ad_type: AdType) -> bool {
        self.shared
            .snapshot
            .read()
            .get(&ad_type)
            .is_some_and(AdUnitState::is_ready)
    }

    /// `load` with a host ad-type tag.
    pub fn load_tag(&self, tag: &str) -> Result<(), BridgeError> {
        let ad_type = parse_tag(tag, "load")?;
        self.load(ad_type)
    }

    /// `show` with a host ad-type tag and an optional options table.
    pub fn show_tag(&self, tag: &str, options: Option<&serde_json::Value>) -> Result<(), BridgeError> {
        let ad_type = parse_tag(tag, "show")?;
        self.show(ad_type, ShowOptions::from_host_table(options))
    }

    /// `is_available` with a host ad-type tag. Unknown tags are never available.
    #[must_use]
    pub fn is_available_tag(&self, tag: &str) -> bool {
        parse_tag(tag, "is_available").is_ok_and(|ad_type| self.is_available(ad_type))
    }

    /// Host went to the background.
    pub fn on_pause(&self) -> Result<(), BridgeError> {
        self.send(Command::Pause)
    }

    /// Host came back to the foreground.
    pub fn on_resume(&self) -> Result<(), BridgeError> {
        self.send(Command::Resume)
    }

    /// Wait until every command sent before this call has been handled.
    pub async fn flush(&self) -> Result<(), BridgeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Flush(tx))?;
        rx.await.map_err(|_| BridgeError::ShutDown)
    }

    /// State of the unit for `ad_type`, `None` when no unit exists.
    pub async fn unit_state(&self, ad_type: AdType) -> Result<Option<AdUnitState>, BridgeError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::QueryState { ad_type, reply })?;
        rx.await.map_err(|_| BridgeError::ShutDown)
    }

    /// Release the listener, discard all units and stop the runtime.
    ///
    /// Idempotent. Vendor callbacks arriving afterwards are dropped.
    pub async fn shutdown(&self) {
        let (tx, rx) = oneshot::channel();
        if self.send(Command::Teardown(Some(tx))).is_err() {
            return;
        }
        let _ = rx.await;
    }

    /// Whether the runtime has stopped.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shared.commands.is_closed()
    }
}

fn parse_tag(tag: &str, operation: &'static str) -> Result<AdType, BridgeError> {
    tag.parse::<AdType>().map_err(|err| {
        warn!(tag, operation, error = %err, "Unknown ad unit type");
        USAGE_ERRORS.with_label_values(&[operation]).inc();
        BridgeError::from(err)
    })
}

impl std::fmt::Debug for MediationBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediationBridge")
            .field("shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}
