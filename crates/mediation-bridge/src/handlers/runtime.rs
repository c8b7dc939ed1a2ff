//! # Bridge Runtime
//!
//! The serialized context. One task owns the event sink, the session and its
//! ad units; every host call and every vendor callback reaches them as a
//! `Command`, one at a time.
//!
//! ## Session Flow
//!
//! ```text
//! Init ──▶ register listener ──▶ privacy flags ──▶ initialize
//!                                                    │
//!               ┌──── sync Ok / InitCompleted ───────┤
//!               ▼                                    └──── Err / InitFailed ──▶ init/failed
//!          init/success ──▶ build units ──▶ request_load each
//! ```
//!
//! ## Drop Reasons
//!
//! | Reason | When |
//! |--------|------|
//! | `no_session` | vendor callback with no session started |
//! | `stale_session` | callback from a replaced session's sink |
//! | `not_initialized` | ad callback before init completed, or after it failed |
//! | `duplicate_init` | second init completion for the same session |
//! | `unknown_unit` | callback for an ad unit that was never built |
//! | `torn_down` | anything arriving after teardown |

use ad_event_sink::{EventConsumer, EventSink};
use ad_types::{
    AdTarget, AdType, NormalizedEvent, SessionId, ValidatedInitOptions, VendorCallback,
    VendorError,
};
use ad_unit::{
    AdSdkCapability, AdUnit, AdUnitApi, AdUnitState, CapabilityProfile, EventNormalizer,
    InitHandshake, InitRequest, VendorCallbackSink, METADATA_COPPA, METADATA_DO_NOT_SELL,
};
use mediation_telemetry::{ACTIVE_AD_UNITS, CALLBACKS_DROPPED, EVENTS_DELIVERED, USAGE_ERRORS};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, WeakUnboundedSender};
use tracing::{debug, error, info, warn};

use crate::container::BridgeConfig;
use crate::wiring::{Command, SessionCallbackSink};

/// Unit states as of the last handled command, readable without entering
/// the runtime.
pub type ReadinessSnapshot = Arc<RwLock<HashMap<AdType, AdUnitState>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InitPhase {
    /// `initialize` returned, completion pending.
    Initializing,
    Ready,
    Failed,
}

struct Session {
    id: SessionId,
    phase: InitPhase,
    options: ValidatedInitOptions,
    units: Vec<AdUnit>,
}

impl Session {
    fn unit_mut(&mut self, ad_type: AdType) -> Option<&mut AdUnit> {
        self.units.iter_mut().find(|unit| unit.ad_type() == ad_type)
    }

    fn route(&mut self, target: &AdTarget) -> Option<&mut AdUnit> {
        self.units.iter_mut().find(|unit| unit.matches(target))
    }
}

/// Owns all bridge state. Consumed by `run`.
pub struct BridgeRuntime {
    capability: Arc<dyn AdSdkCapability>,
    profile: CapabilityProfile,
    config: BridgeConfig,
    normalizer: EventNormalizer,
    sink: EventSink,
    session: Option<Session>,
    snapshot: ReadinessSnapshot,
    /// Used to build per-session callback sinks. Weak so the runtime never
    /// keeps its own channel open.
    commands: WeakUnboundedSender<Command>,
    receiver: UnboundedReceiver<Command>,
}

impl BridgeRuntime {
    pub(crate) fn new(
        capability: Arc<dyn AdSdkCapability>,
        config: BridgeConfig,
        snapshot: ReadinessSnapshot,
        commands: WeakUnboundedSender<Command>,
        receiver: UnboundedReceiver<Command>,
    ) -> Self {
        let profile = capability.profile();
        Self {
            capability,
            profile,
            normalizer: config.normalizer(),
            config,
            sink: EventSink::new(),
            session: None,
            snapshot,
            commands,
            receiver,
        }
    }

    /// Process commands until teardown, or until every handle is gone.
    pub async fn run(mut self) {
        info!(
            generation = %self.profile.generation,
            load_failure_phase = ?self.config.load_failure_phase,
            "Mediation bridge runtime started"
        );

        let mut done = None;
        while let Some(command) = self.receiver.recv().await {
            if let Command::Teardown(reply) = command {
                done = reply;
                break;
            }
            self.handle(command);
            self.sync_snapshot();
        }

        self.teardown();
        // Close before acknowledging so no callback is queued once
        // `shutdown` returns.
        self.receiver.close();
        let mut discarded = 0usize;
        while let Ok(command) = self.receiver.try_recv() {
            if let Command::Vendor { session, callback } = command {
                debug!(session = %session, callback = callback.kind(), "Callback after teardown dropped");
                CALLBACKS_DROPPED.with_label_values(&["torn_down"]).inc();
            }
            discarded += 1;
        }
        info!(discarded, "Mediation bridge runtime stopped");

        if let Some(done) = done {
            let _ = done.send(());
        }
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Init {
                session,
                options,
                consumer,
            } => self.start_session(session, options, consumer),
            Command::Load(ad_type) => self.load(ad_type),
            Command::Show { ad_type, placement } => self.show(ad_type, placement.as_deref()),
            Command::Vendor { session, callback } => self.on_vendor(session, callback),
            Command::Pause => {
                if self.forwards_lifecycle("pause") {
                    self.capability.on_pause();
                }
            }
            Command::Resume => {
                if self.forwards_lifecycle("resume") {
                    self.capability.on_resume();
                }
            }
            Command::QueryState { ad_type, reply } => {
                let state = self
                    .session
                    .as_mut()
                    .and_then(|s| s.unit_mut(ad_type))
                    .map(|unit| unit.state());
                let _ = reply.send(state);
            }
            Command::Flush(done) => {
                let _ = done.send(());
            }
            Command::Teardown(_) => self.teardown(),
        }
    }

    fn start_session(
        &mut self,
        session: SessionId,
        options: ValidatedInitOptions,
        consumer: Box<dyn EventConsumer>,
    ) {
        if let Some(previous) = self.session.take() {
            info!(
                previous = %previous.id,
                units = previous.units.len(),
                "Discarding previous session"
            );
        }
        ACTIVE_AD_UNITS.set(0.0);

        if let Err(err) = self.sink.register(session, consumer) {
            warn!(session = %session, error = %err, "Listener rejected");
            return;
        }

        let Some(commands) = self.commands.upgrade() else {
            debug!(session = %session, "Command channel gone, init abandoned");
            return;
        };
        let callbacks: Arc<dyn VendorCallbackSink> =
            Arc::new(SessionCallbackSink::new(session, commands));

        self.apply_settings(&options);
        let request = InitRequest {
            app_key: options.app_key().to_string(),
            ad_types: self.planned_ad_types(&options),
        };

        info!(
            session = %session,
            generation = %self.profile.generation,
            ad_types = ?request.ad_types,
            "Initializing mediation session"
        );
        self.session = Some(Session {
            id: session,
            phase: InitPhase::Initializing,
            options,
            units: Vec::new(),
        });

        match self.capability.initialize(&request, callbacks) {
            Ok(()) if self.profile.init_handshake == InitHandshake::Synchronous => {
                self.complete_init();
            }
            Ok(()) => debug!(session = %session, "Waiting for init completion"),
            Err(err) => self.fail_init(VendorError::from(err)),
        }
    }

    /// Privacy and debug flags must reach the SDK before `initialize`.
    fn apply_settings(&self, options: &ValidatedInitOptions) {
        let privacy = options.privacy();
        self.capability
            .set_adapters_debug(options.debug_logging_enabled());
        self.capability.set_consent(privacy.has_user_consent);
        self.capability
            .set_metadata(METADATA_COPPA, flag(privacy.coppa_under_age));
        self.capability
            .set_metadata(METADATA_DO_NOT_SELL, flag(privacy.ccpa_do_not_sell));
        if let Some(user_id) = options.user_id() {
            self.capability.set_user_id(user_id);
        }
    }

    fn planned_ad_types(&self, options: &ValidatedInitOptions) -> Vec<AdType> {
        AdType::ALL
            .into_iter()
            .filter(|ad_type| {
                !self.profile.requires_ad_unit_ids || options.ad_unit_id(*ad_type).is_some()
            })
            .collect()
    }

    fn complete_init(&mut self) {
        let capability = Arc::clone(&self.capability);
        let normalizer = self.normalizer;
        let planned = match &self.session {
            Some(session) => self.planned_ad_types(&session.options),
            None => return,
        };
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let options = &session.options;
        let units: Vec<AdUnit> = planned
            .into_iter()
            .map(|ad_type| {
                let id = options.ad_unit_id(ad_type).cloned();
                AdUnit::new(ad_type, id, Arc::clone(&capability), normalizer)
            })
            .collect();
        session.units = units;
        session.phase = InitPhase::Ready;
        let id = session.id;

        info!(session = %id, units = session.units.len(), "Mediation session ready");
        ACTIVE_AD_UNITS.set(session.units.len() as f64);
        if let Some(event) = normalizer.normalize_init(&VendorCallback::InitCompleted) {
            self.publish(id, &event);
        }

        let events: Vec<NormalizedEvent> = match self.session.as_mut() {
            Some(session) => session
                .units
                .iter_mut()
                .filter_map(|unit| unit.request_load())
                .collect(),
            None => Vec::new(),
        };
        for event in events {
            self.publish(id, &event);
        }
    }

    fn fail_init(&mut self, err: VendorError) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        error!(session = %session.id, error = %err, "Mediation init failed");
        session.phase = InitPhase::Failed;
        session.units.clear();
        let id = session.id;
        if let Some(event) = self.normalizer.normalize_init(&VendorCallback::InitFailed(err)) {
            self.publish(id, &event);
        }
    }

    fn on_vendor(&mut self, session_id: SessionId, callback: VendorCallback) {
        let Some(session) = self.session.as_mut() else {
            drop_callback(session_id, &callback, "no_session");
            return;
        };
        if session.id != session_id {
            drop_callback(session_id, &callback, "stale_session");
            return;
        }

        match callback {
            VendorCallback::InitCompleted | VendorCallback::InitFailed(_)
                if session.phase != InitPhase::Initializing =>
            {
                drop_callback(session_id, &callback, "duplicate_init");
            }
            VendorCallback::InitCompleted => self.complete_init(),
            VendorCallback::InitFailed(err) => self.fail_init(err),
            _ if session.phase != InitPhase::Ready => {
                drop_callback(session_id, &callback, "not_initialized");
            }
            _ => {
                let event = match callback.target().and_then(|target| session.route(target)) {
                    Some(unit) => unit.handle_callback(&callback),
                    None => {
                        drop_callback(session_id, &callback, "unknown_unit");
                        return;
                    }
                };
                if let Some(event) = event {
                    self.publish(session_id, &event);
                }
            }
        }
    }

    fn load(&mut self, ad_type: AdType) {
        let Some((id, unit)) = self.ready_unit(ad_type, "load") else {
            return;
        };
        if let Some(event) = unit.request_load() {
            self.publish(id, &event);
        }
    }

    fn show(&mut self, ad_type: AdType, placement: Option<&str>) {
        let Some((id, unit)) = self.ready_unit(ad_type, "show") else {
            return;
        };
        if let Some(event) = unit.request_show(placement) {
            self.publish(id, &event);
        }
    }

    /// The unit for `ad_type` in an initialized session, or a logged usage
    /// error.
    fn ready_unit(&mut self, ad_type: AdType, operation: &'static str) -> Option<(SessionId, &mut AdUnit)> {
        let session = match self.session.as_mut() {
            Some(session) if session.phase == InitPhase::Ready => session,
            _ => {
                warn!(ad_type = %ad_type, operation, "Mediation not initialized, call ignored");
                USAGE_ERRORS.with_label_values(&[operation]).inc();
                return None;
            }
        };
        let id = session.id;
        match session.unit_mut(ad_type) {
            Some(unit) => Some((id, unit)),
            None => {
                warn!(ad_type = %ad_type, operation, "No ad unit configured, call ignored");
                USAGE_ERRORS.with_label_values(&[operation]).inc();
                None
            }
        }
    }

    fn forwards_lifecycle(&self, operation: &'static str) -> bool {
        let forwards = self.config.forwards_lifecycle(&self.profile);
        if !forwards {
            debug!(operation, generation = %self.profile.generation, "Lifecycle not forwarded");
        }
        forwards
    }

    fn publish(&mut self, session: SessionId, event: &NormalizedEvent) {
        let outcome = self.sink.deliver(session, event);
        if outcome.is_delivered() {
            debug!(session = %session, event = %event, "Event delivered");
            EVENTS_DELIVERED
                .with_label_values(&[event.event_type.as_str(), event.phase.as_str()])
                .inc();
        } else {
            CALLBACKS_DROPPED
                .with_label_values(&[outcome.as_str()])
                .inc();
        }
    }

    fn sync_snapshot(&self) {
        let mut snapshot = self.snapshot.write();
        snapshot.clear();
        if let Some(session) = &self.session {
            for unit in &session.units {
                snapshot.insert(unit.ad_type(), unit.state());
            }
        }
    }

    fn teardown(&mut self) {
        if self.sink.is_closed() {
            return;
        }
        if let Some(session) = self.session.take() {
            info!(session = %session.id, units = session.units.len(), "Tearing down session");
        }
        self.sink.teardown();
        self.snapshot.write().clear();
        ACTIVE_AD_UNITS.set(0.0);
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn drop_callback(session: SessionId, callback: &VendorCallback, reason: &'static str) {
    debug!(session = %session, callback = callback.kind(), reason, "Vendor callback dropped");
    CALLBACKS_DROPPED.with_label_values(&[reason]).inc();
}

impl std::fmt::Debug for BridgeRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeRuntime")
            .field("profile", &self.profile)
            .field("config", &self.config)
            .field("session", &self.session.as_ref().map(|s| s.id))
            .finish_non_exhaustive()
    }
}
