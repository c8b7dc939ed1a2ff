//! Commands consumed by the runtime task.

use ad_event_sink::EventConsumer;
use ad_types::{AdType, SessionId, ValidatedInitOptions, VendorCallback};
use ad_unit::AdUnitState;
use tokio::sync::oneshot;

/// A unit of work for the serialized context.
pub enum Command {
    /// Start `session`, replacing whatever session was active.
    Init {
        session: SessionId,
        options: ValidatedInitOptions,
        consumer: Box<dyn EventConsumer>,
    },
    Load(AdType),
    Show {
        ad_type: AdType,
        placement: Option<String>,
    },
    /// A vendor callback, stamped with the session whose sink received it.
    Vendor {
        session: SessionId,
        callback: VendorCallback,
    },
    Pause,
    Resume,
    /// Report the state of a unit, `None` when it does not exist.
    QueryState {
        ad_type: AdType,
        reply: oneshot::Sender<Option<AdUnitState>>,
    },
    /// Barrier: answered once every earlier command has been handled.
    Flush(oneshot::Sender<()>),
    /// Release the listener, drop all units and stop the runtime.
    Teardown(Option<oneshot::Sender<()>>),
}

impl Command {
    /// Short name used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Load(_) => "load",
            Self::Show { .. } => "show",
            Self::Vendor { .. } => "vendor",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::QueryState { .. } => "query_state",
            Self::Flush(_) => "flush",
            Self::Teardown(_) => "teardown",
        }
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Init { session, .. } => f.debug_struct("Init").field("session", session).finish_non_exhaustive(),
            Self::Load(ad_type) => f.debug_tuple("Load").field(ad_type).finish(),
            Self::Show { ad_type, placement } => f
                .debug_struct("Show")
                .field("ad_type", ad_type)
                .field("placement", placement)
                .finish(),
            Self::Vendor { session, callback } => f
                .debug_struct("Vendor")
                .field("session", session)
                .field("callback", callback)
                .finish(),
            Self::QueryState { ad_type, .. } => f
                .debug_struct("QueryState")
                .field("ad_type", ad_type)
                .finish_non_exhaustive(),
            other => f.write_str(other.kind()),
        }
    }
}
