//! Application Context
//!
//! Shared state provided via Leptos Context API: the API handle, the
//! session, both reorder engines and the failure notice.

use leptos::prelude::*;
use taskboard_core::domain::{Card, Orderable, Stage};
use taskboard_core::reorder::EngineCell;
use taskboard_core::{ApiClient, ApiError, ClientConfig, ErrorKind, ReorderEngine, ReorderError, Session};

use crate::storage::LocalStorageTokenStore;

/// Reorder engine living in a signal. Every engine mutation notifies the
/// views; the write guard never outlives one synchronous step.
pub struct EngineSignal<T: Orderable + 'static>(pub RwSignal<ReorderEngine<T>>);

impl<T: Orderable + 'static> Clone for EngineSignal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Orderable + 'static> Copy for EngineSignal<T> {}

impl<T> EngineSignal<T>
where
    T: Orderable + 'static,
    ReorderEngine<T>: Send + Sync,
{
    pub fn new() -> Self {
        Self(RwSignal::new(ReorderEngine::new()))
    }
}

impl<T> EngineCell<T> for EngineSignal<T>
where
    T: Orderable + 'static,
    ReorderEngine<T>: Send + Sync,
{
    fn with_engine<R>(&self, f: impl FnOnce(&mut ReorderEngine<T>) -> R) -> R {
        let mut engine = self.0.write();
        f(&mut *engine)
    }
}

/// A failure shown in the banner
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u32,
    pub kind: ErrorKind,
    pub message: String,
}

/// App-wide handles provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    pub config: StoredValue<ClientConfig>,
    api: StoredValue<ApiClient, LocalStorage>,
    pub session: RwSignal<Session>,
    /// Session restore finished (successfully or not)
    pub session_ready: RwSignal<bool>,
    pub stages: EngineSignal<Stage>,
    pub cards: EngineSignal<Card>,
    /// Trigger to reload the open board - read
    pub reload_trigger: ReadSignal<u32>,
    /// Trigger to reload the open board - write
    set_reload_trigger: WriteSignal<u32>,
    pub notice: RwSignal<Option<Notice>>,
    next_notice: StoredValue<u32>,
}

impl AppContext {
    pub fn new(config: ClientConfig) -> Self {
        let (reload_trigger, set_reload_trigger) = signal(0u32);
        Self {
            api: StoredValue::new_local(ApiClient::new(config.clone())),
            config: StoredValue::new(config),
            session: RwSignal::new(Session::default()),
            session_ready: RwSignal::new(false),
            stages: EngineSignal::new(),
            cards: EngineSignal::new(),
            reload_trigger,
            set_reload_trigger,
            notice: RwSignal::new(None),
            next_notice: StoredValue::new(0),
        }
    }

    /// Current API handle, authenticated when the session has a token
    pub fn api(&self) -> ApiClient {
        self.api.get_value()
    }

    pub fn token_store(&self) -> LocalStorageTokenStore {
        LocalStorageTokenStore::new(self.config.with_value(|c| c.token_key.clone()))
    }

    /// Adopt a restored or new session
    pub fn set_session(&self, session: Session) {
        let token = session.token.clone();
        self.api.update_value(|api| *api = api.clone().with_token(token));
        self.session.set(session);
    }

    pub fn logout(&self) {
        let store = self.token_store();
        self.session.update(|s| s.logout(&store));
        self.api.update_value(|api| *api = api.clone().with_token(None));
        self.stages.0.update(|e| e.clear());
        self.cards.0.update(|e| e.clear());
    }

    /// Trigger a reload of the open board
    pub fn reload(&self) {
        self.set_reload_trigger.update(|v| *v += 1);
    }

    /// Show a reorder failure. The order has already been restored.
    pub fn report(&self, err: &ReorderError) {
        let message = match err.kind() {
            ErrorKind::NetworkFailure => format!("Could not save the new order: {}", err),
            ErrorKind::ValidationFailure => format!("The board rejected the move: {}", err),
            ErrorKind::InvalidGesture => format!("That move is no longer possible: {}", err),
        };
        self.push_notice(err.kind(), message);
    }

    /// Show a failed load or request
    pub fn report_api(&self, err: &ApiError) {
        let kind = match err {
            ApiError::Status { .. } => ErrorKind::ValidationFailure,
            _ => ErrorKind::NetworkFailure,
        };
        self.push_notice(kind, err.to_string());
    }

    fn push_notice(&self, kind: ErrorKind, message: String) {
        let id = self.next_notice.get_value();
        self.next_notice.set_value(id.wrapping_add(1));
        self.notice.set(Some(Notice { id, kind, message }));
    }
}

pub fn use_app_context() -> AppContext {
    use_context::<AppContext>().expect("AppContext should be provided")
}
