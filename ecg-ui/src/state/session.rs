//! Session Context
//!
//! The logged-in session and display locale, provided once at the app root
//! and read through `use_context` instead of reaching into storage from
//! each view. The identifier is persisted under the `user_id` key of
//! `localStorage` so it survives reloads.

use leptos::*;
use web_sys::Storage;

use ecg_monitor::session::SESSION_KEY;
use ecg_monitor::{Locale, Session, SessionError, SessionStore, UserId};

/// Local storage key for the display locale
const LOCALE_KEY: &str = "ecg_locale";

/// Session store backed by `window.localStorage`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageSessionStore;

impl LocalStorageSessionStore {
    fn storage() -> Result<Storage, SessionError> {
        web_sys::window()
            .ok_or_else(|| SessionError::Unavailable("no window".to_string()))?
            .local_storage()
            .map_err(|e| SessionError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| SessionError::Unavailable("localStorage disabled".to_string()))
    }
}

impl SessionStore for LocalStorageSessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        let value = Self::storage()?
            .get_item(SESSION_KEY)
            .map_err(|e| SessionError::Unavailable(format!("{:?}", e)))?;

        Ok(value.and_then(UserId::new).map(Session::new))
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        Self::storage()?
            .set_item(SESSION_KEY, session.user_id.as_str())
            .map_err(|e| SessionError::Unavailable(format!("{:?}", e)))
    }
}

/// Session and locale provided to all components
#[derive(Clone, Copy)]
pub struct SessionContext {
    /// Logged-in session, if any
    pub session: RwSignal<Option<Session>>,
    /// Language for all user-facing text
    pub locale: RwSignal<Locale>,
}

impl SessionContext {
    /// Persist and publish a new session
    pub fn sign_in(&self, session: Session) {
        if let Err(e) = LocalStorageSessionStore.save(&session) {
            web_sys::console::error_1(&format!("Failed to persist session: {}", e).into());
        }
        self.session.set(Some(session));
    }

    /// Switch language and remember the choice
    pub fn set_locale(&self, locale: Locale) {
        if let Ok(storage) = LocalStorageSessionStore::storage() {
            let _ = storage.set_item(LOCALE_KEY, &locale.to_string());
        }
        self.locale.set(locale);
    }

    /// Resolve a message in the current locale
    pub fn text(&self, id: ecg_monitor::MessageId) -> &'static str {
        id.text(self.locale.get())
    }
}

/// Provide the session context to the component tree
pub fn provide_session_context() {
    let session = LocalStorageSessionStore.load().unwrap_or_else(|e| {
        web_sys::console::error_1(&format!("Failed to read session: {}", e).into());
        None
    });

    let locale = LocalStorageSessionStore::storage()
        .ok()
        .and_then(|storage| storage.get_item(LOCALE_KEY).ok().flatten())
        .and_then(|value| value.parse().ok())
        .unwrap_or_default();

    provide_context(SessionContext {
        session: create_rw_signal(session),
        locale: create_rw_signal(locale),
    });
}
