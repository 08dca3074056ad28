//! Login and Registration
//!
//! Maps backend responses onto what the auth views do next: store a
//! session and navigate, or show a message. The interpretation is shared by
//! the browser forms and the CLI; only the transport differs.

use std::borrow::Cow;

use crate::error::ApiError;
use crate::messages::{Locale, MessageId};
use crate::model::AuthResponse;
use crate::session::{Session, UserId};

/// Delay before a successful registration redirects to the login view
pub const REGISTER_REDIRECT_DELAY_MS: u64 = 2000;

/// The three views of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Ecg,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Ecg => "/ecg",
        }
    }
}

/// Text shown under an auth form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Fixed text from the message table
    Message(MessageId),
    /// Text supplied by the server, shown verbatim
    Server(String),
}

impl Notice {
    pub fn text(&self, locale: Locale) -> Cow<'_, str> {
        match self {
            Notice::Message(id) => Cow::Borrowed(id.text(locale)),
            Notice::Server(text) => Cow::Borrowed(text.as_str()),
        }
    }
}

/// Result of a login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Store the session and navigate to the chart
    LoggedIn(Session),
    /// Stay on the form and show an error
    Rejected(MessageId),
}

impl LoginOutcome {
    /// Where to navigate, if anywhere
    pub fn redirect(&self) -> Option<Route> {
        match self {
            LoginOutcome::LoggedIn(_) => Some(Route::Ecg),
            LoginOutcome::Rejected(_) => None,
        }
    }
}

/// Result of a registration attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// Show the success message, then go to login after the delay
    Registered,
    /// Stay on the form and show an error
    Rejected(Notice),
}

impl RegisterOutcome {
    /// Text to show under the form
    pub fn notice(&self) -> Notice {
        match self {
            RegisterOutcome::Registered => Notice::Message(MessageId::RegisterSuccess),
            RegisterOutcome::Rejected(notice) => notice.clone(),
        }
    }

    /// Where to navigate and after how many milliseconds
    pub fn redirect(&self) -> Option<(Route, u64)> {
        match self {
            RegisterOutcome::Registered => Some((Route::Login, REGISTER_REDIRECT_DELAY_MS)),
            RegisterOutcome::Rejected(_) => None,
        }
    }
}

/// Decide what a login response means. A response without a usable
/// `user_id` is a credential rejection; a transport or status failure is a
/// request failure.
pub fn interpret_login(result: Result<AuthResponse, ApiError>) -> LoginOutcome {
    match result {
        Ok(resp) => match resp.user_id().and_then(UserId::new) {
            Some(user_id) => LoginOutcome::LoggedIn(Session::new(user_id)),
            None => LoginOutcome::Rejected(MessageId::InvalidCredentials),
        },
        Err(_) => LoginOutcome::Rejected(MessageId::LoginFailed),
    }
}

/// Decide what a register response means. The server's `message` is passed
/// through verbatim when present.
pub fn interpret_register(result: Result<AuthResponse, ApiError>) -> RegisterOutcome {
    match result {
        Ok(resp) if resp.user_id().is_some() => RegisterOutcome::Registered,
        Ok(resp) => RegisterOutcome::Rejected(match resp.message() {
            Some(message) => Notice::Server(message.to_string()),
            None => Notice::Message(MessageId::RegisterRejected),
        }),
        Err(_) => RegisterOutcome::Rejected(Notice::Message(MessageId::RegisterFailed)),
    }
}

#[cfg(feature = "native")]
pub use flow::{login, register};

#[cfg(feature = "native")]
mod flow {
    use super::*;
    use crate::client::EcgClient;
    use crate::error::MonitorResult;
    use crate::model::Credentials;
    use crate::session::SessionStore;

    /// Submit credentials and persist the session on success
    pub async fn login(
        client: &EcgClient,
        store: &dyn SessionStore,
        credentials: &Credentials,
    ) -> MonitorResult<LoginOutcome> {
        let result = client.login(credentials).await;
        if let Err(e) = &result {
            tracing::error!(login = %credentials.login, error = %e, "Login request failed");
        }

        let outcome = interpret_login(result);
        if let LoginOutcome::LoggedIn(session) = &outcome {
            store.save(session)?;
            tracing::info!(user_id = %session.user_id, "Logged in");
        }

        Ok(outcome)
    }

    /// Submit a registration. The identifier is not stored.
    pub async fn register(client: &EcgClient, credentials: &Credentials) -> RegisterOutcome {
        let result = client.register(credentials).await;
        if let Err(e) = &result {
            tracing::error!(login = %credentials.login, error = %e, "Registration request failed");
        }

        interpret_register(result)
    }
}
