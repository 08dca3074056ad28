//! # ECG Monitor
//!
//! Client-side core for an ECG monitoring dashboard: log in, then poll a
//! backend for ECG samples and chart them with a threshold warning.
//!
//! ## Modules
//!
//! - [`model`]: Wire types for the backend API
//! - [`display`]: Display-state derivation (sort, threshold, axis bounds)
//! - [`chart`]: Chart geometry shared by the canvas and SVG renderers
//! - [`auth`]: Login/registration outcome handling
//! - [`session`]: Session value object and persistence
//! - [`messages`]: Localized user-facing text
//! - [`export`]: SVG and CSV export
//!
//! With the default `native` feature:
//!
//! - [`client`]: reqwest client for the backend
//! - [`poll`]: tokio poll loop publishing display state
//! - [`config`]: TOML configuration
//!
//! The browser dashboard (`ecg-ui`) builds this crate with
//! `default-features = false`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ecg_monitor::{Credentials, EcgClient, FileSessionStore, PollConfig, Poller, SessionStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EcgClient::new("http://localhost:8000")?;
//!     let store = FileSessionStore::new("session.json");
//!
//!     ecg_monitor::auth::login(&client, &store, &Credentials::new("alice", "secret")).await?;
//!
//!     let handle = Poller::new(client, store.load()?, PollConfig::default()).start();
//!     let mut updates = handle.subscribe();
//!     updates.changed().await?;
//!     println!("{:?}", *updates.borrow());
//!
//!     handle.stop().await;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod chart;
pub mod display;
pub mod error;
pub mod export;
pub mod messages;
pub mod model;
pub mod session;

#[cfg(feature = "native")]
pub mod client;
#[cfg(feature = "native")]
pub mod config;
#[cfg(feature = "native")]
pub mod poll;

// Re-export top-level types for convenience
pub use auth::{interpret_login, interpret_register, LoginOutcome, Notice, RegisterOutcome, Route};
pub use chart::ChartLayout;
pub use display::{AxisBounds, ChartFrame, DisplaySettings, DisplayState, TickSequencer};
pub use error::{ApiError, MonitorError, MonitorResult, SessionError};
pub use export::{render_svg, ExportFormat};
pub use messages::{Locale, MessageId};
pub use model::{AuthResponse, Credentials, EcgDataResponse, Sample};
pub use session::{MemorySessionStore, Session, SessionStore, UserId};

#[cfg(feature = "native")]
pub use client::EcgClient;
#[cfg(feature = "native")]
pub use config::{Config, ConfigError, LoggingConfig};
#[cfg(feature = "native")]
pub use poll::{PollConfig, PollHandle, Poller};
#[cfg(feature = "native")]
pub use session::FileSessionStore;
