//! State Management
//!
//! Session context shared by every view.

pub mod session;

pub use session::{provide_session_context, SessionContext};
