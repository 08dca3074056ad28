//! Page Components
//!
//! One page per route.

pub mod ecg;
pub mod login;
pub mod register;

pub use ecg::EcgPage;
pub use login::Login;
pub use register::Register;
