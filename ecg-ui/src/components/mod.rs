//! UI Components
//!
//! Reusable Leptos components for the dashboard.

pub mod auth_form;
pub mod ecg_chart;
pub mod loading;
pub mod nav;

pub use auth_form::AuthForm;
pub use ecg_chart::EcgChart;
pub use loading::Loading;
pub use nav::Nav;
