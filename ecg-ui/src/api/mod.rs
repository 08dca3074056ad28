//! Backend API
//!
//! Browser HTTP client for the ECG backend.

pub mod client;

pub use client::{fetch_ecg_data, login, register};
