//! ECG Monitor Dashboard
//!
//! Browser dashboard built with Leptos (WASM).
//!
//! # Features
//!
//! - Login and registration against the ECG backend
//! - Live ECG chart refreshed every five seconds
//! - Threshold warning with an emergency-call link
//! - PNG export of the current chart
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. Display-state derivation, message text, and auth outcome
//! handling come from the `ecg-monitor` core crate; this crate adds the
//! views, the browser HTTP client, and `localStorage` persistence.

use leptos::*;

mod api;
mod app;
mod components;
mod pages;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    // Mount the app to the document body
    mount_to_body(|| view! { <app::App /> });
}
