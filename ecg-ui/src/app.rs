//! App Root Component
//!
//! Routing and the session context provider. Routes carry no guards: the
//! chart view itself shows the "please log in" state when no session exists.

use leptos::*;
use leptos_router::*;

use ecg_monitor::{MessageId, Route as Page};

use crate::components::Nav;
use crate::pages::{EcgPage, Login, Register};
use crate::state::{provide_session_context, SessionContext};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    // Provide session context to all components
    provide_session_context();

    view! {
        <Router>
            <div class="min-h-screen bg-gray-50 text-gray-900 flex flex-col">
                <Nav />

                <main class="flex-1 container mx-auto px-4 py-8">
                    <Routes>
                        <Route path=Page::Login.path() view=Login />
                        <Route path=Page::Register.path() view=Register />
                        <Route path=Page::Ecg.path() view=EcgPage />
                        <Route path="/*any" view=NotFound />
                    </Routes>
                </main>
            </div>
        </Router>
    }
}

/// 404 Not Found page
#[component]
fn NotFound() -> impl IntoView {
    let ctx = use_context::<SessionContext>().expect("SessionContext not found");

    view! {
        <div class="flex flex-col items-center justify-center min-h-[60vh] text-center">
            <h1 class="text-3xl font-bold mb-6">{move || ctx.text(MessageId::NotFound)}</h1>
            <A
                href=Page::Login.path()
                class="px-6 py-3 bg-teal-600 hover:bg-teal-700 text-white rounded-lg font-medium transition-colors"
            >
                {move || ctx.text(MessageId::LoginTitle)}
            </A>
        </div>
    }
}
