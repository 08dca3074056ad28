//! Navigation Component
//!
//! Header bar with links to the three views and a language switch.

use leptos::*;
use leptos_router::*;

use ecg_monitor::{Locale, MessageId, Route};

use crate::state::SessionContext;

/// Navigation header component
#[component]
pub fn Nav() -> impl IntoView {
    let ctx = use_context::<SessionContext>().expect("SessionContext not found");

    view! {
        <nav class="bg-white border-b border-gray-200">
            <div class="container mx-auto px-4">
                <div class="flex items-center justify-between h-16">
                    <A href=Route::Ecg.path() class="flex items-center space-x-3">
                        <span class="text-xl font-bold text-teal-700">
                            {move || ctx.text(MessageId::MonitoringTitle)}
                        </span>
                    </A>

                    <div class="flex items-center space-x-1">
                        <NavLink route=Route::Login label=MessageId::LoginTitle />
                        <NavLink route=Route::Register label=MessageId::RegisterTitle />
                        <NavLink route=Route::Ecg label=MessageId::ChartTitle />
                        <LocaleSwitch />
                    </div>
                </div>
            </div>
        </nav>
    }
}

/// Individual navigation link
#[component]
fn NavLink(
    route: Route,
    label: MessageId,
) -> impl IntoView {
    let ctx = use_context::<SessionContext>().expect("SessionContext not found");

    view! {
        <A
            href=route.path()
            class="px-4 py-2 rounded-lg text-gray-600 hover:text-gray-900 hover:bg-gray-100 transition-colors"
            active_class="bg-gray-100 text-gray-900"
        >
            {move || ctx.text(label)}
        </A>
    }
}

/// Toggles between Russian and English
#[component]
fn LocaleSwitch() -> impl IntoView {
    let ctx = use_context::<SessionContext>().expect("SessionContext not found");

    let toggle = move |_| {
        let next = match ctx.locale.get_untracked() {
            Locale::Ru => Locale::En,
            Locale::En => Locale::Ru,
        };
        ctx.set_locale(next);
    };

    view! {
        <button
            on:click=toggle
            class="ml-2 px-3 py-2 rounded-lg text-sm uppercase text-gray-500 hover:bg-gray-100"
        >
            {move || ctx.locale.get().to_string()}
        </button>
    }
}
