//! ECG Page

use leptos::*;

use ecg_monitor::MessageId;

use crate::components::EcgChart;
use crate::state::SessionContext;

/// Monitoring page component
#[component]
pub fn EcgPage() -> impl IntoView {
    let ctx = use_context::<SessionContext>().expect("SessionContext not found");

    view! {
        <div class="space-y-6">
            <h1 class="text-3xl font-bold">{move || ctx.text(MessageId::MonitoringTitle)}</h1>
            <EcgChart />
        </div>
    }
}
