//! Registration Page
//!
//! Creates an account. A success message is shown for two seconds before
//! moving to the login page; leaving the page earlier cancels the move.

use gloo_timers::callback::Timeout;
use leptos::*;
use leptos_router::*;

use ecg_monitor::{interpret_register, Credentials, MessageId, RegisterOutcome};

use crate::api;
use crate::components::auth_form::Feedback;
use crate::components::AuthForm;
use crate::state::SessionContext;

/// Registration page component
#[component]
pub fn Register() -> impl IntoView {
    let ctx = use_context::<SessionContext>().expect("SessionContext not found");
    let navigate = use_navigate();
    let (feedback, set_feedback) = create_signal(None::<Feedback>);
    let pending_redirect = store_value(None::<Timeout>);

    let on_submit = Callback::new(move |credentials: Credentials| {
        let navigate = navigate.clone();
        spawn_local(async move {
            let result = api::register(&credentials).await;
            if let Err(e) = &result {
                web_sys::console::error_1(&format!("Registration error: {}", e).into());
            }

            let outcome = interpret_register(result);
            let text = outcome.notice().text(ctx.locale.get_untracked()).into_owned();
            set_feedback.set(Some(match outcome {
                RegisterOutcome::Registered => Feedback::Success(text),
                RegisterOutcome::Rejected(_) => Feedback::Error(text),
            }));

            if let Some((route, delay_ms)) = outcome.redirect() {
                let timeout = Timeout::new(delay_ms as u32, move || {
                    navigate(route.path(), Default::default());
                });
                // Replacing an earlier handle cancels its redirect
                pending_redirect.try_set_value(Some(timeout));
            }
        });
    });

    on_cleanup(move || {
        pending_redirect.try_update_value(|pending| pending.take());
    });

    view! {
        <AuthForm
            title=MessageId::RegisterTitle
            submit_label=MessageId::RegisterButton
            feedback=feedback
            on_submit=on_submit
        />
    }
}
