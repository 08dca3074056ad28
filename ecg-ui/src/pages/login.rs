//! Login Page
//!
//! Submits credentials and, on success, stores the session and opens the
//! chart view.

use leptos::*;
use leptos_router::*;

use ecg_monitor::{interpret_login, Credentials, LoginOutcome, MessageId};

use crate::api;
use crate::components::auth_form::Feedback;
use crate::components::AuthForm;
use crate::state::SessionContext;

/// Login page component
#[component]
pub fn Login() -> impl IntoView {
    let ctx = use_context::<SessionContext>().expect("SessionContext not found");
    let navigate = use_navigate();
    let (feedback, set_feedback) = create_signal(None::<Feedback>);

    let on_submit = Callback::new(move |credentials: Credentials| {
        let navigate = navigate.clone();
        spawn_local(async move {
            let result = api::login(&credentials).await;
            if let Err(e) = &result {
                web_sys::console::error_1(&format!("Login error: {}", e).into());
            }

            let outcome = interpret_login(result);
            let redirect = outcome.redirect();
            match outcome {
                LoginOutcome::LoggedIn(session) => {
                    set_feedback.set(None);
                    ctx.sign_in(session);
                }
                LoginOutcome::Rejected(id) => {
                    set_feedback.set(Some(Feedback::Error(ctx.text(id).to_string())));
                }
            }

            if let Some(route) = redirect {
                navigate(route.path(), Default::default());
            }
        });
    });

    view! {
        <AuthForm
            title=MessageId::LoginTitle
            submit_label=MessageId::LoginButton
            feedback=feedback
            on_submit=on_submit
        />
    }
}
