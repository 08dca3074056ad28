//! Auth Form Component
//!
//! Login/password form shared by the login and registration pages. Inputs
//! are submitted as typed; no client-side validation is applied.

use leptos::*;

use ecg_monitor::{Credentials, MessageId};

use crate::state::SessionContext;

/// Feedback line under the form
#[derive(Clone, Debug, PartialEq)]
pub enum Feedback {
    Error(String),
    Success(String),
}

/// Credentials form with a title, submit button, and feedback line
#[component]
pub fn AuthForm(
    title: MessageId,
    submit_label: MessageId,
    #[prop(into)]
    feedback: Signal<Option<Feedback>>,
    on_submit: Callback<Credentials>,
) -> impl IntoView {
    let ctx = use_context::<SessionContext>().expect("SessionContext not found");

    let (login, set_login) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        on_submit.call(Credentials::new(login.get_untracked(), password.get_untracked()));
    };

    view! {
        <div class="max-w-md mx-auto text-center">
            <h1 class="text-2xl font-bold mb-6">{move || ctx.text(title)}</h1>

            {move || feedback.get().map(|fb| match fb {
                Feedback::Error(text) => view! { <p class="text-red-600 mb-4">{text}</p> },
                Feedback::Success(text) => view! { <p class="text-green-600 mb-4">{text}</p> },
            })}

            <form on:submit=submit class="space-y-4">
                <input
                    type="text"
                    placeholder=move || ctx.text(MessageId::LoginPlaceholder)
                    prop:value=login
                    on:input=move |ev| set_login.set(event_target_value(&ev))
                    class="w-full px-4 py-2 border border-gray-300 rounded-lg"
                />
                <input
                    type="password"
                    placeholder=move || ctx.text(MessageId::PasswordPlaceholder)
                    prop:value=password
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                    class="w-full px-4 py-2 border border-gray-300 rounded-lg"
                />
                <button
                    type="submit"
                    class="px-6 py-2 bg-teal-600 hover:bg-teal-700 text-white rounded-lg font-medium"
                >
                    {move || ctx.text(submit_label)}
                </button>
            </form>
        </div>
    }
}
