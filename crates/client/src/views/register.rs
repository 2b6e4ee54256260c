use std::time::Duration;

use dioxus::prelude::*;
use minisource_shared::RegisterCredentials;

use crate::app::use_app;
use crate::components::{Button, Field, FieldKind};
use crate::hooks::use_debounce;
use crate::routes::Route;

#[component]
pub fn Register() -> Element {
    let app = use_app();
    let nav = use_navigator();
    let mut name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut confirm = use_signal(String::new);
    let mut mismatch = use_signal(|| false);
    let mut is_submitting = use_signal(|| false);
    // Flag a mismatch once the user pauses typing, not on every keystroke.
    let settled_confirm = use_debounce(confirm.cloned(), Duration::from_millis(400));
    let confirm_differs = {
        let settled = settled_confirm.read();
        !settled.is_empty() && *settled != *password.read()
    };

    let onsubmit = move |e: FormEvent| {
        e.prevent_default();
        if is_submitting() {
            return;
        }
        if *password.read() != *confirm.read() {
            mismatch.set(true);
            return;
        }
        mismatch.set(false);

        let credentials = RegisterCredentials {
            name: name.read().trim().to_string(),
            email: email.read().trim().to_string(),
            password: password.cloned(),
        };
        let auth = app.auth.clone();
        is_submitting.set(true);

        spawn(async move {
            if auth.register(&credentials).await.is_ok() {
                nav.push(Route::Dashboard {});
            }
            is_submitting.set(false);
        });
    };

    rsx! {
        div { class: "flex min-h-screen items-center justify-center bg-gray-50 px-4 dark:bg-gray-900",
            div { class: "w-full max-w-sm rounded-lg bg-white p-8 shadow dark:bg-gray-800",
                h1 { class: "mb-6 text-2xl font-semibold text-gray-900 dark:text-white", "Create an account" }
                form { class: "space-y-4", onsubmit,
                    Field { label: "Name", value: name.cloned(), oninput: move |v| name.set(v) }
                    Field {
                        label: "Email",
                        kind: FieldKind::Email,
                        value: email.cloned(),
                        oninput: move |v| email.set(v),
                    }
                    Field {
                        label: "Password",
                        kind: FieldKind::Password,
                        value: password.cloned(),
                        autocomplete: Some("new-password".to_string()),
                        oninput: move |v| password.set(v),
                    }
                    Field {
                        label: "Confirm password",
                        kind: FieldKind::Password,
                        value: confirm.cloned(),
                        autocomplete: Some("new-password".to_string()),
                        oninput: move |v| confirm.set(v),
                    }
                    if mismatch() || confirm_differs {
                        p { class: "text-sm text-red-600", "Passwords do not match" }
                    }
                    Button {
                        r#type: "submit",
                        class: "w-full",
                        loading: is_submitting(),
                        loading_label: Some("Creating account...".to_string()),
                        "Create account"
                    }
                }
                p { class: "mt-6 text-center text-sm text-gray-500",
                    "Already registered? "
                    Link { class: "font-medium text-blue-600 hover:underline", to: Route::Login {}, "Sign in" }
                }
            }
        }
    }
}
