use dioxus::prelude::*;
use minisource_shared::LoginCredentials;

use crate::app::use_app;
use crate::components::{Button, Field, FieldKind};
use crate::routes::Route;

#[component]
pub fn Login() -> Element {
    let app = use_app();
    let nav = use_navigator();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut is_submitting = use_signal(|| false);

    let onsubmit = move |e: FormEvent| {
        e.prevent_default();
        if is_submitting() {
            return;
        }
        let credentials = LoginCredentials {
            email: email.read().trim().to_string(),
            password: password.cloned(),
        };
        let auth = app.auth.clone();
        is_submitting.set(true);

        spawn(async move {
            // The hook already reported failures through a toast.
            if auth.login(&credentials).await.is_ok() {
                nav.push(Route::Dashboard {});
            }
            is_submitting.set(false);
        });
    };

    rsx! {
        div { class: "flex min-h-screen items-center justify-center bg-gray-50 px-4 dark:bg-gray-900",
            div { class: "w-full max-w-sm rounded-lg bg-white p-8 shadow dark:bg-gray-800",
                h1 { class: "mb-6 text-2xl font-semibold text-gray-900 dark:text-white", "Sign in" }
                form { class: "space-y-4", onsubmit,
                    Field {
                        label: "Email",
                        kind: FieldKind::Email,
                        value: email.cloned(),
                        autocomplete: Some("email".to_string()),
                        oninput: move |v| email.set(v),
                    }
                    Field {
                        label: "Password",
                        kind: FieldKind::Password,
                        value: password.cloned(),
                        autocomplete: Some("current-password".to_string()),
                        oninput: move |v| password.set(v),
                    }
                    Button {
                        r#type: "submit",
                        class: "w-full",
                        loading: is_submitting(),
                        loading_label: Some("Signing in...".to_string()),
                        "Sign in"
                    }
                }
                p { class: "mt-6 text-center text-sm text-gray-500",
                    "No account yet? "
                    Link { class: "font-medium text-blue-600 hover:underline", to: Route::Register {}, "Create one" }
                }
            }
        }
    }
}
