//! Renders the notification queue in the corner of the screen and retires
//! each toast when its lifetime ends.

use dioxus::prelude::*;

use crate::app::use_app;
use crate::hooks::use_toasts;
use crate::stores::{Toast, ToastKind};

#[component]
pub fn Toaster() -> Element {
    let toasts = use_toasts();

    rsx! {
        div { class: "fixed right-4 top-4 z-50 flex w-80 flex-col gap-2",
            for toast in toasts.read().iter().cloned() {
                ToastItem { key: "{toast.id}", toast }
            }
        }
    }
}

#[component]
fn ToastItem(toast: Toast) -> Element {
    let store = use_app().toasts;
    let id = toast.id.clone();

    // Dismiss once the toast's lifetime runs out. The task ends with the item.
    use_hook({
        let store = store.clone();
        let id = id.clone();
        move || {
            spawn(async move {
                if let Some(remaining) = store.remaining(&id) {
                    crate::timer::sleep(remaining).await;
                }
                store.dismiss(&id);
            })
        }
    });

    rsx! {
        div {
            class: "flex items-start justify-between gap-3 rounded-md px-4 py-3 text-sm shadow-lg {kind_class(toast.kind)}",
            role: "status",
            span { "{toast.message}" }
            button {
                class: "opacity-70 hover:opacity-100",
                aria_label: "Dismiss",
                onclick: move |_| store.dismiss(&id),
                "×"
            }
        }
    }
}

fn kind_class(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Success => "bg-green-600 text-white",
        ToastKind::Error => "bg-red-600 text-white",
        ToastKind::Info => "bg-gray-800 text-white",
    }
}
