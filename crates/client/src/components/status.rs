//! Fallback screens for failed and pending pages.

use dioxus::prelude::*;

use super::Button;

/// Shown in place of a subtree that failed to render.
#[component]
pub fn ErrorView(
    /// Fills the viewport when rendered outside the app layout.
    #[props(default)]
    full_screen: bool,
    on_retry: EventHandler<()>,
) -> Element {
    let height = if full_screen { "min-h-screen" } else { "min-h-[50vh]" };

    rsx! {
        div { class: "flex {height} flex-col items-center justify-center p-6",
            div { class: "text-center",
                h1 { class: "mb-2 text-4xl font-bold", "Something went wrong!" }
                p { class: "mb-8 text-gray-500 dark:text-gray-400",
                    "An unexpected error occurred. Please try again."
                }
                Button { onclick: move |_| on_retry.call(()), "Try Again" }
            }
        }
    }
}

#[component]
pub fn Skeleton(class: String) -> Element {
    rsx! {
        div { class: "animate-pulse rounded-md bg-gray-200 dark:bg-gray-700 {class}" }
    }
}

/// Placeholder blocks while a page's data loads.
#[component]
pub fn LoadingView() -> Element {
    rsx! {
        div { class: "w-full max-w-3xl space-y-4", aria_busy: "true",
            Skeleton { class: "h-12 w-3/4" }
            Skeleton { class: "h-6 w-1/2" }
            Skeleton { class: "h-32 w-full" }
        }
    }
}
