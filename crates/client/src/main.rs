//! Minisource client entry point. Runs on web (WASM) and desktop.

#![allow(non_snake_case)]

use dioxus::prelude::*;
use minisource_client::app::AppProvider;
use minisource_client::components::{ErrorView, Toaster};
use minisource_client::{log_error, log_info, logging, Route};

fn main() {
    logging::init();
    log_info!("starting {}", env!("CARGO_PKG_NAME"));
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        ErrorBoundary {
            handle_error: |errors: ErrorContext| {
                log_error!("unhandled error: {:?}", errors.errors());
                rsx! {
                    ErrorView { full_screen: true, on_retry: move |_| errors.clear_errors() }
                }
            },
            AppProvider {
                Router::<Route> {}
                Toaster {}
            }
        }
    }
}
