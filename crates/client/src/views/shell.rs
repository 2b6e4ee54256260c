//! Authenticated layout: top bar, collapsible sidebar and theme handling.

use dioxus::prelude::*;

use crate::app::use_app;
use crate::components::{Button, ButtonVariant, ErrorView};
use crate::config::AppConfig;
use crate::hooks::{use_is_mobile, use_local_storage, use_session, use_ui_state};
use crate::routes::Route;
use crate::stores::Theme;

const THEME_KEY: &str = "theme";

#[component]
pub fn Shell() -> Element {
    let app = use_app();
    let nav = use_navigator();
    let session = use_session();
    let ui = use_ui_state();
    let saved_theme = use_local_storage(THEME_KEY, Theme::System);
    let is_mobile = use_is_mobile();

    // Restore the saved theme once; the UI store itself is not persisted.
    use_hook({
        let ui = app.ui.clone();
        let theme = saved_theme.get();
        move || ui.set_theme(theme)
    });

    // Narrow screens start with the sidebar folded away.
    use_effect({
        let ui = app.ui.clone();
        move || {
            if is_mobile() {
                ui.set_sidebar_open(false);
            }
        }
    });

    use_effect(move || {
        if !session.read().is_authenticated {
            nav.replace(Route::Login {});
        }
    });

    let cycle_theme = {
        let ui = app.ui.clone();
        let mut saved_theme = saved_theme.clone();
        move |_| {
            let next = match ui.snapshot().theme {
                Theme::System => Theme::Light,
                Theme::Light => Theme::Dark,
                Theme::Dark => Theme::System,
            };
            ui.set_theme(next);
            saved_theme.set(next);
        }
    };

    let toggle_sidebar = {
        let ui = app.ui.clone();
        move |_| ui.toggle_sidebar()
    };

    let logout = {
        let auth = app.auth.clone();
        move |_| {
            let auth = auth.clone();
            spawn(async move {
                // Local state is cleared either way.
                let _ = auth.logout().await;
                nav.replace(Route::Login {});
            });
        }
    };

    let state = ui.read();
    let theme_class = match state.theme {
        Theme::Dark => "dark",
        Theme::Light | Theme::System => "",
    };
    let theme_label = format!("{:?}", state.theme);
    let app_name = &AppConfig::global().app.name;
    let user_name = session
        .read()
        .user
        .as_ref()
        .map(|u| u.name.clone())
        .unwrap_or_default();

    rsx! {
        div { class: "{theme_class}",
            div { class: "flex min-h-screen bg-gray-50 text-gray-900 dark:bg-gray-900 dark:text-gray-100",
                if state.is_sidebar_open {
                    aside { class: "w-60 border-r border-gray-200 bg-white p-4 dark:border-gray-700 dark:bg-gray-800",
                        p { class: "mb-4 text-lg font-semibold", "{app_name}" }
                        nav { class: "space-y-1 text-sm",
                            Link { class: "block rounded px-2 py-1 hover:bg-gray-100 dark:hover:bg-gray-700", to: Route::Dashboard {}, "Dashboard" }
                        }
                    }
                }
                div { class: "flex flex-1 flex-col",
                    header { class: "flex items-center justify-between border-b border-gray-200 px-4 py-3 dark:border-gray-700",
                        Button { variant: ButtonVariant::Ghost, onclick: toggle_sidebar, "☰" }
                        div { class: "flex items-center gap-3",
                            span { class: "text-sm", "{user_name}" }
                            Button { variant: ButtonVariant::Ghost, onclick: cycle_theme, "Theme: {theme_label}" }
                            Button { variant: ButtonVariant::Outline, onclick: logout, "Log out" }
                        }
                    }
                    if state.is_page_loading {
                        div { class: "h-1 w-full animate-pulse bg-blue-500" }
                    }
                    main { class: "flex-1 p-6",
                        ErrorBoundary {
                            handle_error: |errors: ErrorContext| {
                                crate::log_error!("page error: {:?}", errors.errors());
                                rsx! {
                                    ErrorView { on_retry: move |_| errors.clear_errors() }
                                }
                            },
                            Outlet::<Route> {}
                        }
                    }
                }
            }
        }
    }
}
