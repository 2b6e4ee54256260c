use dioxus::prelude::*;
use minisource_shared::{Role, User};

use crate::components::LoadingView;
use crate::hooks::use_current_user;

#[component]
pub fn Dashboard() -> Element {
    let user = use_current_user();

    rsx! {
        section { class: "max-w-2xl space-y-4",
            h2 { class: "text-2xl font-semibold", "Dashboard" }
            match &*user.read() {
                None | Some(None) => rsx! {
                    LoadingView {}
                },
                Some(Some(Err(err))) => rsx! {
                    p { class: "text-sm text-red-600", "Could not load your profile: {err}" }
                },
                Some(Some(Ok(profile))) => rsx! {
                    ProfileCard { profile: profile.clone() }
                },
            }
        }
    }
}

#[component]
fn ProfileCard(profile: User) -> Element {
    let role = match profile.role {
        Role::Admin => "Administrator",
        Role::User => "Member",
    };
    let since = profile.created_at.format("%B %Y").to_string();

    rsx! {
        div { class: "flex items-center gap-4 rounded-lg bg-white p-4 shadow dark:bg-gray-800",
            if let Some(avatar) = profile.avatar.clone() {
                img { class: "h-12 w-12 rounded-full", src: "{avatar}", alt: "{profile.name}" }
            }
            div {
                p { class: "font-medium", "{profile.name}" }
                p { class: "text-sm text-gray-500", "{profile.email}" }
                p { class: "text-xs text-gray-400", "{role} since {since}" }
            }
        }
    }
}
