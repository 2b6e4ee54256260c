use dioxus::prelude::*;

#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Password,
}

impl FieldKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Password => "password",
        }
    }
}

/// Labelled input bound to a string value.
#[component]
pub fn Field(
    label: String,
    value: String,
    oninput: EventHandler<String>,
    #[props(default)] kind: FieldKind,
    #[props(optional)] placeholder: Option<String>,
    #[props(optional)] autocomplete: Option<String>,
) -> Element {
    rsx! {
        label { class: "block",
            span { class: "mb-1 block text-sm font-medium text-gray-700 dark:text-gray-200", "{label}" }
            input {
                class: "w-full rounded-md border border-gray-300 bg-white px-3 py-2 text-sm text-gray-900 placeholder-gray-400 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500 dark:border-gray-600 dark:bg-gray-800 dark:text-gray-100",
                r#type: kind.as_str(),
                value: "{value}",
                placeholder: placeholder.unwrap_or_default(),
                autocomplete: autocomplete.unwrap_or_else(|| "off".to_string()),
                oninput: move |e: FormEvent| oninput.call(e.value()),
            }
        }
    }
}
