use dioxus::prelude::*;

#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonVariant {
    #[default]
    Primary,
    Outline,
    Ghost,
}

impl ButtonVariant {
    fn classes(self) -> &'static str {
        match self {
            Self::Primary => "bg-blue-600 text-white hover:bg-blue-700 focus:ring-blue-500",
            Self::Outline => {
                "border border-gray-300 bg-white text-gray-700 hover:bg-gray-50 focus:ring-gray-400 dark:border-gray-600 dark:bg-gray-800 dark:text-gray-100"
            }
            Self::Ghost => "bg-transparent text-gray-600 hover:bg-gray-100 dark:text-gray-300 dark:hover:bg-gray-700",
        }
    }
}

/// Button that swaps its label for `loading_label` while `loading` is set.
#[component]
pub fn Button(
    #[props(default)] variant: ButtonVariant,
    #[props(default = "button".to_string())] r#type: String,
    #[props(default)] loading: bool,
    #[props(optional)] loading_label: Option<String>,
    #[props(optional)] class: Option<String>,
    #[props(optional)] onclick: Option<EventHandler<MouseEvent>>,
    children: Element,
) -> Element {
    let class = format!(
        "inline-flex items-center justify-center rounded-md px-4 py-2 text-sm font-medium transition-colors focus:outline-none focus:ring-2 focus:ring-offset-2 disabled:cursor-not-allowed disabled:opacity-50 {} {}",
        variant.classes(),
        class.unwrap_or_default()
    );

    rsx! {
        button {
            class,
            r#type,
            disabled: loading,
            onclick: move |evt| {
                if let Some(handler) = &onclick {
                    handler.call(evt);
                }
            },
            if loading {
                {loading_label.unwrap_or_else(|| "Loading...".to_string())}
            } else {
                {children}
            }
        }
    }
}
