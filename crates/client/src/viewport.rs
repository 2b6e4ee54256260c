//! Window size and responsive breakpoints.
//!
//! In the browser the window and `matchMedia` answer directly. Desktop builds
//! have no media queries, so they report [`DESKTOP_FALLBACK`] and evaluate
//! plain `min-width`/`max-width` queries against it.

/// Matches phones.
pub const MOBILE_QUERY: &str = "(max-width: 767px)";
/// Matches tablets.
pub const TABLET_QUERY: &str = "(min-width: 768px) and (max-width: 1023px)";
/// Matches anything wider than a tablet.
pub const DESKTOP_QUERY: &str = "(min-width: 1024px)";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSize {
    pub width: f64,
    pub height: f64,
}

/// Size reported where there is no browser window to measure.
pub const DESKTOP_FALLBACK: WindowSize = WindowSize {
    width: 1280.0,
    height: 800.0,
};

/// Evaluate a width-only media query such as
/// `(min-width: 768px) and (max-width: 1023px)`.
///
/// Returns `None` for anything other than `min-width`/`max-width` clauses in
/// pixels joined by `and`.
pub fn matches_width(query: &str, width: f64) -> Option<bool> {
    let mut matched = true;
    for clause in query.split(" and ") {
        let clause = clause.trim().strip_prefix('(')?.strip_suffix(')')?;
        let (feature, value) = clause.split_once(':')?;
        let limit: f64 = value.trim().strip_suffix("px")?.trim().parse().ok()?;
        matched &= match feature.trim() {
            "min-width" => width >= limit,
            "max-width" => width <= limit,
            _ => return None,
        };
    }
    Some(matched)
}

/// Current inner size of the window.
#[cfg(not(target_arch = "wasm32"))]
pub fn window_size() -> WindowSize {
    DESKTOP_FALLBACK
}

#[cfg(not(target_arch = "wasm32"))]
pub fn matches(query: &str) -> bool {
    matches_width(query, DESKTOP_FALLBACK.width).unwrap_or(false)
}

#[cfg(target_arch = "wasm32")]
pub use web::{matches, on_resize, watch_media, window_size, Listener};

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::EventTarget;

    use super::{WindowSize, DESKTOP_FALLBACK};

    /// A DOM event listener, removed again on drop.
    pub struct Listener {
        target: EventTarget,
        event: &'static str,
        callback: Closure<dyn FnMut()>,
    }

    impl Drop for Listener {
        fn drop(&mut self) {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
        }
    }

    fn listen(
        target: EventTarget,
        event: &'static str,
        callback: impl FnMut() + 'static,
    ) -> Option<Listener> {
        let callback = Closure::<dyn FnMut()>::new(callback);
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .ok()?;
        Some(Listener {
            target,
            event,
            callback,
        })
    }

    pub fn window_size() -> WindowSize {
        let Some(window) = web_sys::window() else {
            return DESKTOP_FALLBACK;
        };
        let dimension = |value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
            value.ok().and_then(|v| v.as_f64())
        };
        WindowSize {
            width: dimension(window.inner_width()).unwrap_or(DESKTOP_FALLBACK.width),
            height: dimension(window.inner_height()).unwrap_or(DESKTOP_FALLBACK.height),
        }
    }

    pub fn matches(query: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.match_media(query).ok().flatten())
            .map(|list| list.matches())
            .unwrap_or(false)
    }

    /// Call `callback` whenever the window is resized.
    pub fn on_resize(callback: impl FnMut() + 'static) -> Option<Listener> {
        let window = web_sys::window()?;
        listen(window.into(), "resize", callback)
    }

    /// Call `callback` with the new result whenever `query` flips.
    pub fn watch_media(query: &str, mut callback: impl FnMut(bool) + 'static) -> Option<Listener> {
        let list = web_sys::window()?.match_media(query).ok().flatten()?;
        let target: EventTarget = list.clone().into();
        listen(target, "change", move || callback(list.matches()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoints_partition_widths() {
        for (width, mobile, tablet, desktop) in [
            (375.0, true, false, false),
            (767.0, true, false, false),
            (768.0, false, true, false),
            (1023.0, false, true, false),
            (1024.0, false, false, true),
            (1920.0, false, false, true),
        ] {
            assert_eq!(matches_width(MOBILE_QUERY, width), Some(mobile), "{width}");
            assert_eq!(matches_width(TABLET_QUERY, width), Some(tablet), "{width}");
            assert_eq!(matches_width(DESKTOP_QUERY, width), Some(desktop), "{width}");
        }
    }

    #[test]
    fn unsupported_queries_are_not_guessed() {
        assert_eq!(matches_width("(prefers-color-scheme: dark)", 800.0), None);
        assert_eq!(matches_width("(min-width: 40em)", 800.0), None);
        assert_eq!(matches_width("min-width: 400px", 800.0), None);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn desktop_builds_report_the_fallback() {
        assert_eq!(window_size(), DESKTOP_FALLBACK);
        assert!(matches(DESKTOP_QUERY));
        assert!(!matches(MOBILE_QUERY));
        assert!(!matches("(prefers-color-scheme: dark)"));
    }
}
