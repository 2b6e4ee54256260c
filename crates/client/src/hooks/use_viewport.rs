//! Responsive and timing hooks.

use std::time::Duration;

use dioxus::prelude::*;

use crate::timer::Debouncer;
use crate::viewport::{self, WindowSize, DESKTOP_QUERY, MOBILE_QUERY, TABLET_QUERY};

/// Inner window size, kept current on resize.
pub fn use_window_size() -> Signal<WindowSize> {
    let size = use_signal(viewport::window_size);

    #[cfg(target_arch = "wasm32")]
    {
        let mut size = size;
        use_hook(move || {
            let (tx, mut resized) = futures_channel::mpsc::unbounded();
            let listener = viewport::on_resize(move || {
                let _ = tx.unbounded_send(viewport::window_size());
            });
            spawn(async move {
                // Held so the listener lives as long as the component.
                let _listener = listener;
                while let Some(next) = futures_util::StreamExt::next(&mut resized).await {
                    size.set(next);
                }
            })
        });
    }

    size
}

/// Whether `query` currently matches. The query is read on first render.
pub fn use_media_query(query: &str) -> Signal<bool> {
    let query = query.to_string();
    let matches = use_signal({
        let query = query.clone();
        move || viewport::matches(&query)
    });

    #[cfg(target_arch = "wasm32")]
    {
        let mut matches = matches;
        use_hook(move || {
            let (tx, mut changes) = futures_channel::mpsc::unbounded();
            let listener = viewport::watch_media(&query, move |now| {
                let _ = tx.unbounded_send(now);
            });
            spawn(async move {
                let _listener = listener;
                while let Some(next) = futures_util::StreamExt::next(&mut changes).await {
                    matches.set(next);
                }
            })
        });
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = query;

    matches
}

pub fn use_is_mobile() -> Signal<bool> {
    use_media_query(MOBILE_QUERY)
}

pub fn use_is_tablet() -> Signal<bool> {
    use_media_query(TABLET_QUERY)
}

pub fn use_is_desktop() -> Signal<bool> {
    use_media_query(DESKTOP_QUERY)
}

/// `value`, updated only once it has stopped changing for `delay`.
pub fn use_debounce<T>(value: T, delay: Duration) -> Signal<T>
where
    T: Clone + PartialEq + 'static,
{
    let mut debounced = use_signal(|| value.clone());
    let debouncer = use_hook({
        let value = value.clone();
        move || Debouncer::new(value, delay)
    });

    if let Some(settled) = debouncer.push(value) {
        spawn(async move {
            if let Some(value) = settled.await {
                debounced.set(value);
            }
        });
    }

    debounced
}
