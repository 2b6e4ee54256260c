//! Cross-platform logging.
//!
//! The `log_*!` macros tag every message with the calling module and dispatch
//! to the platform backend:
//! - Web: `web_sys::console`
//! - Desktop/native: `tracing`, installed by [`init`]

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

/// Install the native tracing subscriber. `RUST_LOG` overrides the default filter.
#[cfg(not(target_arch = "wasm32"))]
pub fn init() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("minisource_client=debug"));
    // A second init (tests, hot reload) keeps the first subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Console logging needs no setup in the browser.
#[cfg(target_arch = "wasm32")]
pub fn init() {}

#[cfg(not(target_arch = "wasm32"))]
pub fn emit(level: Level, target: &str, msg: &str) {
    match level {
        Level::Debug => tracing::debug!(module = target, "{}", msg),
        Level::Info => tracing::info!(module = target, "{}", msg),
        Level::Warn => tracing::warn!(module = target, "{}", msg),
        Level::Error => tracing::error!(module = target, "{}", msg),
    }
}

#[cfg(target_arch = "wasm32")]
pub fn emit(level: Level, target: &str, msg: &str) {
    let line = wasm_bindgen::JsValue::from_str(&format!("[{target}] {msg}"));
    match level {
        Level::Debug => web_sys::console::debug_1(&line),
        Level::Info => web_sys::console::log_1(&line),
        Level::Warn => web_sys::console::warn_1(&line),
        Level::Error => web_sys::console::error_1(&line),
    }
}

/// Log an info message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::Level::Info, module_path!(), &format!($($arg)*))
    };
}

/// Log an error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::Level::Error, module_path!(), &format!($($arg)*))
    };
}

/// Log a warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::Level::Warn, module_path!(), &format!($($arg)*))
    };
}

/// Log a debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::Level::Debug, module_path!(), &format!($($arg)*))
    };
}
