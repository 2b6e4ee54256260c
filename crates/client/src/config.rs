//! Application configuration read once at startup.
//!
//! Native builds read the process environment; wasm builds have no process
//! environment and read the same keys at compile time via `option_env!`.
//! Values are public; do not store secrets here.

use std::time::Duration;

use once_cell::sync::Lazy;

pub const APP_NAME_VAR: &str = "MINISOURCE_APP_NAME";
pub const APP_URL_VAR: &str = "MINISOURCE_APP_URL";
pub const APP_VERSION_VAR: &str = "MINISOURCE_APP_VERSION";
pub const API_URL_VAR: &str = "MINISOURCE_API_URL";
pub const API_TIMEOUT_VAR: &str = "MINISOURCE_API_TIMEOUT";
pub const ENABLE_ANALYTICS_VAR: &str = "MINISOURCE_ENABLE_ANALYTICS";
pub const ENABLE_PWA_VAR: &str = "MINISOURCE_ENABLE_PWA";

const DEFAULT_APP_NAME: &str = "Minisource App";
const DEFAULT_APP_URL: &str = "http://localhost:3000";
const DEFAULT_APP_VERSION: &str = "1.0.0";
const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_API_TIMEOUT_MS: u64 = 30_000;

static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub app: AppInfo,
    pub api: ApiSettings,
    pub features: FeatureFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub url: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    pub analytics: bool,
    pub pwa: bool,
}

impl AppConfig {
    /// The process-wide configuration, resolved on first access.
    pub fn global() -> &'static AppConfig {
        &CONFIG
    }

    pub fn from_env() -> Self {
        Self::from_lookup(env_var)
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Missing or blank values fall back to the defaults. The timeout must be a
    /// positive number of milliseconds; anything else uses the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).and_then(|v| normalize_value(&v));

        let timeout_ms = value(API_TIMEOUT_VAR)
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_API_TIMEOUT_MS);

        Self {
            app: AppInfo {
                name: value(APP_NAME_VAR).unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
                url: value(APP_URL_VAR).unwrap_or_else(|| DEFAULT_APP_URL.to_string()),
                version: value(APP_VERSION_VAR).unwrap_or_else(|| DEFAULT_APP_VERSION.to_string()),
            },
            api: ApiSettings {
                base_url: value(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                timeout: Duration::from_millis(timeout_ms),
            },
            features: FeatureFlags {
                analytics: value(ENABLE_ANALYTICS_VAR).as_deref() == Some("true"),
                pwa: value(ENABLE_PWA_VAR).as_deref() == Some("true"),
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[cfg(target_arch = "wasm32")]
fn env_var(key: &str) -> Option<String> {
    let value = match key {
        APP_NAME_VAR => option_env!("MINISOURCE_APP_NAME"),
        APP_URL_VAR => option_env!("MINISOURCE_APP_URL"),
        APP_VERSION_VAR => option_env!("MINISOURCE_APP_VERSION"),
        API_URL_VAR => option_env!("MINISOURCE_API_URL"),
        API_TIMEOUT_VAR => option_env!("MINISOURCE_API_TIMEOUT"),
        ENABLE_ANALYTICS_VAR => option_env!("MINISOURCE_ENABLE_ANALYTICS"),
        ENABLE_PWA_VAR => option_env!("MINISOURCE_ENABLE_PWA"),
        _ => None,
    };
    value.map(str::to_string)
}
