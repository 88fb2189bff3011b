use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Tallylens";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bind address for the detection server.
pub const DEFAULT_BIND: &str = "0.0.0.0:5001";

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "info,tallylens=debug"
}

/// Configuration for the external classification oracle.
///
/// The credential is carried as an explicit `Option` rather than read
/// ambiently at call time: a missing key is reported per-request as a
/// configuration error, never as a startup panic.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// API key for the Gemini endpoint. `None` means not configured.
    pub api_key: Option<String>,
    /// Base URL of the generative language API.
    pub base_url: String,
    /// Model identifier used for classification calls.
    pub model: String,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
}

impl OracleConfig {
    pub const DEFAULT_BASE_URL: &'static str =
        "https://generativelanguage.googleapis.com/v1beta";
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash-preview-05-20";

    /// Read oracle configuration from the environment.
    ///
    /// `GEMINI_API_KEY` — credential (optional).
    /// `GEMINI_BASE_URL`, `GEMINI_MODEL` — endpoint overrides.
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let base_url = std::env::var("GEMINI_BASE_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string());

        let model = std::env::var("GEMINI_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_MODEL.to_string());

        Self {
            api_key,
            base_url,
            model,
            timeout: Duration::from_secs(60),
        }
    }

    /// Configuration with no credential — every classification request
    /// short-circuits with the configuration error.
    pub fn unconfigured() -> Self {
        Self {
            api_key: None,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Bind address for the HTTP server (`TALLYLENS_BIND` override).
pub fn bind_addr() -> String {
    std::env::var("TALLYLENS_BIND")
        .ok()
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BIND.to_string())
}
