//! Runtime settings.
//!
//! Pure configuration data with environment loading. The binary layers
//! command-line flags over these values; library code only ever sees the
//! final struct.

/// Default address the gateway listens on.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:11435";

/// Default backend base URL (a local Ollama instance).
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:11434";

/// Default upstream call timeout. Generations can run for minutes, so
/// this bounds worst-case latency rather than typical latency.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Gateway runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Address to bind the front listener to.
    pub listen: String,
    /// Base URL of the backend, without a trailing slash.
    pub backend_url: String,
    /// Total per-call timeout for backend requests, in seconds.
    pub timeout_secs: u64,
    /// Widen the default log filter to `debug`.
    pub debug: bool,
}

impl Settings {
    /// Settings with documented defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            listen: DEFAULT_LISTEN_ADDR.to_string(),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            debug: false,
        }
    }

    /// Load settings from the environment on top of the defaults.
    ///
    /// Recognised variables: `OLLAGATE_LISTEN`, `OLLAGATE_BACKEND` (with
    /// `OLLAMA_HOST` as a fallback, so existing Ollama setups work
    /// unchanged), `OLLAGATE_TIMEOUT_SECS` and `OLLAGATE_DEBUG`.
    /// Unparseable values fall back to the default rather than failing.
    #[must_use]
    pub fn from_env() -> Self {
        let mut settings = Self::with_defaults();

        if let Ok(listen) = std::env::var("OLLAGATE_LISTEN") {
            settings.listen = listen;
        }
        if let Some(backend) = std::env::var("OLLAGATE_BACKEND")
            .or_else(|_| std::env::var("OLLAMA_HOST"))
            .ok()
            .filter(|v| !v.trim().is_empty())
        {
            settings.backend_url = normalize_base_url(&backend);
        }
        if let Some(secs) = std::env::var("OLLAGATE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
        {
            settings.timeout_secs = secs;
        }
        if let Ok(debug) = std::env::var("OLLAGATE_DEBUG") {
            settings.debug = parse_bool(&debug);
        }

        settings
    }

    /// Replace the backend URL, normalizing it.
    pub fn set_backend_url(&mut self, url: &str) {
        self.backend_url = normalize_base_url(url);
    }
}

/// Strip trailing slashes so paths can be appended verbatim.
#[must_use]
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_ollama() {
        let settings = Settings::with_defaults();
        assert_eq!(settings.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(settings.listen, DEFAULT_LISTEN_ADDR);
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(!settings.debug);
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        assert_eq!(
            normalize_base_url("http://10.0.0.2:11434/"),
            "http://10.0.0.2:11434"
        );
        assert_eq!(
            normalize_base_url("http://10.0.0.2:11434"),
            "http://10.0.0.2:11434"
        );
    }

    #[test]
    fn bool_parsing_accepts_common_spellings() {
        assert!(parse_bool("1"));
        assert!(parse_bool("TRUE"));
        assert!(parse_bool(" yes "));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("anything-else"));
    }
}
