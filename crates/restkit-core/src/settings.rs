//! Toolkit configuration.
//!
//! [`Settings`] holds every process-wide knob the toolkit reads: the signing
//! secret, token lifetimes, the user-identifier claim name, the user-model
//! binding, and the CSRF exemption list. Configuration is established at
//! startup and never mutated afterwards; components snapshot what they need
//! at construction time.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// The CSRF exemption list: either every path, or an explicit set.
///
/// Serialized as the string `"all"` or as a list of exact paths.
///
/// # Examples
///
/// ```
/// use restkit_core::settings::CsrfExemptPaths;
///
/// let all = CsrfExemptPaths::All;
/// assert!(all.is_exempt("/any/path/"));
///
/// let some = CsrfExemptPaths::Paths(vec!["/api/token/".to_string()]);
/// assert!(some.is_exempt("/api/token/"));
/// assert!(!some.is_exempt("/api/token"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsrfExemptPaths {
    /// The sentinel: every request path is exempt.
    All,
    /// Only the listed paths (exact match) are exempt.
    Paths(Vec<String>),
}

impl CsrfExemptPaths {
    /// Returns `true` if CSRF enforcement should be skipped for `path`.
    ///
    /// Matching is exact; no prefix or glob semantics.
    pub fn is_exempt(&self, path: &str) -> bool {
        match self {
            Self::All => true,
            Self::Paths(paths) => paths.iter().any(|p| p == path),
        }
    }
}

impl Default for CsrfExemptPaths {
    fn default() -> Self {
        Self::Paths(Vec::new())
    }
}

impl Serialize for CsrfExemptPaths {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str("all"),
            Self::Paths(paths) => paths.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for CsrfExemptPaths {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Sentinel(String),
            Paths(Vec<String>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Sentinel(s) if s == "all" => Ok(Self::All),
            Raw::Sentinel(s) => Err(serde::de::Error::custom(format!(
                "expected \"all\" or a list of paths, got {s:?}"
            ))),
            Raw::Paths(paths) => Ok(Self::Paths(paths)),
        }
    }
}

/// The complete set of toolkit settings.
///
/// # Examples
///
/// ```
/// use restkit_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert_eq!(settings.user_id_claim, "user_id");
/// assert_eq!(settings.access_token_lifetime, 300);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,
    /// The secret key used for token signing.
    pub secret_key: String,
    /// The log level (e.g. "info", "debug", "warn").
    pub log_level: String,

    // ── Auth ─────────────────────────────────────────────────────────

    /// The user-model binding, `app_label.ModelName` (e.g. "accounts.User").
    /// Resolved against the store registry, never evaluated as code.
    pub user_model: String,
    /// The token claim carrying the user identifier.
    pub user_id_claim: String,

    // ── Tokens ───────────────────────────────────────────────────────

    /// Access token lifetime in seconds.
    pub access_token_lifetime: u64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_lifetime: u64,
    /// Whether to record the login timestamp when a token pair is issued.
    pub update_last_login: bool,

    // ── Security ─────────────────────────────────────────────────────

    /// Paths exempt from CSRF enforcement, or the "all" sentinel.
    pub csrf_exempt_paths: CsrfExemptPaths,
    /// The name of the CSRF cookie.
    pub csrf_cookie_name: String,
    /// The name of the HTTP header carrying the CSRF token.
    pub csrf_header_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            secret_key: String::new(),
            log_level: "info".to_string(),
            user_model: "auth.User".to_string(),
            user_id_claim: "user_id".to_string(),
            access_token_lifetime: 300,
            refresh_token_lifetime: 86_400,
            update_last_login: false,
            csrf_exempt_paths: CsrfExemptPaths::default(),
            csrf_cookie_name: "csrftoken".to_string(),
            csrf_header_name: "X-CSRFToken".to_string(),
        }
    }
}

impl Settings {
    /// Parses settings from a TOML document.
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns the TOML parse error message on malformed input.
    pub fn from_toml_str(input: &str) -> Result<Self, String> {
        toml::from_str(input).map_err(|e| e.to_string())
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup, then access
/// settings through [`get`](LazySettings::get).
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings, or the defaults if
    /// [`configure`](Self::configure) was never called.
    pub fn get(&self) -> &Settings {
        self.inner.get_or_init(Settings::default)
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert!(s.secret_key.is_empty());
        assert_eq!(s.log_level, "info");
        assert_eq!(s.user_model, "auth.User");
        assert_eq!(s.user_id_claim, "user_id");
        assert_eq!(s.access_token_lifetime, 300);
        assert_eq!(s.refresh_token_lifetime, 86_400);
        assert!(!s.update_last_login);
        assert_eq!(s.csrf_exempt_paths, CsrfExemptPaths::Paths(Vec::new()));
        assert_eq!(s.csrf_cookie_name, "csrftoken");
        assert_eq!(s.csrf_header_name, "X-CSRFToken");
    }

    #[test]
    fn test_exempt_all_sentinel() {
        let exempt = CsrfExemptPaths::All;
        assert!(exempt.is_exempt("/"));
        assert!(exempt.is_exempt("/api/anything/"));
    }

    #[test]
    fn test_exempt_exact_path_only() {
        let exempt = CsrfExemptPaths::Paths(vec!["/api/token/".to_string()]);
        assert!(exempt.is_exempt("/api/token/"));
        assert!(!exempt.is_exempt("/api/token/refresh/"));
        assert!(!exempt.is_exempt("/api/token"));
    }

    #[test]
    fn test_exempt_empty_list() {
        let exempt = CsrfExemptPaths::Paths(Vec::new());
        assert!(!exempt.is_exempt("/"));
        assert!(!exempt.is_exempt("/api/token/"));
    }

    #[test]
    fn test_from_toml_full() {
        let toml = r#"
            debug = false
            secret_key = "s3cret"
            user_model = "accounts.User"
            access_token_lifetime = 600
            csrf_exempt_paths = ["/api/token/", "/api/token/refresh/"]
        "#;
        let s = Settings::from_toml_str(toml).unwrap();
        assert!(!s.debug);
        assert_eq!(s.secret_key, "s3cret");
        assert_eq!(s.user_model, "accounts.User");
        assert_eq!(s.access_token_lifetime, 600);
        // Unspecified keys keep their defaults
        assert_eq!(s.refresh_token_lifetime, 86_400);
        assert!(s.csrf_exempt_paths.is_exempt("/api/token/"));
        assert!(!s.csrf_exempt_paths.is_exempt("/other/"));
    }

    #[test]
    fn test_from_toml_all_sentinel() {
        let s = Settings::from_toml_str(r#"csrf_exempt_paths = "all""#).unwrap();
        assert_eq!(s.csrf_exempt_paths, CsrfExemptPaths::All);
    }

    #[test]
    fn test_from_toml_rejects_unknown_sentinel() {
        assert!(Settings::from_toml_str(r#"csrf_exempt_paths = "some""#).is_err());
    }

    #[test]
    fn test_from_toml_malformed() {
        assert!(Settings::from_toml_str("debug = ").is_err());
    }

    #[test]
    fn test_exempt_paths_serde_roundtrip() {
        let all = CsrfExemptPaths::All;
        let json = serde_json::to_string(&all).unwrap();
        assert_eq!(json, "\"all\"");
        let back: CsrfExemptPaths = serde_json::from_str(&json).unwrap();
        assert_eq!(back, all);

        let paths = CsrfExemptPaths::Paths(vec!["/a/".to_string()]);
        let json = serde_json::to_string(&paths).unwrap();
        let back: CsrfExemptPaths = serde_json::from_str(&json).unwrap();
        assert_eq!(back, paths);
    }

    #[test]
    fn test_lazy_settings_configure_and_get() {
        let lazy = LazySettings::new();
        assert!(!lazy.is_configured());

        let mut settings = Settings::default();
        settings.secret_key = "test-secret".to_string();
        lazy.configure(settings);

        assert!(lazy.is_configured());
        assert_eq!(lazy.get().secret_key, "test-secret");
    }

    #[test]
    fn test_lazy_settings_defaults_when_unconfigured() {
        let lazy = LazySettings::new();
        assert_eq!(lazy.get().user_id_claim, "user_id");
    }

    #[test]
    #[should_panic(expected = "already been configured")]
    fn test_lazy_settings_double_configure_panics() {
        let lazy = LazySettings::new();
        lazy.configure(Settings::default());
        lazy.configure(Settings::default());
    }
}
