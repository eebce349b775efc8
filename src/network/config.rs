//! Connection configuration: base URL normalization and the per-session
//! client settings derived from it.

/// Canonicalize a user- or build-supplied base URL.
///
/// * empty / whitespace → `""` (unconfigured; callers must check)
/// * `http(s)://…` → unchanged apart from trailing slashes
/// * anything else is a path relative to `origin`; without an origin the
///   trimmed input is returned
pub fn normalize_api_url(raw: Option<&str>, origin: Option<&str>) -> String {
    let trimmed = match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return String::new(),
    };

    if is_absolute_http(trimmed) {
        return strip_trailing_slashes(trimmed).to_string();
    }

    match origin.map(str::trim).filter(|o| !o.is_empty()) {
        Some(origin) => {
            let origin = strip_trailing_slashes(origin);
            let joined = if trimmed.starts_with('/') {
                format!("{}{}", origin, trimmed)
            } else {
                format!("{}/{}", origin, trimmed)
            };
            strip_trailing_slashes(&joined).to_string()
        }
        None => trimmed.to_string(),
    }
}

/// `window.location.origin`, when running inside a browser.
pub fn window_origin() -> Option<String> {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window().and_then(|w| w.location().origin().ok())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        None
    }
}

fn is_absolute_http(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Drop every trailing `/`, but never the `//` of the scheme.
fn strip_trailing_slashes(s: &str) -> &str {
    let keep = s.find("://").map_or(0, |i| i + 3);
    let trimmed = s[keep..].trim_end_matches('/');
    &s[..keep + trimmed.len()]
}

/// API route configuration for one session: where to send requests and
/// which key to present.  Building one never fails; problems surface when
/// a request is made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
    api_key: Option<String>,
}

impl ApiConfig {
    /// `base_url` must already be normalized.  Blank keys count as absent.
    pub fn new(base_url: &str, api_key: Option<&str>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
        }
    }

    /// Get the base URL for all API calls
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
    }

    /// Get a full API URL for a given path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Build-time defaults, lowest priority in the resolution chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvDefaults {
    pub api_url: Option<String>,
    pub assistant_id: Option<String>,
    pub api_key: Option<String>,
}

impl EnvDefaults {
    pub fn from_build_env() -> Self {
        Self {
            api_url: option_env!("AGENT_CHAT_API_URL").map(str::to_string),
            assistant_id: option_env!("AGENT_CHAT_ASSISTANT_ID").map(str::to_string),
            api_key: option_env!("AGENT_CHAT_API_KEY").map(str::to_string),
        }
    }
}

/// First non-blank candidate, trimmed.
pub fn first_non_blank<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ORIGIN: Option<&str> = Some("https://chat.example.com");

    #[test]
    fn empty_means_unconfigured() {
        assert_eq!(normalize_api_url(None, ORIGIN), "");
        assert_eq!(normalize_api_url(Some(""), ORIGIN), "");
        assert_eq!(normalize_api_url(Some("   "), ORIGIN), "");
    }

    #[test]
    fn absolute_urls_lose_trailing_slashes_only() {
        assert_eq!(normalize_api_url(Some("http://localhost:2024/"), ORIGIN), "http://localhost:2024");
        assert_eq!(normalize_api_url(Some("HTTPS://api.example.com/v1"), ORIGIN), "HTTPS://api.example.com/v1");
        assert_eq!(normalize_api_url(Some("  https://a.b  "), None), "https://a.b");
        assert_eq!(normalize_api_url(Some("http://h//"), ORIGIN), "http://h");
        assert_eq!(normalize_api_url(Some("http://"), ORIGIN), "http://");
    }

    #[test]
    fn relative_paths_join_the_origin() {
        assert_eq!(normalize_api_url(Some("/api"), ORIGIN), "https://chat.example.com/api");
        assert_eq!(normalize_api_url(Some("api/"), ORIGIN), "https://chat.example.com/api");
        assert_eq!(normalize_api_url(Some("/"), ORIGIN), "https://chat.example.com");
        assert_eq!(normalize_api_url(Some("//"), ORIGIN), "https://chat.example.com");
        assert_eq!(normalize_api_url(Some("api//"), ORIGIN), "https://chat.example.com/api");
        assert_eq!(normalize_api_url(Some("/api"), Some("https://chat.example.com/")), "https://chat.example.com/api");
    }

    #[test]
    fn relative_paths_without_origin_pass_through() {
        assert_eq!(normalize_api_url(Some("/api"), None), "/api");
    }

    #[test]
    fn api_config_ignores_blank_keys() {
        let cfg = ApiConfig::new("http://h", Some("  "));
        assert_eq!(cfg.api_key(), None);
        assert_eq!(cfg.url("/info"), "http://h/info");
        assert!(!ApiConfig::new("", None).is_configured());
    }

    #[test]
    fn resolution_prefers_explicit_values() {
        assert_eq!(first_non_blank([Some(" "), Some("env")]), Some("env".to_string()));
        assert_eq!(first_non_blank([Some("query"), Some("env")]), Some("query".to_string()));
        assert_eq!(first_non_blank([None, None]), None);
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(raw in "[ ]{0,2}(https?://)?[a-z0-9./:-]{0,24}[ ]{0,2}", with_origin in any::<bool>()) {
            let origin = if with_origin { ORIGIN } else { None };
            let once = normalize_api_url(Some(&raw), origin);
            let twice = normalize_api_url(Some(&once), origin);
            prop_assert_eq!(once, twice);
        }
    }
}
