//! Client configuration baked in at build time.
//!
//! The bundle is served as static files, so there is no runtime environment
//! to read; values come from `option_env!` and fall back to defaults that
//! match a same-origin deployment behind the API proxy.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_API_BASE: &str = "/api/";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15_000;
pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const SESSION_COOKIE: &str = "sessionid";
pub const DEFAULT_ICD_SOURCE: &str = "/static/data/icd10.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, always ending in `/`.
    pub api_base: String,
    pub request_timeout_ms: u64,
    pub csrf_cookie: String,
    pub csrf_header: String,
    /// Static JSON asset holding the diagnosis code tree.
    pub icd_source: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_values(None, None)
    }
}

impl ClientConfig {
    /// Build config from build-time variables.
    ///
    /// Optional:
    /// - `YIXUAN_API_BASE`: default `/api/`
    /// - `YIXUAN_REQUEST_TIMEOUT_MS`: default 15000
    /// - `YIXUAN_ICD_SOURCE`: default `/static/data/icd10.json`
    #[must_use]
    pub fn from_env() -> Self {
        let mut config =
            Self::from_values(option_env!("YIXUAN_API_BASE"), option_env!("YIXUAN_REQUEST_TIMEOUT_MS"));
        if let Some(source) = option_env!("YIXUAN_ICD_SOURCE").map(str::trim).filter(|s| !s.is_empty()) {
            source.clone_into(&mut config.icd_source);
        }
        config
    }

    #[must_use]
    pub fn from_values(api_base: Option<&str>, timeout_ms: Option<&str>) -> Self {
        Self {
            api_base: normalize_base(api_base.unwrap_or(DEFAULT_API_BASE)),
            request_timeout_ms: parse_timeout(timeout_ms),
            csrf_cookie: CSRF_COOKIE.to_owned(),
            csrf_header: CSRF_HEADER.to_owned(),
            icd_source: DEFAULT_ICD_SOURCE.to_owned(),
        }
    }

    /// Join an endpoint path onto the API base.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path.trim_start_matches('/'))
    }
}

fn normalize_base(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_API_BASE.to_owned();
    }
    format!("{}/", trimmed.trim_end_matches('/'))
}

fn parse_timeout(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS)
}
