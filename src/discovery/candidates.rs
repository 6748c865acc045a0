//! Candidate Generators
//!
//! Pure functions producing the ordered guesses the prober walks through:
//! base URLs, auth header shapes and time-entry query shapes.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Production address used when the caller gives no base URL
pub const DEFAULT_BASE_URL: &str = "https://api.jibble.io";

/// Version path suffixes tried on every root, in order
pub const VERSION_SUFFIXES: &[&str] = &["/v1", "/v2", "/api/v1", "/api/v2"];

fn version_suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(/api)?/v\d+$").expect("valid version regex"))
}

fn scheme_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^https?://").expect("valid scheme regex"))
}

/// Trim, enforce a scheme and drop trailing slashes.
///
/// Input with no host left once the scheme and slashes are removed (empty,
/// `/`, `https://`) falls back to `default_base`.
pub fn normalize_base_url(raw: Option<&str>, default_base: &str) -> String {
    raw.and_then(with_scheme)
        .or_else(|| with_scheme(default_base))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

fn with_scheme(value: &str) -> Option<String> {
    let value = value.trim();
    if scheme_regex().replace(value, "").trim_matches('/').is_empty() {
        return None;
    }

    let full = if scheme_regex().is_match(value) {
        value.to_string()
    } else {
        format!("https://{}", value)
    };
    Some(full.trim_end_matches('/').to_string())
}

/// Drop a trailing `/vN` or `/api/vN`
fn strip_version(url: &str) -> String {
    match version_suffix_regex().find(url) {
        Some(m) => url[..m.start()].to_string(),
        None => url.to_string(),
    }
}

/// Ordered, duplicate-free base URL guesses.
///
/// The caller's value and its version variants come first, followed by the
/// default production root and its variants.
pub fn build_base_url_candidates(raw: Option<&str>, default_base: &str) -> Vec<String> {
    let normalized = normalize_base_url(raw, default_base);
    let fallback_root = strip_version(&normalize_base_url(None, default_base));

    let mut ordered = vec![normalized.clone()];

    let user_root = strip_version(&normalized);
    ordered.push(user_root.clone());
    ordered.extend(VERSION_SUFFIXES.iter().map(|s| format!("{}{}", user_root, s)));

    ordered.push(fallback_root.clone());
    ordered.extend(VERSION_SUFFIXES.iter().map(|s| format!("{}{}", fallback_root, s)));

    let mut seen = HashSet::new();
    ordered
        .into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// One way of presenting credentials to the remote API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthStrategy {
    /// Selector accepted in `authMode`
    pub key: &'static str,
    /// Human-readable name, safe to log and return to callers
    pub label: &'static str,
    /// Header name/value pairs sent with every probe
    pub headers: Vec<(String, String)>,
}

/// Build the auth strategies selected by `mode`.
///
/// Empty, `auto` or unrecognised modes yield all four strategies in fixed
/// order. A known key yields just that strategy.
pub fn build_auth_strategies(mode: Option<&str>, id: &str, secret: &str) -> Vec<AuthStrategy> {
    let token = STANDARD.encode(format!("{}:{}", id, secret));

    let all = vec![
        AuthStrategy {
            key: "basic",
            label: "HTTP Basic",
            headers: vec![("Authorization".into(), format!("Basic {}", token))],
        },
        AuthStrategy {
            key: "bearer",
            label: "Bearer token",
            headers: vec![("Authorization".into(), format!("Bearer {}", secret))],
        },
        AuthStrategy {
            key: "api-key",
            label: "API key header",
            headers: vec![("X-API-KEY".into(), secret.to_string())],
        },
        AuthStrategy {
            key: "api-key-secret",
            label: "API key and secret headers",
            headers: vec![
                ("X-API-KEY".into(), id.to_string()),
                ("X-API-SECRET".into(), secret.to_string()),
            ],
        },
    ];

    let wanted = mode
        .map(|m| m.trim().to_ascii_lowercase().replace('_', "-"))
        .unwrap_or_default();

    if wanted.is_empty() || wanted == "auto" {
        return all;
    }

    match all.iter().find(|s| s.key == wanted) {
        Some(strategy) => vec![strategy.clone()],
        None => {
            tracing::debug!(mode = %wanted, "Unknown auth mode, trying every strategy");
            all
        }
    }
}

/// Query parameters for one time-entry probe
pub type ParamSet = Vec<(&'static str, String)>;

/// The four known query shapes for "entries of person X on day D"
pub fn build_time_entry_param_sets(person_id: &str, date: &str) -> Vec<ParamSet> {
    let person = || ("person_id", person_id.to_string());
    let day = || date.to_string();

    vec![
        vec![person(), ("start_date", day()), ("end_date", day())],
        vec![person(), ("date", day())],
        vec![person(), ("from", day()), ("to", day())],
        vec![person(), ("start", day()), ("end", day())],
    ]
}
