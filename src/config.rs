use std::{env, fmt::Display};

use tracing::{info, warn};

pub const DEFAULT_CSRF_COOKIE: &str = "csrftoken";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointSource {
    Fixed(String),
    /// Use the `url` attribute of the first likeable element on the page.
    FirstElement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    Word,
    Glyph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterLookup {
    Shared,
    ById,
}

/// What a click does while a request for the same resource is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapPolicy {
    Supersede,
    Suppress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub endpoint: EndpointSource,
    pub reload_after_toggle: bool,
    pub label_style: LabelStyle,
    pub counter_lookup: CounterLookup,
    pub overlap: OverlapPolicy,
    pub csrf_cookie_name: String,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self::variant_b()
    }
}

impl HandlerConfig {
    /// Fixed endpoint, shared counter, word labels, reload after each toggle.
    pub fn variant_a(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: EndpointSource::Fixed(endpoint.into()),
            reload_after_toggle: true,
            label_style: LabelStyle::Word,
            counter_lookup: CounterLookup::Shared,
            overlap: OverlapPolicy::Supersede,
            csrf_cookie_name: DEFAULT_CSRF_COOKIE.to_string(),
        }
    }

    /// Endpoint from the first element, per-resource counters, glyph labels.
    pub fn variant_b() -> Self {
        Self {
            endpoint: EndpointSource::FirstElement,
            reload_after_toggle: false,
            label_style: LabelStyle::Glyph,
            counter_lookup: CounterLookup::ById,
            overlap: OverlapPolicy::Supersede,
            csrf_cookie_name: DEFAULT_CSRF_COOKIE.to_string(),
        }
    }

    pub fn from_env() -> Self {
        let defaults = Self::variant_b();
        Self {
            endpoint: match env::var("LIKE_ENDPOINT") {
                Ok(url) if !url.trim().is_empty() => EndpointSource::Fixed(url.trim().to_string()),
                _ => {
                    info!("LIKE_ENDPOINT not set, reading endpoint from the first element");
                    defaults.endpoint
                }
            },
            reload_after_toggle: try_load("LIKE_RELOAD", parse_flag, defaults.reload_after_toggle),
            label_style: try_load("LIKE_LABEL", parse_label, defaults.label_style),
            counter_lookup: try_load("LIKE_COUNTER", parse_counter, defaults.counter_lookup),
            overlap: try_load("LIKE_OVERLAP", parse_overlap, defaults.overlap),
            csrf_cookie_name: try_load(
                "LIKE_CSRF_COOKIE",
                parse_cookie_name,
                defaults.csrf_cookie_name,
            ),
        }
    }
}

fn try_load<T: std::fmt::Debug>(
    key: &str,
    parse: fn(&str) -> Result<T, String>,
    default: T,
) -> T {
    let Ok(raw) = env::var(key) else {
        info!("{key} not set, using default: {default:?}");
        return default;
    };
    parse(raw.trim()).unwrap_or_else(|err| {
        warn!("Invalid {key} value: {err}, using default: {default:?}");
        default
    })
}

fn unexpected(value: &str, expected: impl Display) -> String {
    format!("'{value}' (expected {expected})")
}

pub fn parse_flag(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(unexpected(value, "a boolean")),
    }
}

pub fn parse_cookie_name(value: &str) -> Result<String, String> {
    if value.is_empty() || value.contains([';', '=', ' ']) {
        return Err(unexpected(value, "a cookie name"));
    }
    Ok(value.to_string())
}

pub fn parse_label(value: &str) -> Result<LabelStyle, String> {
    match value.to_ascii_lowercase().as_str() {
        "word" => Ok(LabelStyle::Word),
        "glyph" => Ok(LabelStyle::Glyph),
        _ => Err(unexpected(value, "word|glyph")),
    }
}

pub fn parse_counter(value: &str) -> Result<CounterLookup, String> {
    match value.to_ascii_lowercase().as_str() {
        "shared" => Ok(CounterLookup::Shared),
        "by-id" | "id" => Ok(CounterLookup::ById),
        _ => Err(unexpected(value, "shared|by-id")),
    }
}

pub fn parse_overlap(value: &str) -> Result<OverlapPolicy, String> {
    match value.to_ascii_lowercase().as_str() {
        "supersede" => Ok(OverlapPolicy::Supersede),
        "suppress" => Ok(OverlapPolicy::Suppress),
        _ => Err(unexpected(value, "supersede|suppress")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_cover_both_variants() {
        let a = HandlerConfig::variant_a("/posts/like/");
        assert_eq!(a.endpoint, EndpointSource::Fixed("/posts/like/".into()));
        assert!(a.reload_after_toggle);
        assert_eq!(a.counter_lookup, CounterLookup::Shared);

        let b = HandlerConfig::variant_b();
        assert_eq!(b.endpoint, EndpointSource::FirstElement);
        assert!(!b.reload_after_toggle);
        assert_eq!(b.csrf_cookie_name, "csrftoken");
    }

    #[test]
    fn parsers_accept_known_values_only() {
        assert_eq!(parse_flag("TRUE"), Ok(true));
        assert_eq!(parse_flag("off"), Ok(false));
        assert!(parse_flag("maybe").is_err());
        assert_eq!(parse_counter("by-id"), Ok(CounterLookup::ById));
        assert_eq!(parse_overlap("suppress"), Ok(OverlapPolicy::Suppress));
        assert_eq!(parse_label("Glyph"), Ok(LabelStyle::Glyph));
        assert!(parse_label("emoji").is_err());
        assert_eq!(parse_cookie_name("csrf_token"), Ok("csrf_token".to_string()));
        assert!(parse_cookie_name("").is_err());
        assert!(parse_cookie_name("a=b").is_err());
    }
}
