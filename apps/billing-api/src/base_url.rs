//! Application origin used in checkout redirect URLs.

use std::net::IpAddr;

use axum::http::header::HOST;
use axum::http::HeaderMap;

const FORWARDED_HOST: &str = "x-forwarded-host";
const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Resolves `scheme://host[:port]` without a trailing slash.
///
/// A configured URL wins. Otherwise the host comes from `x-forwarded-host`
/// or `host`, and the scheme from `x-forwarded-proto`, defaulting to
/// `https` except for `localhost`, loopback and IP literals, which get
/// `http`.
pub fn resolve_base_url(configured: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(url) = configured.map(str::trim).filter(|url| !url.is_empty()) {
        return url.trim_end_matches('/').to_string();
    }

    let host = first_value(headers, FORWARDED_HOST)
        .or_else(|| first_value(headers, HOST.as_str()))
        .unwrap_or("localhost");

    let scheme = match first_value(headers, FORWARDED_PROTO) {
        Some(proto) => proto,
        None if is_local_host(host) => "http",
        None => "https",
    };

    format!("{scheme}://{host}")
}

/// First entry of a possibly comma-separated header (proxies append).
fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn is_local_host(host: &str) -> bool {
    let hostname = strip_port(host);
    hostname.eq_ignore_ascii_case("localhost")
        || hostname.to_ascii_lowercase().ends_with(".localhost")
        || hostname.parse::<IpAddr>().is_ok()
}

/// `example.com:443` → `example.com`, `[::1]:3000` → `::1`.
fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }

    // More than one colon is a bare IPv6 literal.
    match host.matches(':').count() {
        1 => host.split(':').next().unwrap_or(host),
        _ => host,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
