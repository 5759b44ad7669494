//! Client identity extraction from HTTP headers
//!
//! The identity used for visit deduplication is the client IP plus the raw
//! user-agent string:
//! - `CF-Connecting-IP` is preferred when the site sits behind Cloudflare
//! - otherwise the leftmost (originating client) entry of `X-Forwarded-For`
//! - otherwise the literal `"unknown"`
//!
//! A missing IP never fails the request, it only makes deduplication coarser
//! for that caller.

use axum::http::{header, HeaderMap};

use crate::models::ClientIdentity;

const CF_CONNECTING_IP: &str = "cf-connecting-ip";
const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Derive the (IP, user-agent) identity of the caller
pub fn extract_client_identity(headers: &HeaderMap) -> ClientIdentity {
    let ip = extract_cloudflare_ip(headers).or_else(|| extract_forwarded_for(headers));
    let user_agent = header_str(headers, header::USER_AGENT.as_str());

    ClientIdentity::new(ip, user_agent)
}

/// Extract IP from Cloudflare-specific header
fn extract_cloudflare_ip(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, CF_CONNECTING_IP)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// First hop of X-Forwarded-For: `client, proxy1, proxy2`
fn extract_forwarded_for(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, X_FORWARDED_FOR)?
        .split(',')
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Header value as text; non-UTF-8 values count as missing
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|h| h.to_str().ok())
}
