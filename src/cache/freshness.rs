//! HTTP freshness evaluation for cached responses
//!
//! Decides whether a stored entry may be served without refetching,
//! from the `cache-control` directives and `date` header captured at
//! download time. Anything unparseable counts toward staleness.

use crate::cache::metadata::HeaderSet;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Tuning for the staleness check.
///
/// `accept_stale` switches on a stored `max-stale` directive, whose
/// value extends the freshness window. `max_fresh_secs` caps the
/// window regardless of what `max-age` allows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshnessOptions {
    /// Honor a `max-stale` directive, serving within its window
    pub accept_stale: bool,

    /// Cap freshness at this many seconds regardless of `max-age`
    pub max_fresh_secs: Option<u64>,
}

/// Whether a cached response must be refetched.
///
/// Directives interact, so the evaluation order is load-bearing:
/// no `cache-control` or no usable `max-age` is stale, `immutable`
/// is fresh regardless of age, then `max-stale`/`max-fresh` adjust
/// the plain `max-age` window.
pub fn is_stale(headers: &HeaderSet, options: &FreshnessOptions) -> bool {
    let Some(cache_control) = headers.get("cache-control") else {
        // No Cache-Control header found; assume cache is stale.
        return true;
    };

    let Some(max_age) = directive_value(cache_control, "max-age") else {
        // No usable max-age directive; assume cache is stale.
        return true;
    };

    if has_directive(cache_control, "immutable") {
        // Response is immutable; cache is always fresh.
        return false;
    }

    let Some(cache_time) = headers.get("date").and_then(parse_http_date) else {
        // Without a retrieval date the age is unknowable.
        return true;
    };

    let now = Utc::now();

    if options.accept_stale {
        if let Some(max_stale) = directive_value(cache_control, "max-stale") {
            if !expired_after(cache_time, max_age.saturating_add(max_stale), now) {
                // Cache is fresh with max-stale applied.
                return false;
            }
        }
    }

    let expired = expired_after(cache_time, max_age, now);

    if let Some(max_fresh) = options.max_fresh_secs {
        // max-fresh narrows the window, never widens it.
        let capped = i64::try_from(max_fresh).unwrap_or(i64::MAX);
        return expired || expired_after(cache_time, capped, now);
    }

    expired
}

/// Whether `cache_time + secs` lies in the past. Spans too large for
/// the clock count as never expiring (or always expired when
/// negative), so absurd directive values cannot panic the arithmetic.
fn expired_after(cache_time: DateTime<Utc>, secs: i64, now: DateTime<Utc>) -> bool {
    match Duration::try_seconds(secs).and_then(|d| cache_time.checked_add_signed(d)) {
        Some(expiry) => expiry < now,
        None => secs < 0,
    }
}

fn directives(cache_control: &str) -> impl Iterator<Item = &str> {
    cache_control.split(',').map(str::trim)
}

fn has_directive(cache_control: &str, name: &str) -> bool {
    directives(cache_control).any(|d| d.eq_ignore_ascii_case(name))
}

/// Integer value of a `name=value` directive, `None` when the
/// directive is absent or its value is not numeric.
fn directive_value(cache_control: &str, name: &str) -> Option<i64> {
    directives(cache_control).find_map(|d| {
        let (key, value) = d.split_once('=')?;
        if key.trim().eq_ignore_ascii_case(name) {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

/// Parse an HTTP date header, RFC 2822 first, RFC 3339 as fallback.
fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
