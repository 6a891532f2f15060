//! Location codec: reads a TimeWindow out of a location and writes one back

use tracing::debug;
use url::Url;

use super::types::{DEFAULT_LIVE, TimeWindow};

pub const FROM_KEY: &str = "from_ts";
pub const FROM_LEGACY_KEY: &str = "from";
pub const TO_KEY: &str = "to_ts";
pub const TO_LEGACY_KEY: &str = "to";
pub const LIVE_KEY: &str = "live";
pub const REFRESH_MODE_KEY: &str = "refresh_mode";

/// Every query key the codec owns; `apply` strips all of them
pub const RECOGNIZED_KEYS: [&str; 6] = [
    FROM_KEY,
    FROM_LEGACY_KEY,
    TO_KEY,
    TO_LEGACY_KEY,
    LIVE_KEY,
    REFRESH_MODE_KEY,
];

/// First value for `key`, treating an empty value as absent
fn param(location: &Url, key: &str) -> Option<String> {
    location
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Extract the time window from a location's query component
///
/// `from_ts` wins over the legacy `from` alias, and `to_ts` over `to`. A
/// location without any recognized parameter yields an empty window.
pub fn extract(location: &Url) -> TimeWindow {
    let from = param(location, FROM_KEY).or_else(|| param(location, FROM_LEGACY_KEY));
    let to = param(location, TO_KEY).or_else(|| param(location, TO_LEGACY_KEY));
    let live = param(location, LIVE_KEY);
    let refresh_mode = param(location, REFRESH_MODE_KEY);

    let window = TimeWindow::new(from, to, live, refresh_mode);
    debug!(%location, %window, empty = window.is_empty(), "extract");
    window
}

/// Return a copy of `location` carrying `window`
///
/// All recognized keys are removed, unrelated pairs keep their order, and the
/// window's fields are appended under their canonical names. `live` is only
/// written when it is not the default. The input is left untouched; navigating
/// to the result is the caller's job.
pub fn apply(location: &Url, window: &TimeWindow) -> Url {
    let mut pairs: Vec<(String, String)> = location
        .query_pairs()
        .into_owned()
        .filter(|(k, _)| !RECOGNIZED_KEYS.contains(&k.as_str()))
        .collect();

    if let Some(from) = window.from() {
        pairs.push((FROM_KEY.to_string(), from.to_string()));
    }
    if let Some(to) = window.to() {
        pairs.push((TO_KEY.to_string(), to.to_string()));
    }
    if window.live() != DEFAULT_LIVE {
        pairs.push((LIVE_KEY.to_string(), window.live().to_string()));
    }
    if let Some(mode) = window.refresh_mode() {
        pairs.push((REFRESH_MODE_KEY.to_string(), mode.to_string()));
    }

    let mut next = location.clone();
    if pairs.is_empty() {
        next.set_query(None);
    } else {
        next.query_pairs_mut().clear().extend_pairs(&pairs);
    }

    debug!(%location, %next, "apply");
    next
}
