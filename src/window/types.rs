//! TimeWindow value type

use serde::{Deserialize, Deserializer, Serialize};

/// Value of `live` when the location does not carry one
pub const DEFAULT_LIVE: &str = "false";

/// A dashboard's temporal viewport, as carried in location query parameters
///
/// All tokens are opaque: the host page decides what a timestamp or a refresh
/// mode means. Empty strings are treated as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    from: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    to: Option<String>,

    #[serde(default = "default_live", deserialize_with = "live_or_default")]
    live: String,

    #[serde(
        default,
        alias = "refresh_mode",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "non_empty"
    )]
    refresh_mode: Option<String>,
}

fn default_live() -> String {
    DEFAULT_LIVE.to_string()
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}

fn live_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()).unwrap_or_else(default_live))
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            live: default_live(),
            refresh_mode: None,
        }
    }
}

impl TimeWindow {
    /// Build a window from raw tokens, normalizing empty strings to absent
    pub fn new(from: Option<String>, to: Option<String>, live: Option<String>, refresh_mode: Option<String>) -> Self {
        Self {
            from: from.filter(|v| !v.is_empty()),
            to: to.filter(|v| !v.is_empty()),
            live: live.filter(|v| !v.is_empty()).unwrap_or_else(default_live),
            refresh_mode: refresh_mode.filter(|v| !v.is_empty()),
        }
    }

    /// A fixed `from`..`to` range with live mode off
    pub fn range(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(Some(from.into()), Some(to.into()), None, None)
    }

    pub fn with_live(mut self, live: impl Into<String>) -> Self {
        let live = live.into();
        self.live = if live.is_empty() { default_live() } else { live };
        self
    }

    pub fn with_refresh_mode(mut self, refresh_mode: impl Into<String>) -> Self {
        self.refresh_mode = Some(refresh_mode.into()).filter(|v| !v.is_empty());
        self
    }

    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    pub fn live(&self) -> &str {
        &self.live
    }

    pub fn refresh_mode(&self) -> Option<&str> {
        self.refresh_mode.as_deref()
    }

    /// True when `live` carries anything other than the default
    pub fn is_live_set(&self) -> bool {
        self.live != DEFAULT_LIVE
    }

    /// An empty window has nothing to sync and must never be broadcast or applied
    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none() && !self.is_live_set() && self.refresh_mode.is_none()
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}..{} live={}",
            self.from().unwrap_or("-"),
            self.to().unwrap_or("-"),
            self.live
        )?;
        if let Some(mode) = self.refresh_mode() {
            write!(f, " refresh={}", mode)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let window = TimeWindow::default();
        assert!(window.is_empty());
        assert_eq!(window.live(), "false");
    }

    #[test]
    fn test_any_field_makes_non_empty() {
        assert!(!TimeWindow::new(Some("1".into()), None, None, None).is_empty());
        assert!(!TimeWindow::new(None, Some("2".into()), None, None).is_empty());
        assert!(!TimeWindow::default().with_live("true").is_empty());
        assert!(!TimeWindow::default().with_refresh_mode("paused").is_empty());
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let window = TimeWindow::new(Some(String::new()), Some(String::new()), Some(String::new()), None);
        assert!(window.is_empty());
        assert_eq!(window.live(), "false");
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let json = serde_json::to_value(TimeWindow::range("100", "200")).unwrap();
        assert_eq!(json, serde_json::json!({"from": "100", "to": "200", "live": "false"}));
    }

    #[test]
    fn test_deserialize_legacy_shape() {
        // Older writers emit nulls and snake_case refresh_mode
        let window: TimeWindow =
            serde_json::from_str(r#"{"from":null,"to":"200","live":"true","refresh_mode":"sliding"}"#).unwrap();
        assert_eq!(window.from(), None);
        assert_eq!(window.to(), Some("200"));
        assert_eq!(window.live(), "true");
        assert_eq!(window.refresh_mode(), Some("sliding"));
    }

    #[test]
    fn test_deserialize_missing_live_defaults() {
        let window: TimeWindow = serde_json::from_str(r#"{"from":"1"}"#).unwrap();
        assert_eq!(window.live(), "false");
        let window: TimeWindow = serde_json::from_str(r#"{"from":"1","live":null}"#).unwrap();
        assert_eq!(window.live(), "false");
    }

    #[test]
    fn test_display() {
        let window = TimeWindow::range("100", "200").with_refresh_mode("paused");
        assert_eq!(window.to_string(), "100..200 live=false refresh=paused");
    }
}
