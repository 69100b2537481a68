use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, fmt};

/// Whether the next click adds (`Like`) or removes (`Unlike`) a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleMode {
    Like,
    Unlike,
}

impl ToggleMode {
    pub fn flipped(self) -> Self {
        match self {
            Self::Like => Self::Unlike,
            Self::Unlike => Self::Like,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Unlike => "unlike",
        }
    }

    /// Counter movement caused by a confirmed toggle from this mode.
    pub fn counter_delta(self) -> i64 {
        match self {
            Self::Like => 1,
            Self::Unlike => -1,
        }
    }
}

impl fmt::Display for ToggleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for ResourceId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Self(text),
            RawId::Number(number) => Self::from(number),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeableElement {
    pub id: ResourceId,
    pub action: ToggleMode,
    pub url: Option<String>,
}

/// A counter as the page shows it: text that should hold an integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterElement {
    text: String,
}

impl CounterElement {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> Option<u64> {
        self.text.trim().parse().ok()
    }

    /// Moves the counter by `delta`, clamped at zero. Returns the new value,
    /// or `None` when the current text is not an integer (text unchanged).
    pub fn adjust(&mut self, delta: i64) -> Option<u64> {
        let current = self.value()?;
        let next = if delta >= 0 {
            current.saturating_add(delta.unsigned_abs())
        } else {
            current.saturating_sub(delta.unsigned_abs())
        };
        self.text = next.to_string();
        Some(next)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CounterKey {
    /// The single page-wide `span.count .total` counter.
    Shared,
    Resource(ResourceId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestPayload {
    pub id: ResourceId,
    pub action: ToggleMode,
}

/// Body of the endpoint's answer. Only `status` is consulted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponsePayload {
    pub status: Option<String>,
}

impl ResponsePayload {
    pub const OK: &'static str = "ok";

    pub fn from_value(value: &Value) -> Self {
        Self {
            status: value
                .get("status")
                .and_then(Value::as_str)
                .map(str::to_owned),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some(Self::OK)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub id: ResourceId,
    pub action: ToggleMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Server-rendered page state, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default)]
    pub elements: Vec<ElementSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,
    #[serde(default)]
    pub counters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub id: ResourceId,
    pub previous: ToggleMode,
    pub current: ToggleMode,
    pub count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mode_flips_both_ways() {
        assert_eq!(ToggleMode::Like.flipped(), ToggleMode::Unlike);
        assert_eq!(ToggleMode::Unlike.flipped(), ToggleMode::Like);
        assert_eq!(ToggleMode::Unlike.counter_delta(), -1);
        assert_eq!(
            serde_json::from_value::<ToggleMode>(json!("unlike")).unwrap(),
            ToggleMode::Unlike
        );
        assert!(serde_json::from_value::<ToggleMode>(json!("toggle")).is_err());
    }

    #[test]
    fn only_literal_ok_status_is_success() {
        assert!(ResponsePayload::from_value(&json!({ "status": "ok" })).is_ok());
        assert!(!ResponsePayload::from_value(&json!({ "status": "error" })).is_ok());
        assert!(!ResponsePayload::from_value(&json!({ "status": "OK" })).is_ok());
        assert!(!ResponsePayload::from_value(&json!({ "status": true })).is_ok());
        assert!(!ResponsePayload::from_value(&json!({})).is_ok());
        assert!(!ResponsePayload::from_value(&json!(["ok"])).is_ok());
    }

    #[test]
    fn counter_adjust_clamps_and_skips_garbage() {
        let mut counter = CounterElement::new("0");
        assert_eq!(counter.adjust(-1), Some(0));
        assert_eq!(counter.adjust(1), Some(1));

        let mut garbage = CounterElement::new("n/a");
        assert_eq!(garbage.adjust(1), None);
        assert_eq!(garbage.text(), "n/a");
    }

    #[test]
    fn snapshot_accepts_numeric_ids() {
        let snapshot: PageSnapshot = serde_json::from_value(json!({
            "elements": [{ "id": 42, "action": "like" }],
            "counters": { "42": "5" }
        }))
        .unwrap();
        assert_eq!(snapshot.elements[0].id, ResourceId::new("42"));
        assert_eq!(snapshot.total, None);
    }
}
