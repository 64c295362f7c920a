use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A unit of remaining work with a size and blocking relationships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Unique identifier. An empty key marks the item as malformed.
    #[serde(default)]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Raw tracker status; used to derive `is_complete` when that flag is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Effort in points. Zero means unsized.
    #[serde(default)]
    pub points: f64,
    #[serde(default)]
    pub is_complete: bool,
    /// Logical group (epic) the item belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Keys this item blocks.
    #[serde(default)]
    pub blocks: BTreeSet<String>,
    /// Keys blocking this item.
    #[serde(default)]
    pub blocked_by: BTreeSet<String>,
}

impl WorkItem {
    const TERMINAL_STATUSES: [&'static str; 4] = ["done", "closed", "duplicate", "won't fix"];

    pub fn new(key: impl Into<String>, points: f64) -> Self {
        Self {
            key: key.into(),
            summary: None,
            status: None,
            points,
            is_complete: false,
            group: None,
            blocks: BTreeSet::new(),
            blocked_by: BTreeSet::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Sets the status text and derives the completion flag from it.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        let status = status.into();
        self.is_complete = Self::status_is_terminal(&status);
        self.status = Some(status);
        self
    }

    pub fn completed(mut self) -> Self {
        self.is_complete = true;
        self
    }

    pub fn blocking(mut self, keys: &[&str]) -> Self {
        self.blocks.extend(keys.iter().map(|k| k.to_string()));
        self
    }

    pub fn blocked_by(mut self, keys: &[&str]) -> Self {
        self.blocked_by.extend(keys.iter().map(|k| k.to_string()));
        self
    }

    pub fn status_is_terminal(status: &str) -> bool {
        let lowered = status.trim().to_lowercase();
        Self::TERMINAL_STATUSES.contains(&lowered.as_str())
    }

    pub fn has_key(&self) -> bool {
        !self.key.trim().is_empty()
    }

    pub fn belongs_to(&self, group: &str) -> bool {
        self.group.as_deref() == Some(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_are_case_insensitive() {
        assert!(WorkItem::status_is_terminal("Done"));
        assert!(WorkItem::status_is_terminal("WON'T FIX"));
        assert!(WorkItem::status_is_terminal(" closed "));
        assert!(!WorkItem::status_is_terminal("In Progress"));
    }

    #[test]
    fn with_status_derives_completion() {
        let item = WorkItem::new("T-1", 3.0).with_status("Duplicate");
        assert!(item.is_complete);
        let open = WorkItem::new("T-2", 3.0).with_status("To Do");
        assert!(!open.is_complete);
    }

    #[test]
    fn deserializes_with_defaults() {
        let item: WorkItem = serde_json::from_str(r#"{"key":"T-9","points":2}"#).unwrap();
        assert_eq!(item.key, "T-9");
        assert_eq!(item.points, 2.0);
        assert!(!item.is_complete);
        assert!(item.blocks.is_empty());
        assert!(item.group.is_none());
    }
}
