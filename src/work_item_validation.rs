use crate::work_item::WorkItem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Why an input item was left out of the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    MissingKey,
    InvalidPoints { points: f64 },
    DuplicateKey,
    Unparseable { message: String },
}

/// A malformed input item that was skipped. `position` is its index in the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedItem {
    pub position: usize,
    pub key: Option<String>,
    #[serde(flatten)]
    pub reason: SkipReason,
}

impl fmt::Display for SkippedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.key.as_deref().unwrap_or("<no key>");
        match &self.reason {
            SkipReason::MissingKey => write!(f, "item #{} has no key", self.position),
            SkipReason::InvalidPoints { points } => {
                write!(f, "item {label} has invalid points {points}")
            }
            SkipReason::DuplicateKey => {
                write!(f, "item {label} (#{}) duplicates an earlier key", self.position)
            }
            SkipReason::Unparseable { message } => {
                write!(f, "item {label} (#{}) could not be read: {message}", self.position)
            }
        }
    }
}

/// Work items keyed by key, with blocking relations made symmetric.
#[derive(Debug, Clone, Default)]
pub struct NormalizedItems {
    pub items: BTreeMap<String, WorkItem>,
    pub skipped: Vec<SkippedItem>,
}

impl NormalizedItems {
    pub fn completed_count(&self) -> usize {
        self.items.values().filter(|i| i.is_complete).count()
    }

    pub fn remaining_count(&self) -> usize {
        self.items.len() - self.completed_count()
    }

    pub fn remaining_points(&self) -> f64 {
        self.items
            .values()
            .filter(|i| !i.is_complete)
            .map(|i| i.points)
            .sum()
    }

    pub fn completed_points(&self) -> f64 {
        self.items
            .values()
            .filter(|i| i.is_complete)
            .map(|i| i.points)
            .sum()
    }

    /// Group identifiers present in the input, in key order.
    pub fn groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = self
            .items
            .values()
            .filter_map(|i| i.group.clone())
            .collect();
        groups.sort();
        groups.dedup();
        groups
    }
}

fn validate_item(position: usize, item: &WorkItem) -> Result<(), SkippedItem> {
    if !item.has_key() {
        return Err(SkippedItem {
            position,
            key: None,
            reason: SkipReason::MissingKey,
        });
    }
    if !item.points.is_finite() || item.points < 0.0 {
        return Err(SkippedItem {
            position,
            key: Some(item.key.clone()),
            reason: SkipReason::InvalidPoints {
                points: item.points,
            },
        });
    }
    Ok(())
}

/// Drops malformed items, derives completion from status, and makes the
/// blocks/blocked_by relation symmetric over the keys that remain. References
/// to unknown keys are discarded.
pub fn normalize_items<I>(raw: I) -> NormalizedItems
where
    I: IntoIterator<Item = WorkItem>,
{
    normalize_entries(raw.into_iter().map(Ok))
}

/// Same as `normalize_items` for an untyped JSON array. Elements that do not
/// deserialize into a `WorkItem` are reported as unparseable; the rest of the
/// batch is kept.
pub fn normalize_json_items(raw: Vec<serde_json::Value>) -> NormalizedItems {
    normalize_entries(raw.into_iter().map(|value| {
        let key = value
            .get("key")
            .and_then(|k| k.as_str())
            .map(str::to_string);
        serde_json::from_value::<WorkItem>(value).map_err(|err| UnreadItem {
            key,
            message: err.to_string(),
        })
    }))
}

struct UnreadItem {
    key: Option<String>,
    message: String,
}

fn normalize_entries<I>(entries: I) -> NormalizedItems
where
    I: Iterator<Item = Result<WorkItem, UnreadItem>>,
{
    let mut items: BTreeMap<String, WorkItem> = BTreeMap::new();
    let mut skipped = Vec::new();

    for (position, entry) in entries.enumerate() {
        let mut item = match entry {
            Ok(item) => item,
            Err(unread) => {
                let skip = SkippedItem {
                    position,
                    key: unread.key,
                    reason: SkipReason::Unparseable {
                        message: unread.message,
                    },
                };
                warn!(position, reason = %skip, "skipping malformed work item");
                skipped.push(skip);
                continue;
            }
        };
        if let Err(skip) = validate_item(position, &item) {
            warn!(position, reason = %skip, "skipping malformed work item");
            skipped.push(skip);
            continue;
        }
        item.key = item.key.trim().to_string();
        if items.contains_key(&item.key) {
            let skip = SkippedItem {
                position,
                key: Some(item.key.clone()),
                reason: SkipReason::DuplicateKey,
            };
            warn!(position, reason = %skip, "skipping malformed work item");
            skipped.push(skip);
            continue;
        }
        if let Some(status) = item.status.as_deref() {
            item.is_complete |= WorkItem::status_is_terminal(status);
        }
        items.insert(item.key.clone(), item);
    }

    let mut edges: Vec<(String, String)> = Vec::new();
    let mut dangling = 0usize;
    for (key, item) in &items {
        for blocked in item.blocks.iter().map(|k| k.trim()) {
            if items.contains_key(blocked) {
                edges.push((key.clone(), blocked.to_string()));
            } else {
                dangling += 1;
            }
        }
        for blocker in item.blocked_by.iter().map(|k| k.trim()) {
            if items.contains_key(blocker) {
                edges.push((blocker.to_string(), key.clone()));
            } else {
                dangling += 1;
            }
        }
    }
    if dangling > 0 {
        debug!(dangling, "dropped references to unknown work items");
    }

    for item in items.values_mut() {
        item.blocks.clear();
        item.blocked_by.clear();
    }
    for (blocker, blocked) in edges {
        if let Some(item) = items.get_mut(&blocker) {
            item.blocks.insert(blocked.clone());
        }
        if let Some(item) = items.get_mut(&blocked) {
            item.blocked_by.insert(blocker);
        }
    }

    NormalizedItems { items, skipped }
}
