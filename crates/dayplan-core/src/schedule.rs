//! Shared schedule types: work items, candidate tasks, and placed blocks.
//!
//! Work items and candidate tasks are caller-supplied input; candidate tasks
//! in particular are untrusted and only enter the timeline through the refine
//! pipeline. Placed blocks are the pure output unit. Nothing here is
//! persisted by the core.

use serde::{Deserialize, Serialize};

use crate::clock::{parse_clock, serde_hhmm, Minutes};
use crate::interval::IntervalKind;

/// A flexible work item to be placed into free time.
///
/// `duration_minutes` and `priority` drive the greedy packer;
/// `min_minutes`/`max_minutes` drive the fair-share allocator. Missing
/// numeric fields are defaulted at use (duration 30, priority 0) -- bad
/// input never aborts a planning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub min_minutes: Option<i64>,
    #[serde(default)]
    pub max_minutes: Option<i64>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl WorkItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            duration_minutes: None,
            min_minutes: None,
            max_minutes: None,
            priority: None,
            due_date: None,
            enabled: true,
        }
    }

    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn with_bounds(mut self, min_minutes: i64, max_minutes: Option<i64>) -> Self {
        self.min_minutes = Some(min_minutes);
        self.max_minutes = max_minutes;
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    /// Effective duration for the packer (default 30).
    pub fn duration(&self) -> Minutes {
        self.duration_minutes.unwrap_or(30)
    }

    /// Effective priority (default 0).
    pub fn effective_priority(&self) -> i64 {
        self.priority.unwrap_or(0)
    }

    /// Due-date sort key; items without one sort last.
    pub fn due_key(&self) -> String {
        self.due_date
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "9999-12-31".to_string())
    }
}

/// A discretionary activity idea for sequential packing with travel/buffer
/// blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityIdea {
    pub title: String,
    pub duration_minutes: i64,
    #[serde(default)]
    pub prep_minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_query: Option<String>,
}

/// Where a block on the final timeline came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockOrigin {
    /// Produced by the core placement algorithms or an external generator.
    #[default]
    Generated,
    /// Produced by the deterministic fallback strategy.
    Fallback,
    /// A fixed commitment the user entered directly.
    UserFixed,
}

/// A raw candidate task from an external generator or user entry.
///
/// Untrusted: always passes through the refine pipeline before it can reach
/// the timeline. Unknown wire fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateTask {
    pub start: String,
    pub end: String,
    #[serde(alias = "task", alias = "activity")]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: Option<IntervalKind>,
    #[serde(default)]
    pub origin: BlockOrigin,
}

impl CandidateTask {
    /// Lower into a block in minute-of-day space; the refine pipeline handles
    /// window anchoring and clipping.
    pub fn to_block(&self) -> PlacedBlock {
        PlacedBlock::new(
            &self.title,
            parse_clock(&self.start),
            parse_clock(&self.end),
            self.kind.unwrap_or(IntervalKind::Fixed),
            self.origin,
        )
    }
}

/// A placed block on the final timeline.
///
/// Start/end are absolute window-relative minutes internally and render as
/// wall-clock `"HH:MM"` on the wire. Several blocks may share an `item_id`
/// when a work item was split across free regions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedBlock {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    pub title: String,
    #[serde(with = "serde_hhmm")]
    pub start: Minutes,
    #[serde(with = "serde_hhmm")]
    pub end: Minutes,
    pub kind: IntervalKind,
    pub origin: BlockOrigin,
}

impl PlacedBlock {
    /// Create a new placed block with a fresh id.
    pub fn new(
        title: impl Into<String>,
        start: Minutes,
        end: Minutes,
        kind: IntervalKind,
        origin: BlockOrigin,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            item_id: None,
            title: title.into(),
            start,
            end,
            kind,
            origin,
        }
    }

    pub fn with_item_id(mut self, item_id: impl Into<String>) -> Self {
        self.item_id = Some(item_id.into());
        self
    }

    /// Get total duration in minutes
    pub fn duration_minutes(&self) -> Minutes {
        self.end - self.start
    }

    /// Check if this block overlaps with a time range
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Reported deficit for a work item whose minimum demand could not be met.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shortfall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub shortfall_minutes: Minutes,
}
