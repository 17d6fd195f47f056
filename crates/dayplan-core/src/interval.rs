//! Busy/free interval engine.
//!
//! Converts a day's fixed commitments (sleep window, meals, appointments)
//! into a canonical merged set of busy intervals on a 24-hour canvas, and
//! computes the complementary free time within a bounding window. Also
//! provides the anchored wake-to-bed window used for midnight-crossing
//! arithmetic.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::clock::{merge_intervals, parse_clock, Minutes, MINUTES_PER_DAY};
use crate::error::ValidationError;

/// Kind of schedule interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalKind {
    Sleep,
    Meal,
    Fixed,
    Todo,
    Holiday,
    Travel,
}

impl IntervalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Meal => "meal",
            Self::Fixed => "fixed",
            Self::Todo => "todo",
            Self::Holiday => "holiday",
            Self::Travel => "travel",
        }
    }
}

/// A labeled, half-open time span `[start, end)` in absolute minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: Minutes,
    pub end: Minutes,
    pub label: String,
    pub kind: IntervalKind,
}

impl Interval {
    /// Create a new interval.
    ///
    /// # Panics
    /// Panics if `end <= start`. Use [`try_new`](Self::try_new) for a
    /// non-panicking version.
    pub fn new(start: Minutes, end: Minutes, label: impl Into<String>, kind: IntervalKind) -> Self {
        Self::try_new(start, end, label, kind)
            .expect("Interval::new: end must be greater than start")
    }

    /// Create a new interval, returning a Result.
    ///
    /// # Errors
    /// Returns an error if `end <= start`
    pub fn try_new(
        start: Minutes,
        end: Minutes,
        label: impl Into<String>,
        kind: IntervalKind,
    ) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::InvalidTimeRange { start, end });
        }
        Ok(Self {
            start,
            end,
            label: label.into(),
            kind,
        })
    }

    /// Get duration in minutes
    pub fn duration_minutes(&self) -> Minutes {
        self.end - self.start
    }

    /// Check if this interval overlaps with another
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Check whether a minute lies inside this interval, testing both the
    /// day-local span and its next-day image (for anchored windows that run
    /// past midnight).
    pub fn covers_wrapped(&self, minute: Minutes) -> bool {
        (self.start <= minute && minute < self.end)
            || (self.start + MINUTES_PER_DAY <= minute && minute < self.end + MINUTES_PER_DAY)
    }
}

/// An unoccupied span of the day, available for placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FreeSlot {
    pub start: Minutes,
    pub end: Minutes,
}

impl FreeSlot {
    pub fn new(start: Minutes, end: Minutes) -> Self {
        Self { start, end }
    }

    /// Get duration in minutes
    pub fn duration_minutes(&self) -> Minutes {
        self.end - self.start
    }

    /// Check if this slot can fit a task of given duration
    pub fn can_fit(&self, minutes: Minutes) -> bool {
        self.duration_minutes() >= minutes
    }
}

/// Sleep window boundaries as wall-clock strings. Either side may be absent
/// in partially-filled templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SleepWindow {
    #[serde(default)]
    pub wake: Option<String>,
    #[serde(default)]
    pub bed: Option<String>,
}

/// A meal entry from the day template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub label: String,
}

/// A fixed appointment from the day template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedEvent {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_hint: Option<String>,
}

/// All fixed commitments for one day, as supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixedCommitments {
    #[serde(default)]
    pub sleep: Option<SleepWindow>,
    #[serde(default)]
    pub meals: Vec<Meal>,
    #[serde(default)]
    pub fixed_events: Vec<FixedEvent>,
}

fn push_span(busy: &mut Vec<Interval>, start: Minutes, end: Minutes, label: &str, kind: IntervalKind) {
    if end > start {
        busy.push(Interval::new(start, end, label, kind));
    }
}

/// Build the merged busy set for a day on the `[0, 1440)` canvas.
///
/// Sleep handling: with `bed >= wake` the sleep period occupies `[0, wake)`
/// and `[bed, 1440)` of the current day. When bedtime crosses midnight
/// (`bed < wake`) only `[0, wake)` is blocked here -- the bedtime-to-midnight
/// portion belongs to the previous day's canvas and re-blocking it would
/// double-count across invocations. Entries with `end <= start` are silently
/// dropped.
pub fn busy_intervals(fixed: &FixedCommitments) -> Vec<Interval> {
    let mut busy = Vec::new();

    if let Some(sleep) = &fixed.sleep {
        let wake = sleep.wake.as_deref().map(parse_clock);
        let bed = sleep.bed.as_deref().map(parse_clock);
        match (wake, bed) {
            (Some(w), Some(b)) => {
                if b >= w {
                    push_span(&mut busy, 0, w, "sleep", IntervalKind::Sleep);
                    push_span(&mut busy, b, MINUTES_PER_DAY, "sleep", IntervalKind::Sleep);
                } else {
                    push_span(&mut busy, 0, w, "sleep", IntervalKind::Sleep);
                }
            }
            (Some(w), None) => push_span(&mut busy, 0, w, "sleep", IntervalKind::Sleep),
            (None, Some(b)) => push_span(&mut busy, b, MINUTES_PER_DAY, "sleep", IntervalKind::Sleep),
            (None, None) => {}
        }
    }

    for meal in &fixed.meals {
        let label = if meal.label.is_empty() { "meal" } else { &meal.label };
        push_span(
            &mut busy,
            parse_clock(&meal.start),
            parse_clock(&meal.end),
            label,
            IntervalKind::Meal,
        );
    }

    for event in &fixed.fixed_events {
        let label = if event.label.is_empty() { "fixed" } else { &event.label };
        push_span(
            &mut busy,
            parse_clock(&event.start),
            parse_clock(&event.end),
            label,
            IntervalKind::Fixed,
        );
    }

    merge_intervals(busy)
}

/// Meals and appointments as day-local display intervals, in template order,
/// without merging. Invalid entries are dropped.
pub fn commitment_blocks(fixed: &FixedCommitments) -> Vec<Interval> {
    let mut blocks = Vec::new();
    for meal in &fixed.meals {
        let label = if meal.label.is_empty() { "meal" } else { &meal.label };
        push_span(
            &mut blocks,
            parse_clock(&meal.start),
            parse_clock(&meal.end),
            label,
            IntervalKind::Meal,
        );
    }
    for event in &fixed.fixed_events {
        let label = if event.label.is_empty() { "fixed" } else { &event.label };
        push_span(
            &mut blocks,
            parse_clock(&event.start),
            parse_clock(&event.end),
            label,
            IntervalKind::Fixed,
        );
    }
    blocks
}

/// Compute the free complement of a sorted, merged busy set within
/// `[window_start, window_end)`.
///
/// The returned slots together with the busy set (clipped to the window)
/// exactly tile the window with no gaps and no overlaps.
pub fn free_intervals(busy: &[Interval], window_start: Minutes, window_end: Minutes) -> Vec<FreeSlot> {
    let mut free = Vec::new();
    let mut cursor = window_start;

    for iv in busy {
        if iv.end <= cursor {
            continue;
        }
        if iv.start >= window_end {
            break;
        }
        if iv.start > cursor {
            free.push(FreeSlot::new(cursor, iv.start.min(window_end)));
        }
        cursor = cursor.max(iv.end.min(window_end));
    }

    if cursor < window_end {
        free.push(FreeSlot::new(cursor, window_end));
    }
    free
}

/// The operative day window, anchored at wake time.
///
/// `start` is the wake minute; `end` is the bed minute, pushed one day later
/// when bedtime does not come after waking on the same day. All anchored
/// arithmetic uses absolute minutes relative to this window, so spans that
/// cross midnight stay contiguous.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanWindow {
    pub start: Minutes,
    pub end: Minutes,
}

impl PlanWindow {
    /// The full `[00:00, 24:00)` canvas.
    pub fn full_day() -> Self {
        Self {
            start: 0,
            end: MINUTES_PER_DAY,
        }
    }

    /// Anchored window from wake/bed wall-clock strings.
    pub fn from_sleep(wake: &str, bed: &str) -> Self {
        let start = parse_clock(wake);
        let mut end = parse_clock(bed);
        if end <= start {
            end += MINUTES_PER_DAY;
        }
        Self { start, end }
    }

    /// Total window length in minutes.
    pub fn span(&self) -> Minutes {
        self.end - self.start
    }

    pub fn contains(&self, minute: Minutes) -> bool {
        self.start <= minute && minute < self.end
    }

    /// Lift a minute-of-day value into this window's absolute space: any time
    /// earlier than the anchor is pushed one full day later.
    pub fn to_abs(&self, minute_of_day: Minutes) -> Minutes {
        let anchor = self.start.rem_euclid(MINUTES_PER_DAY);
        if minute_of_day < anchor {
            minute_of_day + MINUTES_PER_DAY
        } else {
            minute_of_day
        }
    }
}

/// Derive the operative window from an existing block list by locating its
/// sleep block: wake is the block's end, bed its start. When several sleep
/// blocks are present (a two-piece same-day sleep set), the longest one wins.
pub fn window_from_blocks(blocks: &[Interval]) -> Option<PlanWindow> {
    let mut best: Option<&Interval> = None;
    let mut best_duration = -1;

    for block in blocks {
        let is_sleep = block.kind == IntervalKind::Sleep || {
            let label = block.label.to_lowercase();
            label.contains("sleep") || label.contains("수면")
        };
        if !is_sleep {
            continue;
        }
        let duration = (block.end - block.start).rem_euclid(MINUTES_PER_DAY);
        if duration > best_duration {
            best_duration = duration;
            best = Some(block);
        }
    }

    best.map(|sleep| {
        let start = sleep.end;
        let mut end = sleep.start;
        if end <= start {
            end += MINUTES_PER_DAY;
        }
        PlanWindow { start, end }
    })
}

/// Lift day-local busy blocks into a window's absolute space and clip them to
/// it: spans crossing midnight are unwrapped (+1440 on the end), out-of-window
/// parts are cut, empty results dropped, and the rest sorted by start.
pub fn anchor_blocks(blocks: &[Interval], window: &PlanWindow) -> Vec<Interval> {
    let mut anchored: Vec<Interval> = blocks
        .iter()
        .filter_map(|block| {
            let mut s = window.to_abs(block.start);
            let mut e = window.to_abs(block.end);
            if e <= s {
                e += MINUTES_PER_DAY;
            }
            s = s.clamp(window.start, window.end);
            e = e.clamp(window.start, window.end);
            if e > s {
                Some(Interval {
                    start: s,
                    end: e,
                    label: block.label.clone(),
                    kind: block.kind,
                })
            } else {
                None
            }
        })
        .collect();
    anchored.sort_by_key(|iv| iv.start);
    anchored
}

/// Free slots of an anchored window around a sorted anchored busy set.
pub fn windows_from_fixed(window: &PlanWindow, anchored_busy: &[Interval]) -> Vec<FreeSlot> {
    free_intervals(anchored_busy, window.start, window.end)
}

/// Enumerate the free grid ticks of a window: ticks covered by a busy block
/// or present in the caller's blocked set are skipped, as is the window's
/// first tick (the wake marker is never schedulable).
pub fn free_ticks(
    window: &PlanWindow,
    busy: &[Interval],
    blocked: &HashSet<Minutes>,
    grid_minutes: i64,
) -> Vec<Minutes> {
    let mut free = Vec::new();
    if grid_minutes <= 0 {
        return free;
    }
    let mut m = window.start;
    while m < window.end {
        let occupied =
            m == window.start || blocked.contains(&m) || busy.iter().any(|iv| iv.covers_wrapped(m));
        if !occupied {
            free.push(m);
        }
        m += grid_minutes;
    }
    free
}
