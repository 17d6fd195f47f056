//! Minute-of-day arithmetic and wall-clock conversion.
//!
//! All core algorithms work on plain absolute-minute integers; `"HH:MM"`
//! strings exist only at the ingestion and output boundary. Parsing is
//! deliberately forgiving: missing or malformed input yields 0 so that a
//! partially-filled template never aborts a planning run.

use crate::interval::Interval;

/// Minutes in one day.
pub const MINUTES_PER_DAY: i64 = 1440;

/// Default quantization step for placements, in minutes.
pub const GRID_MINUTES: i64 = 10;

/// Absolute or local time expressed as minutes.
pub type Minutes = i64;

/// Parse a 24-hour wall-clock string into minutes since midnight.
///
/// Accepts `"HH:MM"`, the separator-less `"HHMM"` form, and a bare minute
/// count. Anything unparseable yields 0; results are clamped to
/// `[0, 1440]`.
pub fn parse_clock(text: &str) -> Minutes {
    let s = text.trim();
    if s.is_empty() {
        return 0;
    }
    if let Some((h, m)) = s.split_once(':') {
        let h: i64 = h.trim().parse().unwrap_or(0);
        let m: i64 = m.trim().parse().unwrap_or(0);
        return (h * 60 + m).clamp(0, MINUTES_PER_DAY);
    }
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        let h: i64 = s[..2].parse().unwrap_or(0);
        let m: i64 = s[2..].parse().unwrap_or(0);
        return (h * 60 + m).clamp(0, MINUTES_PER_DAY);
    }
    s.parse::<i64>()
        .map(|m| m.clamp(0, MINUTES_PER_DAY))
        .unwrap_or(0)
}

/// Format minutes since midnight as `"HH:MM"`, clamped to `[0, 1440]`.
///
/// 1440 formats as `"24:00"` so a full-day end boundary stays distinguishable
/// from midnight.
pub fn format_clock(minutes: Minutes) -> String {
    let clamped = minutes.clamp(0, MINUTES_PER_DAY);
    format!("{:02}:{:02}", clamped / 60, clamped % 60)
}

/// Format an absolute minute value as wall-clock time, wrapping at midnight.
///
/// Used for absolute-minute values that may lie past 1440 (times on the next
/// calendar day of a midnight-crossing window).
pub fn format_clock_wrapped(minutes: Minutes) -> String {
    let wrapped = minutes.rem_euclid(MINUTES_PER_DAY);
    format!("{:02}:{:02}", wrapped / 60, wrapped % 60)
}

/// Round to the nearest multiple of `step` (half rounds up).
pub fn round_to_grid(minutes: Minutes, step: i64) -> Minutes {
    if step <= 0 {
        return minutes;
    }
    let rem = minutes.rem_euclid(step);
    if rem * 2 >= step {
        minutes - rem + step
    } else {
        minutes - rem
    }
}

/// Round up to the next multiple of `step`.
pub fn ceil_to_grid(minutes: Minutes, step: i64) -> Minutes {
    if step <= 0 {
        return minutes;
    }
    let rem = minutes.rem_euclid(step);
    if rem == 0 {
        minutes
    } else {
        minutes - rem + step
    }
}

/// Enumerate the grid ticks in `[start, end)`.
pub fn grid_ticks(start: Minutes, end: Minutes, step: i64) -> Vec<Minutes> {
    let mut ticks = Vec::new();
    if step <= 0 {
        return ticks;
    }
    let mut m = start;
    while m < end {
        ticks.push(m);
        m += step;
    }
    ticks
}

/// Merge overlapping or touching intervals into a sorted, pairwise-disjoint
/// set.
///
/// Sorts by start ascending and walks once, coalescing any interval whose
/// start is <= the running interval's end. The running interval's label and
/// kind win on merge (first-seen wins).
pub fn merge_intervals(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.sort_by_key(|iv| iv.start);
    let mut merged: Vec<Interval> = Vec::new();
    for iv in intervals {
        match merged.last_mut() {
            Some(last) if iv.start <= last.end => {
                last.end = last.end.max(iv.end);
            }
            _ => merged.push(iv),
        }
    }
    merged
}

/// Serde helpers for minute fields carried as `"HH:MM"` on the wire.
pub mod serde_hhmm {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(minutes: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_clock_wrapped(*minutes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(super::parse_clock(&s))
    }
}
