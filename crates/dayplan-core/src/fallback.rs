//! Deterministic fallback generation.
//!
//! When the external candidate generator is unavailable or returns nothing,
//! these routines produce a substitute candidate list by simple sequential
//! bin-filling. They sit behind the same candidate interface as external
//! generation, so the refine pipeline treats both sources identically.

use serde::{Deserialize, Serialize};

use crate::clock::{ceil_to_grid, format_clock_wrapped, Minutes};
use crate::interval::{FreeSlot, IntervalKind};
use crate::schedule::{BlockOrigin, CandidateTask, WorkItem};

/// Day-shape profile keyed to reported energy level: session length, break
/// length between sessions, target session count, and default sleep
/// boundaries for callers without a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyProfile {
    pub wake: String,
    pub bed: String,
    pub session_minutes: Minutes,
    pub break_minutes: Minutes,
    pub target_sessions: usize,
}

impl EnergyProfile {
    /// Low energy: late start, short sessions, long breaks.
    pub fn tired() -> Self {
        Self {
            wake: "10:00".into(),
            bed: "21:30".into(),
            session_minutes: 45,
            break_minutes: 30,
            target_sessions: 3,
        }
    }

    pub fn normal() -> Self {
        Self {
            wake: "09:00".into(),
            bed: "22:00".into(),
            session_minutes: 60,
            break_minutes: 20,
            target_sessions: 5,
        }
    }

    pub fn energized() -> Self {
        Self {
            wake: "08:00".into(),
            bed: "23:00".into(),
            session_minutes: 90,
            break_minutes: 15,
            target_sessions: 6,
        }
    }
}

impl Default for EnergyProfile {
    fn default() -> Self {
        Self::normal()
    }
}

/// Result of a todo session fill: generated candidates plus the items that
/// received no session at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFill {
    pub candidates: Vec<CandidateTask>,
    pub leftovers: Vec<WorkItem>,
}

/// Fill free windows with one fixed-length session per todo, earliest due
/// date first. Sessions inside one window are back to back; items that do
/// not fit anywhere come back as leftovers.
pub fn fill_todo_sessions(
    todos: &[WorkItem],
    windows: &[FreeSlot],
    session_minutes: Minutes,
) -> SessionFill {
    let mut sorted: Vec<WorkItem> = todos.to_vec();
    sorted.sort_by_key(|t| t.due_key());

    let mut candidates = Vec::new();
    let mut index = 0;

    for w in windows {
        let mut cursor = w.start;
        while cursor + session_minutes <= w.end && index < sorted.len() {
            candidates.push(CandidateTask {
                start: format_clock_wrapped(cursor),
                end: format_clock_wrapped(cursor + session_minutes),
                title: sorted[index].title.clone(),
                kind: Some(IntervalKind::Todo),
                origin: BlockOrigin::Fallback,
            });
            cursor += session_minutes;
            index += 1;
        }
        if index >= sorted.len() {
            break;
        }
    }

    SessionFill {
        candidates,
        leftovers: sorted[index..].to_vec(),
    }
}

/// Fill free windows with profile-shaped activity sessions, cycling the
/// caller-supplied title list, until the profile's target session count is
/// reached or capacity runs out. Session starts are aligned up to the grid
/// and separated by the profile's break length.
pub fn fill_profile_sessions(
    titles: &[String],
    windows: &[FreeSlot],
    profile: &EnergyProfile,
    grid_minutes: i64,
) -> Vec<CandidateTask> {
    if titles.is_empty() {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    let mut sessions = 0usize;
    let mut title_index = 0usize;

    for w in windows {
        let mut cursor = ceil_to_grid(w.start, grid_minutes);
        while cursor + profile.session_minutes <= w.end && sessions < profile.target_sessions {
            let end = cursor + profile.session_minutes;
            candidates.push(CandidateTask {
                start: format_clock_wrapped(cursor),
                end: format_clock_wrapped(end),
                title: titles[title_index % titles.len()].clone(),
                kind: Some(IntervalKind::Holiday),
                origin: BlockOrigin::Fallback,
            });
            title_index += 1;
            sessions += 1;
            cursor = end + profile.break_minutes;
        }
        if sessions >= profile.target_sessions {
            break;
        }
    }

    candidates
}
