//! Window-fit & merge post-processor.
//!
//! Forces a raw, untrusted block list (external generator output, user
//! entry, or freshly packed blocks) into the timeline's structural
//! invariants: clipped to the legal free windows, grid-aligned,
//! non-overlapping, adjacent same-activity blocks merged, and rest blocks
//! capped by count and by fraction of the window span. Idempotent on
//! already-clean input.

use serde::{Deserialize, Serialize};

use crate::clock::{round_to_grid, Minutes, GRID_MINUTES};
use crate::interval::{FreeSlot, IntervalKind, PlanWindow};
use crate::schedule::PlacedBlock;

/// Post-processor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefineConfig {
    /// Minimum overlap with a free window for a block to survive clipping.
    #[serde(default = "default_min_block")]
    pub min_block: Minutes,
    /// Maximum number of rest blocks kept.
    #[serde(default = "default_rest_max_blocks")]
    pub rest_max_blocks: usize,
    /// Maximum total rest time as a fraction of the window span.
    #[serde(default = "default_rest_max_ratio")]
    pub rest_max_ratio: f64,
    /// Override the kind of every surviving block.
    #[serde(default)]
    pub force_kind: Option<IntervalKind>,
}

fn default_min_block() -> Minutes {
    GRID_MINUTES
}

fn default_rest_max_blocks() -> usize {
    2
}

fn default_rest_max_ratio() -> f64 {
    0.2
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            min_block: default_min_block(),
            rest_max_blocks: default_rest_max_blocks(),
            rest_max_ratio: default_rest_max_ratio(),
            force_kind: None,
        }
    }
}

/// Case-insensitive rest/break label match.
pub fn is_rest_label(label: &str) -> bool {
    let s = label.to_lowercase();
    s.contains("휴식") || s.contains("휴게") || s.contains("rest") || s.contains("break")
}

/// Run the full pipeline: clip, de-overlap, merge, rest-cap.
///
/// Input block times may be minute-of-day values or already-anchored
/// absolute minutes; both are lifted into the window's absolute space before
/// clipping. Each block is kept against the first free window it overlaps by
/// at least `min_block` minutes; blocks with no sufficient overlap anywhere
/// are dropped.
pub fn fit_into_windows(
    raw: &[PlacedBlock],
    windows: &[FreeSlot],
    window: &PlanWindow,
    config: &RefineConfig,
    grid_minutes: i64,
) -> Vec<PlacedBlock> {
    let grid = grid_minutes.max(1);

    // Clip to the first window with enough overlap.
    let mut clipped: Vec<PlacedBlock> = Vec::new();
    for block in raw {
        let s = round_to_grid(window.to_abs(block.start), grid);
        let e = round_to_grid(window.to_abs(block.end), grid);
        if e <= s {
            continue;
        }
        for w in windows {
            let clipped_start = s.max(w.start);
            let clipped_end = e.min(w.end);
            if clipped_end - clipped_start >= config.min_block {
                let mut kept = block.clone();
                kept.start = clipped_start;
                kept.end = clipped_end;
                if let Some(kind) = config.force_kind {
                    kept.kind = kind;
                }
                clipped.push(kept);
                break;
            }
        }
    }

    // De-overlap: earlier start always wins.
    clipped.sort_by_key(|b| b.start);
    let mut packed: Vec<PlacedBlock> = Vec::new();
    for block in clipped {
        if !packed.iter().any(|kept| kept.overlaps(&block)) {
            packed.push(block);
        }
    }

    // Merge exactly-adjacent blocks of the same activity.
    let mut merged: Vec<PlacedBlock> = Vec::new();
    for block in packed {
        match merged.last_mut() {
            Some(last)
                if last.title == block.title
                    && last.kind == block.kind
                    && last.end == block.start =>
            {
                last.end = block.end;
            }
            _ => merged.push(block),
        }
    }

    // Rest cap: trim only when either limit is exceeded.
    let total_span = window.span();
    let rest_budget = total_span as f64 * config.rest_max_ratio;
    let rest_count = merged.iter().filter(|b| is_rest_label(&b.title)).count();
    let rest_time: Minutes = merged
        .iter()
        .filter(|b| is_rest_label(&b.title))
        .map(|b| b.duration_minutes())
        .sum();

    if rest_count > config.rest_max_blocks || rest_time as f64 > rest_budget {
        let mut trimmed = Vec::new();
        let mut kept_rest = 0usize;
        let mut kept_rest_time: Minutes = 0;
        for block in merged {
            if is_rest_label(&block.title) {
                let span = block.duration_minutes();
                if kept_rest < config.rest_max_blocks
                    && (kept_rest_time + span) as f64 <= rest_budget
                {
                    trimmed.push(block);
                    kept_rest += 1;
                    kept_rest_time += span;
                }
            } else {
                trimmed.push(block);
            }
        }
        trimmed
    } else {
        merged
    }
}
