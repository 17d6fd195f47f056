//! Bounded fair-share allocation of free grid ticks.
//!
//! Distributes a finite sequence of 10-minute ticks among weighted, bounded
//! work items: every item first receives its minimum if globally feasible,
//! then the remainder is shared as evenly as possible up to each item's cap
//! (discrete max-min fairness, i.e. water-filling). When total minimum demand
//! exceeds supply the allocator reports per-item deficits instead of failing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::clock::Minutes;
use crate::interval::{IntervalKind, PlanWindow};
use crate::schedule::{BlockOrigin, PlacedBlock, Shortfall, WorkItem};

const UNBOUNDED: i64 = i64::MAX;

/// Ticks assigned to one work item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickAssignment {
    pub item_id: String,
    pub title: String,
    pub ticks: Vec<Minutes>,
}

/// Result of a fair-share allocation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    /// Tick -> occupying item title, for preview rendering.
    pub preview: BTreeMap<Minutes, String>,
    /// Per-item tick assignments in allocation order.
    pub assignments: Vec<TickAssignment>,
    /// Deficits when total minimum demand exceeded the tick supply; empty
    /// when the allocation was feasible.
    pub shortfalls: Vec<Shortfall>,
}

struct Meta {
    id: String,
    title: String,
    min_ticks: i64,
    max_ticks: i64,
    got: i64,
    ticks: Vec<Minutes>,
}

/// Lenient due-date ordinal: finds an ISO-like `YYYY sep M sep D` date
/// anywhere in the string. Missing or unparseable dates sort last.
fn due_ordinal(due: Option<&str>) -> i64 {
    use chrono::Datelike;
    let Some(s) = due else { return i64::MAX };
    let s = s.trim();
    if s.is_empty() {
        return i64::MAX;
    }
    parse_due_date(s)
        .map(|d| i64::from(d.num_days_from_ce()))
        .unwrap_or(i64::MAX)
}

fn parse_due_date(s: &str) -> Option<chrono::NaiveDate> {
    let mut groups: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() {
            current.push(c);
        } else if !current.is_empty() {
            groups.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }

    let year_pos = groups.iter().position(|g| g.len() == 4)?;
    let year: i32 = groups[year_pos].parse().ok()?;
    let month: u32 = groups.get(year_pos + 1)?.parse().ok()?;
    let day: u32 = groups.get(year_pos + 2)?.parse().ok()?;
    chrono::NaiveDate::from_ymd_opt(year, month, day)
}

/// Allocate free ticks among work items.
///
/// Items are processed in `(due date asc, priority desc, input order)`
/// order. The minimum pass spends the earliest ticks on minimum guarantees
/// in that order; water-filling then levels the remainder. With no free
/// ticks at all, every item is reported with its (clamped) minimum as the
/// deficit.
pub fn allocate(items: &[WorkItem], free_ticks: &[Minutes], grid_minutes: i64) -> Allocation {
    let grid = grid_minutes.max(1);

    if items.is_empty() || free_ticks.is_empty() {
        let shortfalls = items
            .iter()
            .map(|item| {
                let min_ticks = min_ticks_of(item, grid);
                Shortfall {
                    id: Some(item.id.clone()),
                    title: item.title.clone(),
                    shortfall_minutes: min_ticks * grid,
                }
            })
            .collect();
        return Allocation {
            preview: BTreeMap::new(),
            assignments: Vec::new(),
            shortfalls,
        };
    }

    // Priority order: earliest due date first, then declared priority,
    // then input order.
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| {
        due_ordinal(items[a].due_date.as_deref())
            .cmp(&due_ordinal(items[b].due_date.as_deref()))
            .then_with(|| {
                items[b]
                    .effective_priority()
                    .cmp(&items[a].effective_priority())
            })
            .then_with(|| a.cmp(&b))
    });

    let mut metas: Vec<Meta> = order
        .iter()
        .map(|&i| {
            let item = &items[i];
            let max_ticks = max_ticks_of(item, grid);
            let min_ticks = min_ticks_of(item, grid);
            Meta {
                id: item.id.clone(),
                title: item.title.clone(),
                min_ticks,
                max_ticks,
                got: 0,
                ticks: Vec::new(),
            }
        })
        .collect();

    let total_ticks = free_ticks.len() as i64;

    // Minimum pass: the earliest free ticks go to minimum guarantees in
    // priority order.
    let mut cursor = 0usize;
    for meta in &mut metas {
        let want = meta.min_ticks.min(meta.max_ticks);
        let take = want.min(total_ticks - cursor as i64).max(0) as usize;
        if take > 0 {
            meta.ticks.extend_from_slice(&free_ticks[cursor..cursor + take]);
            meta.got += take as i64;
            cursor += take;
        }
    }

    let total_min_need: i64 = metas.iter().map(|m| m.min_ticks.min(m.max_ticks)).sum();
    if total_min_need > total_ticks {
        // Global demand infeasible: no water-filling, report exact deficits.
        let shortfalls = metas
            .iter()
            .filter(|m| m.got < m.min_ticks)
            .map(|m| Shortfall {
                id: Some(m.id.clone()),
                title: m.title.clone(),
                shortfall_minutes: (m.min_ticks - m.got) * grid,
            })
            .collect();
        return finish(metas, shortfalls);
    }

    // Water-filling: repeatedly raise the lowest level group until every
    // item hits its cap or the budget runs dry.
    let count = metas.len();
    let mut remaining = total_ticks - cursor as i64;
    let mut current: Vec<i64> = metas.iter().map(|m| m.got).collect();
    let cap: Vec<i64> = metas.iter().map(|m| m.max_ticks).collect();

    while remaining > 0 {
        let mut eligible: Vec<usize> = (0..count).filter(|&i| current[i] < cap[i]).collect();
        if eligible.is_empty() {
            break;
        }
        eligible.sort_by_key(|&i| (current[i], i));

        let base = current[eligible[0]];
        let level_len = eligible.iter().take_while(|&&i| current[i] == base).count();
        let level = &eligible[..level_len];

        let next_level = if level_len < eligible.len() {
            current[eligible[level_len]]
        } else {
            UNBOUNDED
        };
        let min_cap = level.iter().map(|&i| cap[i]).min().unwrap_or(UNBOUNDED);
        let target = next_level.min(min_cap);
        let delta = target.saturating_sub(base);
        if delta <= 0 {
            break;
        }

        let cost = delta.saturating_mul(level_len as i64);
        if remaining >= cost {
            for &i in level {
                current[i] += delta;
            }
            remaining -= cost;
        } else {
            let per = remaining / level_len as i64;
            let extra = (remaining % level_len as i64) as usize;
            if per > 0 {
                for &i in level {
                    current[i] += per;
                }
            }
            for &i in level.iter().take(extra) {
                current[i] += 1;
            }
            remaining = 0;
        }
    }

    // Materialize extras as a contiguous continuation of the unconsumed
    // tick sequence, per item in priority order.
    for (pos, meta) in metas.iter_mut().enumerate() {
        let add = (current[pos] - meta.got).max(0) as usize;
        if add > 0 {
            meta.ticks.extend_from_slice(&free_ticks[cursor..cursor + add]);
            meta.got += add as i64;
            cursor += add;
        }
    }

    finish(metas, Vec::new())
}

fn min_ticks_of(item: &WorkItem, grid: i64) -> i64 {
    let raw = item.min_minutes.unwrap_or(0).max(0);
    let min_ticks = (raw + grid - 1) / grid;
    min_ticks.min(max_ticks_of(item, grid))
}

fn max_ticks_of(item: &WorkItem, grid: i64) -> i64 {
    match item.max_minutes {
        Some(v) => (v / grid).max(0),
        None => UNBOUNDED,
    }
}

fn finish(metas: Vec<Meta>, shortfalls: Vec<Shortfall>) -> Allocation {
    let mut preview = BTreeMap::new();
    let mut assignments = Vec::new();
    for meta in metas {
        for &tick in &meta.ticks {
            preview.insert(tick, meta.title.clone());
        }
        assignments.push(TickAssignment {
            item_id: meta.id,
            title: meta.title,
            ticks: meta.ticks,
        });
    }
    Allocation {
        preview,
        assignments,
        shortfalls,
    }
}

/// Collapse a tick preview into contiguous placed blocks by merging
/// consecutive ticks holding the same title. Ticks interrupted by busy time
/// start a new block.
pub fn collapse_preview(
    preview: &BTreeMap<Minutes, String>,
    window: &PlanWindow,
    grid_minutes: i64,
) -> Vec<PlacedBlock> {
    let grid = grid_minutes.max(1);
    let mut blocks = Vec::new();
    let mut current: Option<String> = None;
    let mut run_start = window.start;

    let mut m = window.start;
    while m < window.end {
        let tick_title = preview.get(&m).cloned();
        let changed = match (&current, &tick_title) {
            (Some(a), Some(b)) => a != b,
            (None, None) => false,
            _ => true,
        };
        if changed {
            if let Some(title) = current.take() {
                blocks.push(PlacedBlock::new(
                    title,
                    run_start,
                    m,
                    IntervalKind::Todo,
                    BlockOrigin::Generated,
                ));
            }
            if let Some(title) = tick_title {
                current = Some(title);
                run_start = m;
            }
        }
        m += grid;
    }

    if let Some(title) = current {
        blocks.push(PlacedBlock::new(
            title,
            run_start,
            window.end,
            IntervalKind::Todo,
            BlockOrigin::Generated,
        ));
    }
    blocks
}
