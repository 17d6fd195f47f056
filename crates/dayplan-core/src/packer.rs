//! Greedy/split packer for work items.
//!
//! Places a priority-ordered list of variable-duration work items into free
//! slots, optionally splitting oversized items across slots. The packer never
//! fails outright: items that cannot be placed at all are reported in the
//! leftover list, and whatever free capacity remains usable is returned.

use serde::{Deserialize, Serialize};

use crate::clock::{round_to_grid, Minutes, GRID_MINUTES};
use crate::interval::{FreeSlot, IntervalKind};
use crate::schedule::{ActivityIdea, BlockOrigin, PlacedBlock, WorkItem};

/// Packer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackerConfig {
    /// Split oversized items across several free slots.
    #[serde(default)]
    pub allow_split: bool,
    /// Minimum viable block length in minutes; slots shorter than this are
    /// skipped and leftover slivers below it are discarded.
    #[serde(default = "default_min_block")]
    pub min_block: Minutes,
    /// Gap inserted after each placement, in minutes.
    #[serde(default)]
    pub spacing: Minutes,
    /// Quantization step applied to item durations.
    #[serde(default = "default_grid")]
    pub grid_minutes: i64,
    /// Kind recorded on placed blocks.
    #[serde(default = "default_kind")]
    pub kind: IntervalKind,
}

fn default_min_block() -> Minutes {
    15
}

fn default_grid() -> i64 {
    GRID_MINUTES
}

fn default_kind() -> IntervalKind {
    IntervalKind::Todo
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            allow_split: false,
            min_block: default_min_block(),
            spacing: 0,
            grid_minutes: default_grid(),
            kind: default_kind(),
        }
    }
}

/// Result of a packing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackOutcome {
    /// Blocks placed, in the order they were assigned.
    pub placed: Vec<PlacedBlock>,
    /// Items that could not be placed at all. A split item that landed at
    /// least one chunk is not a leftover.
    pub leftovers: Vec<WorkItem>,
    /// Remaining usable free capacity (slivers below `min_block` dropped).
    pub free: Vec<FreeSlot>,
}

/// Pack work items into free slots.
///
/// Items are sorted by priority descending, then due date ascending. In
/// non-split mode each item needs a single slot covering its whole duration;
/// in split mode each visited slot absorbs a chunk of at least `min_block`
/// minutes and the shrunk slot is revisited until the item is satisfied or
/// capacity runs out.
pub fn pack(items: &[WorkItem], free: &[FreeSlot], config: &PackerConfig) -> PackOutcome {
    let mut list: Vec<WorkItem> = items.to_vec();
    list.sort_by(|a, b| {
        b.effective_priority()
            .cmp(&a.effective_priority())
            .then_with(|| a.due_key().cmp(&b.due_key()))
    });

    let mut free: Vec<FreeSlot> = free.to_vec();
    let mut placed = Vec::new();
    let mut leftovers = Vec::new();

    for item in &list {
        let mut need = round_to_grid(item.duration().max(0), config.grid_minutes);
        let mut placed_once = false;

        let mut i = 0;
        while i < free.len() && need > 0 {
            let slot = free[i];
            let len = slot.duration_minutes();
            if len < config.min_block {
                i += 1;
                continue;
            }

            if !config.allow_split {
                if len >= need {
                    placed.push(
                        PlacedBlock::new(
                            &item.title,
                            slot.start,
                            slot.start + need,
                            config.kind,
                            BlockOrigin::Generated,
                        )
                        .with_item_id(&item.id),
                    );
                    free[i].start = slot.start + need + config.spacing;
                    placed_once = true;
                    need = 0;
                    break;
                }
                i += 1;
            } else {
                let chunk = config.min_block.max(len.min(need));
                if chunk <= 0 {
                    i += 1;
                    continue;
                }
                placed.push(
                    PlacedBlock::new(
                        &item.title,
                        slot.start,
                        slot.start + chunk,
                        config.kind,
                        BlockOrigin::Generated,
                    )
                    .with_item_id(&item.id),
                );
                free[i].start = slot.start + chunk + config.spacing;
                need -= chunk;
                placed_once = true;
                // stay on the same (now shorter) slot before moving on
            }
        }

        if need > 0 && !placed_once {
            leftovers.push(item.clone());
        }
    }

    free.retain(|slot| slot.duration_minutes() >= config.min_block);

    PackOutcome {
        placed,
        leftovers,
        free,
    }
}

/// Sequentially pack activity ideas into free slots, inserting a travel
/// block before each activity and leaving a buffer after it.
///
/// The travel estimate is a fixed heuristic (no location data in the core).
/// An idea is only placed when travel + prep + activity + buffer all fit in
/// the remainder of the current slot; otherwise the walk moves to the next
/// slot with the same idea.
pub fn pack_activities(
    ideas: &[ActivityIdea],
    free: &[FreeSlot],
    travel_minutes: Minutes,
    buffer_minutes: Minutes,
) -> Vec<PlacedBlock> {
    let mut scheduled = Vec::new();
    let mut idea_index = 0;

    for slot in free {
        let mut cursor = slot.start;

        while idea_index < ideas.len() {
            let idea = &ideas[idea_index];
            let prep = idea.prep_minutes.unwrap_or(0);
            let total_need = travel_minutes + prep + idea.duration_minutes + buffer_minutes;
            if cursor + total_need > slot.end {
                break;
            }

            if travel_minutes > 0 {
                scheduled.push(PlacedBlock::new(
                    "Travel",
                    cursor,
                    cursor + travel_minutes,
                    IntervalKind::Travel,
                    BlockOrigin::Generated,
                ));
                cursor += travel_minutes;
            }

            let activity_end = cursor + idea.duration_minutes;
            scheduled.push(PlacedBlock::new(
                &idea.title,
                cursor,
                activity_end,
                IntervalKind::Fixed,
                BlockOrigin::Generated,
            ));
            cursor = activity_end + buffer_minutes;

            idea_index += 1;
            if cursor > slot.end {
                break;
            }
        }
    }

    scheduled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, duration: i64, priority: i64) -> WorkItem {
        WorkItem::new(id, format!("Task {id}"))
            .with_duration(duration)
            .with_priority(priority)
    }

    #[test]
    fn test_priority_order_governs_access() {
        let free = vec![FreeSlot::new(420, 480)]; // one hour
        let items = vec![item("low", 60, 1), item("high", 60, 9)];

        let outcome = pack(&items, &free, &PackerConfig::default());
        assert_eq!(outcome.placed.len(), 1);
        assert_eq!(outcome.placed[0].item_id.as_deref(), Some("high"));
        assert_eq!(outcome.leftovers.len(), 1);
        assert_eq!(outcome.leftovers[0].id, "low");
    }

    #[test]
    fn test_due_date_breaks_priority_ties() {
        let free = vec![FreeSlot::new(420, 480)];
        let items = vec![
            item("later", 60, 5).with_due_date("2025-02-01"),
            item("sooner", 60, 5).with_due_date("2025-01-01"),
        ];

        let outcome = pack(&items, &free, &PackerConfig::default());
        assert_eq!(outcome.placed[0].item_id.as_deref(), Some("sooner"));
    }

    #[test]
    fn test_non_split_needs_single_slot() {
        let free = vec![FreeSlot::new(420, 450), FreeSlot::new(500, 530)];
        let items = vec![item("big", 60, 5)];

        let outcome = pack(&items, &free, &PackerConfig::default());
        assert!(outcome.placed.is_empty());
        assert_eq!(outcome.leftovers.len(), 1);
    }

    #[test]
    fn test_split_spans_slots() {
        let free = vec![FreeSlot::new(420, 450), FreeSlot::new(500, 530)];
        let items = vec![item("big", 60, 5)];
        let config = PackerConfig {
            allow_split: true,
            ..Default::default()
        };

        let outcome = pack(&items, &free, &config);
        assert_eq!(outcome.placed.len(), 2);
        assert_eq!((outcome.placed[0].start, outcome.placed[0].end), (420, 450));
        assert_eq!((outcome.placed[1].start, outcome.placed[1].end), (500, 530));
        assert!(outcome.leftovers.is_empty());
    }

    #[test]
    fn test_split_partial_not_leftover() {
        // Only 30 of 90 minutes fit, but one chunk landed, so the item is
        // not a leftover: the API only flags total placement failure.
        let free = vec![FreeSlot::new(420, 450)];
        let items = vec![item("big", 90, 5)];
        let config = PackerConfig {
            allow_split: true,
            ..Default::default()
        };

        let outcome = pack(&items, &free, &config);
        assert_eq!(outcome.placed.len(), 1);
        assert!(outcome.leftovers.is_empty());
    }

    #[test]
    fn test_spacing_advances_slot() {
        let free = vec![FreeSlot::new(420, 600)];
        let items = vec![item("a", 30, 9), item("b", 30, 5)];
        let config = PackerConfig {
            spacing: 10,
            ..Default::default()
        };

        let outcome = pack(&items, &free, &config);
        assert_eq!(outcome.placed.len(), 2);
        assert_eq!(outcome.placed[0].end, 450);
        assert_eq!(outcome.placed[1].start, 460);
    }

    #[test]
    fn test_sliver_slots_dropped_from_free_report() {
        let free = vec![FreeSlot::new(420, 460)];
        let items = vec![item("a", 30, 5)];

        let outcome = pack(&items, &free, &PackerConfig::default());
        // 10 remaining minutes fall below min_block and are debris.
        assert!(outcome.free.is_empty());
    }

    #[test]
    fn test_missing_numbers_defaulted() {
        let free = vec![FreeSlot::new(420, 600)];
        let items = vec![WorkItem::new("x", "No numbers")];

        let outcome = pack(&items, &free, &PackerConfig::default());
        assert_eq!(outcome.placed.len(), 1);
        assert_eq!(outcome.placed[0].duration_minutes(), 30);
    }

    #[test]
    fn test_pack_activities_travel_and_buffer() {
        let free = vec![FreeSlot::new(600, 800)];
        let ideas = vec![
            ActivityIdea {
                title: "Jogging".into(),
                duration_minutes: 60,
                prep_minutes: None,
                place_query: None,
            },
            ActivityIdea {
                title: "Stretching".into(),
                duration_minutes: 30,
                prep_minutes: Some(10),
                place_query: None,
            },
        ];

        let blocks = pack_activities(&ideas, &free, 20, 10);
        // travel + jogging, travel + stretching
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].kind, IntervalKind::Travel);
        assert_eq!((blocks[0].start, blocks[0].end), (600, 620));
        assert_eq!((blocks[1].start, blocks[1].end), (620, 680));
        // buffer of 10 after jogging, then next travel block
        assert_eq!(blocks[2].start, 690);
        assert_eq!(blocks[3].title, "Stretching");
    }

    #[test]
    fn test_pack_activities_skips_when_full() {
        let free = vec![FreeSlot::new(600, 660)]; // 60 minutes
        let ideas = vec![ActivityIdea {
            title: "Museum".into(),
            duration_minutes: 60, // 20 travel + 60 + 10 buffer will not fit
            prep_minutes: None,
            place_query: None,
        }];

        let blocks = pack_activities(&ideas, &free, 20, 10);
        assert!(blocks.is_empty());
    }
}
