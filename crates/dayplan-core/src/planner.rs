//! Day planning orchestration.
//!
//! Wires the stages together: fixed commitments -> operative window -> free
//! capacity -> work-item placement (selected strategy) -> union with
//! candidate blocks -> refine pipeline -> final chronological timeline.
//! Every run is a pure function of its inputs; nothing is retained between
//! invocations.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::PlannerConfig;
use crate::fairshare;
use crate::fallback;
use crate::interval::{
    anchor_blocks, commitment_blocks, free_ticks, windows_from_fixed, FixedCommitments, PlanWindow,
};
use crate::packer;
use crate::refine;
use crate::schedule::{BlockOrigin, CandidateTask, PlacedBlock, Shortfall, WorkItem};

/// How work items are placed into free capacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStrategy {
    /// Bounded max-min fair tick allocation (water-filling).
    #[default]
    FairShare,
    /// Greedy first-fit packing, optionally splitting oversized items.
    Greedy,
    /// Deterministic sequential session fill (the shared fallback strategy).
    Sessions,
}

/// A complete planned day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPlan {
    /// The operative window the plan covers.
    pub window: PlanWindow,
    /// Chronologically sorted, mutually non-overlapping blocks.
    pub blocks: Vec<PlacedBlock>,
    /// Work items whose demand could not be (fully) met.
    pub shortfalls: Vec<Shortfall>,
}

/// Day planner.
pub struct DayPlanner {
    config: PlannerConfig,
}

impl DayPlanner {
    /// Create a planner with default configuration.
    pub fn new() -> Self {
        Self {
            config: PlannerConfig::default(),
        }
    }

    /// Create with custom configuration.
    pub fn with_config(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan one day.
    ///
    /// Fixed commitments anchor the window and re-enter the output as
    /// user-fixed blocks. Enabled work items are placed by the configured
    /// strategy; candidate tasks (untrusted, possibly empty) are unioned in
    /// and the whole set passes through the refine pipeline before the final
    /// chronological sort.
    pub fn plan_day(
        &self,
        fixed: &FixedCommitments,
        items: &[WorkItem],
        candidates: &[CandidateTask],
    ) -> DayPlan {
        let grid = self.config.grid_minutes.max(1);

        let window = match &fixed.sleep {
            Some(sleep) => match (sleep.wake.as_deref(), sleep.bed.as_deref()) {
                (Some(wake), Some(bed)) => PlanWindow::from_sleep(wake, bed),
                _ => PlanWindow::full_day(),
            },
            None => PlanWindow::full_day(),
        };

        let anchored = anchor_blocks(&commitment_blocks(fixed), &window);
        let windows = windows_from_fixed(&window, &anchored);

        let enabled: Vec<WorkItem> = items.iter().filter(|t| t.enabled).cloned().collect();

        let mut union: Vec<PlacedBlock> = Vec::new();
        let mut shortfalls: Vec<Shortfall> = Vec::new();

        match self.config.strategy {
            PlacementStrategy::FairShare => {
                let ticks = free_ticks(&window, &anchored, &HashSet::new(), grid);
                let allocation = fairshare::allocate(&enabled, &ticks, grid);
                union.extend(fairshare::collapse_preview(&allocation.preview, &window, grid));
                shortfalls.extend(allocation.shortfalls);
            }
            PlacementStrategy::Greedy => {
                let outcome = packer::pack(&enabled, &windows, &self.config.packer);
                union.extend(outcome.placed);
                shortfalls.extend(outcome.leftovers.into_iter().map(|item| Shortfall {
                    shortfall_minutes: item.duration(),
                    id: Some(item.id),
                    title: item.title,
                }));
            }
            PlacementStrategy::Sessions => {
                let fill = fallback::fill_todo_sessions(
                    &enabled,
                    &windows,
                    self.config.session_minutes,
                );
                union.extend(fill.candidates.iter().map(CandidateTask::to_block));
                shortfalls.extend(fill.leftovers.into_iter().map(|item| Shortfall {
                    shortfall_minutes: item.duration(),
                    id: Some(item.id),
                    title: item.title,
                }));
            }
        }

        union.extend(candidates.iter().map(CandidateTask::to_block));

        let refined = refine::fit_into_windows(&union, &windows, &window, &self.config.refine, grid);

        let mut blocks: Vec<PlacedBlock> = anchored
            .iter()
            .map(|iv| {
                PlacedBlock::new(&iv.label, iv.start, iv.end, iv.kind, BlockOrigin::UserFixed)
            })
            .collect();
        blocks.extend(refined);
        blocks.sort_by_key(|b| b.start);

        DayPlan {
            window,
            blocks,
            shortfalls,
        }
    }

    /// Plan a day of discretionary activities instead of work items:
    /// activities are packed sequentially with the configured travel
    /// heuristic and post-activity buffer, then refined together with the
    /// fixed commitments like any other candidate set.
    pub fn plan_activities(
        &self,
        fixed: &FixedCommitments,
        ideas: &[crate::schedule::ActivityIdea],
    ) -> DayPlan {
        let grid = self.config.grid_minutes.max(1);

        let window = match &fixed.sleep {
            Some(sleep) => match (sleep.wake.as_deref(), sleep.bed.as_deref()) {
                (Some(wake), Some(bed)) => PlanWindow::from_sleep(wake, bed),
                _ => PlanWindow::full_day(),
            },
            None => PlanWindow::full_day(),
        };

        let anchored = anchor_blocks(&commitment_blocks(fixed), &window);
        let windows = windows_from_fixed(&window, &anchored);

        let packed = packer::pack_activities(
            ideas,
            &windows,
            self.config.travel_minutes,
            self.config.buffer_minutes,
        );
        let refined = refine::fit_into_windows(&packed, &windows, &window, &self.config.refine, grid);

        let mut blocks: Vec<PlacedBlock> = anchored
            .iter()
            .map(|iv| {
                PlacedBlock::new(&iv.label, iv.start, iv.end, iv.kind, BlockOrigin::UserFixed)
            })
            .collect();
        blocks.extend(refined);
        blocks.sort_by_key(|b| b.start);

        DayPlan {
            window,
            blocks,
            shortfalls: Vec::new(),
        }
    }
}

impl Default for DayPlanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::{FixedEvent, IntervalKind, Meal, SleepWindow};

    fn fixed_day() -> FixedCommitments {
        FixedCommitments {
            sleep: Some(SleepWindow {
                wake: Some("07:00".into()),
                bed: Some("23:00".into()),
            }),
            meals: vec![Meal {
                start: "12:00".into(),
                end: "13:00".into(),
                label: "lunch".into(),
            }],
            fixed_events: vec![FixedEvent {
                start: "09:00".into(),
                end: "10:00".into(),
                label: "standup".into(),
                color_hint: None,
            }],
        }
    }

    fn assert_sorted_non_overlapping(blocks: &[PlacedBlock]) {
        for pair in blocks.windows(2) {
            assert!(pair[0].start <= pair[1].start, "blocks out of order");
            assert!(
                pair[0].end <= pair[1].start,
                "overlap between '{}' and '{}'",
                pair[0].title,
                pair[1].title
            );
        }
    }

    #[test]
    fn test_plan_day_fair_share() {
        let planner = DayPlanner::new();
        let items = vec![
            WorkItem::new("1", "Essay")
                .with_bounds(60, Some(120))
                .with_due_date("2025-01-01"),
            WorkItem::new("2", "Reading").with_due_date("2025-01-02"),
        ];

        let plan = planner.plan_day(&fixed_day(), &items, &[]);

        assert!(plan.shortfalls.is_empty());
        assert_sorted_non_overlapping(&plan.blocks);
        assert!(plan
            .blocks
            .iter()
            .any(|b| b.origin == BlockOrigin::UserFixed && b.title == "lunch"));
        assert!(plan.blocks.iter().any(|b| b.title == "Essay"));
        // Everything inside the operative window.
        for block in &plan.blocks {
            assert!(block.start >= plan.window.start && block.end <= plan.window.end);
        }
    }

    #[test]
    fn test_plan_day_disabled_items_skipped() {
        let planner = DayPlanner::new();
        let mut item = WorkItem::new("1", "Skip me").with_bounds(60, None);
        item.enabled = false;

        let plan = planner.plan_day(&fixed_day(), &[item], &[]);
        assert!(!plan.blocks.iter().any(|b| b.title == "Skip me"));
        assert!(plan.shortfalls.is_empty());
    }

    #[test]
    fn test_plan_day_greedy_reports_leftovers() {
        let config = PlannerConfig {
            strategy: PlacementStrategy::Greedy,
            ..Default::default()
        };
        let planner = DayPlanner::with_config(config);
        // A 20-hour item cannot fit any single free slot.
        let items = vec![WorkItem::new("big", "Marathon prep").with_duration(1200)];

        let plan = planner.plan_day(&fixed_day(), &items, &[]);
        assert_eq!(plan.shortfalls.len(), 1);
        assert_eq!(plan.shortfalls[0].shortfall_minutes, 1200);
        assert!(!plan.blocks.iter().any(|b| b.title == "Marathon prep"));
    }

    #[test]
    fn test_plan_day_refines_candidates() {
        let planner = DayPlanner::new();
        let candidates = vec![
            CandidateTask {
                start: "08:00".into(),
                end: "09:30".into(), // runs into the standup; clipped
                title: "Sketching".into(),
                kind: Some(IntervalKind::Holiday),
                origin: BlockOrigin::Generated,
            },
            CandidateTask {
                start: "03:00".into(), // outside the window entirely
                end: "04:00".into(),
                title: "Night owl".into(),
                kind: Some(IntervalKind::Holiday),
                origin: BlockOrigin::Generated,
            },
        ];

        let plan = planner.plan_day(&fixed_day(), &[], &candidates);
        assert_sorted_non_overlapping(&plan.blocks);

        let sketch = plan
            .blocks
            .iter()
            .find(|b| b.title == "Sketching")
            .expect("clipped candidate survives");
        assert_eq!((sketch.start, sketch.end), (480, 540));
        assert!(!plan.blocks.iter().any(|b| b.title == "Night owl"));
    }

    #[test]
    fn test_plan_day_sessions_strategy() {
        let config = PlannerConfig {
            strategy: PlacementStrategy::Sessions,
            ..Default::default()
        };
        let planner = DayPlanner::with_config(config);
        let items = vec![
            WorkItem::new("a", "Laundry").with_due_date("2025-01-01"),
            WorkItem::new("b", "Taxes").with_due_date("2025-01-02"),
        ];

        let plan = planner.plan_day(&fixed_day(), &items, &[]);
        let laundry = plan.blocks.iter().find(|b| b.title == "Laundry").unwrap();
        let taxes = plan.blocks.iter().find(|b| b.title == "Taxes").unwrap();
        assert_eq!(laundry.duration_minutes(), 60);
        assert!(laundry.end <= taxes.start);
        assert_eq!(laundry.origin, BlockOrigin::Fallback);
    }

    #[test]
    fn test_plan_activities_inserts_travel() {
        let planner = DayPlanner::new();
        let ideas = vec![crate::schedule::ActivityIdea {
            title: "Hiking".into(),
            duration_minutes: 120,
            prep_minutes: None,
            place_query: None,
        }];

        let plan = planner.plan_activities(&fixed_day(), &ideas);
        assert_sorted_non_overlapping(&plan.blocks);

        let travel = plan.blocks.iter().find(|b| b.kind == IntervalKind::Travel);
        let hike = plan.blocks.iter().find(|b| b.title == "Hiking").unwrap();
        let travel = travel.expect("travel block precedes the activity");
        assert_eq!(travel.duration_minutes(), 20);
        assert_eq!(travel.end, hike.start);
        assert_eq!(hike.duration_minutes(), 120);
    }

    #[test]
    fn test_plan_day_empty_inputs() {
        let planner = DayPlanner::new();
        let plan = planner.plan_day(&FixedCommitments::default(), &[], &[]);
        assert_eq!(plan.window, PlanWindow::full_day());
        assert!(plan.blocks.is_empty());
        assert!(plan.shortfalls.is_empty());
    }
}
