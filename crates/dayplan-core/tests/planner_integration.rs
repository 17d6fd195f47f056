//! End-to-end planning tests over the public API, driving the full
//! fixed-commitments -> placement -> refine -> timeline path with wire-shaped
//! JSON input, plus property checks for the tiling and fairness invariants.

use proptest::prelude::*;
use std::collections::HashSet;

use dayplan_core::{
    allocate, busy_intervals, free_intervals, merge_intervals, BlockOrigin, CandidateTask,
    DayPlanner, FixedCommitments, Interval, IntervalKind, PlacedBlock, PlannerConfig,
    PlacementStrategy, WorkItem, MINUTES_PER_DAY,
};

fn fixture_day() -> FixedCommitments {
    serde_json::from_str(
        r#"{
            "sleep": { "wake": "07:00", "bed": "23:00" },
            "meals": [
                { "start": "08:00", "end": "08:30", "label": "breakfast" },
                { "start": "19:00", "end": "19:30", "label": "dinner" }
            ],
            "fixed_events": [
                { "start": "13:00", "end": "17:00", "label": "school" }
            ]
        }"#,
    )
    .unwrap()
}

fn assert_timeline_invariants(blocks: &[PlacedBlock], window_start: i64, window_end: i64) {
    for pair in blocks.windows(2) {
        assert!(
            pair[0].end <= pair[1].start,
            "'{}' [{}, {}) overlaps '{}' [{}, {})",
            pair[0].title,
            pair[0].start,
            pair[0].end,
            pair[1].title,
            pair[1].start,
            pair[1].end
        );
    }
    for block in blocks {
        assert!(block.start >= window_start && block.end <= window_end);
    }
}

#[test]
fn plan_day_end_to_end() {
    let planner = DayPlanner::new();
    let items: Vec<WorkItem> = serde_json::from_str(
        r#"[
            { "id": "essay", "title": "Essay draft", "min_minutes": 60, "max_minutes": 120,
              "priority": 5, "due_date": "2025-01-03", "enabled": true },
            { "id": "mail", "title": "Inbox zero", "min_minutes": 20,
              "priority": 2, "due_date": "2025-01-05", "enabled": true }
        ]"#,
    )
    .unwrap();

    let plan = planner.plan_day(&fixture_day(), &items, &[]);

    assert!(plan.shortfalls.is_empty());
    assert_timeline_invariants(&plan.blocks, plan.window.start, plan.window.end);

    // All three commitments reappear as user-fixed blocks.
    let fixed_titles: Vec<&str> = plan
        .blocks
        .iter()
        .filter(|b| b.origin == BlockOrigin::UserFixed)
        .map(|b| b.title.as_str())
        .collect();
    assert_eq!(fixed_titles, vec!["breakfast", "school", "dinner"]);

    // Both items received time; the earlier due date got the earlier start.
    let first_start = |title: &str| {
        plan.blocks
            .iter()
            .find(|b| b.title == title)
            .map(|b| b.start)
            .unwrap()
    };
    assert!(first_start("Essay draft") < first_start("Inbox zero"));
}

#[test]
fn plan_day_candidates_with_rest_caps() {
    let planner = DayPlanner::new();
    let candidates: Vec<CandidateTask> = serde_json::from_str(
        r#"[
            { "start": "09:00", "end": "11:00", "task": "Sketching", "type": "holiday" },
            { "start": "11:00", "end": "12:00", "task": "Rest", "type": "holiday" },
            { "start": "17:30", "end": "18:30", "task": "Rest", "type": "holiday" },
            { "start": "20:00", "end": "21:30", "task": "Rest", "type": "holiday" },
            { "start": "21:30", "end": "22:30", "task": "Reading", "type": "holiday" }
        ]"#,
    )
    .unwrap();

    let plan = planner.plan_day(&fixture_day(), &[], &candidates);
    assert_timeline_invariants(&plan.blocks, plan.window.start, plan.window.end);

    // Only two rest blocks survive the cap.
    let rests: Vec<&PlacedBlock> = plan
        .blocks
        .iter()
        .filter(|b| b.title == "Rest")
        .collect();
    assert_eq!(rests.len(), 2);

    // The out-of-cap rest block is dropped, non-rest neighbors survive.
    assert!(plan.blocks.iter().any(|b| b.title == "Sketching"));
    assert!(plan.blocks.iter().any(|b| b.title == "Reading"));
}

#[test]
fn plan_day_greedy_split_covers_fragmented_day() {
    let mut config = PlannerConfig {
        strategy: PlacementStrategy::Greedy,
        ..Default::default()
    };
    config.packer.allow_split = true;

    let planner = DayPlanner::with_config(config);
    // 5 hours of study against a day fragmented by commitments.
    let items = vec![WorkItem::new("study", "Exam study").with_duration(300)];

    let plan = planner.plan_day(&fixture_day(), &items, &[]);
    assert!(plan.shortfalls.is_empty());
    assert_timeline_invariants(&plan.blocks, plan.window.start, plan.window.end);

    let study_minutes: i64 = plan
        .blocks
        .iter()
        .filter(|b| b.title == "Exam study")
        .map(|b| b.duration_minutes())
        .sum();
    assert_eq!(study_minutes, 300);
    // Split across at least two free regions (no single slot holds 5 hours
    // before the afternoon block).
    assert!(plan.blocks.iter().filter(|b| b.title == "Exam study").count() >= 2);
}

#[test]
fn midnight_crossing_day_stays_contiguous() {
    let fixed: FixedCommitments = serde_json::from_str(
        r#"{
            "sleep": { "wake": "09:00", "bed": "01:00" },
            "meals": [],
            "fixed_events": [
                { "start": "00:10", "end": "00:40", "label": "night walk" }
            ]
        }"#,
    )
    .unwrap();

    let planner = DayPlanner::new();
    let items = vec![WorkItem::new("t", "Late task").with_bounds(60, Some(60))];
    let plan = planner.plan_day(&fixed, &items, &[]);

    // Window runs 09:00 today to 01:00 tomorrow.
    assert_eq!(plan.window.start, 540);
    assert_eq!(plan.window.end, 60 + MINUTES_PER_DAY);
    assert_timeline_invariants(&plan.blocks, plan.window.start, plan.window.end);

    // The night event landed past midnight in absolute minutes.
    let walk = plan.blocks.iter().find(|b| b.title == "night walk").unwrap();
    assert_eq!((walk.start, walk.end), (1450, 1480));
}

#[test]
fn plan_serializes_to_wall_clock_wire_format() {
    let planner = DayPlanner::new();
    let items = vec![WorkItem::new("1", "Essay").with_bounds(30, Some(30))];
    let plan = planner.plan_day(&fixture_day(), &items, &[]);

    let json = serde_json::to_value(&plan).unwrap();
    let blocks = json["blocks"].as_array().unwrap();
    assert!(!blocks.is_empty());
    for block in blocks {
        let start = block["start"].as_str().unwrap();
        assert_eq!(start.len(), 5);
        assert_eq!(&start[2..3], ":");
    }
}

proptest! {
    /// Free and busy sets always tile the full-day window exactly.
    #[test]
    fn tiling_invariant_holds(
        spans in proptest::collection::vec((0i64..1430, 1i64..240), 0..12)
    ) {
        let raw: Vec<Interval> = spans
            .iter()
            .map(|&(start, len)| Interval::new(
                start,
                (start + len).min(MINUTES_PER_DAY),
                "busy",
                IntervalKind::Fixed,
            ))
            .collect();
        let busy = merge_intervals(raw);
        let free = free_intervals(&busy, 0, MINUTES_PER_DAY);

        let mut tiles: Vec<(i64, i64)> = busy
            .iter()
            .map(|iv| (iv.start, iv.end.min(MINUTES_PER_DAY)))
            .chain(free.iter().map(|s| (s.start, s.end)))
            .collect();
        tiles.sort();

        let mut cursor = 0;
        for (start, end) in tiles {
            prop_assert_eq!(start, cursor);
            cursor = end;
        }
        prop_assert_eq!(cursor, MINUTES_PER_DAY);
    }

    /// After pure water-filling (no minimums), any two items still below
    /// their caps end within one tick of each other, and no tick is
    /// assigned twice.
    #[test]
    fn water_filling_fairness_holds(
        tick_count in 1usize..60,
        bounds in proptest::collection::vec(proptest::option::of(30i64..180), 1..6)
    ) {
        let items: Vec<WorkItem> = bounds
            .iter()
            .enumerate()
            .map(|(i, &max)| {
                WorkItem::new(format!("i{i}"), format!("Item {i}")).with_bounds(0, max)
            })
            .collect();
        let ticks: Vec<i64> = (0..tick_count as i64).map(|i| i * 10).collect();

        let allocation = allocate(&items, &ticks, 10);

        let mut seen = HashSet::new();
        for assignment in &allocation.assignments {
            for tick in &assignment.ticks {
                prop_assert!(seen.insert(*tick), "tick {} assigned twice", tick);
            }
        }

        if allocation.shortfalls.is_empty() {
            let cap_of = |id: &str| -> i64 {
                let idx: usize = id[1..].parse().unwrap();
                bounds[idx].map(|m| m / 10).unwrap_or(i64::MAX)
            };
            let below_cap: Vec<i64> = allocation
                .assignments
                .iter()
                .filter(|a| (a.ticks.len() as i64) < cap_of(&a.item_id))
                .map(|a| a.ticks.len() as i64)
                .collect();
            for &a in &below_cap {
                for &b in &below_cap {
                    prop_assert!((a - b).abs() <= 1);
                }
            }
        }
    }
}
