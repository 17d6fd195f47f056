use clap::Args;
use std::collections::HashSet;

use dayplan_core::{
    allocate, busy_intervals, free_ticks, FixedCommitments, PlanWindow, WorkItem, GRID_MINUTES,
};

use crate::common::{print_json, read_json};

#[derive(Args)]
pub struct AllocateArgs {
    /// Fixed commitments JSON (path or `-` for stdin)
    #[arg(long)]
    pub fixed: String,
    /// Work items JSON (min/max bounds drive the allocation)
    #[arg(long)]
    pub todos: String,
    /// Grid step in minutes
    #[arg(long, default_value_t = GRID_MINUTES)]
    pub grid: i64,
}

pub fn run(args: AllocateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let fixed: FixedCommitments = read_json(&args.fixed)?;
    let todos: Vec<WorkItem> = read_json(&args.todos)?;

    let window = match &fixed.sleep {
        Some(sleep) => match (sleep.wake.as_deref(), sleep.bed.as_deref()) {
            (Some(wake), Some(bed)) => PlanWindow::from_sleep(wake, bed),
            _ => PlanWindow::full_day(),
        },
        None => PlanWindow::full_day(),
    };
    let busy = busy_intervals(&fixed);
    let ticks = free_ticks(&window, &busy, &HashSet::new(), args.grid);

    let enabled: Vec<WorkItem> = todos.into_iter().filter(|t| t.enabled).collect();
    let allocation = allocate(&enabled, &ticks, args.grid);
    print_json(&allocation)
}
