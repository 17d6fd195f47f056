use clap::Args;
use serde::Serialize;

use dayplan_core::{
    busy_intervals, format_clock, free_intervals, FixedCommitments, FreeSlot, Interval,
    MINUTES_PER_DAY,
};

use crate::common::{print_json, read_json};

#[derive(Args)]
pub struct FreeArgs {
    /// Fixed commitments JSON (path or `-` for stdin)
    #[arg(long)]
    pub fixed: String,
    /// Window start as HH:MM (defaults to 00:00)
    #[arg(long)]
    pub from: Option<String>,
    /// Window end as HH:MM (defaults to 24:00)
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Serialize)]
struct FreeOutput {
    busy: Vec<Interval>,
    free: Vec<FreeSlot>,
    rendered: Vec<String>,
}

pub fn run(args: FreeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let fixed: FixedCommitments = read_json(&args.fixed)?;

    let window_start = args
        .from
        .as_deref()
        .map(dayplan_core::parse_clock)
        .unwrap_or(0);
    let window_end = args
        .to
        .as_deref()
        .map(dayplan_core::parse_clock)
        .unwrap_or(MINUTES_PER_DAY);

    let busy = busy_intervals(&fixed);
    let free = free_intervals(&busy, window_start, window_end);
    let rendered = free
        .iter()
        .map(|slot| format!("{} - {}", format_clock(slot.start), format_clock(slot.end)))
        .collect();

    print_json(&FreeOutput {
        busy,
        free,
        rendered,
    })
}
