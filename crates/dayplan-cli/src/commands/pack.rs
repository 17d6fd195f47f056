use clap::Args;

use dayplan_core::{
    busy_intervals, free_intervals, pack, FixedCommitments, PackerConfig, WorkItem,
    MINUTES_PER_DAY,
};

use crate::common::{print_json, read_json};

#[derive(Args)]
pub struct PackArgs {
    /// Fixed commitments JSON (path or `-` for stdin)
    #[arg(long)]
    pub fixed: String,
    /// Work items JSON
    #[arg(long)]
    pub todos: String,
    /// Split oversized items across free slots
    #[arg(long)]
    pub split: bool,
    /// Minimum viable block length in minutes
    #[arg(long)]
    pub min_block: Option<i64>,
    /// Spacing between placements in minutes
    #[arg(long)]
    pub spacing: Option<i64>,
}

pub fn run(args: PackArgs) -> Result<(), Box<dyn std::error::Error>> {
    let fixed: FixedCommitments = read_json(&args.fixed)?;
    let todos: Vec<WorkItem> = read_json(&args.todos)?;

    let mut config = PackerConfig {
        allow_split: args.split,
        ..Default::default()
    };
    if let Some(min_block) = args.min_block {
        config.min_block = min_block;
    }
    if let Some(spacing) = args.spacing {
        config.spacing = spacing;
    }

    let busy = busy_intervals(&fixed);
    let free = free_intervals(&busy, 0, MINUTES_PER_DAY);
    let outcome = pack(&todos, &free, &config);
    print_json(&outcome)
}
