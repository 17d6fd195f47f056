use clap::Args;
use serde::Serialize;

use dayplan_core::{
    CandidateTask, DayPlan, DayPlanner, FixedCommitments, PlacementStrategy, PlannerConfig,
    WorkItem,
};

use crate::common::{print_json, read_json};

#[derive(Args)]
pub struct PlanArgs {
    /// Fixed commitments JSON (path or `-` for stdin)
    #[arg(long)]
    pub fixed: String,
    /// Work items JSON
    #[arg(long)]
    pub todos: Option<String>,
    /// Candidate tasks JSON from an external generator
    #[arg(long)]
    pub candidates: Option<String>,
    /// Placement strategy override
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,
    /// Day key (YYYY-MM-DD) echoed in the output
    #[arg(long)]
    pub date: Option<String>,
    /// Planner configuration TOML path (defaults to the user config)
    #[arg(long)]
    pub config: Option<String>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum StrategyArg {
    FairShare,
    Greedy,
    Sessions,
}

impl From<StrategyArg> for PlacementStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::FairShare => PlacementStrategy::FairShare,
            StrategyArg::Greedy => PlacementStrategy::Greedy,
            StrategyArg::Sessions => PlacementStrategy::Sessions,
        }
    }
}

#[derive(Serialize)]
struct PlanOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(flatten)]
    plan: DayPlan,
}

pub fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let fixed: FixedCommitments = read_json(&args.fixed)?;
    let todos: Vec<WorkItem> = match &args.todos {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };
    let candidates: Vec<CandidateTask> = match &args.candidates {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    let mut config = match &args.config {
        Some(path) => PlannerConfig::load_from(std::path::Path::new(path))?,
        None => PlannerConfig::load_or_default(),
    };
    if let Some(strategy) = args.strategy {
        config.strategy = strategy.into();
    }
    config.validate()?;

    let date = match &args.date {
        Some(d) => Some(
            d.parse::<chrono::NaiveDate>()
                .map_err(|e| format!("invalid --date '{d}': {e}"))?
                .to_string(),
        ),
        None => None,
    };

    let plan = DayPlanner::with_config(config).plan_day(&fixed, &todos, &candidates);
    print_json(&PlanOutput { date, plan })
}
