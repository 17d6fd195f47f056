//! # Dayplan Core Library
//!
//! This library provides the scheduling core for Dayplan: it reconciles a
//! day's fixed commitments (sleep, meals, appointments) with flexible work
//! items into a single non-overlapping timeline. Persistence, authentication,
//! UI rendering, and candidate generation are external collaborators -- the
//! core is pure, synchronous computation over in-memory data.
//!
//! ## Architecture
//!
//! - **Busy/Free Engine**: merged busy intervals on a 24-hour canvas and
//!   their free complement, with anchored windows for midnight-crossing days
//! - **Packer**: greedy first-fit / split placement of work items into free
//!   slots
//! - **Fair-Share Allocator**: bounded max-min fair (water-filling) tick
//!   allocation with structured shortfall reporting
//! - **Refine Pipeline**: clips, de-overlaps, merges, and rest-caps
//!   untrusted candidate blocks
//!
//! ## Key Components
//!
//! - [`DayPlanner`]: end-to-end planning orchestration
//! - [`PlannerConfig`]: explicit per-run configuration (TOML-backed)
//! - [`allocate`]: the fair-share allocator
//! - [`fit_into_windows`]: the candidate post-processor

pub mod clock;
pub mod config;
pub mod error;
pub mod fairshare;
pub mod fallback;
pub mod interval;
pub mod packer;
pub mod planner;
pub mod refine;
pub mod schedule;

pub use clock::{
    format_clock, format_clock_wrapped, grid_ticks, merge_intervals, parse_clock, round_to_grid,
    Minutes, GRID_MINUTES, MINUTES_PER_DAY,
};
pub use config::PlannerConfig;
pub use error::{ConfigError, CoreError, Result, ValidationError};
pub use fairshare::{allocate, collapse_preview, Allocation, TickAssignment};
pub use fallback::{fill_profile_sessions, fill_todo_sessions, EnergyProfile, SessionFill};
pub use interval::{
    busy_intervals, free_intervals, free_ticks, window_from_blocks, windows_from_fixed,
    FixedCommitments, FixedEvent, FreeSlot, Interval, IntervalKind, Meal, PlanWindow, SleepWindow,
};
pub use packer::{pack, pack_activities, PackOutcome, PackerConfig};
pub use planner::{DayPlan, DayPlanner, PlacementStrategy};
pub use refine::{fit_into_windows, is_rest_label, RefineConfig};
pub use schedule::{
    ActivityIdea, BlockOrigin, CandidateTask, PlacedBlock, Shortfall, WorkItem,
};
