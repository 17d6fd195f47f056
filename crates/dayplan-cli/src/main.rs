use clap::{Parser, Subcommand};

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "dayplan-cli", version, about = "Dayplan CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a full day from fixed commitments, todos, and candidates
    Plan(commands::plan::PlanArgs),
    /// Pack todos into free slots with the greedy/split packer
    Pack(commands::pack::PackArgs),
    /// Fair-share allocate free ticks among bounded todos
    Allocate(commands::allocate::AllocateArgs),
    /// Show busy intervals and free slots for a day
    Free(commands::free::FreeArgs),
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Plan(args) => commands::plan::run(args),
        Commands::Pack(args) => commands::pack::run(args),
        Commands::Allocate(args) => commands::allocate::run(args),
        Commands::Free(args) => commands::free::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
