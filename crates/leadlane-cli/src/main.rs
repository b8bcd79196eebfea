#![forbid(unsafe_code)]

mod cmd;
mod demo;
mod output;
mod stats;
mod tui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use demo::{DemoEnv, DemoOpts};
use output::OutputMode;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "leadlane: panel de leads con tabla, tablero y sincronización en vivo",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Seed for the demo data generator.
    #[arg(long, global = true, default_value = "2026")]
    seed: u64,

    /// Override the number of generated sample leads.
    #[arg(long, global = true)]
    seed_count: Option<usize>,

    /// JSON file with extra draft leads (wire field names).
    #[arg(long, global = true)]
    seed_file: Option<PathBuf>,

    /// Explicit config file path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.json)
    }

    fn demo_opts(&self) -> DemoOpts {
        DemoOpts {
            seed: self.seed,
            seed_count: self.seed_count,
            seed_file: self.seed_file.clone(),
            config: self.config.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Panel",
        about = "Open the interactive dashboard",
        after_help = "EXAMPLES:\n    # Dashboard with live background activity\n    lane tui\n\n    # Reproducible demo data\n    lane tui --seed 7 --seed-count 20"
    )]
    Tui,

    #[command(
        next_help_heading = "Read",
        about = "List leads with filters",
        after_help = "EXAMPLES:\n    # Contacted leads awaiting classification\n    lane list --status contactado --classification pendiente\n\n    # Free-text search, machine-readable\n    lane list --query maria --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show the pipeline board (three status columns)",
        after_help = "EXAMPLES:\n    lane board\n    lane board --json"
    )]
    Board(cmd::board::BoardArgs),

    #[command(
        next_help_heading = "Read",
        about = "Pipeline summary numbers",
        after_help = "EXAMPLES:\n    lane stats\n    lane stats --json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Write",
        about = "Create a lead",
        after_help = "EXAMPLES:\n    lane create --name \"Laura Vidal\" --phone \"+52 55 1020 3040\" --vehicle Rav4"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Write",
        about = "Edit a lead's contact fields",
        after_help = "EXAMPLES:\n    lane edit ld-0003 --phone 5599887766\n    lane edit ld-0003 --clear-comment"
    )]
    Edit(cmd::edit::EditArgs),

    #[command(
        name = "move",
        next_help_heading = "Write",
        about = "Change a lead's pipeline status",
        after_help = "EXAMPLES:\n    lane move ld-0003 contactado\n    lane move ld-0003 perdido"
    )]
    Move(cmd::move_cmd::MoveArgs),

    #[command(
        next_help_heading = "Write",
        about = "Delete a lead",
        after_help = "EXAMPLES:\n    lane delete ld-0003"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Write",
        about = "Export the filtered table to CSV",
        after_help = "EXAMPLES:\n    # Everything, default filename leads_<fecha>.csv\n    lane export\n\n    # Only closed leads, explicit path\n    lane export --status cerrado --out cerrados.csv"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Catalog",
        about = "Manage the vehicle catalog",
        after_help = "EXAMPLES:\n    lane vehicles list\n    lane vehicles add \"Toyota Corolla\"\n    lane vehicles rm veh-004"
    )]
    Vehicles(cmd::vehicles::VehiclesArgs),

    #[command(
        next_help_heading = "Session",
        about = "Sign in against the auth service",
        after_help = "EXAMPLES:\n    lane login --email demo@leadlane.mx --password demo123"
    )]
    Login(cmd::auth::LoginArgs),

    #[command(next_help_heading = "Session", about = "Sign out and clear the stored session")]
    Logout,

    #[command(next_help_heading = "Session", about = "Show the signed-in account")]
    Whoami,

    #[command(
        next_help_heading = "Diagnostics",
        about = "Run a deterministic sync convergence campaign",
        after_help = "EXAMPLES:\n    lane sim\n    lane sim --rounds 200 --json\n    lane --seed 99 sim"
    )]
    Sim(cmd::sim::SimArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LANE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if std::env::var("DEBUG").is_ok() {
            "leadlane=debug,info"
        } else {
            "leadlane=info,warn"
        })
    });

    let format = std::env::var("LANE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }
    let output = cli.output_mode();

    match &cli.command {
        Commands::Tui => {
            let env = DemoEnv::bootstrap(&cli.demo_opts())?;
            tui::run_tui(&env, cli.seed)
        }
        Commands::List(args) => cmd::list::run_list(args, &DemoEnv::bootstrap(&cli.demo_opts())?, output),
        Commands::Board(args) => {
            cmd::board::run_board(args, &DemoEnv::bootstrap(&cli.demo_opts())?, output)
        }
        Commands::Stats(args) => {
            cmd::stats::run_stats(args, &DemoEnv::bootstrap(&cli.demo_opts())?, output)
        }
        Commands::Create(args) => {
            cmd::create::run_create(args, &DemoEnv::bootstrap(&cli.demo_opts())?, output)
        }
        Commands::Edit(args) => cmd::edit::run_edit(args, &DemoEnv::bootstrap(&cli.demo_opts())?, output),
        Commands::Move(args) => {
            cmd::move_cmd::run_move(args, &DemoEnv::bootstrap(&cli.demo_opts())?, output)
        }
        Commands::Delete(args) => {
            cmd::delete::run_delete(args, &DemoEnv::bootstrap(&cli.demo_opts())?, output)
        }
        Commands::Export(args) => {
            cmd::export::run_export(args, &DemoEnv::bootstrap(&cli.demo_opts())?, output)
        }
        Commands::Vehicles(args) => {
            cmd::vehicles::run_vehicles(args, &DemoEnv::bootstrap(&cli.demo_opts())?, output)
        }
        Commands::Login(args) => {
            cmd::auth::run_login(args, &DemoEnv::bootstrap(&cli.demo_opts())?, output)
        }
        Commands::Logout => cmd::auth::run_logout(&DemoEnv::bootstrap(&cli.demo_opts())?, output),
        Commands::Whoami => cmd::auth::run_whoami(output),
        Commands::Sim(args) => cmd::sim::run_sim(args, cli.seed, output),
    }
}
