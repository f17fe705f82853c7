mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, decision::DecisionSubcommand, micro::MicroSubcommand,
    persona::PersonaSubcommand, sprint::SprintSubcommand, task::TaskSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "msprint",
    about = "MicroSprint tracker — sprints, weighted micro-sprints, tasks and rolled-up analytics",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .msprint/)
    #[arg(long, global = true, env = "MSPRINT_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new card in the current project
    Init {
        /// Project name (default: directory name)
        name: Option<String>,
        /// Project type: software_development, legal_case or mixed
        #[arg(long = "type", value_name = "TYPE", default_value = "software_development")]
        project_type: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Owner (default: config defaults.owner, then $USER)
        #[arg(long)]
        owner: Option<String>,
        /// Active persona: software_engineer or lawyer
        #[arg(long)]
        persona: Option<String>,
    },

    /// Project dashboard: completion, sprint counts, current sprint
    Status,

    /// Show the full sprint / micro-sprint / task tree
    Show,

    /// Recompute every derived field and save if anything was stale
    Rollup,

    /// Manage sprints
    Sprint {
        #[command(subcommand)]
        subcommand: SprintSubcommand,
    },

    /// Manage micro-sprints
    Micro {
        #[command(subcommand)]
        subcommand: MicroSubcommand,
    },

    /// Manage tasks
    Task {
        #[command(subcommand)]
        subcommand: TaskSubcommand,
    },

    /// Show or switch the active persona
    Persona {
        #[command(subcommand)]
        subcommand: PersonaSubcommand,
    },

    /// Record and list project decisions
    Decision {
        #[command(subcommand)]
        subcommand: DecisionSubcommand,
    },

    /// Replace the card with one read from a JSON file
    Import {
        file: PathBuf,
        /// Overwrite an existing card
        #[arg(long)]
        force: bool,
    },

    /// Write a dated copy of the card
    Export {
        /// Target directory (default: config export.dir, then the project root)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Build a card from a YAML or JSON project outline
    Draft {
        outline: PathBuf,
        #[arg(long = "type", value_name = "TYPE", default_value = "software_development")]
        project_type: String,
        #[arg(long, default_value = "software_engineer")]
        persona: String,
        /// First sprint start date (default: today)
        #[arg(long)]
        start: Option<chrono::NaiveDate>,
        /// Overwrite an existing card
        #[arg(long)]
        force: bool,
    },

    /// Inspect and validate .msprint/config.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    tracing::debug!(root = %root.display(), "resolved project root");

    let result = match cli.command {
        Commands::Init {
            name,
            project_type,
            description,
            owner,
            persona,
        } => cmd::init::run(
            &root,
            cmd::init::InitArgs {
                name,
                project_type,
                description,
                owner,
                persona,
            },
            cli.json,
        ),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Show => cmd::show::run(&root, cli.json),
        Commands::Rollup => cmd::rollup::run(&root, cli.json),
        Commands::Sprint { subcommand } => cmd::sprint::run(&root, subcommand, cli.json),
        Commands::Micro { subcommand } => cmd::micro::run(&root, subcommand, cli.json),
        Commands::Task { subcommand } => cmd::task::run(&root, subcommand, cli.json),
        Commands::Persona { subcommand } => cmd::persona::run(&root, subcommand, cli.json),
        Commands::Decision { subcommand } => cmd::decision::run(&root, subcommand, cli.json),
        Commands::Import { file, force } => cmd::import::run(&root, &file, force, cli.json),
        Commands::Export { out } => cmd::export::run(&root, out.as_deref(), cli.json),
        Commands::Draft {
            outline,
            project_type,
            persona,
            start,
            force,
        } => cmd::draft::run(
            &root,
            &outline,
            &project_type,
            &persona,
            start,
            force,
            cli.json,
        ),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
