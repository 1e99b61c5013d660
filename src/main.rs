use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

const LOG_ENV: &str = "KILN_LOG";

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Set up projects, applications and environments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new application in a project, optionally deploying a test environment
    Init {
        /// Name of the project
        #[arg(short, long, default_value = "")]
        project: String,

        /// Name of the application
        #[arg(short, long, default_value = "")]
        app: String,

        /// Type of application to create
        #[arg(short = 't', long = "app-type", default_value = "")]
        app_type: String,

        /// Deploy a test environment without asking
        #[arg(long)]
        deploy: bool,

        /// Do not deploy a test environment
        #[arg(long)]
        skip_deploy: bool,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            project,
            app,
            app_type,
            deploy,
            skip_deploy,
        } => {
            commands::init::execute(project, app, app_type, deploy, skip_deploy)?;
        }
    }

    Ok(())
}
