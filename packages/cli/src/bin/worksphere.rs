use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::*;

mod cli;

use cli::assets::AssetsCommands;
use cli::employees::EmployeesCommands;
use cli::tenants::TenantsCommands;
use worksphere_cli::logging::init_tracing;
use worksphere_cli::{Portal, TerminalNotifier};
use worksphere_config::PortalConfig;

#[derive(Parser)]
#[command(name = "worksphere")]
#[command(about = "WorkSphere CLI - HR, asset and tenant management portal")]
#[command(version)]
struct Cli {
    /// Show debug logs (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to a tenant through its identity provider
    Login {
        /// Tenant (organisation) name
        tenant: String,

        /// Log in again even if a session exists
        #[arg(long)]
        force: bool,

        /// Print the login URL instead of opening a browser
        #[arg(long)]
        no_browser: bool,
    },
    /// Forget the local session
    Logout,
    /// Show the current session
    Status,
    /// Check whether a portal page is reachable with the current session
    Open {
        /// Page path, e.g. /dashboard/hrms
        path: String,
    },
    /// Employee records and leave
    #[command(subcommand)]
    Employees(EmployeesCommands),
    /// Asset inventory
    #[command(subcommand)]
    Assets(AssetsCommands),
    /// Tenant provisioning
    #[command(subcommand)]
    Tenants(TenantsCommands),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = handle_command(cli.command).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn handle_command(command: Commands) -> anyhow::Result<()> {
    let config = PortalConfig::from_env()?;
    let portal = Portal::open(config, Arc::new(TerminalNotifier)).await?;

    match command {
        Commands::Login {
            tenant,
            force,
            no_browser,
        } => cli::auth::login_command(&portal, &tenant, force, no_browser).await,
        Commands::Logout => cli::auth::logout_command(&portal).await,
        Commands::Status => cli::auth::status_command(&portal).await,
        Commands::Open { path } => cli::auth::open_command(&portal, &path).await,
        Commands::Employees(cmd) => cmd.execute(&portal).await,
        Commands::Assets(cmd) => cmd.execute(&portal).await,
        Commands::Tenants(cmd) => cmd.execute(&portal).await,
    }
}
