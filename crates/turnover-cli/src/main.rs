mod cmd;
mod output;
mod root;
mod session;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "turnover",
    about = "Track follow-up actions for a roster of consultants",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .turnover/ or .git/)
    #[arg(long, global = true, env = "TURNOVER_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Skip the remote store entirely
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List consultants with their current status
    List,

    /// Count consultants per status
    Summary,

    /// Add a consultant
    Add {
        name: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        mailbox: Option<String>,
    },

    /// Rename the consultant at a position
    Rename { position: usize, name: String },

    /// Change the company of the consultant at a position
    Company { position: usize, company: String },

    /// Change the mailbox of the consultant at a position
    Mailbox { position: usize, mailbox: String },

    /// Mark a consultant as active again
    Activate { position: usize },

    /// Mark a consultant as inactive
    Deactivate { position: usize },

    /// Record a follow-up action now
    Act { position: usize },

    /// Discard the roster and start again from the seed
    Reset,

    /// Pull from the remote store, optionally pushing the local roster back
    Sync {
        /// Overwrite the remote table with the local roster
        #[arg(long)]
        push: bool,
    },

    /// Keep running and re-evaluate statuses periodically
    Watch,

    /// Show or write the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Watch => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let opts = session::Options {
        json: cli.json,
        offline: cli.offline,
    };

    let result = tokio::runtime::Runtime::new()
        .map_err(anyhow::Error::from)
        .and_then(|rt| rt.block_on(dispatch(&root, cli.command, opts)));

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn dispatch(
    root: &std::path::Path,
    command: Commands,
    opts: session::Options,
) -> anyhow::Result<()> {
    use cmd::roster::Edit;

    match command {
        Commands::List => cmd::roster::list(root, opts).await,
        Commands::Summary => cmd::roster::summary(root, opts).await,
        Commands::Add {
            name,
            company,
            mailbox,
        } => cmd::roster::add(root, name, company, mailbox, opts).await,
        Commands::Rename { position, name } => {
            cmd::roster::edit(root, position, Edit::Name(name), opts).await
        }
        Commands::Company { position, company } => {
            cmd::roster::edit(root, position, Edit::Company(company), opts).await
        }
        Commands::Mailbox { position, mailbox } => {
            cmd::roster::edit(root, position, Edit::Mailbox(mailbox), opts).await
        }
        Commands::Activate { position } => {
            cmd::roster::edit(root, position, Edit::Active(true), opts).await
        }
        Commands::Deactivate { position } => {
            cmd::roster::edit(root, position, Edit::Active(false), opts).await
        }
        Commands::Act { position } => cmd::roster::edit(root, position, Edit::Action, opts).await,
        Commands::Reset => cmd::roster::reset(root, opts).await,
        Commands::Sync { push } => cmd::sync::sync(root, push, opts).await,
        Commands::Watch => cmd::sync::watch(root, opts).await,
        Commands::Config { subcommand } => cmd::config::run(root, subcommand, opts.json),
    }
}
