use clap::{ArgAction, Parser, Subcommand};
use commands::{auth, config, sync};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "trakt-reconcile")]
#[command(about = "Keep the Trakt collection in line with what Radarr and Sonarr actually hold")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to a daily-rotated file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Use this configuration file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the Trakt collection against Radarr and Sonarr
    #[command(long_about = "Fetch the Trakt collection and the Radarr/Sonarr libraries, then report orphaned and missing entries. Nothing is changed on Trakt unless --live is given.")]
    Sync {
        /// Apply removals and additions to Trakt (default is a dry run)
        #[arg(long, action = ArgAction::SetTrue)]
        live: bool,
    },
    /// Authorize against Trakt and store the access token
    #[command(long_about = "Run the Trakt out-of-band OAuth flow: open the printed URL, approve the application and paste the code. The access and refresh tokens are stored in the credentials file. You'll need a Trakt API application from https://trakt.tv/oauth/applications first.")]
    Auth {
        /// Trakt Client ID (defaults to the configured value, prompts otherwise)
        #[arg(long)]
        client_id: Option<String>,

        /// Trakt Client Secret (defaults to the configured value, prompts otherwise)
        #[arg(long)]
        client_secret: Option<String>,

        /// Authorization code (prompts if not provided)
        #[arg(long)]
        code: Option<String>,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration (masks sensitive data)
    #[command(long_about = "Display the configuration after environment overrides are applied. API keys and tokens are masked unless --full is given.")]
    Show {
        /// Show secrets unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Write a template configuration file if none exists
    Init,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging_with_file(cli.verbose, cli.quiet, cli.log_file.clone())
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);
    let paths = commands::AppPaths::resolve(cli.config);

    match cli.command {
        Commands::Sync { live } => sync::run_sync(live, &paths, &output).await,
        Commands::Auth {
            client_id,
            client_secret,
            code,
        } => auth::run_auth(client_id, client_secret, code, &paths, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &paths, &output),
    }
}
