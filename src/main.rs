use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use feedscope::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for feedscope::AppCommand {
    fn from(cmd: Commands) -> feedscope::AppCommand {
        match cmd {
            Commands::Changes { watch } => feedscope::AppCommand::Changes { watch },
            Commands::Components {
                symbol,
                search,
                sort,
                descending,
                page,
                page_size,
            } => feedscope::AppCommand::Components(feedscope::ComponentsArgs {
                symbol,
                search,
                sort,
                descending,
                page,
                page_size,
            }),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display price changes against yesterday's reference prices
    Changes {
        /// Keep refreshing the screen until interrupted
        #[arg(short, long)]
        watch: bool,
    },
    /// Display publisher quality scores for a price feed
    Components {
        /// Feed symbol, may be omitted when a single feed is configured
        symbol: Option<String>,

        /// Only show components whose id or name contains this text
        #[arg(long, default_value = "")]
        search: String,

        /// Column to sort by: score, name, uptime-score, deviation-score,
        /// deviation-penalty, stalled-score or stalled-penalty
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending instead of ascending
        #[arg(long)]
        descending: Option<bool>,

        /// Page to show
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Rows per page: 10, 20, 30, 40 or 50
        #[arg(long)]
        page_size: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => feedscope::cli::setup::setup(),
        Some(cmd) => feedscope::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
