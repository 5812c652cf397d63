use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use exrates::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Rate store to query: ecb, ecb90d, ecbdb, converter or mock
    #[arg(short, long, global = true)]
    store: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the exchange rate for a single date
    Rate {
        /// Currency to convert from
        #[arg(long, default_value = "EUR")]
        from: String,
        /// Currency to convert to
        #[arg(long, default_value = "USD")]
        to: String,
        /// Date as YYYY-MM-DD, defaults to yesterday
        #[arg(long)]
        date: Option<String>,
    },
    /// Display every known exchange rate within a month
    Month {
        /// Currency to convert from
        #[arg(long, default_value = "EUR")]
        from: String,
        /// Currency to convert to
        #[arg(long, default_value = "USD")]
        to: String,
        #[arg(long)]
        year: i32,
        /// Month number, 1 to 12
        #[arg(long)]
        month: u32,
    },
}

impl From<Commands> for exrates::AppCommand {
    fn from(cmd: Commands) -> exrates::AppCommand {
        match cmd {
            Commands::Rate { from, to, date } => exrates::AppCommand::Rate { from, to, date },
            Commands::Month {
                from,
                to,
                year,
                month,
            } => exrates::AppCommand::Month {
                from,
                to,
                year,
                month,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => exrates::cli::setup::setup(),
        Some(cmd) => {
            exrates::run_command(
                cmd.into(),
                cli.config_path.as_deref(),
                cli.store.as_deref(),
            )
            .await
        }
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
