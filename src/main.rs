use anyhow::Result;
use cartquote::core::log::init_logging;
use cartquote::core::order::CartLine;
use clap::{CommandFactory, Parser, Subcommand};

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

impl From<Commands> for cartquote::AppCommand {
    fn from(cmd: Commands) -> cartquote::AppCommand {
        match cmd {
            Commands::Serve => cartquote::AppCommand::Serve,
            Commands::Quote { items, currency } => cartquote::AppCommand::Quote { items, currency },
            Commands::Rates { refresh } => cartquote::AppCommand::Rates { refresh },
            Commands::Products => cartquote::AppCommand::Products,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Run the HTTP API
    Serve,
    /// Price a cart, e.g. `quote --item 1:2 --item 3 --currency EUR`
    Quote {
        /// Cart line as PRODUCT_ID[:QUANTITY]
        #[arg(short, long = "item", required = true, value_parser = cartquote::cli::quote::parse_cart_line)]
        items: Vec<CartLine>,
        /// Target currency code (defaults to CZK)
        #[arg(long)]
        currency: Option<String>,
    },
    /// Show the current CNB exchange rates
    Rates {
        /// Ignore the cached table and fetch again
        #[arg(long)]
        refresh: bool,
    },
    /// List the product catalog
    Products,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => cartquote::cli::setup::setup(),
        Some(cmd) => cartquote::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
