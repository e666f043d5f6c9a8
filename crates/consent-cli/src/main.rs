//! consent - author, sign, print and export consent agreements
//!
//! Records live in one JSON slot under the user's data directory (or the
//! directory set in configuration). Documents are rendered from the stored
//! record every time, so the terminal view, the print page and the exported
//! PNG always show the same content.

use clap::{Parser, Subcommand};
use consent_types::PartySlot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;

use commands::{document, record, template, Context};
use config::CliConfig;

#[derive(Parser)]
#[command(name = "consent")]
#[command(about = "Consent agreements - create, sign, print and export", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CONSENT_CONFIG")]
    config: Option<String>,

    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table")]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an agreement
    #[command(alias = "new")]
    Create(record::CreateArgs),

    /// List agreements
    #[command(alias = "ls")]
    List,

    /// Show one agreement
    View {
        /// Agreement ID or unique prefix
        id: String,
    },

    /// Sign an agreement for one party
    Sign {
        /// Agreement ID or unique prefix
        id: String,

        /// Party to sign for (a or b)
        party: PartySlot,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete an agreement
    #[command(alias = "rm")]
    Delete {
        /// Agreement ID or unique prefix
        id: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Write the print page for an agreement
    Print {
        /// Agreement ID or unique prefix
        id: String,
    },

    /// Export an agreement as PNG
    Export {
        /// Agreement ID or unique prefix
        id: String,
    },

    /// List built-in templates
    Templates,

    /// Show configuration
    Config,
}

fn init_tracing(config: &CliConfig, verbose: bool) {
    let level = if verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref())?;
    init_tracing(&config, cli.verbose);

    if let Commands::Config = cli.command {
        output::print_single(&config, output::OutputFormat::Yaml)?;
        return Ok(());
    }

    let ctx = Context::from_config(config)?;
    let format = cli.output;

    match cli.command {
        Commands::Create(args) => record::create(&ctx, args, format)?,
        Commands::List => record::list(&ctx, format)?,
        Commands::View { id } => record::view(&ctx, &id, format)?,
        Commands::Sign { id, party, yes } => record::sign(&ctx, &id, party, yes, format)?,
        Commands::Delete { id, yes } => record::delete(&ctx, &id, yes)?,
        Commands::Print { id } => document::print(&ctx, &id, format).await?,
        Commands::Export { id } => document::export(&ctx, &id, format).await?,
        Commands::Templates => template::list(format)?,
        Commands::Config => {}
    }
    Ok(())
}
