use clap::{Parser, Subcommand};
use tracing::Level;

mod error;
mod export;
mod import;
mod import_key;
mod list;

use error::Result;

#[derive(Parser)]
#[command(name = "hashi")]
#[command(about = "Bridge PEM bundles into password-protected PKCS#12 keystores", long_about = None)]
struct Cli {
    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Verbose diagnostics
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List keystore entries with their subject names
    List {
        #[command(flatten)]
        config: list::Config,
    },
    /// Import certificates from PEM bundles or other keystores
    Import {
        #[command(flatten)]
        config: import::Config,
    },
    /// Import a private key with its certificate under an alias
    ImportKey {
        #[command(flatten)]
        config: import_key::Config,
    },
    /// Export keystore entries to a PEM bundle
    Export {
        #[command(flatten)]
        config: export::Config,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else if cli.debug {
        Level::TRACE
    } else {
        Level::INFO
    };
    // keep stdout for command output, diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::List { config } => list::execute(config),
        Commands::Import { config } => import::execute(config),
        Commands::ImportKey { config } => import_key::execute(config),
        Commands::Export { config } => export::execute(config),
    }
}
