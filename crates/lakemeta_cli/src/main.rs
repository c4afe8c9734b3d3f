//! lakemeta CLI
//!
//! Operator tooling for tablet metadata kept in a local directory.
//!
//! # Commands
//!
//! - `create` - Create a tablet from a JSON schema file
//! - `show` - Print one snapshot of a tablet
//! - `list` - List snapshots or pending txn logs
//! - `put-log` - Write a JSON txn log
//! - `publish` - Fold txn logs into a new version
//! - `compact` - Print the inputs of a compaction task
//! - `schema` - Print the schema of a tablet
//! - `drop` - Delete every snapshot and txn log of a tablet

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// lakemeta command-line metadata tools.
#[derive(Parser)]
#[command(name = "lakemeta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the tablet metadata
    #[arg(global = true, short, long)]
    root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a tablet at version 1
    Create {
        /// Tablet id
        tablet: u64,

        /// Path to the JSON schema
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Print one snapshot of a tablet
    Show {
        /// Tablet id
        tablet: u64,

        /// Snapshot version
        version: u64,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List snapshots or pending txn logs
    List {
        /// Restrict the listing to one tablet
        tablet: Option<u64>,

        /// List txn logs instead of snapshots
        #[arg(short, long)]
        logs: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Write a txn log read from a JSON file
    PutLog {
        /// Path to the JSON txn log
        file: PathBuf,
    },

    /// Fold txn logs into a new version
    Publish {
        /// Tablet id
        tablet: u64,

        /// Version the logs apply to
        #[arg(short, long)]
        base: u64,

        /// Version to publish (defaults to base + 1)
        #[arg(short, long)]
        new: Option<u64>,

        /// Transaction ids, in application order
        txns: Vec<u64>,
    },

    /// Print the inputs of a compaction task
    Compact {
        /// Tablet id
        tablet: u64,

        /// Version to compact
        version: u64,

        /// Transaction id for the compaction
        #[arg(short, long)]
        txn: u64,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the schema of a tablet
    Schema {
        /// Tablet id
        tablet: u64,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Delete every snapshot and txn log of a tablet
    Drop {
        /// Tablet id
        tablet: u64,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Commands::Version = cli.command {
        println!("lakemeta CLI v{}", env!("CARGO_PKG_VERSION"));
        println!("lakemeta core v{}", lakemeta_core::VERSION);
        return Ok(());
    }

    let root = cli.root.ok_or("--root is required")?;
    let manager = commands::open(&root)?;

    match cli.command {
        Commands::Create { tablet, schema } => {
            commands::tablet::create(&manager, tablet, &schema)?;
        }
        Commands::Show {
            tablet,
            version,
            format,
        } => {
            commands::show::run(&manager, tablet, version, &format)?;
        }
        Commands::List {
            tablet,
            logs,
            format,
        } => {
            commands::list::run(&manager, tablet, logs, &format)?;
        }
        Commands::PutLog { file } => {
            commands::txn::put_log(&manager, &file)?;
        }
        Commands::Publish {
            tablet,
            base,
            new,
            txns,
        } => {
            commands::txn::publish(&manager, tablet, base, new, &txns)?;
        }
        Commands::Compact {
            tablet,
            version,
            txn,
            format,
        } => {
            commands::compact::run(&manager, tablet, version, txn, &format)?;
        }
        Commands::Schema { tablet, format } => {
            commands::tablet::schema(&manager, tablet, &format)?;
        }
        Commands::Drop { tablet } => {
            commands::tablet::drop_tablet(&manager, tablet)?;
        }
        Commands::Version => {}
    }

    Ok(())
}
