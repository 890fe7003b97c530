//! YDB CLI
//!
//! Command-line access to database nodes.
//!
//! # Commands
//!
//! - `show` - Print a key in canonical form
//! - `set` - Store a value at a node
//! - `get` - Print the value at a node
//! - `run` - Execute a script of commands on one connection
//!
//! Without the `libyottadb` feature the commands run against an in-memory
//! engine, so state only persists within one `run` script.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use ydb_core::{Conn, ConnConfig};

/// YottaDB node access from the command line.
#[derive(Parser)]
#[command(name = "ydb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Initial value buffer size in bytes
    #[arg(global = true, long)]
    value_buffer: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a key in canonical form
    Show {
        /// Variable name (prefix with ^ for a global)
        varname: String,
        /// Subscripts, in order
        subscripts: Vec<String>,
    },

    /// Store a value at a node
    Set {
        /// Variable name (prefix with ^ for a global)
        varname: String,
        /// Subscripts, in order
        subscripts: Vec<String>,
        /// Value to store
        #[arg(short = 'V', long)]
        value: String,
    },

    /// Print the value at a node
    Get {
        /// Variable name (prefix with ^ for a global)
        varname: String,
        /// Subscripts, in order
        subscripts: Vec<String>,
        /// Printed instead of failing when the node has no value
        #[arg(short, long)]
        default: Option<String>,
    },

    /// Execute a script of `set`, `get` and `show` lines
    Run {
        /// Script file
        file: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = ConnConfig::default();
    if let Some(size) = cli.value_buffer {
        config = config.value_buffer_capacity(size);
    }
    let conn = Conn::with_config(commands::open_engine(), config);
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Show {
            varname,
            subscripts,
        } => {
            commands::node::show(&conn, &varname, &subscripts, &mut stdout)?;
        }
        Commands::Set {
            varname,
            subscripts,
            value,
        } => {
            commands::node::set(&conn, &varname, &subscripts, &value)?;
        }
        Commands::Get {
            varname,
            subscripts,
            default,
        } => {
            commands::node::get(
                &conn,
                &varname,
                &subscripts,
                default.as_deref(),
                &mut stdout,
            )?;
        }
        Commands::Run { file } => {
            commands::script::run_file(&conn, &file, &mut stdout)?;
        }
        Commands::Version => {
            println!("ydb CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("binding {}", ydb_core::WRAPPER_RELEASE);
            println!("requires YottaDB {} or later", ydb_core::MINIMUM_YDB_RELEASE);
        }
    }

    Ok(())
}
