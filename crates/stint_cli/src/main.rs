//! Stint CLI
//!
//! Headless time tracking: record sessions from scripts and cron jobs,
//! run the sync server, and sync a replica against it.
//!
//! # Commands
//!
//! - `serve` - Run the sync server
//! - `sync` - Run one sync round against a server
//! - `gen-token` - Generate an API token for the server's tokens file
//! - `session`, `frame`, `task` - Record keeping
//! - `export` - Print the store's snapshot as JSON

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use stint_sync_engine::ResolvePolicy;
use tracing_subscriber::EnvFilter;

/// Pomodoro-style time tracking with multi-device sync.
#[derive(Parser)]
#[command(name = "stint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the sqlite database
    #[arg(global = true, long, default_value = "stint.db")]
    db_path: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sync server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// Path to the tokens file
        #[arg(long, default_value = "tokens.json")]
        tokens_path: PathBuf,
    },

    /// Run one sync round against a server
    Sync {
        /// Server base URL, e.g. http://localhost:8080
        #[arg(long)]
        server: String,

        /// API token
        #[arg(long)]
        token: String,

        /// Path of the baseline snapshot file
        #[arg(long, default_value = "stint.baseline.json")]
        baseline: PathBuf,

        /// What to do with conflicting edits
        #[arg(long, value_enum, default_value_t = ResolveArg::Fail)]
        resolve: ResolveArg,
    },

    /// Generate an API token and print its tokens-file entry
    GenToken {
        /// Client name recorded in the tokens file
        #[arg(short, long, default_value = "client")]
        name: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Work with sessions
    #[command(subcommand)]
    Session(SessionCommand),

    /// Work with timeframes
    #[command(subcommand)]
    Frame(FrameCommand),

    /// Work with tasks
    #[command(subcommand)]
    Task(TaskCommand),

    /// Print the store's full snapshot as JSON
    Export,

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Add a session, optionally with one finished timeframe
    Add {
        /// What the session is about
        #[arg(short, long)]
        description: String,

        /// Free-form notes
        #[arg(short, long, default_value = "")]
        notes: String,

        /// Task the session contributes to
        #[arg(long)]
        task_id: Option<String>,

        /// Timeframe start (RFC 3339)
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// Timeframe end (RFC 3339)
        #[arg(long, requires = "from")]
        to: Option<String>,
    },

    /// List sessions, most recent activity first
    List {
        /// Maximum number of sessions to print
        #[arg(short, long, default_value_t = 20)]
        limit: u32,

        /// Skip this many sessions
        #[arg(short, long, default_value_t = 0)]
        offset: u32,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace a session's notes
    Note {
        /// Session ID
        #[arg(long)]
        id: String,

        /// New notes
        #[arg(short, long)]
        notes: String,
    },
}

#[derive(Subcommand)]
enum FrameCommand {
    /// Add a timeframe to a session
    Add {
        /// Owning session ID
        #[arg(long)]
        session_id: String,

        /// Start (RFC 3339)
        #[arg(long)]
        from: String,

        /// End (RFC 3339)
        #[arg(long)]
        to: String,

        /// Mark the frame finished
        #[arg(long)]
        done: bool,
    },

    /// List a session's timeframes
    List {
        /// Owning session ID
        #[arg(long)]
        session_id: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark a timeframe finished
    Done {
        /// Owning session ID
        #[arg(long)]
        session_id: String,

        /// Timeframe ID
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand)]
enum TaskCommand {
    /// Add a task
    Add {
        /// What the task is about
        #[arg(short, long)]
        description: String,
    },

    /// List tasks
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Conflict policy accepted by `sync --resolve`.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResolveArg {
    /// Stop and report the conflicts without writing anything
    Fail,
    /// Reassert this replica's side of every conflict
    Local,
    /// Adopt the server's side of every conflict
    Remote,
}

impl ResolveArg {
    fn policy(self) -> ResolvePolicy {
        match self {
            ResolveArg::Fail => ResolvePolicy::Fail,
            ResolveArg::Local => ResolvePolicy::Local,
            ResolveArg::Remote => ResolvePolicy::Remote,
        }
    }
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

    match cli.command {
        Commands::Serve { bind, tokens_path } => {
            commands::serve::run(bind, &cli.db_path, &tokens_path)?;
        }
        Commands::Sync {
            server,
            token,
            baseline,
            resolve,
        } => {
            commands::sync::run(&server, &token, &cli.db_path, &baseline, resolve.policy())?;
        }
        Commands::GenToken { name, json } => {
            commands::gen_token::run(&name, json)?;
        }
        Commands::Session(command) => match command {
            SessionCommand::Add {
                description,
                notes,
                task_id,
                from,
                to,
            } => {
                commands::session::add(
                    &cli.db_path,
                    &description,
                    &notes,
                    task_id,
                    from.as_deref(),
                    to.as_deref(),
                )?;
            }
            SessionCommand::List {
                limit,
                offset,
                json,
            } => {
                commands::session::list(&cli.db_path, limit, offset, json)?;
            }
            SessionCommand::Note { id, notes } => {
                commands::session::note(&cli.db_path, &id, &notes)?;
            }
        },
        Commands::Frame(command) => match command {
            FrameCommand::Add {
                session_id,
                from,
                to,
                done,
            } => {
                commands::frame::add(&cli.db_path, &session_id, &from, &to, done)?;
            }
            FrameCommand::List { session_id, json } => {
                commands::frame::list(&cli.db_path, &session_id, json)?;
            }
            FrameCommand::Done { session_id, id } => {
                commands::frame::done(&cli.db_path, &session_id, &id)?;
            }
        },
        Commands::Task(command) => match command {
            TaskCommand::Add { description } => {
                commands::task::add(&cli.db_path, &description)?;
            }
            TaskCommand::List { json } => {
                commands::task::list(&cli.db_path, json)?;
            }
        },
        Commands::Export => {
            commands::export::run(&cli.db_path)?;
        }
        Commands::Version => {
            println!("stint v{}", env!("CARGO_PKG_VERSION"));
            println!("store schema v{}", stint_store::latest_version());
        }
    }

    Ok(())
}
