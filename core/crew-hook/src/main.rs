//! crew-hook: CLI entry points for agent lifecycle events.
//!
//! Each subcommand maps to one lifecycle event of the agent process it
//! publishes for. Invocations are independent processes, so the record for
//! the target pid is resumed from the store, mutated, and republished;
//! `created_at` and `turn_count` survive across invocations.
//!
//! `--pid` names the agent process being described. It defaults to the
//! invoking process, which is only right when the agent runs crew-hook
//! in-process; wrapper scripts publishing on an agent's behalf pass the
//! agent's pid explicitly.

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use crew_core::{AgentIdentity, HeartbeatHandle, HeartbeatStore, Result, StorageConfig};

#[derive(Parser)]
#[command(name = "crew-hook")]
#[command(about = "Publishes agent lifecycle events into the crew heartbeat store")]
#[command(version)]
struct Cli {
    /// Process id of the agent the event describes (defaults to this process)
    #[arg(long, global = true)]
    pid: Option<u32>,

    /// Workspace directory the agent operates in (defaults to the cwd)
    #[arg(long, global = true)]
    workdir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish the initial heartbeat record for an agent process
    Announce {
        /// Repository identity label
        #[arg(long)]
        repo: Option<String>,

        /// Branch the agent works on
        #[arg(long)]
        branch: Option<String>,
    },

    /// Periodic keep-alive republish
    Tick,

    /// The agent began generating a response
    StreamStart,

    /// The agent stopped generating a response
    StreamStop,

    /// The agent began executing a named tool
    ToolStart {
        #[arg(long)]
        tool: String,
    },

    /// The tool finished
    ToolStop,

    /// The agent selected a model identity
    Model {
        #[arg(long)]
        model: String,
    },

    /// Record an inbound or outbound message excerpt
    Message {
        #[arg(long, value_enum)]
        role: Role,

        #[arg(long)]
        text: String,
    },

    /// A conversational turn ended
    TurnEnd,

    /// Associate the agent with its own session log file
    LinkHistory {
        #[arg(long)]
        file: String,
    },

    /// Retract the record at clean shutdown
    Retire,
}

#[derive(Clone, Copy, ValueEnum)]
enum Role {
    User,
    Agent,
}

fn main() -> ExitCode {
    let storage = StorageConfig::default();
    let _logging_guard = logging::init(&storage);

    let cli = Cli::parse();
    match run(&storage, cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "crew-hook failed");
            ExitCode::FAILURE
        }
    }
}

fn run(storage: &StorageConfig, cli: Cli) -> Result<()> {
    let store = HeartbeatStore::new(storage.heartbeats_dir());
    let identity = identity_from(cli.pid, cli.workdir)?;

    match cli.command {
        Commands::Announce { repo, branch } => {
            HeartbeatHandle::register(store, identity.with_repo(repo, branch))?;
            Ok(())
        }
        Commands::Tick => HeartbeatHandle::resume(store, identity)?.tick(),
        Commands::StreamStart => HeartbeatHandle::resume(store, identity)?.response_started(),
        Commands::StreamStop => HeartbeatHandle::resume(store, identity)?.response_finished(),
        Commands::ToolStart { tool } => HeartbeatHandle::resume(store, identity)?.tool_started(&tool),
        Commands::ToolStop => HeartbeatHandle::resume(store, identity)?.tool_finished(),
        Commands::Model { model } => HeartbeatHandle::resume(store, identity)?.model_selected(&model),
        Commands::Message { role, text } => {
            let mut handle = HeartbeatHandle::resume(store, identity)?;
            match role {
                Role::User => handle.user_message(&text),
                Role::Agent => handle.agent_reply(&text),
            }
        }
        Commands::TurnEnd => HeartbeatHandle::resume(store, identity)?.turn_completed(),
        Commands::LinkHistory { file } => {
            HeartbeatHandle::resume(store, identity)?.link_history_file(&file)
        }
        Commands::Retire => HeartbeatHandle::resume(store, identity)?.retire(),
    }
}

fn identity_from(pid: Option<u32>, workdir: Option<PathBuf>) -> Result<AgentIdentity> {
    match (pid, workdir) {
        (Some(pid), Some(workdir)) => Ok(AgentIdentity::for_process(pid, workdir)),
        (Some(pid), None) => {
            let identity = AgentIdentity::current()?;
            Ok(AgentIdentity::for_process(pid, identity.working_directory))
        }
        (None, Some(workdir)) => Ok(AgentIdentity::for_process(std::process::id(), workdir)),
        (None, None) => AgentIdentity::current(),
    }
}
