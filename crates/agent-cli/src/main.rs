//! rust-agent terminal chat
//!
//! Reads prompts from stdin, lets the model use local tools, and prints the
//! conversation to stdout. Logs go to stderr.

mod console;

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{Agent, AgentBuilder, Session};
use agent_runtime::{AnthropicConfig, AnthropicProvider};
use agent_tools::{ToolOptions, Toolset};

use crate::console::{ConsoleTranscript, StdinInput};

/// Chat with a model that can read, search, run and edit files
#[derive(Parser, Debug)]
#[command(name = "agent", version)]
struct Cli {
    /// Enable verbose logging on stderr
    #[arg(long)]
    verbose: bool,

    /// Tools offered to the model
    #[arg(long, value_enum, default_value = "edit")]
    toolset: ToolsetArg,

    /// Model name (overrides MODEL_NAME)
    #[arg(long)]
    model: Option<String>,

    /// Extra directory name for list_files to skip (repeatable)
    #[arg(long = "ignore-dir", value_name = "NAME")]
    ignore_dirs: Vec<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ToolsetArg {
    Chat,
    Search,
    Edit,
    All,
}

impl From<ToolsetArg> for Toolset {
    fn from(arg: ToolsetArg) -> Self {
        match arg {
            ToolsetArg::Chat => Self::Chat,
            ToolsetArg::Search => Self::Search,
            ToolsetArg::Edit => Self::Edit,
            ToolsetArg::All => Self::All,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new(
                "warn,agent_core=debug,agent_runtime=debug,agent_tools=debug,agent=debug",
            )
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_agent(cli: &Cli) -> anyhow::Result<Agent> {
    let mut config = AnthropicConfig::from_env()?;
    if let Some(model) = &cli.model {
        config = config.with_model(model.clone());
    }
    let provider = AnthropicProvider::new(config)?;
    tracing::debug!("Anthropic client initialized");

    let toolset = Toolset::from(cli.toolset);
    let tools = toolset.registry(&ToolOptions {
        ignored_dirs: cli.ignore_dirs.clone(),
    })?;
    tracing::debug!(
        toolset = %toolset,
        tools = ?tools.names(),
        "Initialized {} tools",
        tools.len()
    );

    Ok(AgentBuilder::new()
        .provider(Arc::new(provider))
        .tools(tools)
        .build()?)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let agent = match build_agent(&cli) {
        Ok(agent) => agent,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let mut session = Session::new(cli.verbose);
    let mut input = StdinInput::new();
    let mut transcript = ConsoleTranscript::stdout();

    // Ctrl-C ends the session wherever the loop is
    let outcome = tokio::select! {
        result = agent.run(&mut session, &mut input, &mut transcript) => result,
        _ = tokio::signal::ctrl_c() => {
            println!();
            tracing::debug!("Interrupted");
            Ok(())
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_fatal() => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
