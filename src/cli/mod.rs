//! CLI module for Taalcoach.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::config::Settings;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Taalcoach - a team of Dutch coaching agents
///
/// Each command runs one agent on your input. The agent writes its lesson,
/// plan or conversation summary to a Google Doc and replies with the link.
#[derive(Parser, Debug)]
#[command(name = "taalcoach")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(flatten)]
    pub keys: ApiKeys,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// The config file in effect: `--config` if given, otherwise the default location.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .as_deref()
            .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
            .unwrap_or_else(Settings::default_config_path)
    }
}

/// API keys supplied on the command line or through the environment.
#[derive(Args, Debug, Clone, Default)]
pub struct ApiKeys {
    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub openai_api_key: Option<String>,

    /// Composio API key
    #[arg(long, env = "COMPOSIO_API_KEY", hide_env_values = true, global = true)]
    pub composio_api_key: Option<String>,
}

/// Where to read a command's text from.
#[derive(Args, Debug, Clone)]
pub struct TextInput {
    /// The text itself (use '-' to read from stdin)
    pub text: Option<String>,

    /// Read the text from a file instead
    #[arg(short, long, conflicts_with = "text")]
    pub file: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Learn new vocabulary based on today's exercises
    Daily {
        #[command(flatten)]
        input: TextInput,
    },

    /// Get a grammar lesson based on today's exercises
    Grammar {
        #[command(flatten)]
        input: TextInput,
    },

    /// Practice a simulated Dutch conversation
    Converse,

    /// Build next week's study plan from a summary of this week
    Weekly {
        #[command(flatten)]
        input: TextInput,
    },

    /// List the coaching agents and their instructions
    Roles,

    /// Check credentials, configuration and document tools
    Doctor,

    /// Start HTTP API server exposing the coaching actions
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration (keys masked)
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
