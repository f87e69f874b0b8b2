//! VoxChat CLI
//!
//! Terminal front end for chatting with the configured providers and for
//! managing stored conversations and voice settings.

mod app;
mod commands;
mod render;
mod repl;
#[cfg(test)]
mod test_support;

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Context;
use application::ApplicationError;
use clap::{Parser, Subcommand};
use domain::{ConversationId, ProviderId, VoiceSetting};
use infrastructure::{AppConfig, init_telemetry};
use tokio::io::BufReader;
use tracing::warn;

use crate::app::App;

/// VoxChat CLI
#[derive(Debug, Parser)]
#[command(name = "voxchat-cli")]
#[command(author, version, about = "VoxChat conversational assistant", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long, env = "VOXCHAT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start an interactive chat
    Chat {
        /// Provider to start with (defaults to the first configured one)
        #[arg(short, long)]
        provider: Option<String>,

        /// Conversation to resume
        #[arg(long, default_value = "current")]
        conversation: String,
    },

    /// List configured providers
    Providers,

    /// Manage stored conversations
    #[command(subcommand)]
    Conversations(ConversationCommands),

    /// Show or change speech output settings
    #[command(subcommand)]
    Voice(VoiceCommands),
}

#[derive(Debug, Subcommand)]
enum ConversationCommands {
    /// List stored conversations, most recent first
    List,

    /// Export every conversation as JSON
    Export {
        /// Output file (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace stored conversations with an export
    Import {
        /// Export file to read
        file: PathBuf,
    },

    /// Delete one conversation
    Delete {
        /// Conversation id
        id: String,
    },

    /// Delete every conversation
    Clear,

    /// Show storage usage
    Info,
}

#[derive(Debug, Subcommand)]
enum VoiceCommands {
    /// Show the current voice profile
    Show,

    /// Change one setting
    ///
    /// Example: voxchat-cli voice set rate 1.2
    Set {
        /// rate, pitch, volume or voice
        setting: VoiceSetting,

        /// New value
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },

    /// Restore the defaults
    Reset,
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if cli.verbose > 0 {
        config.telemetry.log_filter = log_filter_from_verbosity(cli.verbose).to_string();
    }
    init_telemetry(&config.telemetry)?;

    let app = App::build(&config)?;
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Chat {
            provider,
            conversation,
        } => {
            let engine = app.engine();
            if let Some(raw) = provider {
                engine.set_active_provider(&ProviderId::parse(&raw)?)?;
            }

            let id = ConversationId::parse(&conversation)?;
            match engine.load_conversation(&id).await {
                Ok(count) => writeln!(out, "Resumed {id} ({count} messages)")?,
                Err(ApplicationError::NotFound(_)) => {},
                Err(e) => warn!(error = %e, "Could not restore conversation"),
            }

            match engine.active_provider() {
                Some(p) => writeln!(out, "Chatting with {}. Type /help for commands.", p.label())?,
                None => writeln!(out, "No providers configured. Type /quit to leave.")?,
            }

            let stdin = BufReader::new(tokio::io::stdin());
            repl::run(&engine, stdin, &mut out).await?;
        },

        Commands::Providers => commands::providers(&app, &mut out)?,

        Commands::Conversations(cmd) => match cmd {
            ConversationCommands::List => commands::list_conversations(&app, &mut out).await?,
            ConversationCommands::Export { output } => {
                commands::export_conversations(&app, output.as_deref(), &mut out).await?;
            },
            ConversationCommands::Import { file } => {
                commands::import_conversations(&app, &file, &mut out).await?;
            },
            ConversationCommands::Delete { id } => {
                commands::delete_conversation(&app, &id, &mut out).await?;
            },
            ConversationCommands::Clear => commands::clear_conversations(&app, &mut out).await?,
            ConversationCommands::Info => commands::storage_info(&app, &mut out).await?,
        },

        Commands::Voice(cmd) => match cmd {
            VoiceCommands::Show => commands::show_voice(&app, &mut out).await?,
            VoiceCommands::Set { setting, value } => {
                commands::set_voice(&app, setting, value, &mut out).await?;
            },
            VoiceCommands::Reset => commands::reset_voice(&app, &mut out).await?,
        },
    }

    Ok(())
}
