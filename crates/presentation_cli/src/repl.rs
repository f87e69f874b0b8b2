//! Interactive chat loop

use std::io::Write;

use anyhow::Result;
use application::{ApplicationError, ConversationEngine};
use domain::{ConversationId, ProviderId};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::render;

const HELP: &str = "\
/providers      list configured providers
/use <id>       switch the active provider
/history        show the current conversation
/new            start a new conversation
/load <id>      restore a stored conversation
/help           show this help
/quit           leave the chat
Anything else is sent as a prompt.";

/// A single line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Prompt(String),
    Providers,
    Use(String),
    History,
    New,
    Load(String),
    Help,
    Quit,
    Empty,
    Invalid(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Prompt(line.to_string());
        };

        let (name, arg) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(n, a)| (n, a.trim()));

        match (name, arg) {
            ("providers", _) => Self::Providers,
            ("history", _) => Self::History,
            ("new", _) => Self::New,
            ("help", _) => Self::Help,
            ("quit" | "exit", _) => Self::Quit,
            ("use", id) if !id.is_empty() => Self::Use(id.to_string()),
            ("load", id) if !id.is_empty() => Self::Load(id.to_string()),
            ("use" | "load", _) => Self::Invalid(format!("/{name} needs an id")),
            _ => Self::Invalid(format!("unknown command /{name}, try /help")),
        }
    }
}

/// Run the chat loop until `/quit` or end of input
pub async fn run<R, W>(engine: &ConversationEngine, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        match ReplCommand::parse(&line) {
            ReplCommand::Empty => {},
            ReplCommand::Quit => break,
            ReplCommand::Help => writeln!(out, "{HELP}")?,
            ReplCommand::Invalid(reason) => writeln!(out, "{reason}")?,
            ReplCommand::Providers => {
                let active = engine.active_provider();
                for line in render::provider_lines(engine.providers(), active.as_ref()) {
                    writeln!(out, "{line}")?;
                }
            },
            ReplCommand::Use(raw) => {
                let result = ProviderId::parse(&raw)
                    .map_err(ApplicationError::from)
                    .and_then(|id| engine.set_active_provider(&id));
                match result {
                    Ok(()) => {
                        let label = engine
                            .active_provider()
                            .map_or_else(|| raw.clone(), |p| p.label());
                        writeln!(out, "Now using {label}")?;
                    },
                    Err(e) => writeln!(out, "{e}")?,
                }
            },
            ReplCommand::History => {
                for msg in engine.messages() {
                    writeln!(out, "{}", render::message(&msg))?;
                }
            },
            ReplCommand::New => match engine.new_conversation() {
                Ok(id) => writeln!(out, "Started conversation {id}")?,
                Err(e) => writeln!(out, "{e}")?,
            },
            ReplCommand::Load(raw) => {
                let result = match ConversationId::parse(&raw) {
                    Ok(id) => engine.load_conversation(&id).await,
                    Err(e) => Err(e.into()),
                };
                match result {
                    Ok(count) => writeln!(out, "Loaded {raw} ({count} messages)")?,
                    Err(e) => writeln!(out, "{e}")?,
                }
            },
            ReplCommand::Prompt(text) => match engine.submit(&text).await {
                Ok(Some(reply)) => writeln!(out, "{}", render::message(&reply))?,
                Ok(None) => {},
                Err(e) => writeln!(out, "{e}")?,
            },
        }
    }

    debug!(conversation_id = %engine.conversation_id(), "Chat loop finished");
    Ok(())
}
