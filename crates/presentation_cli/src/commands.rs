//! Non-interactive command handlers

use std::{io::Write, path::Path};

use anyhow::{Context, Result, bail};
use domain::{ConversationId, VoiceSetting};
use tracing::info;

use crate::{app::App, render};

pub fn providers(app: &App, out: &mut impl Write) -> Result<()> {
    let providers = app.gateway.providers();
    if providers.is_empty() {
        writeln!(out, "No providers configured")?;
        return Ok(());
    }
    let active = providers.first().cloned();
    for line in render::provider_lines(&providers, active.as_ref()) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

pub async fn list_conversations(app: &App, out: &mut impl Write) -> Result<()> {
    let summaries = app.conversations.list().await?;
    if summaries.is_empty() {
        writeln!(out, "No stored conversations")?;
        return Ok(());
    }
    for summary in &summaries {
        writeln!(out, "{}", render::summary_line(summary))?;
    }
    Ok(())
}

/// Write the export to `output`, or to `out` when no file is given
pub async fn export_conversations(
    app: &App,
    output: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    let blob = app.conversations.export_all().await?;
    match output {
        Some(path) => {
            tokio::fs::write(path, blob.as_bytes())
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = blob.len(), "Conversations exported");
            writeln!(out, "Exported to {}", path.display())?;
        },
        None => writeln!(out, "{blob}")?,
    }
    Ok(())
}

pub async fn import_conversations(app: &App, file: &Path, out: &mut impl Write) -> Result<()> {
    let blob = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let count = app
        .conversations
        .import_all(&blob)
        .await
        .context("Import rejected")?;
    writeln!(out, "Imported {count} conversation(s)")?;
    Ok(())
}

pub async fn delete_conversation(app: &App, id: &str, out: &mut impl Write) -> Result<()> {
    let id = ConversationId::parse(id)?;
    if !app.conversations.delete(&id).await? {
        bail!("Conversation {id} not found");
    }
    writeln!(out, "Deleted {id}")?;
    Ok(())
}

pub async fn clear_conversations(app: &App, out: &mut impl Write) -> Result<()> {
    app.conversations.clear().await?;
    writeln!(out, "All conversations deleted")?;
    Ok(())
}

pub async fn storage_info(app: &App, out: &mut impl Write) -> Result<()> {
    let info = app.conversations.storage_info().await?;
    writeln!(out, "{}", render::storage_info(&info))?;
    Ok(())
}

pub async fn show_voice(app: &App, out: &mut impl Write) -> Result<()> {
    let profile = app.voice_settings.current().await;
    for line in render::voice_profile(&profile) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

pub async fn set_voice(
    app: &App,
    setting: VoiceSetting,
    value: f64,
    out: &mut impl Write,
) -> Result<()> {
    let profile = app.voice_settings.update(setting, value).await?;
    for line in render::voice_profile(&profile) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

pub async fn reset_voice(app: &App, out: &mut impl Write) -> Result<()> {
    app.voice_settings.reset().await?;
    writeln!(out, "Voice settings reset to defaults")?;
    Ok(())
}
