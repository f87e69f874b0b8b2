//! Plain-text rendering for terminal output

use application::{ProviderInfo, StorageInfo};
use chrono::Local;
use domain::{ChatMessage, ContentSegment, ConversationSummary, VoiceProfile, extract_segments};

/// One line per provider, marking the active one
pub fn provider_lines(providers: &[ProviderInfo], active: Option<&ProviderInfo>) -> Vec<String> {
    providers
        .iter()
        .map(|p| {
            let marker = if active.is_some_and(|a| a.id == p.id) {
                '*'
            } else {
                ' '
            };
            format!(
                "{marker} {:<16} {} ({}, {})",
                p.id.as_str(),
                p.label(),
                p.family,
                p.model
            )
        })
        .collect()
}

/// Render a message with fenced code set off by language
pub fn message(msg: &ChatMessage) -> String {
    let speaker = if msg.is_user() {
        "you".to_string()
    } else {
        msg.provider_label
            .clone()
            .unwrap_or_else(|| "assistant".to_string())
    };

    if msg.is_pending() {
        return format!("{speaker}: ...");
    }

    let mut body = String::new();
    for segment in extract_segments(&msg.text) {
        match segment {
            ContentSegment::Text { content } => body.push_str(&content),
            ContentSegment::Code { language, code } => {
                if !body.is_empty() && !body.ends_with('\n') {
                    body.push('\n');
                }
                body.push_str(&format!("[{language}]\n"));
                for line in code.lines() {
                    body.push_str(&format!("    {line}\n"));
                }
            },
        }
    }

    let prefix = if msg.is_error() { "! " } else { "" };
    format!("{prefix}{speaker}: {}", body.trim_end())
}

/// One line per stored conversation
pub fn summary_line(summary: &ConversationSummary) -> String {
    let when = summary.last_modified.with_timezone(&Local);
    format!(
        "{:<24} {} {:>4} msgs  {}",
        summary.id.as_str(),
        when.format("%Y-%m-%d %H:%M"),
        summary.message_count,
        summary.preview
    )
}

pub fn voice_profile(profile: &VoiceProfile) -> Vec<String> {
    vec![
        format!("rate:   {:.2}", profile.rate),
        format!("pitch:  {:.2}", profile.pitch),
        format!("volume: {:.2}", profile.volume),
        profile
            .selected_voice_index
            .map_or_else(|| "voice:  default".to_string(), |i| format!("voice:  {i}")),
    ]
}

pub fn storage_info(info: &StorageInfo) -> String {
    #[allow(clippy::cast_precision_loss)]
    let kib = info.size_bytes as f64 / 1024.0;
    format!(
        "{} of {} conversations, {kib:.1} KiB",
        info.total_conversations, info.max_conversations
    )
}

#[cfg(test)]
mod tests {
    use domain::{ProviderFamily, ProviderId};

    use super::*;

    fn info(id: &str, icon: Option<&str>) -> ProviderInfo {
        ProviderInfo {
            id: ProviderId::parse(id).unwrap(),
            display_name: id.to_uppercase(),
            icon: icon.map(ToString::to_string),
            family: ProviderFamily::LocalInference,
            model: "llama".to_string(),
        }
    }

    #[test]
    fn marks_active_provider() {
        let providers = vec![info("a", None), info("b", Some("🤖"))];
        let lines = provider_lines(&providers, Some(&providers[1]));

        assert!(lines[0].starts_with("  a"));
        assert!(lines[1].starts_with("* b"));
        assert!(lines[1].contains("🤖 B"));
        assert!(lines[1].contains("local-inference"));
    }

    #[test]
    fn renders_code_blocks_with_language() {
        let msg = ChatMessage::assistant("intro\n```js\nconst x=1;\n```\ntail");
        let out = message(&msg);

        assert!(out.starts_with("assistant: intro\n[js]\n    const x=1;\n"));
        assert!(out.ends_with("tail"));
    }

    #[test]
    fn pending_message_shows_placeholder() {
        assert_eq!(message(&ChatMessage::pending()), "assistant: ...");
    }

    #[test]
    fn error_message_is_flagged() {
        let msg = ChatMessage::error("boom")
            .with_provider(ProviderId::parse("local").unwrap(), "Local");
        assert!(message(&msg).starts_with("! Local: "));
    }

    #[test]
    fn user_message_uses_you() {
        assert_eq!(message(&ChatMessage::user("hi")), "you: hi");
    }

    #[test]
    fn storage_info_reports_kib() {
        let line = storage_info(&StorageInfo {
            total_conversations: 2,
            size_bytes: 2048,
            max_conversations: 20,
        });
        assert_eq!(line, "2 of 20 conversations, 2.0 KiB");
    }

    #[test]
    fn voice_profile_lists_all_fields() {
        let lines = voice_profile(&VoiceProfile::default());
        assert_eq!(lines.len(), 4);
        assert!(lines[3].starts_with("voice:"));
    }
}
