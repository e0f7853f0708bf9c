//! Transcript export: one ordered plain-text file per chat.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::model::{Message, Model};

/// Outcome of one export run. Failures are per-chat; a failed chat never
/// aborts the remaining ones.
#[derive(Debug, Default, Serialize)]
pub struct ExportReport {
    pub exported: Vec<ExportedChat>,
    pub failed: Vec<FailedChat>,
    /// Rows dropped while the model was built, echoed here so an export
    /// summary never hides them.
    pub dropped_rows: usize,
}

#[derive(Debug, Serialize)]
pub struct ExportedChat {
    pub chat_id: i64,
    pub chat: String,
    pub file: PathBuf,
    pub message_count: usize,
}

#[derive(Debug, Serialize)]
pub struct FailedChat {
    pub chat_id: i64,
    pub chat: String,
    pub error: String,
}

impl ExportReport {
    pub fn exported_count(&self) -> usize {
        self.exported.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// Export every chat in the model.
pub fn export_all(model: &Model, output_dir: &Path) -> Result<ExportReport> {
    let ids: Vec<i64> = model.chats().map(|c| c.id).collect();
    export_selected(model, output_dir, &ids)
}

/// Export the given chats. Chat ids are processed in ascending order so
/// filename collision suffixes come out the same on every run.
pub fn export_selected(model: &Model, output_dir: &Path, chat_ids: &[i64]) -> Result<ExportReport> {
    fs::create_dir_all(output_dir).map_err(|source| Error::WriteFailed {
        chat: format!("<output directory {}>", output_dir.display()),
        source,
    })?;

    let mut ids: Vec<i64> = chat_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let mut report = ExportReport {
        dropped_rows: model.join_stats().dropped(),
        ..ExportReport::default()
    };
    let mut used_names: HashSet<String> = HashSet::new();

    for chat_id in ids {
        let Some(chat) = model.chat(chat_id) else {
            continue;
        };

        let filename = transcript_filename(chat.id, &chat.display_name, chat.is_group, &mut used_names);
        let path = output_dir.join(filename);

        let mut messages: Vec<&Message> = model.messages_for(chat.id).collect();
        // Chronological, ties broken by storage row order.
        messages.sort_by_key(|m| (m.timestamp_ms, m.row_id));

        match write_transcript(&path, model, &messages) {
            Ok(()) => {
                info!(chat = %chat.display_name, path = %path.display(), "wrote transcript");
                report.exported.push(ExportedChat {
                    chat_id: chat.id,
                    chat: chat.display_name.clone(),
                    file: path,
                    message_count: messages.len(),
                });
            }
            Err(source) => {
                warn!(chat = %chat.display_name, error = %source, "transcript write failed");
                report.failed.push(FailedChat {
                    chat_id: chat.id,
                    chat: chat.display_name.clone(),
                    error: Error::WriteFailed {
                        chat: chat.display_name.clone(),
                        source,
                    }
                    .to_string(),
                });
            }
        }
    }

    Ok(report)
}

/// Replace filename-hostile characters; keep alphanumerics, space, '_', '-'.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn transcript_filename(
    chat_id: i64,
    display_name: &str,
    is_group: bool,
    used: &mut HashSet<String>,
) -> String {
    let base = if is_group {
        sanitize_filename(display_name)
    } else {
        sanitize_filename(&format!("Chat with {display_name}"))
    };

    // Disambiguate collisions deterministically with the chat id. Names are
    // compared lowercased so distinct chats cannot land on the same file on
    // case-insensitive filesystems.
    let candidate = format!("{base}.txt");
    let name = if used.contains(&candidate.to_lowercase()) {
        format!("{base} ({chat_id}).txt")
    } else {
        candidate
    };
    used.insert(name.to_lowercase());
    name
}

fn write_transcript(path: &Path, model: &Model, messages: &[&Message]) -> std::io::Result<()> {
    let mut content = String::new();
    for message in messages {
        content.push_str(&render_line(model, message));
        content.push('\n');
    }
    // Full rewrite: re-running on unchanged input produces byte-identical
    // files.
    fs::write(path, content)
}

/// `[timestamp] sender: body`; non-text messages with no caption render a
/// kind placeholder instead of an empty body.
pub fn render_line(model: &Model, message: &Message) -> String {
    let timestamp = model.timezone().format(message.timestamp_ms);
    let body = if message.body.is_empty() && !message.kind.is_text() {
        format!("<{}>", message.kind.label())
    } else {
        message.body.clone()
    };
    format!("[{}] {}: {}", timestamp, message.sender_display, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Chat with Ada"), "Chat with Ada");
        assert_eq!(sanitize_filename("a/b\\c:d*e?"), "a_b_c_d_e_");
        assert_eq!(sanitize_filename("Café ☕"), "Café _");
    }

    #[test]
    fn test_collision_suffix_is_deterministic() {
        let mut used = HashSet::new();
        let first = transcript_filename(1, "Ada", false, &mut used);
        let second = transcript_filename(7, "Ada", false, &mut used);
        assert_eq!(first, "Chat with Ada.txt");
        assert_eq!(second, "Chat with Ada (7).txt");
    }

    #[test]
    fn test_collision_check_ignores_case() {
        let mut used = HashSet::new();
        let first = transcript_filename(1, "Ada", false, &mut used);
        let second = transcript_filename(7, "ADA", false, &mut used);
        assert_eq!(first, "Chat with Ada.txt");
        assert_eq!(second, "Chat with ADA (7).txt");
    }

    #[test]
    fn test_group_name_used_verbatim() {
        let mut used = HashSet::new();
        let name = transcript_filename(3, "Climbing Crew", true, &mut used);
        assert_eq!(name, "Climbing Crew.txt");
    }
}
