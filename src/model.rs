//! Message normalizer: joins raw chat/message/jid rows with the contact book
//! into the immutable in-memory model the exporter and aggregator consume.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::Serialize;
use tracing::warn;

use crate::contacts::{normalize_phone, ContactBook};
use crate::db::{ChatRow, JidRow, RawTables};

/// Fallback label when a sender has no number at all.
pub const UNKNOWN_SENDER: &str = "Unknown";

/// Label for the local user's own messages.
pub const SELF_SENDER: &str = "Me";

// ============================================================================
// Timezone policy
// ============================================================================

/// How source epoch timestamps are converted for display and bucketing.
///
/// Applied uniformly across the whole run; exposed as a CLI option rather
/// than inferred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimezonePolicy {
    /// Host-local timezone (default).
    #[default]
    Local,
    Utc,
    /// Fixed UTC offset, e.g. +02:00.
    Fixed(FixedOffset),
}

impl TimezonePolicy {
    /// Parse "local", "utc" or a fixed offset like "+02:00" / "-0530".
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Some(Self::Local),
            "utc" => Some(Self::Utc),
            _ => {
                let dt = DateTime::parse_from_str(
                    &format!("1970-01-01 00:00:00 {s}"),
                    "%Y-%m-%d %H:%M:%S %:z",
                )
                .or_else(|_| {
                    DateTime::parse_from_str(
                        &format!("1970-01-01 00:00:00 {s}"),
                        "%Y-%m-%d %H:%M:%S %z",
                    )
                })
                .ok()?;
                Some(Self::Fixed(*dt.offset()))
            }
        }
    }

    /// Convert epoch milliseconds to a zoned datetime. Out-of-range values
    /// clamp to the epoch rather than failing the row.
    pub fn convert(&self, epoch_ms: i64) -> DateTime<FixedOffset> {
        let utc = Utc
            .timestamp_millis_opt(epoch_ms)
            .single()
            .unwrap_or(DateTime::UNIX_EPOCH);
        match self {
            Self::Local => utc.with_timezone(&chrono::Local).fixed_offset(),
            Self::Utc => utc.fixed_offset(),
            Self::Fixed(offset) => utc.with_timezone(offset),
        }
    }

    /// Human-readable transcript timestamp.
    pub fn format(&self, epoch_ms: i64) -> String {
        self.convert(epoch_ms).format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

// ============================================================================
// Decoded enumerations
// ============================================================================

/// Semantic message category decoded from the store's `message_type` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Image,
    Audio,
    Video,
    ContactCard,
    Location,
    System,
    Document,
    Gif,
    Revoked,
    Sticker,
    /// Code outside the known set. Kept, never dropped.
    Unknown(i64),
}

impl MessageKind {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Text,
            1 => Self::Image,
            2 => Self::Audio,
            3 => Self::Video,
            4 => Self::ContactCard,
            5 => Self::Location,
            7 => Self::System,
            9 => Self::Document,
            13 => Self::Gif,
            15 => Self::Revoked,
            20 => Self::Sticker,
            other => Self::Unknown(other),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }

    /// Stable label for stats tables and transcript placeholders.
    pub fn label(&self) -> String {
        match self {
            Self::Text => "text".to_string(),
            Self::Image => "image".to_string(),
            Self::Audio => "audio".to_string(),
            Self::Video => "video".to_string(),
            Self::ContactCard => "contact_card".to_string(),
            Self::Location => "location".to_string(),
            Self::System => "system".to_string(),
            Self::Document => "document".to_string(),
            Self::Gif => "gif".to_string(),
            Self::Revoked => "revoked".to_string(),
            Self::Sticker => "sticker".to_string(),
            Self::Unknown(code) => format!("unknown({code})"),
        }
    }
}

/// Delivery state decoded from the store's `status` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Received,
    Pending,
    Delivered,
    Read,
    Unknown(i64),
}

impl DeliveryStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Received,
            4 => Self::Pending,
            5 => Self::Delivered,
            13 => Self::Read,
            other => Self::Unknown(other),
        }
    }
}

// ============================================================================
// Normalized model
// ============================================================================

/// One conversation.
#[derive(Debug, Clone, Serialize)]
pub struct Chat {
    pub id: i64,
    /// Group name; None for one-on-one chats.
    pub subject: Option<String>,
    /// Normalized peer number for one-on-one chats.
    pub peer_number: Option<String>,
    /// Resolved name shown everywhere: group subject, contact name, raw
    /// number, or a generic placeholder, in that order.
    pub display_name: String,
    pub is_group: bool,
}

/// One normalized message.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub chat_id: i64,
    /// Storage row id; the tie-breaker for chronological ordering.
    pub row_id: i64,
    pub from_me: bool,
    /// Normalized number of the sending participant; None for own messages
    /// and for senders without a number.
    pub sender_number: Option<String>,
    /// "Me", a contact name, a raw number, or "Unknown".
    pub sender_display: String,
    pub timestamp_ms: i64,
    pub timestamp: DateTime<FixedOffset>,
    pub body: String,
    pub kind: MessageKind,
    pub status: DeliveryStatus,
}

/// Rows dropped during the join, kept for diagnostics. Never silently
/// swallowed: commands surface these counts next to their results.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct JoinStats {
    /// Messages referencing a chat row that does not exist.
    pub dangling_chat_refs: usize,
    /// Messages referencing a sender jid row that does not exist.
    pub dangling_sender_refs: usize,
}

impl JoinStats {
    pub fn dropped(&self) -> usize {
        self.dangling_chat_refs + self.dangling_sender_refs
    }
}

/// The normalized in-memory model for one run. Immutable once built.
#[derive(Debug)]
pub struct Model {
    chats: BTreeMap<i64, Chat>,
    /// Global storage order (by row id).
    messages: Vec<Message>,
    timezone: TimezonePolicy,
    join_stats: JoinStats,
}

impl Model {
    pub fn chats(&self) -> impl Iterator<Item = &Chat> {
        self.chats.values()
    }

    pub fn chat(&self, id: i64) -> Option<&Chat> {
        self.chats.get(&id)
    }

    pub fn chat_count(&self) -> usize {
        self.chats.len()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn messages_for(&self, chat_id: i64) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.chat_id == chat_id)
    }

    pub fn timezone(&self) -> TimezonePolicy {
        self.timezone
    }

    pub fn join_stats(&self) -> JoinStats {
        self.join_stats
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Build the normalized model from raw rows and the contact book.
///
/// Dangling references are dropped and counted; everything else is kept,
/// including messages with unrecognized type/status codes.
pub fn build_model(
    raw: RawTables,
    contacts: &ContactBook,
    timezone: TimezonePolicy,
) -> Model {
    let jids: BTreeMap<i64, JidRow> = raw.jids.into_iter().map(|j| (j.id, j)).collect();

    let chats: BTreeMap<i64, Chat> = raw
        .chats
        .into_iter()
        .map(|row| (row.id, normalize_chat(row, &jids, contacts)))
        .collect();

    let mut join_stats = JoinStats::default();
    let mut messages = Vec::new();

    for row in raw.messages {
        let Some(chat) = chats.get(&row.chat_row_id) else {
            warn!(message_id = row.id, chat_row_id = row.chat_row_id, "dropping message with dangling chat reference");
            join_stats.dangling_chat_refs += 1;
            continue;
        };

        let (sender_number, sender_display) = if row.from_me {
            (None, SELF_SENDER.to_string())
        } else if let Some(sender_jid) = row.sender_jid_row_id {
            // Group messages attribute the sending participant, not the
            // group identifier.
            match jids.get(&sender_jid) {
                Some(jid) => resolve_sender(jid.user.as_deref(), contacts),
                None => {
                    warn!(message_id = row.id, sender_jid_row_id = sender_jid, "dropping message with dangling sender reference");
                    join_stats.dangling_sender_refs += 1;
                    continue;
                }
            }
        } else {
            // Incoming one-on-one message: the chat's peer is the sender.
            match chat.peer_number.as_deref() {
                Some(number) => (
                    Some(number.to_string()),
                    contacts.display_name(number),
                ),
                None => (None, UNKNOWN_SENDER.to_string()),
            }
        };

        let kind = MessageKind::from_code(row.message_type);
        messages.push(Message {
            chat_id: row.chat_row_id,
            row_id: row.id,
            from_me: row.from_me,
            sender_number,
            sender_display,
            timestamp_ms: row.timestamp_ms,
            timestamp: timezone.convert(row.timestamp_ms),
            body: row.text.unwrap_or_default(),
            kind,
            status: DeliveryStatus::from_code(row.status),
        });
    }

    Model {
        chats,
        messages,
        timezone,
        join_stats,
    }
}

fn normalize_chat(
    row: ChatRow,
    jids: &BTreeMap<i64, JidRow>,
    contacts: &ContactBook,
) -> Chat {
    let jid = row.jid_row_id.and_then(|id| jids.get(&id));
    let is_group = row.subject.is_some() || jid.map(JidRow::is_group).unwrap_or(false);

    let peer_number = if is_group {
        None
    } else {
        jid.and_then(|j| j.user.as_deref())
            .filter(|u| !u.is_empty())
            .map(normalize_phone)
    };

    let display_name = row
        .subject
        .clone()
        .or_else(|| peer_number.as_deref().map(|n| contacts.display_name(n)))
        .unwrap_or_else(|| format!("Chat {}", row.id));

    Chat {
        id: row.id,
        subject: row.subject,
        peer_number,
        display_name,
        is_group,
    }
}

fn resolve_sender(user: Option<&str>, contacts: &ContactBook) -> (Option<String>, String) {
    match user.filter(|u| !u.is_empty()) {
        Some(user) => {
            let number = normalize_phone(user);
            let display = contacts.display_name(&number);
            (Some(number), display)
        }
        None => (None, UNKNOWN_SENDER.to_string()),
    }
}
