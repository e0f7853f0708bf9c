//! Typed row structs for the chat, message and jid relations.
//!
//! Rows are typed right at the database boundary; nothing downstream of this
//! module handles untyped fields.

use rusqlite::Connection;

use super::queries;
use crate::error::Result;

/// One row of the `chat` relation.
#[derive(Debug, Clone)]
pub struct ChatRow {
    pub id: i64,
    /// jid of the conversation itself (the peer for one-on-one chats, the
    /// group jid for groups).
    pub jid_row_id: Option<i64>,
    /// Group name; null for one-on-one chats.
    pub subject: Option<String>,
}

/// One row of the `message` relation.
#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: i64,
    pub chat_row_id: i64,
    pub from_me: bool,
    /// Unix epoch milliseconds.
    pub timestamp_ms: i64,
    pub text: Option<String>,
    /// jid of the sending participant; null for outgoing messages and for
    /// incoming one-on-one messages (where the chat jid identifies the peer).
    pub sender_jid_row_id: Option<i64>,
    pub message_type: i64,
    pub status: i64,
}

/// One row of the `jid` relation.
#[derive(Debug, Clone)]
pub struct JidRow {
    pub id: i64,
    /// Phone-number part of the jid; null for some system identifiers.
    pub user: Option<String>,
    pub server: Option<String>,
}

impl JidRow {
    pub fn is_group(&self) -> bool {
        self.server.as_deref() == Some(queries::GROUP_JID_SERVER)
    }
}

/// The full raw working set for one run.
#[derive(Debug, Default)]
pub struct RawTables {
    pub chats: Vec<ChatRow>,
    pub messages: Vec<MessageRow>,
    pub jids: Vec<JidRow>,
}

/// Read all three relations in one pass. The normalizer materializes the
/// single in-memory working set per run; no caching happens here.
pub fn fetch_all(conn: &Connection) -> Result<RawTables> {
    Ok(RawTables {
        chats: fetch_chats(conn)?,
        messages: fetch_messages(conn)?,
        jids: fetch_jids(conn)?,
    })
}

pub fn fetch_chats(conn: &Connection) -> Result<Vec<ChatRow>> {
    let mut stmt = conn.prepare(queries::ALL_CHATS)?;
    let rows = stmt.query_map([], |row| {
        Ok(ChatRow {
            id: row.get(0)?,
            jid_row_id: row.get(1)?,
            subject: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

pub fn fetch_messages(conn: &Connection) -> Result<Vec<MessageRow>> {
    let mut stmt = conn.prepare(queries::ALL_MESSAGES)?;
    let rows = stmt.query_map([], |row| {
        Ok(MessageRow {
            id: row.get(0)?,
            chat_row_id: row.get(1)?,
            from_me: row.get::<_, Option<i64>>(2)?.unwrap_or(0) == 1,
            timestamp_ms: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
            text: row.get(4)?,
            sender_jid_row_id: row.get(5)?,
            message_type: row.get::<_, Option<i64>>(6)?.unwrap_or(0),
            status: row.get::<_, Option<i64>>(7)?.unwrap_or(0),
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

pub fn fetch_jids(conn: &Connection) -> Result<Vec<JidRow>> {
    let mut stmt = conn.prepare(queries::ALL_JIDS)?;
    let rows = stmt.query_map([], |row| {
        Ok(JidRow {
            id: row.get(0)?,
            user: row.get(1)?,
            server: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}
