//! SQL queries for msgstore.db.
//!
//! The schema is an external contract owned by the messaging application;
//! only the columns the pipeline needs are selected so incidental schema
//! additions in newer store versions do not break the reader.

/// All chat rows. `subject` is non-null only for group chats.
pub const ALL_CHATS: &str = r#"
SELECT
    _id,
    jid_row_id,
    subject
FROM chat
ORDER BY _id
"#;

/// All message rows in storage order.
///
/// Storage order (`_id`) is non-decreasing by timestamp within a chat, and
/// the exporter relies on it for tie-breaking.
pub const ALL_MESSAGES: &str = r#"
SELECT
    _id,
    chat_row_id,
    from_me,
    timestamp,
    text_data,
    sender_jid_row_id,
    message_type,
    status
FROM message
ORDER BY _id
"#;

/// All jid (identifier) rows. `server` distinguishes group jids ('g.us')
/// from user jids.
pub const ALL_JIDS: &str = r#"
SELECT
    _id,
    user,
    server
FROM jid
ORDER BY _id
"#;

/// jid server value that marks a group conversation.
pub const GROUP_JID_SERVER: &str = "g.us";
