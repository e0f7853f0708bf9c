//! Command implementations for the presentation layer.

pub mod chats;
pub mod contacts;
pub mod dashboard;
pub mod export;
pub mod stats;

use anyhow::{bail, Result};
use strsim::jaro_winkler;

use crate::contacts::normalize_phone;
use crate::model::{Chat, Model};
use crate::session::Session;

/// Minimum similarity accepted by the fuzzy fallback.
const FUZZY_THRESHOLD: f64 = 0.85;

/// Resolve a user-supplied chat name to a chat.
///
/// Matching ladder: exact display name (case-insensitive), then substring,
/// then best fuzzy match above the threshold.
pub fn resolve_chat<'a>(model: &'a Model, name: &str) -> Result<&'a Chat> {
    let needle = name.to_lowercase();

    if let Some(chat) = model
        .chats()
        .find(|c| c.display_name.to_lowercase() == needle)
    {
        return Ok(chat);
    }

    if let Some(chat) = model
        .chats()
        .find(|c| c.display_name.to_lowercase().contains(&needle))
    {
        return Ok(chat);
    }

    let best = model
        .chats()
        .map(|c| (c, jaro_winkler(&needle, &c.display_name.to_lowercase())))
        .filter(|(_, score)| *score >= FUZZY_THRESHOLD)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    match best {
        Some((chat, _)) => Ok(chat),
        None => bail!("no chat matches '{name}'"),
    }
}

/// Resolve a user-supplied contact name or number to a normalized number.
pub fn resolve_contact(session: &Session, name_or_number: &str) -> Result<String> {
    // A mostly-numeric argument is taken as a number directly.
    let digits = normalize_phone(name_or_number);
    if digits.len() >= 7 {
        return Ok(digits);
    }

    let needle = name_or_number.to_lowercase();
    let book = session.contacts();

    if let Some((number, _)) = book
        .iter()
        .find(|(_, contact_name)| contact_name.to_lowercase() == needle)
    {
        return Ok(number.to_string());
    }

    if let Some((number, _)) = book
        .iter()
        .find(|(_, contact_name)| contact_name.to_lowercase().contains(&needle))
    {
        return Ok(number.to_string());
    }

    let best = book
        .iter()
        .map(|(number, contact_name)| {
            (number, jaro_winkler(&needle, &contact_name.to_lowercase()))
        })
        .filter(|(_, score)| *score >= FUZZY_THRESHOLD)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    match best {
        Some((number, _)) => Ok(number.to_string()),
        None => bail!("no contact matches '{name_or_number}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::ContactBook;
    use crate::db::{ChatRow, JidRow, MessageRow, RawTables};
    use crate::model::{build_model, TimezonePolicy};

    fn sample_model() -> Model {
        let raw = RawTables {
            chats: vec![
                ChatRow { id: 1, jid_row_id: Some(10), subject: None },
                ChatRow { id: 2, jid_row_id: Some(11), subject: Some("Climbing Crew".to_string()) },
            ],
            jids: vec![
                JidRow { id: 10, user: Some("15551234567".to_string()), server: Some("s.whatsapp.net".to_string()) },
                JidRow { id: 11, user: Some("123-456".to_string()), server: Some("g.us".to_string()) },
            ],
            messages: Vec::<MessageRow>::new(),
        };
        let book = ContactBook::from_entries([(
            "15551234567".to_string(),
            "Ada Lovelace".to_string(),
        )]);
        build_model(raw, &book, TimezonePolicy::Utc)
    }

    #[test]
    fn test_resolve_chat_exact_and_substring() {
        let model = sample_model();
        assert_eq!(resolve_chat(&model, "ada lovelace").unwrap().id, 1);
        assert_eq!(resolve_chat(&model, "climbing").unwrap().id, 2);
    }

    #[test]
    fn test_resolve_chat_fuzzy() {
        let model = sample_model();
        assert_eq!(resolve_chat(&model, "climbing crw").unwrap().id, 2);
        assert!(resolve_chat(&model, "zzz").is_err());
    }
}
