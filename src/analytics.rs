//! Summary statistics over the normalized model.
//!
//! Every function here is a pure read of `&Model`: statistics are recomputed
//! on demand and never persisted. An empty model yields zeroed/empty results.

use std::collections::BTreeMap;

use chrono::{Datelike, Timelike};
use serde::Serialize;

use crate::model::{Message, Model};

// ============================================================================
// Filters
// ============================================================================

/// Optional scoping for the per-view statistics.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub chat_id: Option<i64>,
    /// Normalized sender number; matches incoming messages only.
    pub sender_number: Option<String>,
}

impl MessageFilter {
    fn matches(&self, message: &Message) -> bool {
        if let Some(chat_id) = self.chat_id {
            if message.chat_id != chat_id {
                return false;
            }
        }
        if let Some(ref number) = self.sender_number {
            if message.sender_number.as_deref() != Some(number.as_str()) {
                return false;
            }
        }
        true
    }
}

fn filtered<'a>(
    model: &'a Model,
    filter: &'a MessageFilter,
) -> impl Iterator<Item = &'a Message> {
    model.messages().iter().filter(|m| filter.matches(m))
}

// ============================================================================
// Overview
// ============================================================================

#[derive(Debug, Serialize)]
pub struct Overview {
    pub total_messages: usize,
    pub sent: usize,
    pub received: usize,
    pub chat_count: usize,
    pub first_message: Option<String>,
    pub last_message: Option<String>,
    pub busiest_hour: Option<u32>,
    pub busiest_weekday: Option<&'static str>,
    /// Dangling rows dropped while building the model.
    pub dropped_rows: usize,
}

pub fn overview(model: &Model) -> Overview {
    let messages = model.messages();
    let sent = messages.iter().filter(|m| m.from_me).count();

    let (first, last) = first_last(messages.iter());

    let mut hour_counts = [0usize; 24];
    let mut weekday_counts = [0usize; 7];
    for message in messages {
        hour_counts[message.timestamp.hour() as usize] += 1;
        weekday_counts[message.timestamp.weekday().num_days_from_monday() as usize] += 1;
    }

    Overview {
        total_messages: messages.len(),
        sent,
        received: messages.len() - sent,
        chat_count: model.chat_count(),
        first_message: first.map(|ms| model.timezone().format(ms)),
        last_message: last.map(|ms| model.timezone().format(ms)),
        busiest_hour: argmax(&hour_counts).map(|h| h as u32),
        busiest_weekday: argmax(&weekday_counts).map(weekday_name),
        dropped_rows: model.join_stats().dropped(),
    }
}

fn first_last<'a>(messages: impl Iterator<Item = &'a Message>) -> (Option<i64>, Option<i64>) {
    let mut first = None;
    let mut last = None;
    for m in messages {
        first = Some(first.map_or(m.timestamp_ms, |f: i64| f.min(m.timestamp_ms)));
        last = Some(last.map_or(m.timestamp_ms, |l: i64| l.max(m.timestamp_ms)));
    }
    (first, last)
}

fn argmax(counts: &[usize]) -> Option<usize> {
    let max = *counts.iter().max()?;
    if max == 0 {
        return None;
    }
    counts.iter().position(|&c| c == max)
}

fn weekday_name(index_from_monday: usize) -> &'static str {
    const DAYS: [&str; 7] = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ];
    DAYS[index_from_monday % 7]
}

// ============================================================================
// Per-chat and per-contact breakdowns
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ChatCount {
    pub chat_id: i64,
    pub name: String,
    pub is_group: bool,
    pub message_count: usize,
    pub first_message: Option<String>,
    pub last_message: Option<String>,
}

/// Message counts per chat, busiest first. Chats whose rows were entirely
/// dropped still appear, with a zero count.
pub fn per_chat(model: &Model) -> Vec<ChatCount> {
    let mut counts: Vec<ChatCount> = model
        .chats()
        .map(|chat| {
            let (first, last) = first_last(model.messages_for(chat.id));
            ChatCount {
                chat_id: chat.id,
                name: chat.display_name.clone(),
                is_group: chat.is_group,
                message_count: model.messages_for(chat.id).count(),
                first_message: first.map(|ms| model.timezone().format(ms)),
                last_message: last.map(|ms| model.timezone().format(ms)),
            }
        })
        .collect();
    counts.sort_by(|a, b| b.message_count.cmp(&a.message_count).then(a.chat_id.cmp(&b.chat_id)));
    counts
}

#[derive(Debug, Serialize)]
pub struct ContactCount {
    pub name: String,
    /// Normalized number; None for own messages and unattributed senders.
    pub number: Option<String>,
    pub message_count: usize,
}

/// Message counts per sender, busiest first.
///
/// Own messages ("Me") and unattributed senders get their own rows, so the
/// counts always partition the filtered message set: they sum to its total.
pub fn per_contact(model: &Model, filter: &MessageFilter) -> Vec<ContactCount> {
    let mut counts: BTreeMap<String, ContactCount> = BTreeMap::new();
    for message in filtered(model, filter) {
        let key = message
            .sender_number
            .clone()
            .unwrap_or_else(|| message.sender_display.clone());
        counts
            .entry(key)
            .or_insert_with(|| ContactCount {
                name: message.sender_display.clone(),
                number: message.sender_number.clone(),
                message_count: 0,
            })
            .message_count += 1;
    }

    let mut counts: Vec<ContactCount> = counts.into_values().collect();
    counts.sort_by(|a, b| b.message_count.cmp(&a.message_count).then(a.name.cmp(&b.name)));
    counts
}

// ============================================================================
// Time series
// ============================================================================

/// Bucket granularity for volume trends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    Day,
    Week,
    Month,
}

impl TimeBucket {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            _ => None,
        }
    }

    fn key(&self, message: &Message) -> String {
        match self {
            // ISO week so the first days of January land in the right week.
            Self::Day => message.timestamp.format("%Y-%m-%d").to_string(),
            Self::Week => message.timestamp.format("%G-W%V").to_string(),
            Self::Month => message.timestamp.format("%Y-%m").to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VolumePoint {
    pub period: String,
    pub count: usize,
    /// Trailing 7-point moving average; only populated for day buckets once
    /// a full window exists.
    pub moving_avg: Option<f64>,
}

/// Message volume per time bucket, in chronological order.
pub fn volume(model: &Model, bucket: TimeBucket, filter: &MessageFilter) -> Vec<VolumePoint> {
    let mut buckets: BTreeMap<String, usize> = BTreeMap::new();
    for message in filtered(model, filter) {
        *buckets.entry(bucket.key(message)).or_default() += 1;
    }

    let counts: Vec<(String, usize)> = buckets.into_iter().collect();
    counts
        .iter()
        .enumerate()
        .map(|(i, (period, count))| {
            let moving_avg = if bucket == TimeBucket::Day && i + 1 >= 7 {
                let window: usize = counts[i + 1 - 7..=i].iter().map(|(_, c)| c).sum();
                Some(window as f64 / 7.0)
            } else {
                None
            };
            VolumePoint {
                period: period.clone(),
                count: *count,
                moving_avg,
            }
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct KindCount {
    pub kind: String,
    pub count: usize,
}

/// Distribution of messages across decoded kinds, busiest first.
pub fn kind_distribution(model: &Model, filter: &MessageFilter) -> Vec<KindCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for message in filtered(model, filter) {
        *counts.entry(message.kind.label()).or_default() += 1;
    }
    let mut counts: Vec<KindCount> = counts
        .into_iter()
        .map(|(kind, count)| KindCount { kind, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.kind.cmp(&b.kind)));
    counts
}

#[derive(Debug, Serialize)]
pub struct HourCount {
    pub hour: u32,
    pub sent: usize,
    pub received: usize,
}

/// Messages per hour of day under the run's timezone policy, split by
/// direction. Always 24 entries.
pub fn hourly_distribution(model: &Model, filter: &MessageFilter) -> Vec<HourCount> {
    let mut hours: Vec<HourCount> = (0..24)
        .map(|hour| HourCount {
            hour,
            sent: 0,
            received: 0,
        })
        .collect();
    for message in filtered(model, filter) {
        let slot = &mut hours[message.timestamp.hour() as usize];
        if message.from_me {
            slot.sent += 1;
        } else {
            slot.received += 1;
        }
    }
    hours
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::ContactBook;
    use crate::db::{ChatRow, JidRow, MessageRow, RawTables};
    use crate::model::{build_model, TimezonePolicy};

    const HOUR_MS: i64 = 3_600_000;
    const DAY_MS: i64 = 24 * HOUR_MS;

    // 2023-11-14 22:13:20 UTC
    const BASE_MS: i64 = 1_700_000_000_000;

    fn model_with_messages(messages: Vec<MessageRow>) -> Model {
        let raw = RawTables {
            chats: vec![
                ChatRow { id: 1, jid_row_id: Some(10), subject: None },
                ChatRow { id: 2, jid_row_id: Some(11), subject: Some("Group".to_string()) },
            ],
            jids: vec![
                JidRow { id: 10, user: Some("15551234567".to_string()), server: Some("s.whatsapp.net".to_string()) },
                JidRow { id: 11, user: Some("123-456".to_string()), server: Some("g.us".to_string()) },
            ],
            messages,
        };
        build_model(raw, &ContactBook::empty(), TimezonePolicy::Utc)
    }

    fn msg(id: i64, chat: i64, from_me: bool, ts: i64, kind: i64) -> MessageRow {
        MessageRow {
            id,
            chat_row_id: chat,
            from_me,
            timestamp_ms: ts,
            text: Some(format!("m{id}")),
            sender_jid_row_id: None,
            message_type: kind,
            status: 0,
        }
    }

    #[test]
    fn test_empty_model_yields_zeroes() {
        let model = model_with_messages(Vec::new());
        let ov = overview(&model);
        assert_eq!(ov.total_messages, 0);
        assert_eq!(ov.sent, 0);
        assert!(ov.first_message.is_none());
        assert!(ov.busiest_hour.is_none());
        assert!(ov.busiest_weekday.is_none());
        assert!(per_contact(&model, &MessageFilter::default()).is_empty());
        assert!(volume(&model, TimeBucket::Day, &MessageFilter::default()).is_empty());
        assert_eq!(hourly_distribution(&model, &MessageFilter::default()).len(), 24);
    }

    #[test]
    fn test_overview_counts_and_extremes() {
        let model = model_with_messages(vec![
            msg(1, 1, false, BASE_MS, 0),
            msg(2, 1, true, BASE_MS + HOUR_MS, 0),
            msg(3, 2, false, BASE_MS + 2 * HOUR_MS, 1),
        ]);
        let ov = overview(&model);
        assert_eq!(ov.total_messages, 3);
        assert_eq!(ov.sent, 1);
        assert_eq!(ov.received, 2);
        assert_eq!(ov.chat_count, 2);
        assert_eq!(ov.first_message.as_deref(), Some("2023-11-14 22:13:20"));
        assert_eq!(ov.last_message.as_deref(), Some("2023-11-15 00:13:20"));
    }

    #[test]
    fn test_per_contact_partitions_total() {
        let model = model_with_messages(vec![
            msg(1, 1, false, BASE_MS, 0),
            msg(2, 1, true, BASE_MS + 1, 0),
            msg(3, 1, false, BASE_MS + 2, 0),
            msg(4, 2, true, BASE_MS + 3, 0),
        ]);
        let counts = per_contact(&model, &MessageFilter::default());
        let sum: usize = counts.iter().map(|c| c.message_count).sum();
        assert_eq!(sum, model.messages().len());

        let me = counts.iter().find(|c| c.name == "Me").unwrap();
        assert_eq!(me.message_count, 2);
    }

    #[test]
    fn test_chat_filter_scopes_counts() {
        let model = model_with_messages(vec![
            msg(1, 1, false, BASE_MS, 0),
            msg(2, 2, false, BASE_MS + 1, 0),
            msg(3, 2, true, BASE_MS + 2, 0),
        ]);
        let filter = MessageFilter {
            chat_id: Some(2),
            ..MessageFilter::default()
        };
        let counts = per_contact(&model, &filter);
        let sum: usize = counts.iter().map(|c| c.message_count).sum();
        assert_eq!(sum, 2);
    }

    #[test]
    fn test_daily_volume_and_moving_average() {
        // Ten consecutive days, one message per day except day 3 with two.
        let mut rows = Vec::new();
        for day in 0..10i64 {
            rows.push(msg(day * 2 + 1, 1, false, BASE_MS + day * DAY_MS, 0));
            if day == 3 {
                rows.push(msg(day * 2 + 2, 1, true, BASE_MS + day * DAY_MS + 1, 0));
            }
        }
        let model = model_with_messages(rows);
        let series = volume(&model, TimeBucket::Day, &MessageFilter::default());
        assert_eq!(series.len(), 10);
        assert!(series[5].moving_avg.is_none());
        // Days 0..=6 hold 8 messages (day 3 has two).
        assert_eq!(series[6].moving_avg, Some(8.0 / 7.0));
        // Days 3..=9 also hold 8 messages.
        assert_eq!(series[9].moving_avg, Some(8.0 / 7.0));
    }

    #[test]
    fn test_month_buckets() {
        let jan = 1_704_067_200_000; // 2024-01-01 UTC
        let feb = 1_706_745_600_000; // 2024-02-01 UTC
        let model = model_with_messages(vec![
            msg(1, 1, false, jan, 0),
            msg(2, 1, false, jan + DAY_MS, 0),
            msg(3, 1, false, feb, 0),
        ]);
        let series = volume(&model, TimeBucket::Month, &MessageFilter::default());
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].period, "2024-01");
        assert_eq!(series[0].count, 2);
        assert_eq!(series[1].period, "2024-02");
        assert_eq!(series[1].count, 1);
    }

    #[test]
    fn test_kind_distribution_includes_unknown() {
        let model = model_with_messages(vec![
            msg(1, 1, false, BASE_MS, 0),
            msg(2, 1, false, BASE_MS + 1, 0),
            msg(3, 1, false, BASE_MS + 2, 1),
            msg(4, 1, false, BASE_MS + 3, 999),
        ]);
        let dist = kind_distribution(&model, &MessageFilter::default());
        assert_eq!(dist[0].kind, "text");
        assert_eq!(dist[0].count, 2);
        assert!(dist.iter().any(|k| k.kind == "unknown(999)" && k.count == 1));
    }

    #[test]
    fn test_hourly_split_by_direction() {
        let model = model_with_messages(vec![
            msg(1, 1, false, BASE_MS, 0),          // 22:13 UTC
            msg(2, 1, true, BASE_MS + 60_000, 0),  // 22:14 UTC
        ]);
        let hours = hourly_distribution(&model, &MessageFilter::default());
        assert_eq!(hours[22].received, 1);
        assert_eq!(hours[22].sent, 1);
        assert_eq!(hours[0].sent + hours[0].received, 0);
    }
}
