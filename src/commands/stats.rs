//! Stats command: aggregate views over the normalized model.

use anyhow::Result;
use serde::Serialize;

use crate::analytics::{
    self, ChatCount, ContactCount, HourCount, KindCount, MessageFilter, Overview, TimeBucket,
    VolumePoint,
};
use crate::output::OutputControls;
use crate::session::Session;

/// How many rows the per-chat / per-contact text tables show.
const TOP_N: usize = 10;

#[derive(Debug, Serialize)]
struct StatsReport {
    overview: Overview,
    volume: Vec<VolumePoint>,
    kinds: Vec<KindCount>,
    hourly: Vec<HourCount>,
    top_chats: Vec<ChatCount>,
    top_contacts: Vec<ContactCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scoped_chat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scoped_contact: Option<String>,
}

pub fn run(
    session: &mut Session,
    bucket: TimeBucket,
    chat_name: Option<&str>,
    contact_name: Option<&str>,
    out: &OutputControls,
) -> Result<()> {
    // Populate the cache before contact resolution reads the book.
    session.model()?;

    let mut filter = MessageFilter::default();
    let mut scoped_chat = None;
    let mut scoped_contact = None;

    if let Some(number) = contact_name
        .map(|name| super::resolve_contact(session, name))
        .transpose()?
    {
        scoped_contact = Some(number.clone());
        filter.sender_number = Some(number);
    }

    let model = session.model()?;
    if let Some(name) = chat_name {
        let chat = super::resolve_chat(model, name)?;
        scoped_chat = Some(chat.display_name.clone());
        filter.chat_id = Some(chat.id);
    }

    let report = StatsReport {
        overview: analytics::overview(model),
        volume: analytics::volume(model, bucket, &filter),
        kinds: analytics::kind_distribution(model, &filter),
        hourly: analytics::hourly_distribution(model, &filter),
        top_chats: analytics::per_chat(model),
        top_contacts: analytics::per_contact(model, &filter),
        scoped_chat,
        scoped_contact,
    };

    if out.is_json() {
        out.print(&report);
    } else {
        print_report(&report, bucket);
    }
    Ok(())
}

fn print_report(report: &StatsReport, bucket: TimeBucket) {
    println!("Overview:");
    println!("{:-<60}", "");
    println!("total_messages: {}", report.overview.total_messages);
    println!("sent: {}", report.overview.sent);
    println!("received: {}", report.overview.received);
    println!("chats: {}", report.overview.chat_count);
    if let Some(ref first) = report.overview.first_message {
        println!("first_message: {first}");
    }
    if let Some(ref last) = report.overview.last_message {
        println!("last_message: {last}");
    }
    if let Some(hour) = report.overview.busiest_hour {
        println!("busiest_hour: {hour:02}:00");
    }
    if let Some(day) = report.overview.busiest_weekday {
        println!("busiest_weekday: {day}");
    }
    if report.overview.dropped_rows > 0 {
        println!("dropped_rows: {}", report.overview.dropped_rows);
    }

    if let Some(ref chat) = report.scoped_chat {
        println!();
        println!("(volume/kinds/hourly/contacts scoped to chat: {chat})");
    }
    if let Some(ref contact) = report.scoped_contact {
        println!();
        println!("(volume/kinds/hourly scoped to sender: {contact})");
    }

    if !report.volume.is_empty() {
        println!();
        println!("Volume per {:?}:", bucket);
        println!("{:-<60}", "");
        for point in &report.volume {
            match point.moving_avg {
                Some(avg) => println!("{}  {:>6}  (7-day avg {:.1})", point.period, point.count, avg),
                None => println!("{}  {:>6}", point.period, point.count),
            }
        }
    }

    if !report.kinds.is_empty() {
        println!();
        println!("Message kinds:");
        println!("{:-<60}", "");
        for kind in &report.kinds {
            println!("{:<16} {}", kind.kind, kind.count);
        }
    }

    let active_hours: Vec<_> = report
        .hourly
        .iter()
        .filter(|h| h.sent + h.received > 0)
        .collect();
    if !active_hours.is_empty() {
        println!();
        println!("By hour of day:");
        println!("{:-<60}", "");
        for hour in active_hours {
            println!(
                "{:02}:00  sent {:>5}  received {:>5}",
                hour.hour, hour.sent, hour.received
            );
        }
    }

    if !report.top_chats.is_empty() {
        println!();
        println!("Top chats:");
        println!("{:-<60}", "");
        for chat in report.top_chats.iter().take(TOP_N) {
            let marker = if chat.is_group { " [group]" } else { "" };
            println!("{:<40} {}{}", chat.name, chat.message_count, marker);
        }
    }

    if !report.top_contacts.is_empty() {
        println!();
        println!("Top contacts:");
        println!("{:-<60}", "");
        for contact in report.top_contacts.iter().take(TOP_N) {
            println!("{:<40} {}", contact.name, contact.message_count);
        }
    }
}
