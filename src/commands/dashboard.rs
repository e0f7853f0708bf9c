//! Interactive dashboard: a menu loop over the cached session.
//!
//! Each action re-reads the already-loaded in-memory model; the database is
//! only re-read on the explicit reload action. Errors surface as messages on
//! this loop rather than process exits.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Result;

use crate::analytics::{self, MessageFilter, TimeBucket};
use crate::export::export_all;
use crate::session::Session;

const TOP_N: usize = 10;

pub fn run(session: &mut Session, output_dir: &Path) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print_menu();
        let Some(choice) = read_line(&mut lines)? else {
            // stdin closed
            return Ok(());
        };

        let result = match choice.trim() {
            "1" => show_overview(session),
            "2" => show_volume(session, &mut lines),
            "3" => show_top(session),
            "4" => run_export(session, output_dir),
            "5" => reload(session),
            "6" | "q" | "quit" | "exit" => {
                println!("Goodbye!");
                return Ok(());
            }
            other => {
                println!("Invalid choice '{other}'.");
                Ok(())
            }
        };

        // Keep the loop alive; the message is the error surface here.
        if let Err(e) = result {
            println!("Error: {e:#}");
        }
        println!();
    }
}

fn print_menu() {
    println!();
    println!("=== Message Store Analytics ===");
    println!("1. Overview statistics");
    println!("2. Message volume trend");
    println!("3. Top chats and contacts");
    println!("4. Export all chats as TXT files");
    println!("5. Reload data from disk");
    println!("6. Exit");
    print!("\nEnter your choice (1-6): ");
    let _ = io::stdout().flush();
}

fn read_line(lines: &mut impl Iterator<Item = io::Result<String>>) -> Result<Option<String>> {
    match lines.next() {
        Some(line) => Ok(Some(line?)),
        None => Ok(None),
    }
}

fn show_overview(session: &mut Session) -> Result<()> {
    let model = session.model()?;
    let ov = analytics::overview(model);

    println!();
    println!("Overview:");
    println!("{:-<60}", "");
    println!("total_messages: {}", ov.total_messages);
    println!("sent: {} / received: {}", ov.sent, ov.received);
    println!("chats: {}", ov.chat_count);
    if let (Some(first), Some(last)) = (&ov.first_message, &ov.last_message) {
        println!("range: {first} .. {last}");
    }
    if let Some(hour) = ov.busiest_hour {
        println!("busiest_hour: {hour:02}:00");
    }
    if let Some(day) = ov.busiest_weekday {
        println!("busiest_weekday: {day}");
    }
    if ov.dropped_rows > 0 {
        println!("dropped_rows: {}", ov.dropped_rows);
    }
    Ok(())
}

fn show_volume(
    session: &mut Session,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<()> {
    print!("Granularity [day/week/month] (default day): ");
    let _ = io::stdout().flush();
    let bucket = match read_line(lines)? {
        Some(answer) if !answer.trim().is_empty() => match TimeBucket::parse(answer.trim()) {
            Some(bucket) => bucket,
            None => {
                println!("Unrecognized granularity '{}', using day.", answer.trim());
                TimeBucket::Day
            }
        },
        _ => TimeBucket::Day,
    };

    let model = session.model()?;
    let series = analytics::volume(model, bucket, &MessageFilter::default());
    if series.is_empty() {
        println!("No messages.");
        return Ok(());
    }

    println!();
    println!("Volume per {bucket:?}:");
    println!("{:-<60}", "");
    for point in &series {
        match point.moving_avg {
            Some(avg) => println!("{}  {:>6}  (7-day avg {:.1})", point.period, point.count, avg),
            None => println!("{}  {:>6}", point.period, point.count),
        }
    }
    Ok(())
}

fn show_top(session: &mut Session) -> Result<()> {
    let model = session.model()?;
    let chats = analytics::per_chat(model);
    let contacts = analytics::per_contact(model, &MessageFilter::default());

    println!();
    println!("Top chats:");
    println!("{:-<60}", "");
    for chat in chats.iter().take(TOP_N) {
        let marker = if chat.is_group { " [group]" } else { "" };
        println!("{:<40} {}{}", chat.name, chat.message_count, marker);
    }

    println!();
    println!("Top contacts:");
    println!("{:-<60}", "");
    for contact in contacts.iter().take(TOP_N) {
        println!("{:<40} {}", contact.name, contact.message_count);
    }
    Ok(())
}

fn run_export(session: &mut Session, output_dir: &Path) -> Result<()> {
    let model = session.model()?;
    let report = export_all(model, output_dir)?;
    println!(
        "Done. {} transcript(s) in {}, {} failed.",
        report.exported_count(),
        output_dir.display(),
        report.failed_count()
    );
    for failed in &report.failed {
        println!("  {}: {}", failed.chat, failed.error);
    }
    if report.dropped_rows > 0 {
        println!("Note: {} dangling row(s) skipped.", report.dropped_rows);
    }
    Ok(())
}

fn reload(session: &mut Session) -> Result<()> {
    let model = session.reload()?;
    println!(
        "Reloaded: {} chats, {} messages.",
        model.chat_count(),
        model.messages().len()
    );
    Ok(())
}
