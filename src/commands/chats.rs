//! Chats command: list conversations with counts and date ranges.

use anyhow::Result;

use crate::analytics;
use crate::output::OutputControls;
use crate::session::Session;

pub fn run(session: &mut Session, out: &OutputControls) -> Result<()> {
    let model = session.model()?;
    let chats = analytics::per_chat(model);

    if out.is_json() {
        out.print(&chats);
        return Ok(());
    }

    if chats.is_empty() {
        println!("No chats found.");
        return Ok(());
    }

    println!("Chats ({}):", chats.len());
    println!("{:-<60}", "");
    for chat in &chats {
        let marker = if chat.is_group { " [group]" } else { "" };
        println!("{}{} ({} messages)", chat.name, marker, chat.message_count);
        if let (Some(first), Some(last)) = (&chat.first_message, &chat.last_message) {
            println!("  {first} .. {last}");
        }
    }

    let dropped = model.join_stats().dropped();
    if dropped > 0 {
        println!();
        println!("Note: {dropped} database row(s) with dangling references were skipped.");
    }
    Ok(())
}
