//! Contacts command: show the resolved contact mapping.

use anyhow::Result;
use serde::Serialize;

use crate::output::OutputControls;
use crate::session::Session;

#[derive(Debug, Serialize)]
struct ContactEntry {
    number: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct ContactsReport {
    entries: Vec<ContactEntry>,
    skipped_entries: usize,
}

pub fn run(session: &mut Session, out: &OutputControls) -> Result<()> {
    // Populate the cache so the book reflects the current contact file.
    session.model()?;
    let book = session.contacts();

    let mut entries: Vec<ContactEntry> = book
        .iter()
        .map(|(number, name)| ContactEntry {
            number: number.to_string(),
            name: name.to_string(),
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name).then(a.number.cmp(&b.number)));

    let report = ContactsReport {
        entries,
        skipped_entries: book.skipped(),
    };

    if out.is_json() {
        out.print(&report);
        return Ok(());
    }

    if report.entries.is_empty() {
        println!("Contact mapping is empty; messages are attributed to raw numbers.");
    } else {
        println!("Contacts ({}):", report.entries.len());
        println!("{:-<60}", "");
        for entry in &report.entries {
            println!("{:<32} {}", entry.name, entry.number);
        }
    }

    if report.skipped_entries > 0 {
        println!();
        println!("Note: {} malformed contact entr(ies) were skipped.", report.skipped_entries);
    }
    Ok(())
}
