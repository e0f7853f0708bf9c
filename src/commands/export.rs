//! Export command: write one transcript file per chat.

use std::path::Path;

use anyhow::Result;

use crate::export::{export_all, export_selected, ExportReport};
use crate::output::OutputControls;
use crate::session::Session;

/// Export all chats, or only those named in `chat_names`.
pub fn run(
    session: &mut Session,
    output_dir: &Path,
    chat_names: &[String],
    out: &OutputControls,
) -> Result<()> {
    let model = session.model()?;

    let report = if chat_names.is_empty() {
        export_all(model, output_dir)?
    } else {
        let mut ids = Vec::with_capacity(chat_names.len());
        for name in chat_names {
            ids.push(super::resolve_chat(model, name)?.id);
        }
        export_selected(model, output_dir, &ids)?
    };

    if out.is_json() {
        out.print(&report);
    } else {
        print_report(&report, output_dir);
    }

    // Failed chats are reported above, not fatal; the command itself
    // succeeds as long as the run could proceed.
    Ok(())
}

fn print_report(report: &ExportReport, output_dir: &Path) {
    for chat in &report.exported {
        println!(
            "Wrote {} ({} messages)",
            chat.file.display(),
            chat.message_count
        );
    }

    if !report.failed.is_empty() {
        println!();
        println!("Failed chats ({}):", report.failed_count());
        println!("{:-<60}", "");
        for failed in &report.failed {
            println!("{}: {}", failed.chat, failed.error);
        }
    }

    println!();
    println!(
        "Done. {} transcript(s) in {}, {} failed.",
        report.exported_count(),
        output_dir.display(),
        report.failed_count()
    );
    if report.dropped_rows > 0 {
        println!(
            "Note: {} database row(s) with dangling references were skipped.",
            report.dropped_rows
        );
    }
}
