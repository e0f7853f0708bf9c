//! msgstore-analytics - export WhatsApp chat transcripts and crunch
//! message statistics from a local msgstore.db.
//!
//! Reads the message store strictly read-only; an optional contacts.vcf maps
//! phone numbers to display names.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::anyhow;
use clap::{Parser, Subcommand};

use msgstore_analytics::analytics::TimeBucket;
use msgstore_analytics::contacts::ParseOptions;
use msgstore_analytics::model::TimezonePolicy;
use msgstore_analytics::output::OutputControls;
use msgstore_analytics::session::Session;
use msgstore_analytics::commands;

/// Export WhatsApp chat transcripts and crunch message statistics.
#[derive(Parser, Debug)]
#[command(name = "msgstore-analytics")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the message store database
    #[arg(long, global = true, default_value = "msgstore.db")]
    db: PathBuf,

    /// Path to the vCard contact file (missing file is fine)
    #[arg(long, global = true, default_value = "contacts.vcf")]
    contacts: PathBuf,

    /// Timezone for timestamps: local, utc, or a fixed offset like +02:00
    #[arg(long, global = true, default_value = "local")]
    timezone: String,

    /// Country code prepended to bare 10-digit contact numbers
    #[arg(long, global = true)]
    country_code: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Compact single-line JSON output
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export chats as one text transcript per chat
    Export {
        /// Output directory for transcript files
        #[arg(short, long, default_value = "chat_txt_files")]
        output: PathBuf,

        /// Export only these chats (name, fuzzy matched); default: all
        #[arg(short, long)]
        chat: Vec<String>,
    },

    /// Show aggregate statistics
    Stats {
        /// Volume bucket granularity: day, week or month
        #[arg(short, long, default_value = "day")]
        bucket: String,

        /// Scope to one chat (name, fuzzy matched)
        #[arg(long)]
        chat: Option<String>,

        /// Scope to one sender (contact name or number)
        #[arg(long)]
        contact: Option<String>,
    },

    /// List chats with message counts and date ranges
    Chats,

    /// Show the resolved contact mapping
    Contacts,

    /// Interactive dashboard (menu loop)
    Dashboard {
        /// Output directory used by the export action
        #[arg(short, long, default_value = "chat_txt_files")]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let out = OutputControls {
        json: cli.json,
        compact: cli.compact,
    };

    let Some(timezone) = TimezonePolicy::parse(&cli.timezone) else {
        eprintln!(
            "Error: unrecognized timezone '{}' (expected local, utc or a fixed offset like +02:00)",
            cli.timezone
        );
        return ExitCode::from(2);
    };

    let mut session = Session::new(
        cli.db,
        cli.contacts,
        timezone,
        ParseOptions {
            default_country_code: cli.country_code,
        },
    );

    let result = match cli.command {
        Command::Export { output, chat } => {
            commands::export::run(&mut session, &output, &chat, &out)
        }
        Command::Stats { bucket, chat, contact } => match TimeBucket::parse(&bucket) {
            Some(bucket) => {
                commands::stats::run(&mut session, bucket, chat.as_deref(), contact.as_deref(), &out)
            }
            None => Err(anyhow!(
                "unrecognized bucket '{bucket}' (expected day, week or month)"
            )),
        },
        Command::Chats => commands::chats::run(&mut session, &out),
        Command::Contacts => commands::contacts::run(&mut session, &out),
        Command::Dashboard { output } => commands::dashboard::run(&mut session, &output),
    };

    match result {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}
