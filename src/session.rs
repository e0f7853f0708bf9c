//! Explicit, caller-visible cache of the loaded model.
//!
//! The presentation layer interacts with a `Session` rather than re-reading
//! the database on every view: the model is loaded lazily, kept immutable,
//! and refreshed only on an explicit reload action.

use std::path::PathBuf;

use tracing::info;

use crate::contacts::{ContactBook, ParseOptions};
use crate::db;
use crate::error::Result;
use crate::model::{build_model, Model, TimezonePolicy};

pub struct Session {
    db_path: PathBuf,
    contacts_path: PathBuf,
    timezone: TimezonePolicy,
    contact_options: ParseOptions,
    model: Option<Model>,
    contacts: ContactBook,
}

impl Session {
    pub fn new(
        db_path: PathBuf,
        contacts_path: PathBuf,
        timezone: TimezonePolicy,
        contact_options: ParseOptions,
    ) -> Self {
        Self {
            db_path,
            contacts_path,
            timezone,
            contact_options,
            model: None,
            contacts: ContactBook::empty(),
        }
    }

    /// The model, loading it from disk on first access.
    pub fn model(&mut self) -> Result<&Model> {
        if self.model.is_none() {
            self.load()?;
        }
        match self.model.as_ref() {
            Some(model) => Ok(model),
            // load() either filled the cache or returned an error above.
            None => unreachable!("session cache filled by load"),
        }
    }

    /// Drop the cached model and re-read both input files.
    pub fn reload(&mut self) -> Result<&Model> {
        self.model = None;
        self.model()
    }

    /// The contact book from the most recent load.
    pub fn contacts(&self) -> &ContactBook {
        &self.contacts
    }

    fn load(&mut self) -> Result<()> {
        self.contacts = ContactBook::load(&self.contacts_path, self.contact_options.clone());

        let conn = db::open_store(&self.db_path)?;
        let raw = db::fetch_all(&conn)?;
        let model = build_model(raw, &self.contacts, self.timezone);

        info!(
            chats = model.chat_count(),
            messages = model.messages().len(),
            contacts = self.contacts.len(),
            dropped = model.join_stats().dropped(),
            "loaded message store"
        );
        self.model = Some(model);
        Ok(())
    }
}
