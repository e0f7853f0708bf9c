//! Contact book - load and look up contacts parsed from a vCard file.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use super::vcard;

/// Options applied while normalizing numbers from the contact file.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Country code prepended to bare 10-digit numbers, e.g. "39".
    /// Off by default; contact files that already carry full international
    /// numbers need no widening.
    pub default_country_code: Option<String>,
}

/// Mapping from normalized phone number to display name.
///
/// Built once per run; read-only afterward. An empty book is a supported
/// mode: every lookup falls through to the raw identifier.
#[derive(Debug, Clone, Default)]
pub struct ContactBook {
    entries: HashMap<String, String>,
    skipped: usize,
    options: ParseOptions,
}

impl ContactBook {
    /// Load contacts from a vCard file.
    ///
    /// A missing file yields an empty book, not an error. Malformed entries
    /// are skipped and counted.
    pub fn load<P: AsRef<Path>>(path: P, options: ParseOptions) -> Self {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                info!(path = %path.display(), error = %e, "no contact file, using raw identifiers");
                return Self {
                    options,
                    ..Self::default()
                };
            }
        };

        let parsed = vcard::parse(&content, &options);
        if parsed.skipped > 0 {
            warn!(skipped = parsed.skipped, path = %path.display(), "skipped malformed contact entries");
        }

        Self {
            entries: parsed.entries,
            skipped: parsed.skipped,
            options,
        }
    }

    /// An empty book (pass-through resolution).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a book from already-normalized entries.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            entries: entries.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Resolve a raw phone number to a display name, if known.
    pub fn resolve(&self, raw_number: &str) -> Option<&str> {
        let key = normalize_with(raw_number, &self.options);
        self.entries.get(&key).map(String::as_str)
    }

    /// Display name for a number, falling back to the raw number itself.
    pub fn display_name(&self, raw_number: &str) -> String {
        self.resolve(raw_number)
            .map(str::to_string)
            .unwrap_or_else(|| raw_number.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of malformed entries skipped while parsing.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Iterate (normalized number, display name) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Strip formatting characters from a phone number to produce the canonical
/// lookup key: digits only, no leading '+', spaces, dashes or parentheses.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub(crate) fn normalize_with(raw: &str, options: &ParseOptions) -> String {
    let mut key = normalize_phone(raw);
    if let Some(ref cc) = options.default_country_code {
        if key.len() == 10 {
            key = format!("{cc}{key}");
        }
    }
    key
}
