//! Line-oriented vCard parsing.
//!
//! Only the fields this tool needs are read: FN for the display name, TEL
//! lines for numbers. Everything else in a card is ignored. A TEL line with
//! no preceding FN in the same card is a malformed entry and is skipped.

use std::collections::HashMap;

use super::book::{normalize_with, ParseOptions};

#[derive(Debug, Default)]
pub struct ParsedContacts {
    pub entries: HashMap<String, String>,
    pub skipped: usize,
}

/// Parse vCard content into number -> name entries.
///
/// TEL lines look like `TEL;TYPE=CELL:+1 555 123 4567`; the number is
/// whatever follows the first ':'. Prefix matching is case-insensitive.
pub fn parse(content: &str, options: &ParseOptions) -> ParsedContacts {
    let mut parsed = ParsedContacts::default();
    let mut current_name: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();
        let upper = line.to_ascii_uppercase();

        if upper.starts_with("BEGIN:VCARD") || upper.starts_with("END:VCARD") {
            current_name = None;
        } else if upper.starts_with("FN:") {
            let name = line[3..].trim();
            current_name = (!name.is_empty()).then(|| name.to_string());
        } else if upper.starts_with("TEL") {
            let Some((_, raw_number)) = line.split_once(':') else {
                parsed.skipped += 1;
                continue;
            };
            let key = normalize_with(raw_number.trim(), options);
            match (&current_name, key.is_empty()) {
                (Some(name), false) => {
                    parsed.entries.insert(key, name.clone());
                }
                _ => parsed.skipped += 1,
            }
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_default(content: &str) -> ParsedContacts {
        parse(content, &ParseOptions::default())
    }

    #[test]
    fn test_parse_basic_card() {
        let vcf = "BEGIN:VCARD\nVERSION:3.0\nFN:Ada Lovelace\nTEL;TYPE=CELL:+1 (555) 123-4567\nEND:VCARD\n";
        let parsed = parse_default(vcf);
        assert_eq!(parsed.entries.get("15551234567").map(String::as_str), Some("Ada Lovelace"));
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn test_multiple_formats_same_key() {
        let vcf = concat!(
            "BEGIN:VCARD\nFN:Ada\nTEL:+1 (555) 123-4567\nEND:VCARD\n",
            "BEGIN:VCARD\nFN:Also Ada\nTEL:15551234567\nEND:VCARD\n",
        );
        let parsed = parse_default(vcf);
        // Both raw formats normalize to the same key; last writer wins.
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries.get("15551234567").map(String::as_str), Some("Also Ada"));
    }

    #[test]
    fn test_tel_without_name_is_skipped() {
        let vcf = "BEGIN:VCARD\nTEL:+1 555 000 1111\nEND:VCARD\n";
        let parsed = parse_default(vcf);
        assert!(parsed.entries.is_empty());
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn test_empty_number_is_skipped() {
        let vcf = "BEGIN:VCARD\nFN:Nobody\nTEL;TYPE=CELL:\nEND:VCARD\n";
        let parsed = parse_default(vcf);
        assert!(parsed.entries.is_empty());
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn test_name_does_not_leak_across_cards() {
        let vcf = concat!(
            "BEGIN:VCARD\nFN:Ada\nEND:VCARD\n",
            "BEGIN:VCARD\nTEL:+1 555 222 3333\nEND:VCARD\n",
        );
        let parsed = parse_default(vcf);
        assert!(parsed.entries.is_empty());
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn test_case_insensitive_prefixes() {
        let vcf = "begin:vcard\nfn:Grace Hopper\ntel;type=home:+1 555 999 8877\nend:vcard\n";
        let parsed = parse_default(vcf);
        assert_eq!(parsed.entries.get("15559998877").map(String::as_str), Some("Grace Hopper"));
    }
}
