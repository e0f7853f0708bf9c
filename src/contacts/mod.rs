//! Contact resolution: vCard file -> normalized phone number -> display name.

pub mod book;
pub mod vcard;

pub use book::{normalize_phone, ContactBook, ParseOptions};
