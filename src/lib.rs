//! msgstore-analytics library
//!
//! Pipeline: database reader + contact resolver -> message normalizer ->
//! exporter / analytics aggregator -> presentation layer.

pub mod analytics;
pub mod commands;
pub mod contacts;
pub mod db;
pub mod error;
pub mod export;
pub mod model;
pub mod output;
pub mod session;

pub use error::{Error, Result};
