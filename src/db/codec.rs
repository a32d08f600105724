//! Encoding between in-memory records and their storage columns.
//!
//! Embedded collections (checklists, comments, shopping items) live in TEXT
//! columns as JSON arrays. Timestamps are RFC 3339 strings with millisecond
//! precision, which keeps lexical and chronological order identical.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub fn encode_collection<T: Serialize>(items: &[T]) -> Result<String> {
    serde_json::to_string(items).context("failed to encode embedded collection")
}

/// Parses an embedded collection. A blank or `null` column reads as empty.
pub fn decode_collection<T: DeserializeOwned>(column: &str, text: &str) -> Result<Vec<T>> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).with_context(|| format!("malformed {column} column"))
}

pub fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn decode_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("invalid timestamp: {text}"))
}

/// Wraps a decoding failure so it can surface from a row mapper.
pub(crate) fn conversion_error(column: usize, err: anyhow::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{err:#}"),
        )),
    )
}
