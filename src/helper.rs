use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use log::{error, trace};
use uuid::Uuid;

use crate::{IslandError, Result};

/// Generates a fresh island identifier
pub fn new_island_id() -> String {
    Uuid::new_v4().to_string()
}

/// Parses a stored timestamp.
///
/// Accepts RFC 3339 strings as well as naive ISO-8601 strings without an
/// offset, which are read as UTC. Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    trace!("Unparseable timestamp: {}", raw);
    None
}

/// Reads island content from a text file
pub fn read_content_file(path: &Path) -> Result<String> {
    if !path.exists() {
        error!("Content file not found: {}", path.display());
        return Err(IslandError::invalid_input(format!(
            "content file not found: {}",
            path.display()
        )));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Renders ideas as `Idea N: <line>`, numbered from 1
pub fn number_ideas(ideas: &[String]) -> Vec<String> {
    ideas
        .iter()
        .enumerate()
        .map(|(i, line)| format!("Idea {}: {}", i + 1, line))
        .collect()
}
