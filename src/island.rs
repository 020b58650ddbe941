//! The island record, its legacy-format migration and the collection type.
//!
//! Records on disk come in two shapes: the current one with a flat `content`
//! string, and an older one carrying a `notes` list. Both are resolved into
//! the single canonical [`Island`] when loaded; nothing past this module
//! looks at field presence.
use std::collections::{btree_map, BTreeMap};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{new_island_id, parse_timestamp, sampling, IslandError, Result};

/// A named text blob whose non-blank lines are ideas
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Island {
    /// Unique identifier; stored as the collection key, not inside the record
    #[serde(skip)]
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-form text, one idea per line
    pub content: String,
    /// When the island was created
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Island {
    /// Creates a new island with a fresh id and empty content
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Island {
            id: new_island_id(),
            name,
            content: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the fields present in `patch`, bumping `updated_at`.
    ///
    /// `updated_at` never moves backwards, even if the clock does.
    pub fn apply(&mut self, patch: &IslandPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        self.updated_at = Utc::now().max(self.updated_at);
    }

    /// Every idea in the island, in file order
    pub fn ideas(&self) -> Vec<String> {
        sampling::all_ideas(&self.content)
    }
}

/// A partial update: only the fields being changed are set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IslandPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl IslandPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.content.is_none()
    }

    /// The patch as it is stored: names are trimmed, content is kept verbatim
    pub fn normalized(&self) -> IslandPatch {
        IslandPatch {
            name: self.name.as_deref().map(|n| n.trim().to_string()),
            content: self.content.clone(),
        }
    }
}

/// The shape a stored record's text was found in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredContent {
    /// Flat `content` string
    Current(String),
    /// Older `notes` list; each entry's optional `content`
    Legacy(Vec<Option<String>>),
    /// Neither field present
    Missing,
}

/// A record as found on disk, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredIsland {
    pub name: Option<String>,
    pub content: StoredContent,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredIsland {
    /// Reads whatever fields are usable out of a raw JSON value.
    ///
    /// Fields with the wrong type are treated as absent.
    pub fn from_value(value: &Value) -> Self {
        let empty = Map::new();
        let object = value.as_object().unwrap_or(&empty);

        let text = |key: &str| object.get(key).and_then(Value::as_str);

        let content = match (text("content"), object.get("notes")) {
            (Some(content), _) => StoredContent::Current(content.to_string()),
            (None, Some(Value::Array(notes))) => StoredContent::Legacy(
                notes
                    .iter()
                    .map(|note| note.get("content").and_then(Value::as_str).map(str::to_string))
                    .collect(),
            ),
            _ => StoredContent::Missing,
        };

        StoredIsland {
            name: text("name").map(str::to_string),
            content,
            created_at: text("created_at").and_then(parse_timestamp),
            updated_at: text("updated_at").and_then(parse_timestamp),
        }
    }

    /// Resolves into a canonical island with safe defaults
    pub fn into_island(self, id: &str) -> Island {
        let content = match self.content {
            StoredContent::Current(content) => content,
            StoredContent::Legacy(notes) => {
                debug!("Migrating legacy notes for island {}", id);
                notes
                    .into_iter()
                    .map(Option::unwrap_or_default)
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            StoredContent::Missing => String::new(),
        };

        let created_at = self.created_at.unwrap_or_else(Utc::now);
        let updated_at = self.updated_at.unwrap_or(created_at);

        Island {
            id: id.to_string(),
            name: self.name.unwrap_or_default(),
            content,
            created_at,
            updated_at,
        }
    }
}

/// Coerces any raw record into a well-formed island. Never fails.
pub fn normalize(id: &str, raw: &Value) -> Island {
    if !raw.is_object() {
        warn!("Island {} is not an object, loading it with defaults", id);
    }
    StoredIsland::from_value(raw).into_island(id)
}

/// All islands, keyed by id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IslandCollection {
    islands: BTreeMap<String, Island>,
}

impl IslandCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from a raw id -> record map, normalizing every entry
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let islands = map
            .iter()
            .map(|(id, raw)| (id.clone(), normalize(id, raw)))
            .collect();
        Self { islands }
    }

    pub fn len(&self) -> usize {
        self.islands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.islands.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.islands.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Island> {
        self.islands.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Island> {
        self.islands.get_mut(id)
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, Island> {
        self.islands.values()
    }

    /// Inserts an island under its own id, returning any island it replaced
    pub fn insert(&mut self, island: Island) -> Option<Island> {
        self.islands.insert(island.id.clone(), island)
    }

    pub fn remove(&mut self, id: &str) -> Option<Island> {
        self.islands.remove(id)
    }

    /// Moves an island from `old_id` to `new_id`
    pub fn rekey(&mut self, old_id: &str, new_id: &str) -> Result<()> {
        if old_id == new_id {
            return if self.contains(old_id) {
                Ok(())
            } else {
                Err(IslandError::not_found(old_id))
            };
        }
        if self.contains(new_id) {
            return Err(IslandError::invalid_input(format!(
                "island id {} is already in use",
                new_id
            )));
        }
        let mut island = self
            .islands
            .remove(old_id)
            .ok_or_else(|| IslandError::not_found(old_id))?;
        island.id = new_id.to_string();
        self.insert(island);
        Ok(())
    }
}

impl FromIterator<Island> for IslandCollection {
    fn from_iter<I: IntoIterator<Item = Island>>(iter: I) -> Self {
        Self {
            islands: iter.into_iter().map(|i| (i.id.clone(), i)).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a IslandCollection {
    type Item = &'a Island;
    type IntoIter = btree_map::Values<'a, String, Island>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
