//! The note-file document: entry name -> link

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key written by `regfile` holding the creation timestamp
pub const SENTINEL_KEY: &str = "_created";

/// A whole note-file. Serializes as a flat JSON object of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteFile {
    links: BTreeMap<String, String>,
}

impl NoteFile {
    /// A freshly registered file: no entries, only the sentinel
    pub fn seeded(created_at: DateTime<Utc>) -> Self {
        let mut links = BTreeMap::new();
        links.insert(
            SENTINEL_KEY.to_string(),
            created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        Self { links }
    }

    pub fn get(&self, entry: &str) -> Option<&str> {
        if entry == SENTINEL_KEY {
            return None;
        }
        self.links.get(entry).map(String::as_str)
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.get(entry).is_some()
    }

    /// Insert or overwrite a link, returning the previous one
    pub fn set(&mut self, entry: &str, link: &str) -> Option<String> {
        self.links.insert(entry.to_string(), link.to_string())
    }

    /// Entry names in sorted order, sentinel excluded
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.links
            .keys()
            .map(String::as_str)
            .filter(|k| *k != SENTINEL_KEY)
    }

    pub fn len(&self) -> usize {
        self.entry_names().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn created_at(&self) -> Option<&str> {
        self.links.get(SENTINEL_KEY).map(String::as_str)
    }
}
