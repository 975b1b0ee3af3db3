use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ReadRow;

/// One user's acknowledgment of one content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadEntry {
    pub is_read: bool,
    pub read_at: DateTime<Utc>,
}

/// One user's read rows keyed by content id.
///
/// Only rows that exist in storage appear here; a missing entry means
/// unread with no timestamp. The map never synthesizes placeholder rows,
/// and nothing in this crate can flip an entry back to unread; rows only
/// advance via the storage-side upsert.
#[derive(Debug, Clone, Default)]
pub struct ReadMap {
    entries: HashMap<Uuid, ReadEntry>,
}

impl ReadMap {
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = ReadRow>,
    {
        let entries = rows
            .into_iter()
            .map(|row| {
                (
                    row.content_id,
                    ReadEntry {
                        is_read: row.is_read,
                        read_at: row.read_at,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, content_id: Uuid) -> Option<&ReadEntry> {
        self.entries.get(&content_id)
    }

    /// Absence reads as unread.
    pub fn is_read(&self, content_id: Uuid) -> bool {
        self.entries
            .get(&content_id)
            .map(|entry| entry.is_read)
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
