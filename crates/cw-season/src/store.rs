//! Season persistence boundary.
//!
//! Persistence is opaque whole-aggregate save/load by id — no
//! partial-update protocol. The store is an explicit object handed to
//! whatever needs it, not process-wide hidden state.

use std::collections::HashMap;

use crate::error::SeasonResult;
use crate::season::Season;

/// Save/resume boundary for seasons.
pub trait SeasonStore {
    /// Persist the full aggregate under its id, replacing any prior save.
    fn save(&mut self, season: &Season) -> SeasonResult<()>;

    /// Load a season by id. `None` when no save exists.
    fn load(&self, id: &str) -> SeasonResult<Option<Season>>;

    /// Ids of all saved seasons, sorted.
    fn ids(&self) -> Vec<String>;
}

/// In-memory store backed by serialized aggregates.
///
/// Serializing on save keeps its behavior identical to an external
/// key-value collaborator: a loaded season shares nothing with the one
/// saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    saves: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saved seasons.
    pub fn len(&self) -> usize {
        self.saves.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.saves.is_empty()
    }
}

impl SeasonStore for MemoryStore {
    fn save(&mut self, season: &Season) -> SeasonResult<()> {
        let json = serde_json::to_string(season)?;
        self.saves.insert(season.id().to_string(), json);
        Ok(())
    }

    fn load(&self, id: &str) -> SeasonResult<Option<Season>> {
        match self.saves.get(id) {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.saves.keys().cloned().collect();
        ids.sort();
        ids
    }
}
