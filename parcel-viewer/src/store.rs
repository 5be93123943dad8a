//! Stockage clé/valeur persistant sur fichier JSON
//!
//! ```json
//! {"lngLat": {"value": "[106.70005,10.78005]", "expires_at": 1792108800}}
//! ```
//!
//! `expires_at` est un timestamp Unix en secondes. Les entrées expirées sont purgées à
//! l'ouverture et ignorées en lecture.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parcel_engine::{EngineError, KeyValueStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
struct Entry {
    value: String,
    expires_at: u64,
}

/// Stockage sur fichier, réécrit entièrement à chaque écriture
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, Entry>,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl FileStore {
    /// Ouvre (ou crée à la première écriture) le fichier de stockage
    ///
    /// Un fichier illisible est traité comme vide : la dernière position n'est qu'un confort.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let path = path.into();
        let mut entries: BTreeMap<String, Entry> = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Unreadable store file, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        let now = unix_now();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        if entries.len() < before {
            debug!(purged = before - entries.len(), "Expired store entries purged");
        }

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn flush(&self) -> Result<(), EngineError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn save(&mut self, key: &str, value: &str, ttl: Duration) -> Result<(), EngineError> {
        let expires_at = unix_now()
            .checked_add(ttl.as_secs())
            .ok_or_else(|| EngineError::storage(key, "expiry overflows"))?;
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        self.flush()
    }

    fn load(&self, key: &str) -> Result<Option<String>, EngineError> {
        let now = unix_now();
        Ok(self
            .entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone()))
    }
}
