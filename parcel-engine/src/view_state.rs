//! Persistance de la dernière position consultée
//!
//! Un emplacement clé/valeur avec expiration suffit. Le format stocké est un tableau JSON
//! `[lng, lat]` ; la forme objet `{"lng": .., "lat": ..}` est aussi acceptée en lecture.

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::geometry::LngLat;

/// Stockage clé/valeur durable avec expiration
pub trait KeyValueStore {
    /// Écrit une valeur valable `ttl` à partir de maintenant
    fn save(&mut self, key: &str, value: &str, ttl: Duration) -> Result<(), EngineError>;

    /// Lit une valeur non expirée
    fn load(&self, key: &str) -> Result<Option<String>, EngineError>;
}

/// Stockage en mémoire, horloge décalable pour les tests d'expiration
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, (String, SystemTime)>,
    offset: Duration,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Avance l'horloge du stockage
    pub fn advance(&mut self, by: Duration) {
        self.offset = self.offset.saturating_add(by);
    }

    /// `None` si l'horloge décalée dépasse la plage de `SystemTime`
    fn now(&self) -> Option<SystemTime> {
        SystemTime::now().checked_add(self.offset)
    }
}

impl KeyValueStore for MemoryStore {
    fn save(&mut self, key: &str, value: &str, ttl: Duration) -> Result<(), EngineError> {
        let expires_at = self
            .now()
            .and_then(|now| now.checked_add(ttl))
            .ok_or_else(|| EngineError::storage(key, "expiry overflows"))?;
        self.entries
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>, EngineError> {
        Ok(self
            .entries
            .get(key)
            .filter(|(_, expires_at)| self.now().is_some_and(|now| *expires_at > now))
            .map(|(value, _)| value.clone()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCoord {
    Pair([f64; 2]),
    Object { lng: f64, lat: f64 },
}

/// Lecture/écriture de la dernière position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    key: String,
    ttl: Duration,
}

impl ViewState {
    pub fn new(key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            ttl,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.view_state_key, config.view_state_ttl())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Persiste une coordonnée (écrase la précédente)
    pub fn save<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
        coord: LngLat,
    ) -> Result<(), EngineError> {
        let value = serde_json::to_string(&[coord.lng, coord.lat])?;
        store.save(&self.key, &value, self.ttl)?;
        debug!(key = %self.key, lng = coord.lng, lat = coord.lat, "Saved view state");
        Ok(())
    }

    /// Dernière coordonnée persistée
    ///
    /// Un slot absent, expiré, illisible ou hors bornes donne `None` : l'appelant retombe
    /// sur le centre par défaut.
    pub fn load<S: KeyValueStore + ?Sized>(&self, store: &S) -> Option<LngLat> {
        self.try_load(store).unwrap_or_else(|e| {
            warn!(key = %self.key, error = %e, "Ignoring unreadable view state");
            None
        })
    }

    /// Variante stricte de [`ViewState::load`] qui remonte l'erreur
    pub fn try_load<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<Option<LngLat>, EngineError> {
        match store.load(&self.key)? {
            Some(raw) => parse_stored(&raw)
                .map(Some)
                .map_err(|reason| EngineError::malformed(&self.key, reason)),
            None => Ok(None),
        }
    }

    /// Centre initial de la caméra
    pub fn initial_center<S: KeyValueStore + ?Sized>(&self, store: &S, default: LngLat) -> LngLat {
        self.load(store).unwrap_or(default)
    }
}

fn parse_stored(raw: &str) -> Result<LngLat, String> {
    let coord = match serde_json::from_str::<StoredCoord>(raw).map_err(|e| e.to_string())? {
        StoredCoord::Pair([lng, lat]) => LngLat::new(lng, lat),
        StoredCoord::Object { lng, lat } => LngLat::new(lng, lat),
    };
    if !coord.is_valid() {
        return Err(format!("coordinate out of range: {}, {}", coord.lng, coord.lat));
    }
    Ok(coord)
}
