//! Types d'erreurs pour le crate parcel-engine

use thiserror::Error;

/// Erreurs pouvant survenir autour du moteur (persistance, configuration)
///
/// Les pipelines de survol et de sélection ne remontent jamais d'erreur :
/// tout échec y dégrade vers l'état "rien de sélectionné".
#[derive(Debug, Error)]
pub enum EngineError {
    /// Erreur d'I/O du stockage persistant
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sérialisation JSON impossible
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Écriture refusée par le stockage clé/valeur
    #[error("Storage error for key {key}: {reason}")]
    Storage { key: String, reason: String },

    /// Valeur persistée illisible
    #[error("Malformed persisted state for key {key}: {reason}")]
    MalformedState { key: String, reason: String },

    /// Texte de recherche de coordonnées invalide
    #[error("Invalid coordinate query {input:?}: {reason}")]
    InvalidCoordinate { input: String, reason: String },
}

impl EngineError {
    /// Crée une erreur de stockage avec contexte
    pub fn storage(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Storage {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur d'état persisté invalide
    pub fn malformed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedState {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de saisie de coordonnées
    pub fn invalid_coordinate(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCoordinate {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
