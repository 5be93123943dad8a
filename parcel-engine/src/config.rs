//! Configuration du moteur : noms de couches, schéma d'attributs des tuiles, persistance

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geometry::LngLat;

/// Centre par défaut : Hô Chi Minh-Ville
pub const DEFAULT_CENTER: LngLat = LngLat::new(106.702103, 10.775496);

/// Durée de validité de la dernière position (12 mois de 30 jours)
pub const VIEW_STATE_TTL: Duration = Duration::from_secs(12 * 30 * 24 * 60 * 60);

/// Configuration principale du moteur
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub layers: LayerConfig,
    pub attributes: AttributeConfig,

    /// Centre de la caméra si aucune position n'est persistée
    pub default_center: LngLat,

    /// Opacité du remplissage de survol
    pub hover_opacity: f64,

    /// Libellé d'usage du sol quand la tuile n'en fournit pas
    pub unknown_land_use_label: String,

    /// Clé du slot de persistance de la dernière position
    pub view_state_key: String,

    /// Validité du slot en jours
    pub view_state_ttl_days: u64,

    /// Zoom appliqué par la recherche de coordonnées
    pub search_zoom: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layers: LayerConfig::default(),
            attributes: AttributeConfig::default(),
            default_center: DEFAULT_CENTER,
            hover_opacity: 0.4,
            unknown_land_use_label: "Không xác định".to_string(),
            view_state_key: "lngLat".to_string(),
            view_state_ttl_days: VIEW_STATE_TTL.as_secs() / 86_400,
            search_zoom: 18.0,
        }
    }
}

impl EngineConfig {
    /// Parse une configuration JSON (champs absents = valeurs par défaut)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn view_state_ttl(&self) -> Duration {
        Duration::from_secs(self.view_state_ttl_days.saturating_mul(86_400))
    }
}

/// Noms des couches et sources du style de carte
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Couche de remplissage des sous-parcelles (cible du pointeur)
    pub sub_parcels: String,
    /// Couche symbole des numéros de rue
    pub address_points: String,
    /// Source vectorielle faisant foi pour les contours de parcelles
    pub parcel_source: String,
    /// Couche de la source contenant les parcelles
    pub parcel_source_layer: String,
    /// Couche de surbrillance au survol
    pub hover: String,
    /// Couche de sélection
    pub selection: String,
    /// Couche des cotes (longueurs d'arêtes)
    pub length_labels: String,
    /// Couche des aires
    pub area_labels: String,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            sub_parcels: "subparcels".to_string(),
            address_points: "diachi".to_string(),
            parcel_source: "extra".to_string(),
            parcel_source_layer: "parcels".to_string(),
            hover: "hoverLayer".to_string(),
            selection: "clickLayer".to_string(),
            length_labels: "lengthFeature".to_string(),
            area_labels: "areaFeature".to_string(),
        }
    }
}

/// Noms des attributs dans les tuiles cadastrales
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AttributeConfig {
    pub group_id: String,
    pub color: String,
    pub land_use: String,
    pub area: String,
    pub sheet_number: String,
    pub lot_number: String,
    pub house_number: String,
    pub street_name: String,
    pub ward_name: String,
    pub district_name: String,
    /// Numéro de rue porté par la couche des points d'adresse
    pub address_house_number: String,
}

impl Default for AttributeConfig {
    fn default() -> Self {
        Self {
            group_id: "gid".to_string(),
            color: "rgbcolor".to_string(),
            land_use: "chucnangsdd".to_string(),
            area: "dientich".to_string(),
            sheet_number: "soto".to_string(),
            lot_number: "sothua".to_string(),
            house_number: "sonha".to_string(),
            street_name: "tenduong".to_string(),
            ward_name: "tenphuongxa".to_string(),
            district_name: "tenquanhuyen".to_string(),
            address_house_number: "housenumber".to_string(),
        }
    }
}
