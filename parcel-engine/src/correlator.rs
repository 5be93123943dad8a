//! Corrélation pixel → groupe de parcelles
//!
//! 1. Feature de la couche sous-parcelles sous le pixel
//! 2. Identifiant de groupe et couleur de cette feature
//! 3. Toutes les sous-parcelles rendues du même groupe, dédoublonnées
//! 4. Parcelles parentes depuis la source faisant foi

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::geometry::Pixel;
use crate::identity::FeatureId;
use crate::model::{GroupId, Parcel, ParcelGroup, Rgb, SubParcel};
use crate::renderer::{LayerFilter, MapRenderer, QueryArea, SourceQuery};

/// Raison d'un résultat vide
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    /// Aucune sous-parcelle sous le pixel (cas normal)
    NoFeature,
    /// Sous-parcelle sans identifiant de groupe exploitable
    MissingGroupId,
    /// Groupe rendu mais absent de la source des parcelles (cache de tuiles périmé)
    OrphanGroup(GroupId),
}

/// Résultat de la corrélation
#[derive(Debug, Clone, PartialEq)]
pub enum Correlation {
    Group(ParcelGroup),
    Empty(EmptyReason),
}

impl Correlation {
    pub fn group(&self) -> Option<&ParcelGroup> {
        match self {
            Self::Group(g) => Some(g),
            Self::Empty(_) => None,
        }
    }

    pub fn into_group(self) -> Option<ParcelGroup> {
        match self {
            Self::Group(g) => Some(g),
            Self::Empty(_) => None,
        }
    }
}

/// Résumé d'une interaction traitée par un pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Matched(GroupId),
    Empty(EmptyReason),
}

impl Outcome {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// Reconstruit le groupe de parcelles sous un pixel
pub fn correlate<R: MapRenderer + ?Sized>(
    renderer: &R,
    pixel: Pixel,
    config: &EngineConfig,
) -> Correlation {
    let layers = &config.layers;
    let attrs = &config.attributes;

    // 1. Feature sous le pixel
    let hits = renderer.query_rendered_features(
        QueryArea::Pixel(pixel),
        &LayerFilter::layer(&layers.sub_parcels),
    );
    let Some(hit) = hits.first() else {
        return Correlation::Empty(EmptyReason::NoFeature);
    };

    // 2. Groupe et couleur
    let Some(group_id) = GroupId::from_feature(hit, &attrs.group_id) else {
        debug!(feature = ?hit.id, "Sub-parcel without group id");
        return Correlation::Empty(EmptyReason::MissingGroupId);
    };
    let color = hit
        .property_str(&attrs.color)
        .and_then(|s| s.parse::<Rgb>().ok())
        .unwrap_or(Rgb::HIGHLIGHT_FALLBACK);
    let hit_land_use = hit
        .property_opt(&attrs.land_use)
        .unwrap_or_else(|| config.unknown_land_use_label.clone());

    // 3. Sous-parcelles du groupe, dédoublonnées AVANT toute agrégation
    let siblings = renderer.query_rendered_features(
        QueryArea::Viewport,
        &LayerFilter::layer(&layers.sub_parcels).with_property(&attrs.group_id, group_id.as_str()),
    );
    let queried = siblings.len();
    let mut seen: HashSet<FeatureId> = HashSet::with_capacity(queried);
    let sub_parcels: Vec<SubParcel> = siblings
        .iter()
        .filter(|f| seen.insert(f.identity()))
        .filter_map(|f| SubParcel::from_feature(f, attrs, &config.unknown_land_use_label))
        .collect();

    if sub_parcels.len() < queried {
        debug!(
            group = %group_id,
            queried,
            kept = sub_parcels.len(),
            "Dropped duplicate or empty sub-parcel features"
        );
    }

    // 4. Parcelles parentes. Une parcelle découpée par les tuiles revient en fragments de
    // même id : seules les copies exactes sont écartées.
    let query = SourceQuery::new(&layers.parcel_source_layer, vec![group_id.0.clone()]);
    let mut seen_parents: HashSet<FeatureId> = HashSet::new();
    let parents: Vec<Parcel> = renderer
        .query_source_features(&layers.parcel_source, &query)
        .iter()
        .filter(|f| seen_parents.insert(FeatureId::of(None, &f.geometry)))
        .map(|f| Parcel::from_feature(f, attrs))
        .collect();

    let parent_count = parents.len();
    let Some(group) = ParcelGroup::new(group_id.clone(), color, hit_land_use, sub_parcels, parents)
    else {
        warn!(group = %group_id, "Orphan group: rendered but missing from parcel source");
        return Correlation::Empty(EmptyReason::OrphanGroup(group_id));
    };

    debug!(
        group = %group.group_id,
        sub_parcels = group.sub_parcels.len(),
        parents = parent_count,
        "Correlated parcel group"
    );

    Correlation::Group(group)
}
