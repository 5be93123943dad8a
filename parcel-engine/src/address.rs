//! Composition de l'adresse affichée d'une parcelle

use crate::config::EngineConfig;
use crate::geometry::Pixel;
use crate::model::Parcel;
use crate::renderer::{LayerFilter, MapRenderer, QueryArea};

/// Résout l'adresse au pixel de l'interaction courante
///
/// Le pixel doit être celui qui a déclenché la corrélation : survol et clic l'appellent
/// chacun avec leur propre position.
pub fn resolve_address<R: MapRenderer + ?Sized>(
    renderer: &R,
    pixel: Pixel,
    parcel: &Parcel,
    config: &EngineConfig,
) -> String {
    let points = renderer.query_rendered_features(
        QueryArea::Pixel(pixel),
        &LayerFilter::layer(&config.layers.address_points),
    );
    let point_house = points
        .first()
        .and_then(|p| p.property_str(&config.attributes.address_house_number));

    compose_address(point_house.as_deref(), parcel)
}

/// Compose l'adresse à partir du point d'adresse (prioritaire) et des attributs de la parcelle
///
/// `"{numéro}, {rue}, {phường}, {quận}"`, chaque partie absente (ou sentinelle) étant omise.
pub fn compose_address(point_house_number: Option<&str>, parcel: &Parcel) -> String {
    let house = point_house_number
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or(parcel.house_number.as_deref());

    [
        house,
        parcel.street_name.as_deref(),
        parcel.ward_name.as_deref(),
        parcel.district_name.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(", ")
}
