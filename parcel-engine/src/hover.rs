//! Surbrillance transitoire au survol
//!
//! Le survol ne possède que la couche de survol et la popup. Il ne touche jamais à la
//! sélection, au marqueur ni à la position persistée.

use serde::Serialize;
use tracing::trace;

use crate::address::resolve_address;
use crate::config::EngineConfig;
use crate::correlator::{correlate, Correlation, Outcome};
use crate::geometry::{LngLat, Pixel};
use crate::model::{ParcelGroup, Rgb};
use crate::renderer::{empty_collection, MapRenderer, PaintValue};

/// Contenu de l'infobulle de survol
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub land_use: String,
    pub sheet_number: String,
    pub lot_number: String,
    pub address: String,
    pub color: Rgb,
}

impl Tooltip {
    fn from_group(group: &ParcelGroup, address: String) -> Self {
        let primary = group.primary();
        Self {
            land_use: group.hit_land_use.clone(),
            sheet_number: primary.sheet_number.clone(),
            lot_number: primary.lot_number.clone(),
            address,
            color: group.color,
        }
    }

    /// Fragment HTML de la popup (valeurs échappées)
    pub fn to_html(&self) -> String {
        format!(
            concat!(
                "<div class=\"parcel-tooltip\">",
                "<span class=\"swatch\" style=\"background:{}\"></span>",
                "<strong>{}</strong>",
                "<div>Tờ {} - Thửa {}</div>",
                "<div>{}</div>",
                "</div>"
            ),
            self.color.css(),
            escape_html(&self.land_use),
            escape_html(&self.sheet_number),
            escape_html(&self.lot_number),
            escape_html(&self.address),
        )
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Pipeline de survol
#[derive(Debug, Default)]
pub struct HoverPipeline {
    tooltip: Option<Tooltip>,
}

impl HoverPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Infobulle actuellement affichée
    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Traite un déplacement du pointeur
    pub fn on_pointer_move<R: MapRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        pixel: Pixel,
        lng_lat: LngLat,
        config: &EngineConfig,
    ) -> Outcome {
        let layer = &config.layers.hover;

        let group = match correlate(&*renderer, pixel, config) {
            Correlation::Group(group) => group,
            Correlation::Empty(reason) => {
                if self.tooltip.take().is_some() {
                    trace!("Hover left parcel group");
                }
                renderer.set_layer_data(layer, empty_collection());
                renderer.hide_popup();
                return Outcome::Empty(reason);
            }
        };

        let address = resolve_address(&*renderer, pixel, group.primary(), config);
        let tooltip = Tooltip::from_group(&group, address);

        renderer.set_layer_data(layer, group.outline_collection());
        renderer.set_paint_property(layer, "fill-color", PaintValue::Color(group.color.css()));
        renderer.set_paint_property(
            layer,
            "fill-opacity",
            PaintValue::Number(config.hover_opacity),
        );
        renderer.show_popup(lng_lat, &tooltip.to_html());

        trace!(group = %group.group_id, "Hover highlight updated");
        self.tooltip = Some(tooltip);
        Outcome::Matched(group.group_id)
    }
}
