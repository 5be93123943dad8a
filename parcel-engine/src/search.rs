//! Recherche par coordonnées saisies au format `"lat, lng"`

use std::sync::LazyLock;

use regex::Regex;

use crate::error::EngineError;
use crate::geometry::LngLat;

/// `lat, lng` : deux décimaux signés séparés par une virgule
static COORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?\d+\.?\d*)\s*,\s*(-?\d+\.?\d*)$").expect("valid regex")
});

/// Parse une saisie `"lat, lng"` (ordre latitude d'abord, comme les coordonnées affichées)
pub fn parse_coordinate_query(input: &str) -> Result<LngLat, EngineError> {
    let trimmed = input.trim();
    let caps = COORD_RE.captures(trimmed).ok_or_else(|| {
        EngineError::invalid_coordinate(input, "expected \"lat, lng\" (e.g. 10.7769, 106.7009)")
    })?;

    let number = |i: usize| -> Result<f64, EngineError> {
        caps[i]
            .parse::<f64>()
            .map_err(|e| EngineError::invalid_coordinate(input, e.to_string()))
    };
    let lat = number(1)?;
    let lng = number(2)?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(EngineError::invalid_coordinate(
            input,
            format!("latitude {} out of range", lat),
        ));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(EngineError::invalid_coordinate(
            input,
            format!("longitude {} out of range", lng),
        ));
    }

    Ok(LngLat::new(lng, lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lat_lng_order() {
        let ll = parse_coordinate_query("10.7769, 106.7009").unwrap();
        assert_eq!(ll, LngLat::new(106.7009, 10.7769));
    }

    #[test]
    fn test_parse_tolerates_spacing() {
        assert_eq!(
            parse_coordinate_query("  -33.5 ,151 ").unwrap(),
            LngLat::new(151.0, -33.5)
        );
        assert_eq!(parse_coordinate_query("10.,106.").unwrap(), LngLat::new(106.0, 10.0));
    }

    #[test]
    fn test_parse_rejects_bad_format() {
        for input in ["", "10.7769", "10.7769; 106.7009", "abc, def", "10.7, 106.7, 3"] {
            assert!(
                matches!(
                    parse_coordinate_query(input),
                    Err(EngineError::InvalidCoordinate { .. })
                ),
                "input={:?}",
                input
            );
        }
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        // Ordre inversé : 106 n'est pas une latitude
        assert!(parse_coordinate_query("106.7009, 10.7769").is_err());
        assert!(parse_coordinate_query("10.0, 181.0").is_err());
        assert!(parse_coordinate_query("-90.0, -180.0").is_ok());
    }
}
