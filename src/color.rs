use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Region → Color32
// ---------------------------------------------------------------------------

/// Size of the palette individual countries are hashed into.
const COUNTRY_PALETTE_SIZE: usize = 24;

/// Stable colour per region so the same continent looks the same in every
/// chart. Countries outside the fixed list get a colour from their name.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    country_palette: Vec<Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Assign colours in the order the regions are given.
    pub fn new<'a>(regions: impl IntoIterator<Item = &'a str>) -> Self {
        let regions: Vec<&str> = regions.into_iter().collect();
        let palette = generate_palette(regions.len());
        let mapping = regions
            .into_iter()
            .zip(palette)
            .map(|(r, c)| (r.to_string(), c))
            .collect();

        ColorMap {
            mapping,
            country_palette: generate_palette(COUNTRY_PALETTE_SIZE),
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a region; unknown regions are grey.
    pub fn color_for(&self, region: &str) -> Color32 {
        self.mapping
            .get(region)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Mapped colour if the name is known, otherwise one picked by hashing
    /// the name. The same name always gets the same colour.
    pub fn color_for_country(&self, name: &str) -> Color32 {
        if let Some(c) = self.mapping.get(name) {
            return *c;
        }
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        let idx = (hasher.finish() % self.country_palette.len() as u64) as usize;
        self.country_palette[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::AGGREGATE_REGIONS;

    #[test]
    fn test_palette_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(8).len(), 8);
    }

    #[test]
    fn test_region_colors_distinct_and_stable() {
        let map = ColorMap::new(AGGREGATE_REGIONS);
        let again = ColorMap::new(AGGREGATE_REGIONS);
        assert_ne!(map.color_for("World"), map.color_for("Asia"));
        assert_eq!(map.color_for("Europe"), again.color_for("Europe"));
        assert_eq!(map.color_for("France"), Color32::GRAY);
    }

    #[test]
    fn test_country_colors_hashed() {
        let map = ColorMap::new(AGGREGATE_REGIONS);
        assert_eq!(map.color_for_country("Asia"), map.color_for("Asia"));
        assert_eq!(map.color_for_country("France"), map.color_for_country("France"));

        let countries = ["France", "Germany", "China", "India", "Brazil", "Chile", "Japan", "Peru"];
        let distinct: std::collections::BTreeSet<[u8; 4]> = countries
            .iter()
            .map(|c| map.color_for_country(c).to_array())
            .collect();
        assert!(distinct.len() > 1);
    }
}
