use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::state::{ChartKind, Section};

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
            let hsl = Hsl::new(hue, 0.65, 0.5);
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
// Color mapping: series label → Color32
// ---------------------------------------------------------------------------

/// One colour per series label, shared by every chart of a tab so that a
/// supplier or class keeps its colour across charts.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    pub fn new(labels: &BTreeSet<String>) -> Self {
        let palette = generate_palette(labels.len());
        ColorMap {
            mapping: labels.iter().cloned().zip(palette).collect(),
        }
    }

    /// Colour map over every series and category label of `sections`.
    pub fn for_sections<'a>(sections: impl IntoIterator<Item = &'a Section>) -> Self {
        let mut labels = BTreeSet::new();
        for chart in sections.into_iter().flat_map(|s| &s.charts) {
            match &chart.kind {
                ChartKind::Lines(series) | ChartKind::StackedBars(series) => {
                    labels.extend(series.iter().map(|s| s.name.clone()));
                }
                ChartKind::Categories(bars) => {
                    labels.extend(bars.iter().map(|(label, _)| label.clone()));
                }
            }
        }
        Self::new(&labels)
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping.get(label).copied().unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_colours_per_label() {
        let labels: BTreeSet<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let map = ColorMap::new(&labels);
        assert_ne!(map.color_for("A"), map.color_for("B"));
        assert_ne!(map.color_for("B"), map.color_for("C"));
        assert_eq!(map.color_for("unknown"), Color32::GRAY);
    }

    #[test]
    fn empty_palette() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(4).len(), 4);
    }
}
