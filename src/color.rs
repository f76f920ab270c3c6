use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::ExperienceLevel;
use crate::selection::SelectionModel;

/// Unselected bars and slices ("steelblue").
pub const BASE: Color32 = Color32::from_rgb(70, 130, 180);
/// Selected bars ("orange").
pub const ACCENT: Color32 = Color32::from_rgb(255, 165, 0);

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
// Color mapping: experience level → Color32
// ---------------------------------------------------------------------------

/// One colour per experience level, fixed regardless of which levels the
/// loaded file happens to contain.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<ExperienceLevel, Color32>,
}

impl Default for ColorMap {
    fn default() -> Self {
        let mapping = ExperienceLevel::ALL
            .into_iter()
            .zip(generate_palette(ExperienceLevel::ALL.len()))
            .collect();
        ColorMap { mapping }
    }
}

impl ColorMap {
    pub fn color_for(&self, level: ExperienceLevel) -> Color32 {
        self.mapping.get(&level).copied().unwrap_or(BASE)
    }

    /// Fill of a bar. Selected job titles use the accent; otherwise, while
    /// an experience filter is active, the bar takes the colour of its job's
    /// experience level.
    pub fn bar_color(
        &self,
        job_title: &str,
        job_level: Option<ExperienceLevel>,
        selection: &SelectionModel,
    ) -> Color32 {
        if selection.is_job_selected(job_title) {
            return ACCENT;
        }
        match job_level {
            Some(level) if selection.has_experience_filter() => self.color_for(level),
            _ => BASE,
        }
    }

    /// Fill of a pie slice: its own colour unless another level is selected.
    pub fn slice_color(&self, level: ExperienceLevel, selection: &SelectionModel) -> Color32 {
        if !selection.has_experience_filter() || selection.is_level_selected(level) {
            self.color_for(level)
        } else {
            BASE
        }
    }
}
