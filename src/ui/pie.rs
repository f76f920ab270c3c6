use std::f64::consts::{FRAC_PI_4, TAU};

use eframe::egui::{self, Color32, Pos2, RichText, Sense, Shape, Stroke, Ui, Vec2};

use crate::data::aggregate::{AggregateRow, legend_text, shares};
use crate::data::model::ExperienceLevel;
use crate::state::{AppState, Interaction};

// ---------------------------------------------------------------------------
// Pie layout
// ---------------------------------------------------------------------------

/// One arc of the pie. Angles in radians, clockwise from twelve o'clock.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub key: String,
    pub start: f64,
    pub end: f64,
}

/// Lay rows out around the circle in row order, proportionally to `metric`.
pub fn pie_slices(rows: &[AggregateRow]) -> Vec<PieSlice> {
    let total: f64 = rows.iter().map(|r| r.metric).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let mut angle = 0.0;
    let mut slices: Vec<PieSlice> = rows
        .iter()
        .map(|row| {
            let start = angle;
            angle += row.metric / total * TAU;
            PieSlice {
                key: row.key.clone(),
                start,
                end: angle,
            }
        })
        .collect();
    // Close the circle exactly despite rounding.
    if let Some(last) = slices.last_mut() {
        last.end = TAU;
    }
    slices
}

/// Slice containing the screen offset `(dx, dy)` from the centre (y down).
pub fn slice_at(slices: &[PieSlice], dx: f64, dy: f64, radius: f64) -> Option<&PieSlice> {
    if dx.hypot(dy) > radius {
        return None;
    }
    let angle = dx.atan2(-dy).rem_euclid(TAU);
    slices.iter().find(|s| angle >= s.start && angle < s.end)
}

fn arc_point(center: Pos2, radius: f32, angle: f64) -> Pos2 {
    Pos2::new(
        center.x + radius * angle.sin() as f32,
        center.y - radius * angle.cos() as f32,
    )
}

/// Convex wedges (at most 45° each) covering one slice.
fn wedges(center: Pos2, radius: f32, slice: &PieSlice) -> Vec<Vec<Pos2>> {
    let span = slice.end - slice.start;
    let pieces = (span / FRAC_PI_4 - 1e-9).ceil().max(1.0) as usize;
    (0..pieces)
        .map(|p| {
            let a0 = slice.start + span * p as f64 / pieces as f64;
            let a1 = slice.start + span * (p + 1) as f64 / pieces as f64;
            let mut points = vec![center];
            for step in 0..=8 {
                points.push(arc_point(center, radius, a0 + (a1 - a0) * step as f64 / 8.0));
            }
            points
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pie chart widget
// ---------------------------------------------------------------------------

/// Render the experience-level pie with its legend. A click on a slice
/// yields [`Interaction::ClickSlice`].
pub fn experience_pie(ui: &mut Ui, state: &AppState) -> Option<Interaction> {
    let fixed = state.fixed.as_ref()?;
    let rows = &fixed.experience_counts;
    let slices = pie_slices(rows);

    ui.strong("Distribution of Experience Level");
    let side = ui.available_width().min(260.0);
    let (rect, response) = ui.allocate_exact_size(Vec2::splat(side), Sense::click());
    let center = rect.center();
    let radius = side / 2.0 - 4.0;

    let painter = ui.painter_at(rect);
    for slice in &slices {
        let fill = ExperienceLevel::parse(&slice.key)
            .map(|lvl| state.color_map.slice_color(lvl, &state.selection))
            .unwrap_or(Color32::GRAY);
        for wedge in wedges(center, radius, slice) {
            painter.add(Shape::convex_polygon(wedge, fill, Stroke::NONE));
        }
    }
    for slice in &slices {
        painter.line_segment(
            [center, arc_point(center, radius, slice.start)],
            Stroke::new(1.0, Color32::WHITE),
        );
    }

    // Legend
    ui.add_space(6.0);
    for (key, pct) in shares(rows) {
        let swatch = ExperienceLevel::parse(&key)
            .map(|lvl| state.color_map.color_for(lvl))
            .unwrap_or(Color32::GRAY);
        ui.horizontal(|ui: &mut Ui| {
            ui.label(RichText::new("■").color(swatch));
            ui.label(legend_text(&key, pct));
        });
    }

    if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }
    if !response.clicked() {
        return None;
    }
    let pos = response.interact_pointer_pos()?;
    let slice = slice_at(
        &slices,
        f64::from(pos.x - center.x),
        f64::from(pos.y - center.y),
        f64::from(radius),
    )?;
    let level = ExperienceLevel::parse(&slice.key)?;
    Some(Interaction::ClickSlice(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<AggregateRow> {
        vec![
            AggregateRow { key: "SE".into(), metric: 2.0 },
            AggregateRow { key: "MI".into(), metric: 1.0 },
            AggregateRow { key: "EN".into(), metric: 1.0 },
        ]
    }

    #[test]
    fn slices_cover_the_circle() {
        let slices = pie_slices(&rows());
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].start, 0.0);
        assert!((slices[0].end - std::f64::consts::PI).abs() < 1e-12);
        assert!((slices[2].end - TAU).abs() < 1e-12);
        assert!(pie_slices(&[]).is_empty());
    }

    #[test]
    fn hit_testing_goes_clockwise_from_top() {
        let slices = pie_slices(&rows());
        // Right of centre is a quarter turn: inside the first (half) slice.
        assert_eq!(slice_at(&slices, 10.0, 0.0, 50.0).unwrap().key, "SE");
        // Straight down is exactly half way: second slice starts there.
        assert_eq!(slice_at(&slices, 0.0, 10.0, 50.0).unwrap().key, "MI");
        // Upper left quadrant belongs to the last slice.
        assert_eq!(slice_at(&slices, -10.0, -10.0, 50.0).unwrap().key, "EN");
        assert!(slice_at(&slices, 60.0, 0.0, 50.0).is_none());
    }

    #[test]
    fn wide_slices_split_into_convex_wedges() {
        let slices = pie_slices(&rows());
        assert_eq!(wedges(Pos2::ZERO, 10.0, &slices[0]).len(), 4);
        assert_eq!(wedges(Pos2::ZERO, 10.0, &slices[1]).len(), 2);
    }
}
