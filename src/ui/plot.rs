use eframe::egui::{Align2, Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoint, PlotPoints, Text};

use crate::color::BASE;
use crate::data::model::{DimensionKind, FieldValue, Record};
use crate::data::scale::{DimensionScale, ScaleDomain};
use crate::state::{AppState, Interaction};

/// Width of a bar in slot units.
const BAR_WIDTH: f64 = 0.7;
/// Vertical distance (in normalised axis units) that still counts as "on" a line.
const HOVER_TOLERANCE: f64 = 0.015;
/// Categorical axes with more categories than this only label every n-th one.
const MAX_CATEGORY_LABELS: usize = 24;

// ---------------------------------------------------------------------------
// Bar chart: average salary by job title
// ---------------------------------------------------------------------------

/// Index of the bar under plot x-coordinate `x`, if any.
pub fn bar_at(x: f64, n_bars: usize) -> Option<usize> {
    let idx = x.round();
    if idx < 0.0 || idx >= n_bars as f64 || (x - idx).abs() > BAR_WIDTH / 2.0 {
        return None;
    }
    Some(idx as usize)
}

/// Render the bar chart; a click on a bar yields [`Interaction::ClickBar`].
pub fn salary_bar_chart(ui: &mut Ui, state: &AppState, height: f32) -> Option<Interaction> {
    let fixed = state.fixed.as_ref()?;
    let jobs: Vec<String> = match &fixed.bar_jobs.domain {
        ScaleDomain::Discrete(jobs) => jobs.clone(),
        ScaleDomain::Continuous { .. } => Vec::new(),
    };

    let bars: Vec<Bar> = state
        .views
        .salary_by_job
        .iter()
        .filter_map(|row| {
            let slot = fixed.bar_jobs.map(FieldValue::Text(&row.key))?;
            let level = state.views.level_of_job(&row.key);
            let fill = state.color_map.bar_color(&row.key, level, &state.selection);
            Some(
                Bar::new(slot, row.metric)
                    .width(BAR_WIDTH)
                    .fill(fill)
                    .name(&row.key),
            )
        })
        .collect();

    let (_, top) = fixed.bar_values.range;
    let labels = jobs.clone();

    let response = Plot::new("salary_by_job")
        .height(height)
        .x_axis_label("Job Title")
        .y_axis_label("Average Salary in USD")
        .include_y(0.0)
        .include_y(top * 1.05)
        .include_x(-0.5)
        .include_x(jobs.len() as f64 - 0.5)
        .allow_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_axis_formatter(move |mark: GridMark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Average Salaries by Job Title"));
            plot_ui.pointer_coordinate()
        });

    if !response.response.clicked() {
        return None;
    }
    let pointer = response.inner?;
    let idx = bar_at(pointer.x, jobs.len())?;
    let job = jobs.get(idx)?;
    // Only bars currently drawn are clickable.
    let row = state.views.salary_by_job.iter().find(|r| r.key == *job)?;
    (pointer.y >= 0.0 && pointer.y <= row.metric).then(|| Interaction::ClickBar(job.clone()))
}

// ---------------------------------------------------------------------------
// Parallel coordinates
// ---------------------------------------------------------------------------

/// Normalised position of `record` on every axis; `None` where undefined.
pub fn polyline(scales: &[DimensionScale], record: &Record) -> Vec<Option<f64>> {
    scales.iter().map(|s| s.map_record(record)).collect()
}

/// Height of `line` at plot x-coordinate `x` (axis `i` sits at `x == i`).
fn height_at(line: &[Option<f64>], x: f64) -> Option<f64> {
    if line.is_empty() || x < 0.0 || x > (line.len() - 1) as f64 {
        return None;
    }
    let k = x.floor() as usize;
    let t = x - k as f64;
    if t == 0.0 {
        return line[k];
    }
    let (a, b) = (line[k]?, line.get(k + 1).copied().flatten()?);
    Some(a + (b - a) * t)
}

/// The line passing closest to `(x, y)`, within the hover tolerance.
pub fn nearest_line(lines: &[(usize, Vec<Option<f64>>)], x: f64, y: f64) -> Option<usize> {
    lines
        .iter()
        .filter_map(|(idx, line)| Some((*idx, (height_at(line, x)? - y).abs())))
        .filter(|(_, dist)| *dist <= HOVER_TOLERANCE)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(idx, _)| idx)
}

/// Split a polyline into drawable runs of consecutive defined points.
fn segments(line: &[Option<f64>]) -> Vec<Vec<[f64; 2]>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (i, y) in line.iter().enumerate() {
        match y {
            Some(y) => current.push([i as f64, *y]),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Keep at most [`MAX_CATEGORY_LABELS`] evenly strided labels.
fn thin_labels(ticks: Vec<(f64, String)>) -> Vec<(f64, String)> {
    let stride = ticks.len().div_ceil(MAX_CATEGORY_LABELS).max(1);
    ticks.into_iter().step_by(stride).collect()
}

/// Render the parallel-coordinates plot. Pointer movement yields hover
/// enter/exit interactions.
pub fn parallel_plot(ui: &mut Ui, state: &AppState, height: f32) -> Option<Interaction> {
    let fixed = state.fixed.as_ref()?;
    let dataset = state.dataset.as_ref()?;
    let scales = &fixed.parallel;

    let lines: Vec<(usize, Vec<Option<f64>>)> = state
        .views
        .visible_indices
        .iter()
        .map(|&idx| (idx, polyline(scales, &dataset.records[idx])))
        .collect();

    let names: Vec<&'static str> = scales.iter().map(|s| s.name()).collect();
    let tick_count = state.config.tick_count;
    let hovered = state.hover;

    let response = Plot::new("parallel_coordinates")
        .height(height)
        .show_grid(false)
        .show_y(false)
        .show_axes([true, false])
        .include_x(-0.5)
        .include_x(scales.len() as f64 - 0.5)
        .include_y(-0.08)
        .include_y(1.08)
        .allow_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_axis_formatter(move |mark: GridMark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            names.get(idx as usize).map(|n| n.to_string()).unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for (i, _) in scales.iter().enumerate() {
                let axis = vec![[i as f64, 0.0], [i as f64, 1.0]];
                plot_ui.line(Line::new(PlotPoints::from(axis)).color(Color32::GRAY).width(1.0));
            }

            for (idx, line) in &lines {
                // Other lines vanish while one is hovered.
                let emphasised = hovered == Some(*idx);
                if hovered.is_some() && !emphasised {
                    continue;
                }
                let width = if emphasised { 3.0 } else { 1.0 };
                for run in segments(line) {
                    plot_ui.line(Line::new(PlotPoints::from(run)).color(BASE).width(width));
                }
            }

            let hovered_record = hovered.and_then(|idx| dataset.records.get(idx));
            for (i, scale) in scales.iter().enumerate() {
                let labels = match hovered_record {
                    // Only the hovered record's own values stay labelled.
                    Some(record) => scale
                        .map_record(record)
                        .map(|pos| vec![(pos, scale.field.value(record).key())])
                        .unwrap_or_default(),
                    None => match scale.kind() {
                        DimensionKind::Continuous => scale.ticks(tick_count),
                        DimensionKind::Discrete => thin_labels(scale.ticks(tick_count)),
                    },
                };
                for (pos, label) in labels {
                    plot_ui.text(
                        Text::new(PlotPoint::new(i as f64 - 0.02, pos), label)
                            .color(Color32::BLACK)
                            .anchor(Align2::RIGHT_CENTER),
                    );
                }
            }

            plot_ui.pointer_coordinate()
        });

    match response.inner {
        Some(p) if response.response.hovered() => match nearest_line(&lines, p.x, p.y) {
            Some(idx) if hovered != Some(idx) => Some(Interaction::HoverLine(idx)),
            None if hovered.is_some() => Some(Interaction::HoverExit),
            _ => None,
        },
        _ if hovered.is_some() => Some(Interaction::HoverExit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use crate::data::model::{ExperienceLevel, Field};
    use crate::data::scale::build_scale;

    #[test]
    fn bar_hit_testing() {
        assert_eq!(bar_at(0.1, 3), Some(0));
        assert_eq!(bar_at(1.9, 3), Some(2));
        assert_eq!(bar_at(1.5, 3), None);
        assert_eq!(bar_at(3.0, 3), None);
        assert_eq!(bar_at(-0.2, 3), Some(0));
        assert_eq!(bar_at(-0.6, 3), None);
    }

    #[test]
    fn polylines_follow_scales() {
        let records = vec![
            record("Data Scientist", ExperienceLevel::Senior, 100.0),
            record("ML Engineer", ExperienceLevel::Mid, 200.0),
        ];
        let scales = vec![
            build_scale(&records, Field::JobTitle, (0.0, 1.0)),
            build_scale(&records, Field::SalaryInUsd, (0.0, 1.0)),
        ];
        for (record, want) in records.iter().zip([0.0, 1.0]) {
            let line = polyline(&scales, record);
            assert_eq!(line.len(), 2);
            for y in line {
                assert!((y.unwrap() - want).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn nearest_line_within_tolerance() {
        let lines = vec![
            (0, vec![Some(0.0), Some(1.0)]),
            (5, vec![Some(1.0), Some(0.0)]),
            (7, vec![Some(0.2), None]),
        ];
        assert_eq!(nearest_line(&lines, 0.25, 0.25), Some(0));
        assert_eq!(nearest_line(&lines, 0.25, 0.75), Some(5));
        assert_eq!(nearest_line(&lines, 0.0, 0.2), Some(7));
        assert_eq!(nearest_line(&lines, 0.25, 0.5), None);
        assert_eq!(nearest_line(&lines, 2.0, 0.0), None);
    }

    #[test]
    fn dense_category_labels_are_thinned() {
        let ticks: Vec<(f64, String)> = (0..50).map(|i| (i as f64, i.to_string())).collect();
        let thinned = thin_labels(ticks);
        assert_eq!(thinned.len(), 17);
        assert_eq!(thinned[1].1, "3");

        let few = vec![(0.0, "EN".to_string()), (1.0, "SE".to_string())];
        assert_eq!(thin_labels(few.clone()), few);
    }

    #[test]
    fn undefined_points_break_lines() {
        let line = vec![Some(0.1), None, Some(0.3), Some(0.4)];
        assert_eq!(
            segments(&line),
            vec![vec![[0.0, 0.1]], vec![[2.0, 0.3], [3.0, 0.4]]]
        );
    }
}
