use std::path::Path;

use crate::color::ColorMap;
use crate::config::ViewerConfig;
use crate::data::aggregate::{
    AggregateRow, Reducer, aggregate, experience_distribution, first_experience_by_job,
    salary_by_job,
};
use crate::data::model::{ExperienceLevel, Field, Record, SalaryDataset};
use crate::data::scale::{DimensionScale, build_scale};
use crate::selection::{Category, SelectionModel, filtered_records};

// ---------------------------------------------------------------------------
// Interactions dispatched by the rendering surface
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    ClickBar(String),
    ClickSlice(ExperienceLevel),
    /// Pointer entered a parallel-coordinates line (record index).
    HoverLine(usize),
    HoverExit,
    ResetSelection,
}

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

/// Everything derived once per load. Unaffected by the selection.
#[derive(Debug, Clone)]
pub struct FixedViews {
    /// Bar slot per job title, first-seen order, positions `0..n`.
    pub bar_jobs: DimensionScale,
    /// Bar value axis, `[0, highest mean salary]` of the full dataset.
    pub bar_values: DimensionScale,
    /// One scale per parallel-coordinates dimension, onto `[0, 1]`.
    pub parallel: Vec<DimensionScale>,
    /// Pie slices over the full dataset, so every level stays clickable.
    pub experience_counts: Vec<AggregateRow>,
}

impl FixedViews {
    pub fn build(records: &[Record], config: &ViewerConfig) -> Self {
        let n_jobs = records
            .iter()
            .map(|r| r.job_title.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len();
        let bar_jobs = build_scale(
            records,
            Field::JobTitle,
            (0.0, n_jobs.saturating_sub(1) as f64),
        );

        let highest_mean = salary_by_job(records)
            .iter()
            .map(|row| row.metric)
            .fold(0.0, f64::max);
        let bar_values =
            DimensionScale::continuous(Field::SalaryInUsd, 0.0, highest_mean, (0.0, highest_mean));

        let parallel = Field::PARALLEL
            .into_iter()
            .map(|field| build_scale(records, field, (0.0, 1.0)).with_padding(config.point_padding))
            .collect();

        FixedViews {
            bar_jobs,
            bar_values,
            parallel,
            experience_counts: experience_distribution(records),
        }
    }
}

/// Count, mean and top salary of one experience level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSummary {
    pub key: String,
    pub count: usize,
    pub mean_salary: f64,
    pub max_salary: f64,
}

impl LevelSummary {
    fn compute<'a, I>(records: I) -> Vec<LevelSummary>
    where
        I: IntoIterator<Item = &'a Record> + Clone,
    {
        let by_level = |reducer| {
            aggregate(
                records.clone(),
                Field::ExperienceLevel,
                Field::SalaryInUsd,
                reducer,
            )
        };
        let counts = by_level(Reducer::Count);
        let means = by_level(Reducer::Mean);
        let maxes = by_level(Reducer::Max);

        // Same records and grouping, so the three views line up row by row.
        counts
            .into_iter()
            .zip(means)
            .zip(maxes)
            .map(|((count, mean), max)| LevelSummary {
                key: count.key,
                count: count.metric as usize,
                mean_salary: mean.metric,
                max_salary: max.metric,
            })
            .collect()
    }
}

/// Everything recomputed when the selection changes. A pure function of
/// `(records, selection)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartViews {
    pub salary_by_job: Vec<AggregateRow>,
    /// Per-level summary of the visible records (side-panel table).
    pub level_summary: Vec<LevelSummary>,
    /// Experience level of each visible job's first record (bar colouring).
    pub job_levels: Vec<(String, ExperienceLevel)>,
    /// Indices into the dataset of records passing the filter.
    pub visible_indices: Vec<usize>,
}

impl ChartViews {
    pub fn compute(records: &[Record], selection: &SelectionModel) -> Self {
        let visible = filtered_records(records, selection);
        let salary_by_job = salary_by_job(visible.iter().copied());
        let job_levels = first_experience_by_job(visible.iter().copied());
        let level_summary = LevelSummary::compute(visible.iter().copied());

        let visible_indices = records
            .iter()
            .enumerate()
            .filter(|(_, r)| selection.admits(r))
            .map(|(i, _)| i)
            .collect();

        ChartViews {
            salary_by_job,
            level_summary,
            job_levels,
            visible_indices,
        }
    }

    pub fn level_of_job(&self, job_title: &str) -> Option<ExperienceLevel> {
        self.job_levels
            .iter()
            .find(|(title, _)| title == job_title)
            .map(|(_, level)| *level)
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ViewerConfig,

    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<SalaryDataset>,

    /// Scales and pie slices fixed for the current dataset.
    pub fixed: Option<FixedViews>,

    /// Active filter categories; replaced wholesale on every click.
    pub selection: SelectionModel,

    /// Aggregates for the current selection (cached).
    pub views: ChartViews,

    /// Emphasised parallel-coordinates line. Purely visual.
    pub hover: Option<usize>,

    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            dataset: None,
            fixed: None,
            selection: SelectionModel::new(),
            views: ChartViews::default(),
            hover: None,
            color_map: ColorMap::default(),
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset: rebuild scales, clear selection.
    pub fn set_dataset(&mut self, dataset: SalaryDataset) {
        self.fixed = Some(FixedViews::build(&dataset.records, &self.config));
        self.selection = SelectionModel::default();
        self.hover = None;
        self.views = ChartViews::compute(&dataset.records, &self.selection);
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Load `path`, keeping the current dataset if that fails.
    pub fn load_path(&mut self, path: &Path) {
        match crate::data::loader::load_file(path) {
            Ok(dataset) => {
                if dataset.is_empty() {
                    log::warn!("{} contains no valid records", path.display());
                }
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Handle one interaction event to completion.
    pub fn apply(&mut self, interaction: Interaction) {
        match interaction {
            Interaction::ClickBar(title) => self.select(Category::JobTitle(title)),
            Interaction::ClickSlice(level) => self.select(Category::Experience(level)),
            Interaction::HoverLine(idx) => {
                if self.views.visible_indices.contains(&idx) {
                    self.hover = Some(idx);
                }
            }
            Interaction::HoverExit => self.hover = None,
            Interaction::ResetSelection => {
                self.selection = std::mem::take(&mut self.selection).reset();
                self.recompute();
            }
        }
    }

    fn select(&mut self, category: Category) {
        log::debug!("Toggling {category:?}");
        self.selection = std::mem::take(&mut self.selection).toggle(category);
        self.recompute();
    }

    fn recompute(&mut self) {
        self.views = match &self.dataset {
            Some(ds) => ChartViews::compute(&ds.records, &self.selection),
            None => ChartViews::default(),
        };
        // A hidden line cannot stay emphasised.
        if let Some(idx) = self.hover {
            if !self.views.visible_indices.contains(&idx) {
                self.hover = None;
            }
        }
    }

    /// Text shown under the parallel plot while a line is hovered.
    pub fn hover_label(&self) -> Option<String> {
        let record = self.dataset.as_ref()?.records.get(self.hover?)?;
        Some(format!("Salary: ${}", record.salary_in_usd))
    }
}
