use std::collections::BTreeSet;

use crate::data::model::{ExperienceLevel, Record};

// ---------------------------------------------------------------------------
// Categories and click policies
// ---------------------------------------------------------------------------

/// Something the user can click to select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    /// A bar of the salary-by-job chart.
    JobTitle(String),
    /// A slice of the experience-level pie.
    Experience(ExperienceLevel),
}

/// What a click on an unselected category does to its active set.
///
/// Bars and pie slices deliberately behave differently; keep them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickPolicy {
    /// Add the category; other active categories stay.
    Accumulate,
    /// The category becomes the only active one.
    ReplaceOnNew,
}

impl ClickPolicy {
    /// Bars multi-select, pie slices single-select.
    pub fn for_category(category: &Category) -> Self {
        match category {
            Category::JobTitle(_) => ClickPolicy::Accumulate,
            Category::Experience(_) => ClickPolicy::ReplaceOnNew,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    Unfiltered,
    Filtered,
}

// ---------------------------------------------------------------------------
// SelectionModel
// ---------------------------------------------------------------------------

/// Active filter categories. An empty set means "no filter" for that kind.
///
/// Transitions consume the model and hand back the next one, so each
/// interaction handler sees exactly the state it was given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    job_titles: BTreeSet<String>,
    experience_levels: BTreeSet<ExperienceLevel>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle `category` under the policy its chart uses.
    pub fn toggle(self, category: Category) -> Self {
        let policy = ClickPolicy::for_category(&category);
        self.toggle_with(category, policy)
    }

    /// Toggle `category` under an explicit policy.
    ///
    /// A selected category is always removed, whatever the policy.
    pub fn toggle_with(mut self, category: Category, policy: ClickPolicy) -> Self {
        match category {
            Category::JobTitle(title) => toggle_in(&mut self.job_titles, title, policy),
            Category::Experience(level) => {
                toggle_in(&mut self.experience_levels, level, policy)
            }
        }
        self
    }

    /// Back to Unfiltered.
    pub fn reset(self) -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SelectionPhase {
        if self.job_titles.is_empty() && self.experience_levels.is_empty() {
            SelectionPhase::Unfiltered
        } else {
            SelectionPhase::Filtered
        }
    }

    pub fn job_titles(&self) -> &BTreeSet<String> {
        &self.job_titles
    }

    pub fn experience_levels(&self) -> &BTreeSet<ExperienceLevel> {
        &self.experience_levels
    }

    pub fn is_job_selected(&self, title: &str) -> bool {
        self.job_titles.contains(title)
    }

    pub fn is_level_selected(&self, level: ExperienceLevel) -> bool {
        self.experience_levels.contains(&level)
    }

    /// Whether the experience-level filter is narrowing the data.
    pub fn has_experience_filter(&self) -> bool {
        !self.experience_levels.is_empty()
    }

    /// Whether `record` survives the experience-level filter. Job-title
    /// selection only drives highlighting and never filters.
    pub fn admits(&self, record: &Record) -> bool {
        self.experience_levels.is_empty()
            || self.experience_levels.contains(&record.experience_level)
    }
}

fn toggle_in<T: Ord>(set: &mut BTreeSet<T>, item: T, policy: ClickPolicy) {
    if set.remove(&item) {
        return;
    }
    if policy == ClickPolicy::ReplaceOnNew {
        set.clear();
    }
    set.insert(item);
}

/// Records visible under `selection`, in dataset order.
pub fn filtered_records<'a>(records: &'a [Record], selection: &SelectionModel) -> Vec<&'a Record> {
    records.iter().filter(|r| selection.admits(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use crate::data::model::ExperienceLevel::*;

    fn levels(model: &SelectionModel) -> Vec<ExperienceLevel> {
        model.experience_levels().iter().copied().collect()
    }

    #[test]
    fn starts_unfiltered() {
        let model = SelectionModel::new();
        assert_eq!(model.phase(), SelectionPhase::Unfiltered);
        assert!(!model.has_experience_filter());
    }

    #[test]
    fn accumulate_policy_keeps_earlier_picks() {
        let model = SelectionModel::new()
            .toggle_with(Category::Experience(Senior), ClickPolicy::Accumulate)
            .toggle_with(Category::Experience(Mid), ClickPolicy::Accumulate);
        assert_eq!(levels(&model), vec![Mid, Senior]);
        assert_eq!(model.phase(), SelectionPhase::Filtered);
    }

    #[test]
    fn replace_policy_swaps_in_new_pick() {
        let model = SelectionModel::new().toggle(Category::Experience(Senior));
        assert_eq!(levels(&model), vec![Senior]);

        let model = model.toggle(Category::Experience(Mid));
        assert_eq!(levels(&model), vec![Mid]);
    }

    #[test]
    fn replace_policy_deselects_active_pick() {
        let model = SelectionModel::new()
            .toggle(Category::Experience(Senior))
            .toggle(Category::Experience(Senior));
        assert_eq!(model, SelectionModel::new());
        assert_eq!(model.phase(), SelectionPhase::Unfiltered);
    }

    #[test]
    fn job_titles_always_accumulate() {
        let model = SelectionModel::new()
            .toggle(Category::JobTitle("Data Scientist".into()))
            .toggle(Category::JobTitle("ML Engineer".into()));
        assert!(model.is_job_selected("Data Scientist"));
        assert!(model.is_job_selected("ML Engineer"));
        assert!(!model.has_experience_filter());

        let model = model.toggle(Category::JobTitle("Data Scientist".into()));
        assert!(!model.is_job_selected("Data Scientist"));
        assert_eq!(model.phase(), SelectionPhase::Filtered);
    }

    #[test]
    fn double_toggle_restores_prior_state() {
        let start = SelectionModel::new()
            .toggle(Category::JobTitle("Data Analyst".into()))
            .toggle(Category::Experience(Entry));

        let job = Category::JobTitle("ML Engineer".into());
        let again = start.clone().toggle(job.clone()).toggle(job);
        assert_eq!(again, start);

        let level = Category::Experience(Entry);
        let again = start.clone().toggle(level.clone()).toggle(level);
        assert_eq!(again, start);
    }

    #[test]
    fn policies_differ_per_chart() {
        assert_eq!(
            ClickPolicy::for_category(&Category::JobTitle("x".into())),
            ClickPolicy::Accumulate
        );
        assert_eq!(
            ClickPolicy::for_category(&Category::Experience(Executive)),
            ClickPolicy::ReplaceOnNew
        );
    }

    #[test]
    fn filter_uses_experience_levels_only() {
        let records = vec![
            record("Data Scientist", Senior, 1.0),
            record("ML Engineer", Mid, 2.0),
            record("Data Analyst", Senior, 3.0),
        ];

        let model = SelectionModel::new();
        assert_eq!(filtered_records(&records, &model).len(), 3);

        let model = model.toggle(Category::JobTitle("ML Engineer".into()));
        assert_eq!(filtered_records(&records, &model).len(), 3);

        let model = model.toggle(Category::Experience(Senior));
        let visible = filtered_records(&records, &model);
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|r| r.experience_level == Senior));

        let model = model.toggle(Category::Experience(Executive));
        assert!(filtered_records(&records, &model).is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let model = SelectionModel::new()
            .toggle(Category::JobTitle("Data Analyst".into()))
            .toggle(Category::Experience(Mid))
            .reset();
        assert_eq!(model.phase(), SelectionPhase::Unfiltered);
    }
}
