use std::collections::{HashMap, HashSet};

use super::model::{ExperienceLevel, Field, Record};

// ---------------------------------------------------------------------------
// Aggregate rows
// ---------------------------------------------------------------------------

/// One bar or one pie slice: a group key and its reduced metric.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub key: String,
    pub metric: f64,
}

/// How a group's values collapse into one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Mean,
    /// Number of records in the group; the value field is ignored.
    Count,
    Max,
}

#[derive(Default)]
struct GroupAcc {
    members: usize,
    samples: usize,
    sum: f64,
    max: f64,
}

impl GroupAcc {
    fn add(&mut self, value: Option<f64>) {
        self.members += 1;
        if let Some(v) = value {
            self.max = if self.samples == 0 { v } else { self.max.max(v) };
            self.samples += 1;
            self.sum += v;
        }
    }

    /// `None` when a numeric reducer has nothing to reduce.
    fn reduce(&self, reducer: Reducer) -> Option<f64> {
        match reducer {
            Reducer::Count => Some(self.members as f64),
            _ if self.samples == 0 => None,
            Reducer::Mean => Some(self.sum / self.samples as f64),
            Reducer::Max => Some(self.max),
        }
    }
}

/// Group `records` by `group_by` and reduce `value` within each group.
///
/// Groups come out in the order their key is first seen. The output depends
/// only on the inputs, so recomputing after a selection change never carries
/// anything over from a previous run.
pub fn aggregate<'a, I>(records: I, group_by: Field, value: Field, reducer: Reducer) -> Vec<AggregateRow>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, GroupAcc> = HashMap::new();

    for record in records {
        let key = group_by.value(record).key();
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups
            .entry(key)
            .or_default()
            .add(value.value(record).as_f64());
    }

    order
        .into_iter()
        .filter_map(|key| {
            let metric = groups.get(&key)?.reduce(reducer);
            if metric.is_none() {
                log::warn!("Group '{key}' has no numeric {value} values; skipped");
            }
            metric.map(|metric| AggregateRow { key, metric })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Chart views
// ---------------------------------------------------------------------------

/// Mean `salary_in_usd` per job title (bar chart heights).
pub fn salary_by_job<'a, I>(records: I) -> Vec<AggregateRow>
where
    I: IntoIterator<Item = &'a Record>,
{
    aggregate(records, Field::JobTitle, Field::SalaryInUsd, Reducer::Mean)
}

/// Record count per experience level (pie slice sizes).
pub fn experience_distribution<'a, I>(records: I) -> Vec<AggregateRow>
where
    I: IntoIterator<Item = &'a Record>,
{
    aggregate(records, Field::ExperienceLevel, Field::ExperienceLevel, Reducer::Count)
}

/// Percentage of the total each row represents. Empty when the total is zero.
pub fn shares(rows: &[AggregateRow]) -> Vec<(String, f64)> {
    let total: f64 = rows.iter().map(|r| r.metric).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    rows.iter()
        .map(|r| (r.key.clone(), r.metric / total * 100.0))
        .collect()
}

/// Pie legend line, e.g. `Senior: 46%`. Unknown codes are shown verbatim.
/// Halves round up, so 12.5% reads as 13%.
pub fn legend_text(key: &str, percentage: f64) -> String {
    let name = ExperienceLevel::parse(key).map_or(key, |level| level.label());
    let rounded = (percentage + 0.5).floor();
    format!("{name}: {rounded:.0}%")
}

/// Experience level of the first record seen for each job title.
pub fn first_experience_by_job<'a, I>(records: I) -> Vec<(String, ExperienceLevel)>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for record in records {
        if seen.insert(record.job_title.as_str()) {
            out.push((record.job_title.clone(), record.experience_level));
        }
    }
    out
}
