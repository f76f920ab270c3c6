use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float32Array, Float64Array, StringArray};
use arrow::datatypes::DataType;
use avenger_scales::scales::{ConfiguredScale, linear::LinearScale, point::PointScale};

use super::model::{DimensionKind, Field, FieldValue, Record};

// ---------------------------------------------------------------------------
// Scale domain
// ---------------------------------------------------------------------------

/// The input side of a [`DimensionScale`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScaleDomain {
    /// Closed numeric interval `[min, max]`.
    Continuous { min: f64, max: f64 },
    /// Distinct categories in first-seen order.
    Discrete(Vec<String>),
}

// ---------------------------------------------------------------------------
// DimensionScale – value → axis position
// ---------------------------------------------------------------------------

/// Maps values of one dimension onto an output interval (pixels, plot units).
///
/// Built once per dataset load and kept while the selection changes, so
/// filtered views stay comparable with the unfiltered one. The mapping itself
/// is an avenger linear or point scale configured from `domain` and `range`.
#[derive(Clone)]
pub struct DimensionScale {
    pub field: Field,
    pub domain: ScaleDomain,
    /// Output interval; `start` may be greater than `end` (inverted axis).
    pub range: (f64, f64),
    /// Outer padding of point scales, in steps. Ignored by continuous scales.
    pub padding: f64,
    configured: Arc<ConfiguredScale>,
}

impl std::fmt::Debug for DimensionScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DimensionScale")
            .field("field", &self.field)
            .field("domain", &self.domain)
            .field("range", &self.range)
            .field("padding", &self.padding)
            .finish()
    }
}

fn configure(domain: &ScaleDomain, range: (f64, f64), padding: f64) -> ConfiguredScale {
    let range32 = (range.0 as f32, range.1 as f32);
    match domain {
        ScaleDomain::Continuous { min, max } => {
            LinearScale::configured((*min as f32, *max as f32), range32)
        }
        ScaleDomain::Discrete(categories) => {
            let domain: ArrayRef = Arc::new(StringArray::from(categories.clone()));
            PointScale::configured(domain, range32)
                .with_option("padding", padding as f32)
                .with_option("align", 0.5_f32)
        }
    }
}

/// Numeric values of a scale output or tick array; nulls and NaN become `None`.
fn numbers(array: &ArrayRef) -> Vec<Option<f64>> {
    let Ok(cast) = arrow::compute::cast(array, &DataType::Float64) else {
        return Vec::new();
    };
    match cast.as_any().downcast_ref::<Float64Array>() {
        Some(values) => values
            .iter()
            .map(|v| v.filter(|v| v.is_finite()))
            .collect(),
        None => Vec::new(),
    }
}

impl DimensionScale {
    fn new(field: Field, domain: ScaleDomain, range: (f64, f64), padding: f64) -> Self {
        let configured = Arc::new(configure(&domain, range, padding));
        DimensionScale {
            field,
            domain,
            range,
            padding,
            configured,
        }
    }

    /// A continuous scale over an explicit interval.
    pub fn continuous(field: Field, min: f64, max: f64, range: (f64, f64)) -> Self {
        Self::new(field, ScaleDomain::Continuous { min, max }, range, 0.0)
    }

    pub fn with_padding(self, padding: f64) -> Self {
        Self::new(self.field, self.domain, self.range, padding.max(0.0))
    }

    pub fn name(&self) -> &'static str {
        self.field.name()
    }

    pub fn kind(&self) -> DimensionKind {
        match self.domain {
            ScaleDomain::Continuous { .. } => DimensionKind::Continuous,
            ScaleDomain::Discrete(_) => DimensionKind::Discrete,
        }
    }

    /// Position of `value`, or `None` if it is outside a discrete domain or
    /// not a number on a continuous one.
    pub fn map(&self, value: FieldValue<'_>) -> Option<f64> {
        let input: ArrayRef = match &self.domain {
            ScaleDomain::Continuous { min, max } => {
                let v = value.as_f64()?;
                // A single-valued extent sits in the middle of the range.
                if min == max {
                    return Some((self.range.0 + self.range.1) / 2.0);
                }
                Arc::new(Float32Array::from(vec![v as f32]))
            }
            ScaleDomain::Discrete(categories) => {
                let key = value.key();
                if !categories.contains(&key) {
                    return None;
                }
                Arc::new(StringArray::from(vec![key]))
            }
        };
        let output = self.configured.scale(&input).ok()?;
        numbers(&output).into_iter().next().flatten()
    }

    /// Position of this scale's field within `record`.
    pub fn map_record(&self, record: &Record) -> Option<f64> {
        self.map(self.field.value(record))
    }

    /// Axis ticks as `(position, label)`.
    ///
    /// Continuous scales get "nice" round ticks inside the domain, roughly
    /// `count` of them; discrete scales tick every category.
    pub fn ticks(&self, count: usize) -> Vec<(f64, String)> {
        match &self.domain {
            ScaleDomain::Discrete(categories) => {
                let domain: ArrayRef = Arc::new(StringArray::from(categories.clone()));
                let Ok(output) = self.configured.scale(&domain) else {
                    return Vec::new();
                };
                numbers(&output)
                    .into_iter()
                    .zip(categories.iter().cloned())
                    .filter_map(|(pos, label)| Some((pos?, label)))
                    .collect()
            }
            ScaleDomain::Continuous { min, max } if min == max => {
                let label = FieldValue::Number(*min).key();
                vec![(self.map(FieldValue::Number(*min)).unwrap_or(self.range.0), label)]
            }
            ScaleDomain::Continuous { .. } => {
                let values: Vec<f64> = match self.configured.ticks(Some(count.max(1) as f32)) {
                    Ok(ticks) => numbers(&ticks).into_iter().flatten().collect(),
                    Err(err) => {
                        log::debug!("no ticks for {}: {err}", self.field);
                        return Vec::new();
                    }
                };
                let decimals = tick_decimals(&values);
                values
                    .into_iter()
                    .filter_map(|v| {
                        let label = format!("{v:.decimals$}");
                        Some((self.map(FieldValue::Number(v))?, label))
                    })
                    .collect()
            }
        }
    }
}

/// Digits after the decimal point needed to tell adjacent ticks apart.
fn tick_decimals(values: &[f64]) -> usize {
    match values {
        [a, b, ..] => {
            // Ticks come back as f32; round the step before taking its magnitude.
            let step = ((b - a).abs() * 1e6).round() / 1e6;
            if step <= 0.0 {
                0
            } else {
                (-step.log10().floor()).max(0.0) as usize
            }
        }
        _ => 0,
    }
}

// ---------------------------------------------------------------------------
// Scale Builder
// ---------------------------------------------------------------------------

/// Build the scale for `field` from the full dataset.
///
/// The scale kind comes from [`Field::kind`]; continuous dimensions span the
/// data extent, discrete ones list their distinct values in first-seen order.
pub fn build_scale<'a, I>(records: I, field: Field, range: (f64, f64)) -> DimensionScale
where
    I: IntoIterator<Item = &'a Record>,
{
    let domain = match field.kind() {
        DimensionKind::Continuous => {
            let (min, max) = records
                .into_iter()
                .filter_map(|r| field.value(r).as_f64())
                .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                    None => Some((v, v)),
                    Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                })
                .unwrap_or((0.0, 0.0));
            ScaleDomain::Continuous { min, max }
        }
        DimensionKind::Discrete => {
            let mut categories: Vec<String> = Vec::new();
            for record in records {
                let key = field.value(record).key();
                if !categories.contains(&key) {
                    categories.push(key);
                }
            }
            ScaleDomain::Discrete(categories)
        }
    };

    DimensionScale::new(field, domain, range, 0.0)
}
