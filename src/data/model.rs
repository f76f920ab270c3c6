use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// ExperienceLevel – the four seniority codes used by the survey
// ---------------------------------------------------------------------------

/// Seniority bucket of a respondent. Ordered from junior to senior so it can
/// live in `BTreeSet`s and sort naturally in legends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Executive,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 4] = [
        ExperienceLevel::Entry,
        ExperienceLevel::Mid,
        ExperienceLevel::Senior,
        ExperienceLevel::Executive,
    ];

    /// Two-letter code as it appears in the input file.
    pub fn code(self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "EN",
            ExperienceLevel::Mid => "MI",
            ExperienceLevel::Senior => "SE",
            ExperienceLevel::Executive => "EX",
        }
    }

    /// Human readable name used in the pie-chart legend.
    pub fn label(self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "Entry-Level",
            ExperienceLevel::Mid => "Mid-Level",
            ExperienceLevel::Senior => "Senior",
            ExperienceLevel::Executive => "Executive",
        }
    }

    /// Parse a code, ignoring surrounding whitespace and case.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|lvl| lvl.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the survey
// ---------------------------------------------------------------------------

/// A single employment observation. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub work_year: i32,
    pub experience_level: ExperienceLevel,
    pub employment_type: String,
    pub job_title: String,
    /// Always > 0 for loaded records.
    pub salary_in_usd: f64,
    pub employee_residence: String,
    pub remote_ratio: f64,
    pub company_location: String,
    pub company_size: String,
}

// ---------------------------------------------------------------------------
// Field – typed column names
// ---------------------------------------------------------------------------

/// How a dimension is mapped onto an axis. Fixed per [`Field`], never
/// inferred from the values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionKind {
    Continuous,
    Discrete,
}

/// A column of [`Record`] that can be grouped on, reduced, or put on an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    WorkYear,
    ExperienceLevel,
    EmploymentType,
    JobTitle,
    SalaryInUsd,
    EmployeeResidence,
    RemoteRatio,
    CompanyLocation,
    CompanySize,
}

impl Field {
    /// Dimensions shown on the parallel-coordinates plot, in header order.
    pub const PARALLEL: [Field; 6] = [
        Field::WorkYear,
        Field::ExperienceLevel,
        Field::EmploymentType,
        Field::JobTitle,
        Field::SalaryInUsd,
        Field::RemoteRatio,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::WorkYear => "work_year",
            Field::ExperienceLevel => "experience_level",
            Field::EmploymentType => "employment_type",
            Field::JobTitle => "job_title",
            Field::SalaryInUsd => "salary_in_usd",
            Field::EmployeeResidence => "employee_residence",
            Field::RemoteRatio => "remote_ratio",
            Field::CompanyLocation => "company_location",
            Field::CompanySize => "company_size",
        }
    }

    pub fn kind(self) -> DimensionKind {
        match self {
            Field::WorkYear | Field::SalaryInUsd | Field::RemoteRatio => DimensionKind::Continuous,
            _ => DimensionKind::Discrete,
        }
    }

    /// Borrow this field's value out of a record.
    pub fn value(self, record: &Record) -> FieldValue<'_> {
        match self {
            Field::WorkYear => FieldValue::Number(f64::from(record.work_year)),
            Field::ExperienceLevel => FieldValue::Text(record.experience_level.code()),
            Field::EmploymentType => FieldValue::Text(&record.employment_type),
            Field::JobTitle => FieldValue::Text(&record.job_title),
            Field::SalaryInUsd => FieldValue::Number(record.salary_in_usd),
            Field::EmployeeResidence => FieldValue::Text(&record.employee_residence),
            Field::RemoteRatio => FieldValue::Number(record.remote_ratio),
            Field::CompanyLocation => FieldValue::Text(&record.company_location),
            Field::CompanySize => FieldValue::Text(&record.company_size),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// FieldValue – a borrowed cell
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Number(f64),
    Text(&'a str),
}

impl FieldValue<'_> {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }

    /// Grouping key: text as-is, whole numbers without a fractional part.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(v) if v.fract() == 0.0 => write!(f, "{v:.0}"),
            FieldValue::Number(v) => write!(f, "{v}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

// ---------------------------------------------------------------------------
// SalaryDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// All valid records of one input file, plus bookkeeping on excluded rows.
#[derive(Debug, Clone, Default)]
pub struct SalaryDataset {
    pub records: Vec<Record>,
    /// Rejection reason → number of rows excluded for it.
    pub rejected_rows: BTreeMap<&'static str, usize>,
}

impl SalaryDataset {
    pub fn new(records: Vec<Record>, rejected_rows: BTreeMap<&'static str, usize>) -> Self {
        SalaryDataset {
            records,
            rejected_rows,
        }
    }

    /// Number of valid records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total number of rows dropped by the loader.
    pub fn rejected_total(&self) -> usize {
        self.rejected_rows.values().sum()
    }
}
