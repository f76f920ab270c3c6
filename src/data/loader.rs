use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{ExperienceLevel, Record, SalaryDataset};

/// Columns every input file must provide, in the survey's header order.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "work_year",
    "experience_level",
    "employment_type",
    "job_title",
    "salary",
    "salary_currency",
    "salary_in_usd",
    "employee_residence",
    "remote_ratio",
    "company_location",
    "company_size",
];

// ---------------------------------------------------------------------------
// Row-level rejection
// ---------------------------------------------------------------------------

/// Why a row was left out of the dataset. Not a load failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowRejection {
    #[error("salary_in_usd must be positive, got {0}")]
    NonPositiveSalary(f64),
    #[error("column '{column}': '{value}' is not a number")]
    MalformedNumber { column: &'static str, value: String },
    #[error("job_title is empty")]
    EmptyJobTitle,
    #[error("unknown experience_level '{0}'")]
    UnknownExperienceLevel(String),
    #[error("unreadable row: {0}")]
    Unreadable(String),
}

impl RowRejection {
    /// Stable key used to tally rejections on the dataset.
    pub fn reason(&self) -> &'static str {
        match self {
            RowRejection::NonPositiveSalary(_) => "non-positive salary",
            RowRejection::MalformedNumber { .. } => "malformed number",
            RowRejection::EmptyJobTitle => "empty job title",
            RowRejection::UnknownExperienceLevel(_) => "unknown experience level",
            RowRejection::Unreadable(_) => "unreadable row",
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a salary survey from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the survey columns (the usual `ds_salaries.csv`)
/// * `.json`    – `[{ "work_year": 2023, "job_title": "...", ... }, ...]`
/// * `.parquet` – one column per survey field, any primitive type
pub fn load_file(path: &Path) -> Result<SalaryDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} records from {} ({} rows excluded)",
        dataset.len(),
        path.display(),
        dataset.rejected_total()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Row parsing shared by every format
// ---------------------------------------------------------------------------

fn cell<'a>(cells: &[&'a str], column: &str) -> &'a str {
    REQUIRED_COLUMNS
        .iter()
        .position(|c| *c == column)
        .and_then(|i| cells.get(i))
        .copied()
        .unwrap_or("")
}

fn parse_number(column: &'static str, raw: &str) -> Result<f64, RowRejection> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RowRejection::MalformedNumber {
            column,
            value: raw.to_string(),
        })
}

/// Turn one row (cells ordered like [`REQUIRED_COLUMNS`]) into a [`Record`].
pub fn parse_row(cells: &[&str]) -> Result<Record, RowRejection> {
    let salary_in_usd = parse_number("salary_in_usd", cell(cells, "salary_in_usd"))?;
    if salary_in_usd <= 0.0 {
        return Err(RowRejection::NonPositiveSalary(salary_in_usd));
    }

    let job_title = cell(cells, "job_title").trim();
    if job_title.is_empty() {
        return Err(RowRejection::EmptyJobTitle);
    }

    let raw_year = cell(cells, "work_year");
    let year = parse_number("work_year", raw_year)?;
    if year.fract() != 0.0 || year < f64::from(i32::MIN) || year > f64::from(i32::MAX) {
        return Err(RowRejection::MalformedNumber {
            column: "work_year",
            value: raw_year.to_string(),
        });
    }

    let remote_ratio = parse_number("remote_ratio", cell(cells, "remote_ratio"))?;

    let raw_level = cell(cells, "experience_level");
    let experience_level = ExperienceLevel::parse(raw_level)
        .ok_or_else(|| RowRejection::UnknownExperienceLevel(raw_level.to_string()))?;

    Ok(Record {
        work_year: year as i32,
        experience_level,
        employment_type: cell(cells, "employment_type").trim().to_string(),
        job_title: job_title.to_string(),
        salary_in_usd,
        employee_residence: cell(cells, "employee_residence").trim().to_string(),
        remote_ratio,
        company_location: cell(cells, "company_location").trim().to_string(),
        company_size: cell(cells, "company_size").trim().to_string(),
    })
}

/// Accumulates valid records and tallies rejected rows.
#[derive(Default)]
struct RowCollector {
    records: Vec<Record>,
    rejected: BTreeMap<&'static str, usize>,
}

impl RowCollector {
    fn push(&mut self, row_no: usize, cells: &[&str]) {
        match parse_row(cells) {
            Ok(record) => self.records.push(record),
            Err(why) => self.reject(row_no, why),
        }
    }

    fn reject(&mut self, row_no: usize, why: RowRejection) {
        log::debug!("Row {row_no} excluded: {why}");
        *self.rejected.entry(why.reason()).or_default() += 1;
    }

    fn finish(self) -> SalaryDataset {
        SalaryDataset::new(self.records, self.rejected)
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<SalaryDataset> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    read_csv(file)
}

/// Read a survey from any CSV source with a header row.
///
/// Ragged rows are accepted: missing trailing cells read as empty and go
/// through the usual coercion. Rows the CSV reader cannot decode are
/// tallied as unreadable instead of failing the load.
pub fn read_csv<R: Read>(source: R) -> Result<SalaryDataset> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let positions = REQUIRED_COLUMNS
        .iter()
        .map(|col| {
            headers
                .iter()
                .position(|h| h == col)
                .with_context(|| format!("CSV missing required column '{col}'"))
        })
        .collect::<Result<Vec<usize>>>()?;

    let mut rows = RowCollector::default();
    for (row_no, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(err) if is_row_error(&err) => {
                rows.reject(row_no, RowRejection::Unreadable(err.to_string()));
                continue;
            }
            Err(err) => return Err(err).with_context(|| format!("CSV row {row_no}")),
        };
        let cells: Vec<&str> = positions
            .iter()
            .map(|&p| record.get(p).unwrap_or(""))
            .collect();
        rows.push(row_no, &cells);
    }

    Ok(rows.finish())
}

/// Errors confined to one row; anything else (I/O) aborts the load.
fn is_row_error(err: &csv::Error) -> bool {
    matches!(
        err.kind(),
        csv::ErrorKind::Utf8 { .. } | csv::ErrorKind::UnequalLengths { .. }
    )
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "work_year": 2023, "experience_level": "SE", "job_title": "Data Scientist",
///     "salary_in_usd": 85847, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<SalaryDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<SalaryDataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut collector = RowCollector::default();
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let owned = REQUIRED_COLUMNS
            .iter()
            .map(|col| {
                obj.get(*col)
                    .map(json_to_cell)
                    .with_context(|| format!("Row {i}: missing required column '{col}'"))
            })
            .collect::<Result<Vec<String>>>()?;
        let cells: Vec<&str> = owned.iter().map(String::as_str).collect();
        collector.push(i, &cells);
    }

    Ok(collector.finish())
}

fn json_to_cell(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per survey field. Column types are
/// free-form: every cell is rendered to text and coerced like a CSV cell.
fn load_parquet(path: &Path) -> Result<SalaryDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut collector = RowCollector::default();
    let mut row_no = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let columns = REQUIRED_COLUMNS
            .iter()
            .map(|col| {
                schema
                    .index_of(col)
                    .map(|idx| batch.column(idx).clone())
                    .map_err(|_| anyhow::anyhow!("Parquet file missing required column '{col}'"))
            })
            .collect::<Result<Vec<Arc<dyn Array>>>>()?;

        for row in 0..batch.num_rows() {
            let owned = columns
                .iter()
                .map(|col| parquet_cell(col, row))
                .collect::<Result<Vec<String>>>()
                .with_context(|| format!("Row {row_no}"))?;
            let cells: Vec<&str> = owned.iter().map(String::as_str).collect();
            collector.push(row_no, &cells);
            row_no += 1;
        }
    }

    Ok(collector.finish())
}

fn parquet_cell(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        return Ok(String::new());
    }
    array_value_to_string(col.as_ref(), row).context("formatting parquet cell")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "work_year,experience_level,employment_type,job_title,salary,salary_currency,salary_in_usd,employee_residence,remote_ratio,company_location,company_size";

    fn csv_text(rows: &[&str]) -> String {
        let mut text = HEADER.to_string();
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    fn read(text: &str) -> Result<SalaryDataset> {
        read_csv(text.as_bytes())
    }

    #[test]
    fn valid_rows_are_coerced() {
        let ds = read(&csv_text(&[
            "2023,SE,FT,Principal Data Scientist,80000,EUR,85847,ES,100,ES,L",
            "2022,MI,CT,ML Engineer,30000,USD,30000,US,50,US,S",
        ]))
        .unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rejected_total(), 0);
        let first = &ds.records[0];
        assert_eq!(first.work_year, 2023);
        assert_eq!(first.experience_level, ExperienceLevel::Senior);
        assert_eq!(first.job_title, "Principal Data Scientist");
        assert_eq!(first.salary_in_usd, 85847.0);
        assert_eq!(first.remote_ratio, 100.0);
        assert_eq!(ds.records[1].company_size, "S");
    }

    #[test]
    fn invalid_rows_are_excluded_and_tallied() {
        let ds = read(&csv_text(&[
            "2023,SE,FT,Data Scientist,0,USD,0,US,0,US,M",
            "2023,SE,FT,Data Scientist,1,USD,-5,US,0,US,M",
            "2023,SE,FT,,100,USD,100,US,0,US,M",
            "2023,SE,FT,Data Analyst,100,USD,lots,US,0,US,M",
            "twenty,SE,FT,Data Analyst,100,USD,100,US,0,US,M",
            "2023,ZZ,FT,Data Analyst,100,USD,100,US,0,US,M",
            "2023,EN,FT,Data Analyst,100,USD,100,US,0,US,M",
        ]))
        .unwrap();

        assert_eq!(ds.len(), 1);
        assert_eq!(ds.rejected_total(), 6);
        assert_eq!(ds.rejected_rows["non-positive salary"], 2);
        assert_eq!(ds.rejected_rows["empty job title"], 1);
        assert_eq!(ds.rejected_rows["malformed number"], 2);
        assert_eq!(ds.rejected_rows["unknown experience level"], 1);
    }

    #[test]
    fn ragged_row_is_excluded_not_fatal() {
        let ds = read(&csv_text(&[
            "2023,SE,FT,Data Scientist,100,USD,100,US,0,US,M",
            "2023,SE,FT,Data Scientist",
            "2022,MI,FT,Data Analyst,90,USD,90,US,50,US,S",
        ]))
        .unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[1].job_title, "Data Analyst");
        assert_eq!(ds.rejected_rows["malformed number"], 1);
    }

    #[test]
    fn undecodable_row_is_tallied_as_unreadable() {
        let mut bytes = csv_text(&["2023,SE,FT,Data Scientist,100,USD,100,US,0,US,M"]).into_bytes();
        bytes.extend_from_slice(b"\n2023,SE,FT,Data \xff Scientist,100,USD,100,US,0,US,M");
        bytes.extend_from_slice(b"\n2021,EN,FT,Data Analyst,50,USD,50,US,0,US,S");

        let ds = read_csv(bytes.as_slice()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rejected_rows["unreadable row"], 1);
    }

    #[test]
    fn header_only_file_is_an_empty_dataset() {
        let ds = read(HEADER).unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn missing_column_fails_the_load() {
        let err = read("work_year,job_title\n2023,Data Scientist").unwrap_err();
        assert!(err.to_string().contains("experience_level"), "{err:#}");
    }

    #[test]
    fn parse_row_reports_reason() {
        let cells = [
            "2023", "SE", "FT", "Data Scientist", "1", "USD", "abc", "US", "0", "US", "M",
        ];
        assert_eq!(
            parse_row(&cells),
            Err(RowRejection::MalformedNumber {
                column: "salary_in_usd",
                value: "abc".to_string()
            })
        );
    }

    #[test]
    fn json_records_load() {
        let ds = parse_json(
            r#"[{"work_year": 2021, "experience_level": "EX", "employment_type": "FT",
                "job_title": "Head of Data", "salary": 230000, "salary_currency": "USD",
                "salary_in_usd": 230000, "employee_residence": "US", "remote_ratio": 50,
                "company_location": "US", "company_size": "L"}]"#,
        )
        .unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].experience_level, ExperienceLevel::Executive);
        assert_eq!(ds.records[0].remote_ratio, 50.0);
    }

    #[test]
    fn json_row_missing_column_fails() {
        let err = parse_json(r#"[{"work_year": 2021}]"#).unwrap_err();
        assert!(format!("{err:#}").contains("missing required column"));
    }

    #[test]
    fn load_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ds_salaries.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            "{}",
            csv_text(&["2020,EN,PT,Data Analyst,20000,USD,20000,DE,0,DE,S"])
        )
        .unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 1);

        let err = load_file(&dir.path().join("data.xlsx")).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported file extension"));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_file(&dir.path().join("absent.csv")).is_err());
    }

    fn write_parquet(path: &Path, with_salary: bool) {
        use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{DataType, Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let text = |values: [Option<&str>; 3]| -> ArrayRef { Arc::new(StringArray::from(values.to_vec())) };
        let mut columns: Vec<(&str, DataType, ArrayRef)> = vec![
            ("work_year", DataType::Int64, Arc::new(Int64Array::from(vec![2023, 2022, 2021])) as ArrayRef),
            ("experience_level", DataType::Utf8, text([Some("SE"), Some("mi"), Some("EX")])),
            ("employment_type", DataType::Utf8, text([Some("FT"), Some("FT"), Some("CT")])),
            ("job_title", DataType::Utf8, text([Some("Data Scientist"), None, Some("Head of Data")])),
            ("salary", DataType::Float64, Arc::new(Float64Array::from(vec![80000.0, 1.0, 2.0])) as ArrayRef),
            ("salary_currency", DataType::Utf8, text([Some("EUR"), Some("USD"), Some("USD")])),
            ("salary_in_usd", DataType::Float64, Arc::new(Float64Array::from(vec![85847.5, 1.0, 230000.0])) as ArrayRef),
            ("employee_residence", DataType::Utf8, text([Some("ES"), Some("US"), Some("US")])),
            ("remote_ratio", DataType::Int64, Arc::new(Int64Array::from(vec![100, 0, 50])) as ArrayRef),
            ("company_location", DataType::Utf8, text([Some("ES"), Some("US"), Some("US")])),
            ("company_size", DataType::Utf8, text([Some("L"), Some("M"), Some("S")])),
        ];
        if !with_salary {
            columns.retain(|(name, _, _)| *name != "salary_in_usd");
        }

        let schema = Arc::new(Schema::new(
            columns
                .iter()
                .map(|(name, dtype, _)| Field::new(*name, dtype.clone(), true))
                .collect::<Vec<_>>(),
        ));
        let batch =
            RecordBatch::try_new(schema.clone(), columns.into_iter().map(|(_, _, a)| a).collect())
                .unwrap();

        let file = std::fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn parquet_columns_are_coerced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ds_salaries.parquet");
        write_parquet(&path, true);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rejected_rows["empty job title"], 1);

        let first = &ds.records[0];
        assert_eq!(first.work_year, 2023);
        assert_eq!(first.experience_level, ExperienceLevel::Senior);
        assert_eq!(first.job_title, "Data Scientist");
        assert_eq!(first.salary_in_usd, 85847.5);
        assert_eq!(first.remote_ratio, 100.0);
        assert_eq!(first.company_size, "L");

        let last = &ds.records[1];
        assert_eq!(last.experience_level, ExperienceLevel::Executive);
        assert_eq!(last.remote_ratio, 50.0);
    }

    #[test]
    fn parquet_missing_column_names_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.pq");
        write_parquet(&path, false);

        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("salary_in_usd"), "{err:#}");
    }
}
