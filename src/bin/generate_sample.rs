use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// One synthetic survey answer, columns in `ds_salaries.csv` order.
struct Row {
    work_year: i64,
    experience_level: &'static str,
    employment_type: &'static str,
    job_title: &'static str,
    salary: f64,
    salary_currency: &'static str,
    salary_in_usd: f64,
    employee_residence: &'static str,
    remote_ratio: i64,
    company_location: &'static str,
    company_size: &'static str,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const JOBS: [(&str, f64); 6] = [
    ("Data Scientist", 120_000.0),
    ("Data Engineer", 115_000.0),
    ("Data Analyst", 85_000.0),
    ("Machine Learning Engineer", 140_000.0),
    ("Research Scientist", 150_000.0),
    ("Head of Data", 190_000.0),
];

/// Experience code and salary multiplier.
const LEVELS: [(&str, f64); 4] = [("EN", 0.6), ("MI", 0.85), ("SE", 1.1), ("EX", 1.6)];

/// Country, currency and USD exchange rate.
const PLACES: [(&str, &str, f64); 4] = [
    ("US", "USD", 1.0),
    ("GB", "GBP", 0.8),
    ("DE", "EUR", 0.92),
    ("IN", "INR", 82.0),
];

fn generate(n: usize, rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::with_capacity(n);
    for i in 0..n {
        let (job_title, base) = rng.pick(&JOBS);
        let (experience_level, factor) = rng.pick(&LEVELS);
        let (country, currency, rate) = rng.pick(&PLACES);

        let salary_in_usd = rng.gauss(base * factor, base * 0.15).max(5_000.0).round();
        rows.push(Row {
            work_year: 2020 + (rng.next_u64() % 4) as i64,
            experience_level,
            employment_type: rng.pick(&["FT", "FT", "FT", "PT", "CT", "FL"]),
            job_title,
            salary: (salary_in_usd * rate).round(),
            salary_currency: currency,
            // Every 50th row carries an invalid salary the viewer must skip.
            salary_in_usd: if i % 50 == 49 { 0.0 } else { salary_in_usd },
            employee_residence: country,
            remote_ratio: rng.pick(&[0, 50, 100]),
            company_location: country,
            company_size: rng.pick(&["S", "M", "L"]),
        });
    }
    rows
}

fn write_csv(path: &str, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record([
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
    ])?;
    for r in rows {
        writer.write_record([
            r.work_year.to_string(),
            r.experience_level.to_string(),
            r.employment_type.to_string(),
            r.job_title.to_string(),
            r.salary.to_string(),
            r.salary_currency.to_string(),
            r.salary_in_usd.to_string(),
            r.employee_residence.to_string(),
            r.remote_ratio.to_string(),
            r.company_location.to_string(),
            r.company_size.to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[Row]) -> Result<()> {
    let text = |f: fn(&Row) -> &'static str| -> Arc<StringArray> {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("work_year", DataType::Int64, false),
        Field::new("experience_level", DataType::Utf8, false),
        Field::new("employment_type", DataType::Utf8, false),
        Field::new("job_title", DataType::Utf8, false),
        Field::new("salary", DataType::Float64, false),
        Field::new("salary_currency", DataType::Utf8, false),
        Field::new("salary_in_usd", DataType::Float64, false),
        Field::new("employee_residence", DataType::Utf8, false),
        Field::new("remote_ratio", DataType::Int64, false),
        Field::new("company_location", DataType::Utf8, false),
        Field::new("company_size", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.work_year))),
            text(|r| r.experience_level),
            text(|r| r.employment_type),
            text(|r| r.job_title),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.salary))),
            text(|r| r.salary_currency),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.salary_in_usd))),
            text(|r| r.employee_residence),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.remote_ratio))),
            text(|r| r.company_location),
            text(|r| r.company_size),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(600, &mut rng);

    write_csv("ds_salaries.csv", &rows)?;
    write_parquet("ds_salaries.parquet", &rows)?;

    println!(
        "Wrote {} survey rows to ds_salaries.csv and ds_salaries.parquet",
        rows.len()
    );
    Ok(())
}
