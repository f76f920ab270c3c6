/// Data layer: core types, loading, aggregation, and scales.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + drop invalid rows → SalaryDataset
///   └──────────┘
///        │
///        ├──────────────────────┐
///        ▼                      ▼
///   ┌───────────┐         ┌──────────┐
///   │ aggregate  │         │  scale    │  once per load
///   └───────────┘         └──────────┘
///   mean / count per group, recomputed per selection
/// ```

pub mod aggregate;
pub mod loader;
pub mod model;
pub mod scale;
