/// Data layer: loading, preparation, and view queries.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Vec<RawRecord>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ prepare  │  fill missing with 0, derive gdp_per_capita → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  query   │  (Dataset, ViewInput) → ViewOutput, once per input change
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod prepare;
pub mod query;
