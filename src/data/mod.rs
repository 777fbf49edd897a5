/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset  │  Vec<Row>, classified predictor lists, age range
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  sex + age range → RowSubset (indices, original order)
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
