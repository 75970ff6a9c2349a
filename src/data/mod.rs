/// Data layer: table type, loading, and writing.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table, drop stray index column
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  ordered columns, rows of CellValue
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  writer   │  Table → CSV (header, no index)
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod writer;
