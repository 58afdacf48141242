/// Data layer: core types, loading, validation, derivation and export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ validate  │  schema check, id truncation, drop incomplete rows
///   └──────────┘
///        │
///        ├───────────────► scatter points (CO2 trace)
///        ▼
///   ┌──────────┐
///   │ formula   │  twelve derived columns per row
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  analyzed_<name>, original columns first
///   └──────────┘
/// ```

pub mod export;
pub mod formula;
pub mod loader;
pub mod model;
pub mod validate;
