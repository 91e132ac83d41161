//! Data layer: table model, loading, profiling, cleaning, aggregation.
//!
//! Architecture:
//! ```text
//!  .csv / .csv.zip / .csv.gz / .parquet / .json
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  parse file → Table (typed columns)
//!   └──────────┘
//!        │
//!        ├──────────► profile    shape, head, dtypes, nulls, describe
//!        ▼
//!   ┌──────────┐
//!   │  clean   │  drop sparse columns / incomplete rows,
//!   └──────────┘  derive publish_date, pub_year, abstract_word_count
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate │  value counts → charts
//!   └───────────┘
//! ```

pub mod aggregate;
pub mod clean;
pub mod loader;
pub mod model;
pub mod profile;
