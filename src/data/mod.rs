//! Data layer: core types, loading, lookups and filtering.
//!
//! Architecture:
//! ```text
//!  .txt / .tsv / .xlsx / store .csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  parse file(s) → Table, stamp file date
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Table   │  named columns, rows of Value
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter  │  apply per-column selections → row indices
//!   └──────────┘
//! ```

pub mod filter;
pub mod loader;
pub mod lookup;
pub mod model;

pub use lookup::Lookup;
pub use model::{Table, Value};
