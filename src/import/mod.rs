//! Import layer: one batch run per domain.
//!
//! ```text
//!   validate ──► loader ──► clean ──► store
//!   (ImportDir)  (Table)   (Cleaner)  (CsvStore)
//! ```

pub mod clean;
pub mod pipeline;
pub mod store;
pub mod validate;

pub use pipeline::{run, Domain, ImportReport};
