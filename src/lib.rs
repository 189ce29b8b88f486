//! Library statistics: import periodic export files into CSV stores and
//! derive the views shown by the dashboard.
//!
//! ```text
//!  export files (.txt / .tsv / .xlsx)
//!        │
//!        ▼
//!   ┌──────────┐   ┌──────────┐   ┌──────────┐
//!   │ validate │ → │  loader  │ → │  clean   │ → CSV store
//!   └──────────┘   └──────────┘   └──────────┘
//!                                                   │
//!                                                   ▼
//!                                            ┌──────────┐
//!                                            │  report  │ → dashboard
//!                                            └──────────┘
//! ```

pub mod columns;
pub mod config;
pub mod data;
pub mod dates;
pub mod error;
pub mod import;
pub mod report;

pub use error::{Error, Result};
