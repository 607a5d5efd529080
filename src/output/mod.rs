//! Export formatters for analysis results.
//!
//! All analysis outputs are plain data; these modules turn them into CSV
//! rows for spreadsheets and a JSON document for downstream tooling.

pub mod csv;
pub mod json;

pub use csv::{GroupCsvExport, PairCsvExport};
pub use json::JsonReport;
