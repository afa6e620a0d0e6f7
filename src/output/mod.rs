//! Output module for persisting scan results
//!
//! This module handles:
//! - Choosing a writer for the configured format
//! - Serializing matched URLs as plain text, JSON or CSV
//! - Naming and creating the results file

mod traits;
mod writers;

pub use traits::{OutputError, OutputFormat, OutputResult, ResultWriter};
pub use writers::{CsvWriter, JsonWriter, TxtWriter};

/// Returns the writer for a format
pub fn writer_for(format: OutputFormat) -> Box<dyn ResultWriter + Send + Sync> {
    match format {
        OutputFormat::Txt => Box::new(TxtWriter),
        OutputFormat::Json => Box::new(JsonWriter),
        OutputFormat::Csv => Box::new(CsvWriter),
    }
}
