//! Result writer trait and types
//!
//! The crawl core hands its matched URLs to a `ResultWriter`; the writer
//! decides how they are serialized.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing results
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for OutputError {
    fn from(e: serde_json::Error) -> Self {
        OutputError::Format(e.to_string())
    }
}

impl From<csv::Error> for OutputError {
    fn from(e: csv::Error) -> Self {
        OutputError::Format(e.to_string())
    }
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Serialization format for matched URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One URL per line
    #[default]
    Txt,
    /// `{"found_urls": [...]}`
    Json,
    /// A `URL` header followed by one URL per row
    Csv,
}

impl OutputFormat {
    /// File extension used for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Trait for result writers
///
/// Implementations serialize a collection of matched URLs. Order is
/// whatever the caller provides; writers do not sort.
pub trait ResultWriter {
    /// The format this writer produces
    fn format(&self) -> OutputFormat;

    /// Serializes the URLs into `out`
    fn write_to(&self, urls: &[String], out: &mut dyn std::io::Write) -> OutputResult<()>;

    /// Writes the URLs to `results_<timestamp>.<ext>` inside `directory`
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Path of the file that was written
    /// * `Err(OutputError)` - Failed to create or write the file
    fn write_file(&self, urls: &[String], directory: &Path) -> OutputResult<PathBuf> {
        let timestamp = chrono::Utc::now().timestamp();
        let path = directory.join(format!(
            "results_{}.{}",
            timestamp,
            self.format().extension()
        ));

        let mut file = std::io::BufWriter::new(std::fs::File::create(&path)?);
        self.write_to(urls, &mut file)?;
        std::io::Write::flush(&mut file)?;

        Ok(path)
    }
}
