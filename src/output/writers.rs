//! Plain text, JSON and CSV result writers

use crate::output::traits::{OutputFormat, OutputResult, ResultWriter};
use serde::Serialize;
use std::io::Write;

/// Writes one URL per line
#[derive(Debug, Default, Clone, Copy)]
pub struct TxtWriter;

impl ResultWriter for TxtWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Txt
    }

    fn write_to(&self, urls: &[String], out: &mut dyn Write) -> OutputResult<()> {
        for url in urls {
            writeln!(out, "{}", url)?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonResults<'a> {
    found_urls: &'a [String],
}

/// Writes `{"found_urls": [...]}`, pretty-printed
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonWriter;

impl ResultWriter for JsonWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn write_to(&self, urls: &[String], out: &mut dyn Write) -> OutputResult<()> {
        serde_json::to_writer_pretty(&mut *out, &JsonResults { found_urls: urls })?;
        writeln!(out)?;
        Ok(())
    }
}

/// Writes a `URL` header row followed by one row per URL
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvWriter;

impl ResultWriter for CsvWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Csv
    }

    fn write_to(&self, urls: &[String], out: &mut dyn Write) -> OutputResult<()> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(["URL"])?;
        for url in urls {
            writer.write_record([url.as_str()])?;
        }
        writer.flush()?;
        Ok(())
    }
}
