//! # Declaration Reports
//!
//! Where finished monthly declarations go.
//!
//! ## CSV Layout
//! ```text
//! city_tax_{accommodation}_{month}_{year}.csv
//!
//! TOTAL CITY TAX AMOUNT,TOTAL GUESTS,TOTAL NIGHTS,EVALUATED CITY TAX
//! 440.00,24,80,440.00
//! ```
//!
//! A report is rewritten from scratch on every call; running the same
//! declaration twice leaves one file with the latest figures.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use roost_core::tax::Declaration;

use crate::error::ReportError;

/// Destination for finished declarations.
pub trait DeclarationSink {
    fn write(&mut self, declaration: &Declaration) -> Result<(), ReportError>;
}

/// One CSV row; field names are the column headers.
#[derive(Debug, Serialize)]
struct DeclarationRow {
    #[serde(rename = "TOTAL CITY TAX AMOUNT")]
    total_city_tax: String,
    #[serde(rename = "TOTAL GUESTS")]
    total_guests: i64,
    #[serde(rename = "TOTAL NIGHTS")]
    total_nights: i64,
    #[serde(rename = "EVALUATED CITY TAX")]
    evaluated_city_tax: String,
}

impl From<&Declaration> for DeclarationRow {
    fn from(declaration: &Declaration) -> Self {
        DeclarationRow {
            total_city_tax: declaration.total_city_tax.to_string(),
            total_guests: declaration.total_guests,
            total_nights: declaration.total_nights,
            evaluated_city_tax: declaration.total_evaluated.to_string(),
        }
    }
}

// =============================================================================
// CSV Directory Sink
// =============================================================================

/// Writes each declaration to its own CSV file inside a directory.
#[derive(Debug, Clone)]
pub struct CsvDirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvDirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CsvDirectorySink {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `city_tax_{accommodation}_{month}_{year}.csv`
    pub fn file_name(declaration: &Declaration) -> String {
        format!(
            "city_tax_{}_{}_{}.csv",
            declaration.accommodation_id,
            declaration.month.month(),
            declaration.month.year()
        )
    }

    pub fn path_for(&self, declaration: &Declaration) -> PathBuf {
        self.dir.join(Self::file_name(declaration))
    }

    /// Files written so far, oldest first.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl DeclarationSink for CsvDirectorySink {
    fn write(&mut self, declaration: &Declaration) -> Result<(), ReportError> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(declaration);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.serialize(DeclarationRow::from(declaration))?;
        writer.flush()?;

        debug!(path = %path.display(), "Declaration report written");
        self.written.push(path);
        Ok(())
    }
}

// =============================================================================
// Memory Sink
// =============================================================================

/// Keeps declarations in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub declarations: Vec<Declaration>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeclarationSink for MemorySink {
    fn write(&mut self, declaration: &Declaration) -> Result<(), ReportError> {
        self.declarations.push(declaration.clone());
        Ok(())
    }
}
