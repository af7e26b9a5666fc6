//! CSV Data Loader Module
//! Reads the uploaded arrears CSV into a Polars DataFrame.

use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("CSV file has no header row")]
    NoHeader,
}

/// Parses uploaded CSV files. Holds only the name of the last file read.
#[derive(Default)]
pub struct DataLoader {
    file_path: Option<PathBuf>,
}

impl DataLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a CSV file from disk and parse it.
    pub fn load_csv(&mut self, file_path: &Path) -> Result<DataFrame, LoaderError> {
        let bytes = std::fs::read(file_path)?;
        let df = Self::parse_bytes(bytes)?;
        self.file_path = Some(file_path.to_path_buf());

        log::info!(
            "Loaded {} rows, {} columns from {}",
            df.height(),
            df.width(),
            file_path.display()
        );
        Ok(df)
    }

    /// Parse raw CSV bytes.
    ///
    /// The schema is inferred from every row and malformed values fail the
    /// read instead of being nulled out, so a bad numeric cell further down the
    /// file cannot silently change a column's type.
    pub fn parse_bytes(bytes: Vec<u8>) -> Result<DataFrame, LoaderError> {
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(LoaderError::NoHeader);
        }

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .with_ignore_errors(false)
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;

        Ok(df)
    }

    /// Get file path of the last successful load.
    pub fn get_file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_rows() {
        let csv = b"Total_Fee,Amount_Paid,Level,Status,School\n3000,1000,Master,Unpaid,FSKM\n500,500,Diploma,Paid,FPA\n";
        let df = DataLoader::parse_bytes(csv.to_vec()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 5);
        assert!(df.column("School").is_ok());
    }

    #[test]
    fn empty_cells_become_nulls() {
        let csv = b"Total_Fee,Amount_Paid,Total_Fine,Level,Status,School\n3000,1000,,Master,Unpaid,FSKM\n";
        let df = DataLoader::parse_bytes(csv.to_vec()).unwrap();
        assert_eq!(df.column("Total_Fine").unwrap().null_count(), 1);
    }

    #[test]
    fn blank_input_is_rejected() {
        let err = DataLoader::parse_bytes(b"  \n".to_vec()).unwrap_err();
        assert!(matches!(err, LoaderError::NoHeader));
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut loader = DataLoader::new();
        let err = loader
            .load_csv(Path::new("/definitely/not/here/arrears.csv"))
            .unwrap_err();
        assert!(matches!(err, LoaderError::Io(_)));
        assert!(loader.get_file_path().is_none());
    }
}
