//! CSV Data Loader Module
//! Reads the listings CSV with Polars and validates the required columns.

use log::{debug, info};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const PRICE: &str = "price";
pub const MODEL_YEAR: &str = "model_year";
pub const ODOMETER: &str = "odometer";
pub const MODEL: &str = "model";
pub const CONDITION: &str = "condition";
pub const VEHICLE_TYPE: &str = "type";
pub const MANUFACTURER: &str = "manufacturer";

/// Columns every listings CSV must carry. `manufacturer` is derived from
/// `model` after loading and is not expected in the file.
pub const REQUIRED_COLUMNS: [&str; 6] = [PRICE, MODEL_YEAR, ODOMETER, MODEL, CONDITION, VEHICLE_TYPE];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("CSV file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Failed to parse CSV: {0}")]
    Parse(#[from] PolarsError),
    #[error("Required column missing: {0}")]
    ColumnMissing(String),
}

/// Loads listing CSVs. Every failure here is fatal at startup.
pub struct ListingLoader;

impl ListingLoader {
    /// Load a CSV file using Polars and check the required column set.
    pub fn load_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::FileNotFound(path.to_path_buf()));
        }

        debug!("Reading listings from {}", path.display());

        // Malformed rows must surface as errors, so no ignore_errors here
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;

        Self::validate_columns(&df)?;

        info!(
            "Loaded {} rows, {} columns from {}",
            df.height(),
            df.width(),
            path.display()
        );
        Ok(df)
    }

    /// Fail with the first required column the frame does not carry.
    pub fn validate_columns(df: &DataFrame) -> Result<(), LoaderError> {
        let names = Self::get_columns(df);
        match REQUIRED_COLUMNS
            .iter()
            .find(|required| !names.iter().any(|name| name == *required))
        {
            Some(missing) => Err(LoaderError::ColumnMissing(missing.to_string())),
            None => Ok(()),
        }
    }

    /// Get list of column names from a DataFrame.
    pub fn get_columns(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static FIXTURE_ID: AtomicUsize = AtomicUsize::new(0);

    /// Write `contents` to a fresh CSV under the OS temp directory.
    pub(crate) fn write_fixture(contents: &str) -> PathBuf {
        let id = FIXTURE_ID.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "car_dashboard_fixture_{}_{}.csv",
            std::process::id(),
            id
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_csv_with_required_columns() {
        let path = write_fixture(
            "price,model_year,odometer,model,condition,type\n\
             9400,2011,145000,bmw x5,good,SUV\n\
             25500,,88705,ford f-150,good,pickup\n",
        );

        let df = ListingLoader::load_csv(&path).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column(MODEL_YEAR).unwrap().null_count(), 1);
        fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_is_reported() {
        let path = std::env::temp_dir().join("car_dashboard_does_not_exist.csv");
        match ListingLoader::load_csv(&path) {
            Err(LoaderError::FileNotFound(p)) => assert_eq!(p, path),
            other => panic!("expected FileNotFound, got {:?}", other.map(|df| df.height())),
        }
    }

    #[test]
    fn missing_required_column_is_reported() {
        let path = write_fixture(
            "price,model_year,odometer,model,condition\n\
             9400,2011,145000,bmw x5,good\n",
        );

        match ListingLoader::load_csv(&path) {
            Err(LoaderError::ColumnMissing(name)) => assert_eq!(name, VEHICLE_TYPE),
            other => panic!("expected ColumnMissing, got {:?}", other.map(|df| df.height())),
        }
        fs::remove_file(path).ok();
    }

    #[test]
    fn malformed_csv_is_reported() {
        let path = write_fixture(
            "price,model_year,odometer,model,condition,type\n\
             9400,2011,145000,bmw x5,good,SUV\n\
             25500,2013,88705,ford f-150,good,pickup,red,extra\n",
        );

        match ListingLoader::load_csv(&path) {
            Err(LoaderError::Parse(_)) => {}
            other => panic!("expected Parse, got {:?}", other.map(|df| df.height())),
        }
        fs::remove_file(path).ok();
    }

    #[test]
    fn extra_columns_are_kept() {
        let path = write_fixture(
            "price,model_year,odometer,model,condition,type,paint_color\n\
             5500,2013,110000,hyundai sonata,like new,sedan,red\n",
        );

        let df = ListingLoader::load_csv(&path).unwrap();
        assert!(ListingLoader::get_columns(&df).contains(&"paint_color".to_string()));
        fs::remove_file(path).ok();
    }
}
