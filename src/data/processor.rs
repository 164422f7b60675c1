//! Data Processor Module
//! Cleaning (median fill, manufacturer derivation), grouped counts and filtering.

use crate::data::loader::{
    ListingLoader, LoaderError, MANUFACTURER, MODEL, MODEL_YEAR, ODOMETER,
};
use crate::stats::StatsCalculator;
use log::{debug, info};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreparerError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Column not found: {0}")]
    ColumnMissing(String),
    #[error("Column '{0}' is not a string column")]
    NotAString(String),
    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),
    #[error("Column '{0}' has no values to take a median from")]
    AllMissing(String),
}

const GROUP_LEN: &str = "group_len";

/// Number of rows sharing one key combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub keys: Vec<String>,
    pub count: usize,
}

/// Handles data cleaning and aggregation over the listings table.
pub struct DataPreparer;

impl DataPreparer {
    /// Load the CSV and run the cleaning steps: median fill of
    /// `model_year` and `odometer`, then manufacturer derivation.
    pub fn prepare(path: &Path) -> Result<DataFrame, PreparerError> {
        let mut df = ListingLoader::load_csv(path)?;

        for column in [MODEL_YEAR, ODOMETER] {
            let median = Self::fill_median(&mut df, column)?;
            info!("Filled missing '{}' with median {}", column, median);
        }
        Self::derive_manufacturer(&mut df)?;

        Ok(df)
    }

    /// Replace missing values in `column` with the median of the present ones.
    ///
    /// NaN counts as missing. The filled column is stored as `Float64` and the
    /// median used is returned. A column with no present values cannot be
    /// filled and yields [`PreparerError::AllMissing`] instead of NaNs.
    pub fn fill_median(df: &mut DataFrame, column: &str) -> Result<f64, PreparerError> {
        let values = Self::optional_f64(df, column)?;
        let present: Vec<f64> = values.iter().flatten().copied().filter(|v| !v.is_nan()).collect();
        let median = StatsCalculator::median(&present)
            .ok_or_else(|| PreparerError::AllMissing(column.to_string()))?;

        let missing = values.len() - present.len();
        let filled: Vec<f64> = values
            .into_iter()
            .map(|v| match v {
                Some(v) if !v.is_nan() => v,
                _ => median,
            })
            .collect();

        df.with_column(Column::new(column.into(), filled))?;
        debug!("'{}': {} missing values replaced", column, missing);
        Ok(median)
    }

    /// First whitespace-delimited token of a model string, lower-cased.
    pub fn manufacturer_of(model: &str) -> Option<String> {
        model.split_whitespace().next().map(|token| token.to_lowercase())
    }

    /// Add the `manufacturer` column derived from `model`.
    ///
    /// A null or blank model gives a null manufacturer.
    pub fn derive_manufacturer(df: &mut DataFrame) -> Result<(), PreparerError> {
        let manufacturers: Vec<Option<String>> = {
            let model = df
                .column(MODEL)
                .map_err(|_| PreparerError::ColumnMissing(MODEL.to_string()))?;
            let model = model
                .str()
                .map_err(|_| PreparerError::NotAString(MODEL.to_string()))?;
            model
                .into_iter()
                .map(|m| m.and_then(Self::manufacturer_of))
                .collect()
        };

        df.with_column(Column::new(MANUFACTURER.into(), manufacturers))?;
        Ok(())
    }

    /// Count rows per distinct combination of `keys`.
    ///
    /// Keys are compared as strings. Rows with a null in any key column are
    /// not counted. The result order is unspecified; pass it through
    /// [`DataPreparer::sorted`] when order matters.
    pub fn group_count(df: &DataFrame, keys: &[&str]) -> Result<Vec<GroupCount>, PreparerError> {
        for key in keys {
            if df.column(key).is_err() {
                return Err(PreparerError::ColumnMissing(key.to_string()));
            }
        }
        let Some(present) = keys
            .iter()
            .map(|key| col(*key).is_not_null())
            .reduce(|acc, expr| acc.and(expr))
        else {
            return Ok(Vec::new());
        };

        let grouped = df
            .clone()
            .lazy()
            .filter(present)
            .group_by(
                keys.iter()
                    .map(|key| col(*key).cast(DataType::String))
                    .collect::<Vec<_>>(),
            )
            .agg([len().alias(GROUP_LEN)])
            .collect()?;

        let key_columns = keys
            .iter()
            .map(|key| grouped.column(key)?.str().cloned())
            .collect::<PolarsResult<Vec<_>>>()?;
        let counts = grouped.column(GROUP_LEN)?.cast(&DataType::UInt64)?;
        let counts = counts.u64()?;

        Ok((0..grouped.height())
            .map(|i| GroupCount {
                keys: key_columns
                    .iter()
                    .map(|column| column.get(i).unwrap_or_default().to_string())
                    .collect(),
                count: counts.get(i).unwrap_or_default() as usize,
            })
            .collect())
    }

    /// Sort group counts by their key tuple.
    pub fn sorted(mut counts: Vec<GroupCount>) -> Vec<GroupCount> {
        counts.sort_by(|a, b| a.keys.cmp(&b.keys));
        counts
    }

    /// Rows satisfying `predicate`. The input frame is left untouched; rows
    /// where the predicate is null are dropped.
    pub fn filter_by_predicate(df: &DataFrame, predicate: Expr) -> Result<DataFrame, PreparerError> {
        let filtered = df.clone().lazy().filter(predicate).collect()?;
        Ok(filtered)
    }

    /// Keep only manufacturers with at least `threshold` listings.
    pub fn exclude_small_manufacturers(
        df: &DataFrame,
        threshold: usize,
    ) -> Result<DataFrame, PreparerError> {
        let kept: Vec<String> = Self::group_count(df, &[MANUFACTURER])?
            .into_iter()
            .filter(|group| group.count >= threshold)
            .filter_map(|group| group.keys.into_iter().next())
            .collect();

        let kept_series = Series::new("kept".into(), &kept);
        let filtered =
            Self::filter_by_predicate(df, col(MANUFACTURER).is_in(lit(kept_series)))?;

        debug!(
            "Small manufacturer filter (< {}): {} -> {} rows, {} manufacturers kept",
            threshold,
            df.height(),
            filtered.height(),
            kept.len()
        );
        Ok(filtered)
    }

    /// Distinct non-null manufacturers, sorted.
    pub fn manufacturers(df: &DataFrame) -> Result<Vec<String>, PreparerError> {
        let mut names: Vec<String> = Self::group_count(df, &[MANUFACTURER])?
            .into_iter()
            .filter_map(|group| group.keys.into_iter().next())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Present (non-null, non-NaN) values of a numeric column.
    pub fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<f64>, PreparerError> {
        Ok(Self::optional_f64(df, column)?
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect())
    }

    /// `[x, y]` pairs for rows where both columns are present.
    pub fn paired_values(df: &DataFrame, x: &str, y: &str) -> Result<Vec<[f64; 2]>, PreparerError> {
        let xs = Self::optional_f64(df, x)?;
        let ys = Self::optional_f64(df, y)?;

        Ok(xs
            .into_iter()
            .zip(ys)
            .filter_map(|pair| match pair {
                (Some(x), Some(y)) if !x.is_nan() && !y.is_nan() => Some([x, y]),
                _ => None,
            })
            .collect())
    }

    /// Values of `value_col` grouped by the category in `category_col`.
    /// Rows missing either side are skipped.
    pub fn values_by_category(
        df: &DataFrame,
        category_col: &str,
        value_col: &str,
    ) -> Result<BTreeMap<String, Vec<f64>>, PreparerError> {
        let categories = Self::optional_str(df, category_col)?;
        let values = Self::optional_f64(df, value_col)?;

        let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for (category, value) in categories.into_iter().zip(values) {
            if let (Some(category), Some(value)) = (category, value) {
                if !value.is_nan() {
                    grouped.entry(category).or_default().push(value);
                }
            }
        }
        Ok(grouped)
    }

    /// A numeric column as nullable `f64`s.
    pub fn optional_f64(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>, PreparerError> {
        let series = df
            .column(column)
            .map_err(|_| PreparerError::ColumnMissing(column.to_string()))?;

        // An all-empty CSV column is inferred as String; it is numeric with nothing present
        if series.null_count() == series.len() {
            return Ok(vec![None; series.len()]);
        }
        if !Self::is_numeric(series.dtype()) {
            return Err(PreparerError::NotNumeric(column.to_string()));
        }

        let as_f64 = series.cast(&DataType::Float64)?;
        Ok(as_f64.f64()?.into_iter().collect())
    }

    /// Any column rendered as nullable strings.
    pub fn optional_str(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>, PreparerError> {
        let series = df
            .column(column)
            .map_err(|_| PreparerError::ColumnMissing(column.to_string()))?;
        let as_str = series.cast(&DataType::String)?;

        Ok(as_str
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect())
    }

    fn is_numeric(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Float32
                | DataType::Float64
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }
}
