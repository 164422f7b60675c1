//! Typed row view over the prepared listings table.

use crate::data::loader::{CONDITION, MANUFACTURER, MODEL, MODEL_YEAR, ODOMETER, PRICE, VEHICLE_TYPE};
use crate::data::processor::{DataPreparer, PreparerError};
use polars::prelude::*;
use serde::Serialize;

/// One used-car listing after preprocessing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleListing {
    pub price: Option<f64>,
    pub model_year: f64,
    pub odometer: f64,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub condition: Option<String>,
    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,
}

pub struct ListingTable;

impl ListingTable {
    /// Extract up to `limit` rows from a prepared frame.
    ///
    /// The frame must have gone through [`DataPreparer::prepare`]; a missing
    /// `model_year` or `odometer` here is reported as a missing column.
    pub fn rows(df: &DataFrame, limit: usize) -> Result<Vec<VehicleListing>, PreparerError> {
        let height = df.height().min(limit);
        let head = df.head(Some(height));

        let prices = DataPreparer::optional_f64(&head, PRICE)?;
        let years = Self::filled(&head, MODEL_YEAR)?;
        let odometers = Self::filled(&head, ODOMETER)?;
        let models = DataPreparer::optional_str(&head, MODEL)?;
        let manufacturers = DataPreparer::optional_str(&head, MANUFACTURER)?;
        let conditions = DataPreparer::optional_str(&head, CONDITION)?;
        let types = DataPreparer::optional_str(&head, VEHICLE_TYPE)?;

        let mut rows = Vec::with_capacity(height);
        for i in 0..height {
            rows.push(VehicleListing {
                price: prices[i],
                model_year: years[i],
                odometer: odometers[i],
                model: models[i].clone(),
                manufacturer: manufacturers[i].clone(),
                condition: conditions[i].clone(),
                vehicle_type: types[i].clone(),
            });
        }
        Ok(rows)
    }

    /// Serialize rows as a pretty JSON array.
    pub fn to_json(rows: &[VehicleListing]) -> serde_json::Result<String> {
        serde_json::to_string_pretty(rows)
    }

    fn filled(df: &DataFrame, column: &str) -> Result<Vec<f64>, PreparerError> {
        DataPreparer::optional_f64(df, column)?
            .into_iter()
            .map(|v| v.ok_or_else(|| PreparerError::ColumnMissing(column.to_string())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared() -> DataFrame {
        let mut df = DataFrame::new(vec![
            Column::new(PRICE.into(), vec![Some(9400.0), None]),
            Column::new(MODEL_YEAR.into(), vec![Some(2011.0), None]),
            Column::new(ODOMETER.into(), vec![Some(145000.0), Some(88705.0)]),
            Column::new(MODEL.into(), vec!["bmw x5", "Ford F-150"]),
            Column::new(CONDITION.into(), vec![Some("good"), None]),
            Column::new(VEHICLE_TYPE.into(), vec!["SUV", "pickup"]),
        ])
        .unwrap();
        DataPreparer::fill_median(&mut df, MODEL_YEAR).unwrap();
        DataPreparer::derive_manufacturer(&mut df).unwrap();
        df
    }

    #[test]
    fn rows_are_typed_and_limited() {
        let df = prepared();

        let rows = ListingTable::rows(&df, 10).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].price, None);
        assert_eq!(rows[1].model_year, 2011.0);
        assert_eq!(rows[1].manufacturer.as_deref(), Some("ford"));
        assert_eq!(rows[1].condition, None);

        assert_eq!(ListingTable::rows(&df, 1).unwrap().len(), 1);
    }

    #[test]
    fn json_uses_source_column_names() {
        let rows = ListingTable::rows(&prepared(), 1).unwrap();
        let json = ListingTable::to_json(&rows).unwrap();
        assert!(json.contains("\"type\": \"SUV\""));
        assert!(json.contains("\"manufacturer\": \"bmw\""));
    }
}
