//! Data module - CSV loading, cleaning and aggregation

mod listing;
pub(crate) mod loader;
mod processor;

pub use listing::{ListingTable, VehicleListing};
pub use loader::{
    ListingLoader, LoaderError, CONDITION, MANUFACTURER, MODEL, MODEL_YEAR, ODOMETER, PRICE,
    REQUIRED_COLUMNS, VEHICLE_TYPE,
};
pub use processor::{DataPreparer, GroupCount, PreparerError};
