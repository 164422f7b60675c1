//! Chart Builder Module
//! Turns the listings table into backend-independent chart inputs.

use crate::data::{
    DataPreparer, PreparerError, CONDITION, MANUFACTURER, MODEL_YEAR, ODOMETER, PRICE,
    VEHICLE_TYPE,
};
use crate::stats::{BinEdges, PriceSummary, StatsCalculator};
use log::debug;
use polars::prelude::DataFrame;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error(transparent)]
    Preparer(#[from] PreparerError),
    #[error("Unknown manufacturer: {0}")]
    UnknownManufacturer(String),
    #[error("No data to plot for '{0}'")]
    NoData(&'static str),
}

/// The charts the dashboard knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    OdometerHistogram,
    PriceVsYear,
    TypesByManufacturer,
    ConditionByYear,
    PriceComparison,
}

impl ChartKind {
    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::OdometerHistogram => "Odometer distribution",
            ChartKind::PriceVsYear => "Price vs model year",
            ChartKind::TypesByManufacturer => "Vehicle types by manufacturer",
            ChartKind::ConditionByYear => "Condition vs model year",
            ChartKind::PriceComparison => "Price distribution between manufacturers",
        }
    }

    /// File name (without extension) used when exporting.
    pub fn file_stem(&self) -> &'static str {
        match self {
            ChartKind::OdometerHistogram => "odometer_histogram",
            ChartKind::PriceVsYear => "price_vs_model_year",
            ChartKind::TypesByManufacturer => "types_by_manufacturer",
            ChartKind::ConditionByYear => "condition_by_model_year",
            ChartKind::PriceComparison => "price_comparison",
        }
    }
}

/// How several histogram series share the bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarMode {
    Stacked,
    Overlay,
}

/// One labelled run of bar heights.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramChart {
    pub bins: BinEdges,
    pub series: Vec<Series>,
    pub mode: BarMode,
    pub x_label: &'static str,
    pub y_label: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub points: Vec<[f64; 2]>,
    pub x_label: &'static str,
    pub y_label: &'static str,
}

/// Bars per category, each stack a series with one height per category.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedBarChart {
    pub categories: Vec<String>,
    pub stacks: Vec<Series>,
    pub x_label: &'static str,
    pub y_label: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartBody {
    Histogram(HistogramChart),
    Scatter(ScatterChart),
    StackedBar(StackedBarChart),
}

/// Everything needed to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub kind: ChartKind,
    pub body: ChartBody,
    pub summary: Option<PriceSummary>,
}

impl ChartData {
    pub fn title(&self) -> &'static str {
        self.kind.title()
    }
}

/// Builds chart inputs from a (possibly filtered) listings table.
pub struct ChartBuilder;

impl ChartBuilder {
    /// Histogram of odometer readings.
    pub fn odometer_histogram(df: &DataFrame, bins: usize) -> Result<ChartData, ChartError> {
        let kind = ChartKind::OdometerHistogram;
        let values = DataPreparer::numeric_values(df, ODOMETER)?;
        let edges = BinEdges::spanning(&values, bins).ok_or(ChartError::NoData(kind.title()))?;

        Ok(ChartData {
            kind,
            body: ChartBody::Histogram(HistogramChart {
                bins: edges,
                series: vec![Series {
                    label: ODOMETER.to_string(),
                    values: StatsCalculator::histogram(&values, &edges),
                }],
                mode: BarMode::Stacked,
                x_label: "Odometer",
                y_label: "Count",
            }),
            summary: None,
        })
    }

    /// Scatter of price against model year.
    pub fn price_vs_year(df: &DataFrame) -> Result<ChartData, ChartError> {
        let points = DataPreparer::paired_values(df, MODEL_YEAR, PRICE)?;
        Ok(ChartData {
            kind: ChartKind::PriceVsYear,
            body: ChartBody::Scatter(ScatterChart {
                points,
                x_label: "Model year",
                y_label: "Price",
            }),
            summary: None,
        })
    }

    /// Listing counts per manufacturer, stacked by vehicle type.
    pub fn types_by_manufacturer(df: &DataFrame) -> Result<ChartData, ChartError> {
        let counts = DataPreparer::sorted(DataPreparer::group_count(df, &[MANUFACTURER, VEHICLE_TYPE])?);

        let mut by_type: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        let mut categories: Vec<String> = Vec::new();
        for group in counts {
            let [manufacturer, vehicle_type]: [String; 2] = match group.keys.try_into() {
                Ok(keys) => keys,
                Err(_) => continue,
            };
            if categories.last() != Some(&manufacturer) {
                categories.push(manufacturer.clone());
            }
            by_type
                .entry(vehicle_type)
                .or_default()
                .insert(manufacturer, group.count as f64);
        }

        let stacks = by_type
            .into_iter()
            .map(|(label, counts)| Series {
                values: categories
                    .iter()
                    .map(|m| counts.get(m).copied().unwrap_or(0.0))
                    .collect(),
                label,
            })
            .collect();

        Ok(ChartData {
            kind: ChartKind::TypesByManufacturer,
            body: ChartBody::StackedBar(StackedBarChart {
                categories,
                stacks,
                x_label: "Manufacturer",
                y_label: "Listings",
            }),
            summary: None,
        })
    }

    /// Model year histogram, one stacked series per condition.
    pub fn condition_by_year(df: &DataFrame, bins: usize) -> Result<ChartData, ChartError> {
        let kind = ChartKind::ConditionByYear;
        let grouped = DataPreparer::values_by_category(df, CONDITION, MODEL_YEAR)?;
        let edges = BinEdges::spanning(grouped.values().flatten(), bins)
            .ok_or(ChartError::NoData(kind.title()))?;

        let series = grouped
            .into_iter()
            .map(|(label, years)| Series {
                values: StatsCalculator::histogram(&years, &edges),
                label,
            })
            .collect();

        Ok(ChartData {
            kind,
            body: ChartBody::Histogram(HistogramChart {
                bins: edges,
                series,
                mode: BarMode::Stacked,
                x_label: "Model year",
                y_label: "Count",
            }),
            summary: None,
        })
    }

    /// Overlaid price histograms of two manufacturers on shared bins.
    ///
    /// With `normalize` each series is expressed as a percentage of its own
    /// listings. The chart carries a price summary of both manufacturers.
    pub fn price_comparison(
        df: &DataFrame,
        first: &str,
        second: &str,
        bins: usize,
        normalize: bool,
    ) -> Result<ChartData, ChartError> {
        let kind = ChartKind::PriceComparison;
        let prices = DataPreparer::values_by_category(df, MANUFACTURER, PRICE)?;
        let sample = |name: &str| {
            prices
                .get(name)
                .ok_or_else(|| ChartError::UnknownManufacturer(name.to_string()))
        };
        let first_prices = sample(first)?;
        let second_prices = sample(second)?;

        let edges = BinEdges::spanning(first_prices.iter().chain(second_prices.iter()), bins)
            .ok_or(ChartError::NoData(kind.title()))?;

        let series = [(first, first_prices), (second, second_prices)]
            .into_iter()
            .map(|(name, values)| {
                let counts = StatsCalculator::histogram(values, &edges);
                Series {
                    label: name.to_string(),
                    values: if normalize {
                        StatsCalculator::normalize_percent(&counts)
                    } else {
                        counts
                    },
                }
            })
            .collect();

        debug!(
            "Price comparison {} ({}) vs {} ({}), normalize={}",
            first,
            first_prices.len(),
            second,
            second_prices.len(),
            normalize
        );

        Ok(ChartData {
            kind,
            body: ChartBody::Histogram(HistogramChart {
                bins: edges,
                series,
                mode: BarMode::Overlay,
                x_label: "Price",
                y_label: if normalize { "Percent" } else { "Count" },
            }),
            summary: Some(StatsCalculator::price_summary(
                first,
                first_prices,
                second,
                second_prices,
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn listings() -> DataFrame {
        DataFrame::new(vec![
            Column::new(MANUFACTURER.into(), vec!["ford", "ford", "ford", "bmw", "bmw"]),
            Column::new(VEHICLE_TYPE.into(), vec![Some("pickup"), Some("sedan"), Some("pickup"), Some("SUV"), None]),
            Column::new(CONDITION.into(), vec!["good", "good", "fair", "excellent", "good"]),
            Column::new(PRICE.into(), vec![10000.0, 12000.0, 4000.0, 30000.0, 26000.0]),
            Column::new(MODEL_YEAR.into(), vec![2010.0, 2012.0, 2005.0, 2015.0, 2016.0]),
            Column::new(ODOMETER.into(), vec![150000.0, 90000.0, 210000.0, 40000.0, 30000.0]),
        ])
        .unwrap()
    }

    fn histogram(chart: &ChartData) -> &HistogramChart {
        match &chart.body {
            ChartBody::Histogram(h) => h,
            other => panic!("expected histogram, got {:?}", other),
        }
    }

    #[test]
    fn odometer_histogram_counts_every_listing() {
        let chart = ChartBuilder::odometer_histogram(&listings(), 10).unwrap();
        let h = histogram(&chart);
        assert_eq!(h.series.len(), 1);
        assert_eq!(h.series[0].values.len(), 10);
        assert_eq!(h.series[0].values.iter().sum::<f64>(), 5.0);
    }

    #[test]
    fn odometer_histogram_of_empty_table_has_no_data() {
        let empty = listings().clear();
        assert!(matches!(
            ChartBuilder::odometer_histogram(&empty, 10),
            Err(ChartError::NoData(_))
        ));
    }

    #[test]
    fn scatter_pairs_year_with_price() {
        let chart = ChartBuilder::price_vs_year(&listings()).unwrap();
        match chart.body {
            ChartBody::Scatter(s) => {
                assert_eq!(s.points.len(), 5);
                assert_eq!(s.points[0], [2010.0, 10000.0]);
            }
            other => panic!("expected scatter, got {:?}", other),
        }
    }

    #[test]
    fn stacked_bar_is_sorted_and_aligned() {
        let chart = ChartBuilder::types_by_manufacturer(&listings()).unwrap();
        let ChartBody::StackedBar(bar) = chart.body else {
            panic!("expected stacked bar");
        };

        assert_eq!(bar.categories, vec!["bmw".to_string(), "ford".to_string()]);
        let labels: Vec<&str> = bar.stacks.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["SUV", "pickup", "sedan"]);
        assert_eq!(bar.stacks[0].values, vec![1.0, 0.0]);
        assert_eq!(bar.stacks[1].values, vec![0.0, 2.0]);
        assert_eq!(bar.stacks[2].values, vec![0.0, 1.0]);
    }

    #[test]
    fn condition_series_share_bins() {
        let chart = ChartBuilder::condition_by_year(&listings(), 5).unwrap();
        let h = histogram(&chart);
        let labels: Vec<&str> = h.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["excellent", "fair", "good"]);
        assert!(h.series.iter().all(|s| s.values.len() == 5));
        let total: f64 = h.series.iter().flat_map(|s| s.values.iter()).sum();
        assert_eq!(total, 5.0);
    }

    #[test]
    fn price_comparison_normalizes_each_series() {
        let chart = ChartBuilder::price_comparison(&listings(), "ford", "bmw", 4, true).unwrap();
        let h = histogram(&chart);
        assert_eq!(h.mode, BarMode::Overlay);
        for series in &h.series {
            assert!((series.values.iter().sum::<f64>() - 100.0).abs() < 1e-9);
        }

        let summary = chart.summary.unwrap();
        assert_eq!(summary.first.count, 3);
        assert_eq!(summary.first.median, 10000.0);
        assert_eq!(summary.second.count, 2);
        assert_eq!(summary.second.median, 28000.0);
    }

    #[test]
    fn price_comparison_counts_without_normalize() {
        let chart = ChartBuilder::price_comparison(&listings(), "ford", "bmw", 4, false).unwrap();
        let h = histogram(&chart);
        assert_eq!(h.series[0].values.iter().sum::<f64>(), 3.0);
        assert_eq!(h.y_label, "Count");
    }

    #[test]
    fn price_comparison_rejects_unknown_manufacturer() {
        assert!(matches!(
            ChartBuilder::price_comparison(&listings(), "ford", "tesla", 4, false),
            Err(ChartError::UnknownManufacturer(name)) if name == "tesla"
        ));
    }
}
