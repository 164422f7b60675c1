//! Dashboard session: the prepared listings plus the widget state that
//! selects and filters what gets charted.

use crate::charts::{ChartBuilder, ChartData, ChartError};
use crate::config::DashboardConfig;
use crate::data::{DataPreparer, PreparerError};
use log::{debug, info};
use polars::prelude::DataFrame;

/// State of the dashboard widgets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    /// Keep manufacturers below the listing threshold.
    pub include_small_mfrs: bool,
    /// Show the price comparison as percentages instead of counts.
    pub normalize: bool,
    pub manufacturer_a: Option<String>,
    pub manufacturer_b: Option<String>,
    pub show_histogram: bool,
    pub show_scatter: bool,
}

impl DashboardState {
    /// Histogram button: the histogram replaces whatever was triggered before.
    pub fn trigger_histogram(&mut self) {
        self.show_histogram = true;
        self.show_scatter = false;
    }

    /// Scatter button: the scatter replaces whatever was triggered before.
    pub fn trigger_scatter(&mut self) {
        self.show_scatter = true;
        self.show_histogram = false;
    }
}

/// One session's prepared listings. Built once, then only read.
pub struct Dashboard {
    listings: DataFrame,
    manufacturers: Vec<String>,
    small_manufacturer_threshold: usize,
    histogram_bins: usize,
}

impl Dashboard {
    /// Load and prepare the CSV named in `config`.
    pub fn open(config: &DashboardConfig) -> Result<Self, PreparerError> {
        let listings = DataPreparer::prepare(&config.csv_path)?;
        Self::new(listings, config)
    }

    /// Wrap an already prepared table.
    pub fn new(listings: DataFrame, config: &DashboardConfig) -> Result<Self, PreparerError> {
        let manufacturers = DataPreparer::manufacturers(&listings)?;
        info!(
            "Dashboard ready: {} listings, {} manufacturers",
            listings.height(),
            manufacturers.len()
        );

        Ok(Self {
            listings,
            manufacturers,
            small_manufacturer_threshold: config.small_manufacturer_threshold,
            histogram_bins: config.histogram_bins,
        })
    }

    pub fn listings(&self) -> &DataFrame {
        &self.listings
    }

    /// Every manufacturer in the prepared table, sorted.
    pub fn manufacturers(&self) -> &[String] {
        &self.manufacturers
    }

    /// Manufacturers the selectors may offer under `state`, sorted.
    pub fn selectable_manufacturers(&self, state: &DashboardState) -> Result<Vec<String>, PreparerError> {
        if state.include_small_mfrs {
            return Ok(self.manufacturers.clone());
        }
        DataPreparer::manufacturers(&self.visible_listings(state)?)
    }

    /// First two selectable manufacturers, the starting point of both selectors.
    pub fn default_selection(
        &self,
        state: &DashboardState,
    ) -> Result<(Option<String>, Option<String>), PreparerError> {
        let mut names = self.selectable_manufacturers(state)?.into_iter();
        let first = names.next();
        let second = names.next().or_else(|| first.clone());
        Ok((first, second))
    }

    /// Rows the charts are drawn from under `state`.
    pub fn visible_listings(&self, state: &DashboardState) -> Result<DataFrame, PreparerError> {
        if state.include_small_mfrs {
            Ok(self.listings.clone())
        } else {
            DataPreparer::exclude_small_manufacturers(&self.listings, self.small_manufacturer_threshold)
        }
    }

    /// Build every chart `state` asks for.
    ///
    /// Histogram and scatter only appear once triggered; the comparison
    /// needs both selectors set. A chart with nothing to plot is skipped.
    pub fn build_charts(&self, state: &DashboardState) -> Result<Vec<ChartData>, ChartError> {
        let visible = self.visible_listings(state)?;
        let bins = self.histogram_bins;
        let mut charts = Vec::new();

        if state.show_histogram {
            Self::push_chart(&mut charts, ChartBuilder::odometer_histogram(&visible, bins))?;
        }
        if state.show_scatter {
            Self::push_chart(&mut charts, ChartBuilder::price_vs_year(&visible))?;
        }
        Self::push_chart(&mut charts, ChartBuilder::types_by_manufacturer(&visible))?;
        Self::push_chart(&mut charts, ChartBuilder::condition_by_year(&visible, bins))?;

        if let (Some(a), Some(b)) = (&state.manufacturer_a, &state.manufacturer_b) {
            Self::push_chart(
                &mut charts,
                ChartBuilder::price_comparison(&visible, a, b, bins, state.normalize),
            )?;
        }

        debug!("Built {} charts from {} rows", charts.len(), visible.height());
        Ok(charts)
    }

    fn push_chart(
        charts: &mut Vec<ChartData>,
        chart: Result<ChartData, ChartError>,
    ) -> Result<(), ChartError> {
        match chart {
            Ok(chart) => charts.push(chart),
            Err(ChartError::NoData(title)) => debug!("Skipping '{}': no data", title),
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartKind;
    use crate::data::loader::tests::write_fixture;
    use crate::data::{MANUFACTURER, PRICE};
    use std::fs;

    /// A CSV with 2000 ford rows and 2 bmw rows, some fields missing.
    fn two_manufacturer_csv() -> String {
        let mut csv = String::from("price,model_year,odometer,model,condition,type\n");
        for i in 0..2000 {
            let year = if i % 10 == 0 { String::new() } else { (2000 + i % 15).to_string() };
            let odometer = if i % 7 == 0 { String::new() } else { (50000 + i * 10).to_string() };
            csv.push_str(&format!("{},{},{},ford f-150,good,pickup\n", 5000 + i, year, odometer));
        }
        csv.push_str("30000,2018,20000,BMW x5,excellent,SUV\n");
        csv.push_str("28000,,,bmw 328i,good,sedan\n");
        csv
    }

    fn open_fixture() -> (Dashboard, std::path::PathBuf) {
        let path = write_fixture(&two_manufacturer_csv());
        let config = DashboardConfig {
            csv_path: path.clone(),
            ..DashboardConfig::default()
        };
        (Dashboard::open(&config).unwrap(), path)
    }

    #[test]
    fn excluding_small_manufacturers_drops_exactly_their_rows() {
        let (dashboard, path) = open_fixture();
        assert_eq!(dashboard.listings().height(), 2002);
        assert_eq!(dashboard.manufacturers(), &["bmw".to_string(), "ford".to_string()]);

        let state = DashboardState::default();
        let visible = dashboard.visible_listings(&state).unwrap();
        assert_eq!(visible.height(), 2000);
        assert_eq!(DataPreparer::manufacturers(&visible).unwrap(), vec!["ford".to_string()]);

        let all = dashboard
            .visible_listings(&DashboardState {
                include_small_mfrs: true,
                ..DashboardState::default()
            })
            .unwrap();
        assert_eq!(all.height(), 2002);
        // Filtering never changes the session's table
        assert_eq!(dashboard.listings().height(), 2002);
        fs::remove_file(path).ok();
    }

    #[test]
    fn charts_follow_triggers_and_selection() {
        let (dashboard, path) = open_fixture();
        let mut state = DashboardState {
            include_small_mfrs: true,
            ..DashboardState::default()
        };
        let (a, b) = dashboard.default_selection(&state).unwrap();
        assert_eq!(a.as_deref(), Some("bmw"));
        assert_eq!(b.as_deref(), Some("ford"));
        state.manufacturer_a = a;
        state.manufacturer_b = b;

        // Hidden manufacturers are never offered
        let (a, b) = dashboard.default_selection(&DashboardState::default()).unwrap();
        assert_eq!((a.as_deref(), b.as_deref()), (Some("ford"), Some("ford")));

        let kinds = |charts: Vec<ChartData>| charts.into_iter().map(|c| c.kind).collect::<Vec<_>>();

        assert_eq!(
            kinds(dashboard.build_charts(&state).unwrap()),
            vec![
                ChartKind::TypesByManufacturer,
                ChartKind::ConditionByYear,
                ChartKind::PriceComparison
            ]
        );

        state.trigger_histogram();
        state.trigger_scatter();
        let built = kinds(dashboard.build_charts(&state).unwrap());
        assert!(built.contains(&ChartKind::PriceVsYear));
        assert!(!built.contains(&ChartKind::OdometerHistogram));
        fs::remove_file(path).ok();
    }

    #[test]
    fn comparison_with_filtered_out_manufacturer_fails() {
        let (dashboard, path) = open_fixture();
        let state = DashboardState {
            include_small_mfrs: false,
            manufacturer_a: Some("bmw".to_string()),
            manufacturer_b: Some("ford".to_string()),
            ..DashboardState::default()
        };

        assert!(matches!(
            dashboard.build_charts(&state),
            Err(ChartError::UnknownManufacturer(name)) if name == "bmw"
        ));
        fs::remove_file(path).ok();
    }

    #[test]
    fn new_requires_derived_manufacturer() {
        let df = DataFrame::new(vec![polars::prelude::Column::new(PRICE.into(), vec![1.0])]).unwrap();
        assert!(matches!(
            Dashboard::new(df, &DashboardConfig::default()),
            Err(PreparerError::ColumnMissing(name)) if name == MANUFACTURER
        ));
    }
}
