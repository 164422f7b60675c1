//! Charts module - chart inputs, interactive drawing and static export

mod builder;
mod plotter;
mod renderer;

pub use builder::{
    BarMode, ChartBody, ChartBuilder, ChartData, ChartError, ChartKind, HistogramChart,
    ScatterChart, Series, StackedBarChart,
};
pub use plotter::ChartPlotter;
pub use renderer::{RenderError, StaticChartRenderer};
