//! Chart Plotter Module
//! Draws chart inputs interactively using egui_plot.

use crate::charts::{
    BarMode, ChartBody, ChartData, HistogramChart, ScatterChart, StackedBarChart,
};
use crate::stats::{GroupStats, PriceSummary};
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoints, Points};

/// Color palette for series
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(121, 85, 72),   // Brown
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

/// Creates interactive charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Get color for the series at `index`.
    pub fn get_series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Draw any chart, followed by its price summary if it has one.
    pub fn draw_chart(ui: &mut egui::Ui, chart: &ChartData, height: f32) {
        let id = chart.kind.file_stem();
        match &chart.body {
            ChartBody::Histogram(h) => Self::draw_histogram(ui, id, h, height),
            ChartBody::Scatter(s) => Self::draw_scatter(ui, id, s, height),
            ChartBody::StackedBar(b) => Self::draw_stacked_bar(ui, id, b, height),
        }

        if let Some(summary) = &chart.summary {
            ui.add_space(8.0);
            Self::draw_summary_table(ui, id, summary);
        }
    }

    /// Histogram bars; several series are stacked or overlaid per `mode`.
    pub fn draw_histogram(ui: &mut egui::Ui, id: &str, chart: &HistogramChart, height: f32) {
        let bins = chart.bins;
        let mut bar_charts: Vec<BarChart> = Vec::new();

        for (i, series) in chart.series.iter().enumerate() {
            let color = Self::get_series_color(i);
            let bars: Vec<Bar> = series
                .values
                .iter()
                .enumerate()
                .map(|(b, &v)| Bar::new(bins.center(b), v).width(bins.width))
                .collect();

            let mut bar_chart = BarChart::new(bars).name(&series.label);
            bar_chart = match chart.mode {
                BarMode::Stacked => {
                    let below: Vec<&BarChart> = bar_charts.iter().collect();
                    bar_chart.color(color).stack_on(&below)
                }
                // Translucent so both distributions stay visible
                BarMode::Overlay => bar_chart.color(color.gamma_multiply(0.5)),
            };
            bar_charts.push(bar_chart);
        }

        Plot::new(format!("histogram_{}", id))
            .height(height)
            .legend(Legend::default())
            .x_axis_label(chart.x_label)
            .y_axis_label(chart.y_label)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                for bar_chart in bar_charts {
                    plot_ui.bar_chart(bar_chart);
                }
            });
    }

    pub fn draw_scatter(ui: &mut egui::Ui, id: &str, chart: &ScatterChart, height: f32) {
        let color = Self::get_series_color(0);

        Plot::new(format!("scatter_{}", id))
            .height(height)
            .x_axis_label(chart.x_label)
            .y_axis_label(chart.y_label)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(chart.points.iter().copied()))
                        .radius(2.0)
                        .color(color.gamma_multiply(0.6)),
                );
            });
    }

    /// Bars per category, one stacked segment per series.
    /// X-axis: categories by index, labelled by name.
    pub fn draw_stacked_bar(ui: &mut egui::Ui, id: &str, chart: &StackedBarChart, height: f32) {
        let mut bar_charts: Vec<BarChart> = Vec::new();

        for (i, stack) in chart.stacks.iter().enumerate() {
            let bars: Vec<Bar> = stack
                .values
                .iter()
                .enumerate()
                .map(|(c, &v)| Bar::new(c as f64, v).width(0.7))
                .collect();

            let below: Vec<&BarChart> = bar_charts.iter().collect();
            let bar_chart = BarChart::new(bars)
                .name(&stack.label)
                .color(Self::get_series_color(i))
                .stack_on(&below);
            bar_charts.push(bar_chart);
        }

        let x_labels = chart.categories.clone();

        Plot::new(format!("stacked_{}", id))
            .height(height)
            .legend(Legend::default())
            .x_axis_label(chart.x_label)
            .y_axis_label(chart.y_label)
            .allow_scroll(false)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx - mark.value).abs() < 1e-6 {
                    x_labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for bar_chart in bar_charts {
                    plot_ui.bar_chart(bar_chart);
                }
            });
    }

    /// Price summary of both manufacturers under the overlay chart.
    pub fn draw_summary_table(ui: &mut egui::Ui, id: &str, summary: &PriceSummary) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id(format!("summary_table_{}", id)))
                    .striped(true)
                    .min_col_width(55.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for header in ["Manufacturer", "Listings", "Mean", "Median", "Std", "Min", "Max"] {
                            ui.label(RichText::new(header).strong().size(11.0));
                        }
                        ui.end_row();

                        for (i, stats) in [&summary.first, &summary.second].into_iter().enumerate() {
                            Self::stats_row(ui, stats, Self::get_series_color(i));
                            ui.end_row();
                        }
                    });
            });
    }

    fn stats_row(ui: &mut egui::Ui, stats: &GroupStats, color: Color32) {
        ui.label(RichText::new(&stats.group_name).size(11.0).color(color));
        ui.label(RichText::new(stats.count.to_string()).size(11.0));
        for value in [stats.mean, stats.median, stats.std, stats.min, stats.max] {
            ui.label(RichText::new(format!("{:.0}", value)).size(11.0));
        }
    }
}
