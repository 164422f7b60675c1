//! Static Chart Renderer
//! Writes chart inputs to PNG files with plotters.
//!
//! Layout per image:
//! 1. Caption with the chart title
//! 2. Plot area with mesh, axis labels and a legend for multi-series charts
//! 3. For the price comparison, a one-line price summary of both manufacturers

use crate::charts::{
    BarMode, ChartBody, ChartData, HistogramChart, ScatterChart, StackedBarChart,
};
use crate::stats::{GroupStats, PriceSummary};
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create export directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("Plotting failed: {0}")]
    Plot(String),
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

// Same palette as the interactive charts
const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),
    RGBColor(231, 76, 60),
    RGBColor(46, 204, 113),
    RGBColor(155, 89, 182),
    RGBColor(243, 156, 18),
    RGBColor(26, 188, 156),
    RGBColor(233, 30, 99),
    RGBColor(0, 188, 212),
    RGBColor(121, 85, 72),
    RGBColor(96, 125, 139),
];

const SUMMARY_HEIGHT: u32 = 40;

fn plot_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Plot(e.to_string())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render every chart to `dir/<file_stem>.png`, creating `dir` if needed.
    pub fn export_all(
        charts: &[ChartData],
        dir: &Path,
        width: u32,
        height: u32,
    ) -> Result<Vec<PathBuf>, RenderError> {
        fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(charts.len());
        for chart in charts {
            let path = dir.join(format!("{}.png", chart.kind.file_stem()));
            Self::render_png(chart, &path, width, height)?;
            info!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }

    /// Render one chart to a PNG file.
    pub fn render_png(chart: &ChartData, path: &Path, width: u32, height: u32) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;

        let plot_area = match &chart.summary {
            Some(summary) => {
                let (upper, lower) = root.split_vertically(height.saturating_sub(SUMMARY_HEIGHT));
                Self::draw_summary(&lower, summary)?;
                upper
            }
            None => root.clone(),
        };

        match &chart.body {
            ChartBody::Histogram(h) => Self::draw_histogram(&plot_area, chart.title(), h)?,
            ChartBody::Scatter(s) => Self::draw_scatter(&plot_area, chart.title(), s)?,
            ChartBody::StackedBar(b) => Self::draw_stacked_bar(&plot_area, chart.title(), b)?,
        }

        root.present().map_err(plot_err)
    }

    fn draw_histogram(area: &Area, title: &str, chart: &HistogramChart) -> Result<(), RenderError> {
        let bins = chart.bins;
        let y_max = Self::histogram_top(chart);

        let mut ctx = ChartBuilder::on(area)
            .caption(title, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(bins.start..bins.end(), 0f64..y_max * 1.1)
            .map_err(plot_err)?;

        ctx.configure_mesh()
            .x_desc(chart.x_label)
            .y_desc(chart.y_label)
            .draw()
            .map_err(plot_err)?;

        let mut base = vec![0.0; bins.count];
        for (i, series) in chart.series.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            let style = match chart.mode {
                BarMode::Stacked => color.filled(),
                BarMode::Overlay => color.mix(0.5).filled(),
            };

            let rects: Vec<Rectangle<(f64, f64)>> = series
                .values
                .iter()
                .enumerate()
                .map(|(b, &v)| {
                    let bottom = if chart.mode == BarMode::Stacked { base[b] } else { 0.0 };
                    Rectangle::new([(bins.left(b), bottom), (bins.left(b + 1), bottom + v)], style)
                })
                .collect();

            if chart.mode == BarMode::Stacked {
                for (b, &v) in series.values.iter().enumerate() {
                    base[b] += v;
                }
            }

            ctx.draw_series(rects)
                .map_err(plot_err)?
                .label(series.label.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], style));
        }

        if chart.series.len() > 1 {
            ctx.configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(plot_err)?;
        }
        Ok(())
    }

    fn draw_scatter(area: &Area, title: &str, chart: &ScatterChart) -> Result<(), RenderError> {
        let (x_range, y_range) = Self::scatter_ranges(&chart.points);

        let mut ctx = ChartBuilder::on(area)
            .caption(title, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_range)
            .map_err(plot_err)?;

        ctx.configure_mesh()
            .x_desc(chart.x_label)
            .y_desc(chart.y_label)
            .draw()
            .map_err(plot_err)?;

        let style = PALETTE[0].mix(0.4).filled();
        ctx.draw_series(chart.points.iter().map(|&[x, y]| Circle::new((x, y), 2, style)))
            .map_err(plot_err)?;
        Ok(())
    }

    fn draw_stacked_bar(area: &Area, title: &str, chart: &StackedBarChart) -> Result<(), RenderError> {
        let n = chart.categories.len().max(1);
        let totals: Vec<f64> = (0..chart.categories.len())
            .map(|c| chart.stacks.iter().map(|s| s.values[c]).sum::<f64>())
            .collect();
        let y_max = totals.iter().copied().fold(1.0, f64::max);

        let mut ctx = ChartBuilder::on(area)
            .caption(title, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(60)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..n as f64 - 0.5, 0f64..y_max * 1.1)
            .map_err(plot_err)?;

        let categories = &chart.categories;
        let label_category = |x: &f64| {
            let idx = x.round();
            if idx >= 0.0 && (idx - x).abs() < 1e-6 {
                categories.get(idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        };
        ctx.configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&label_category)
            .x_desc(chart.x_label)
            .y_desc(chart.y_label)
            .draw()
            .map_err(plot_err)?;

        let mut base = vec![0.0; chart.categories.len()];
        for (i, stack) in chart.stacks.iter().enumerate() {
            let style = PALETTE[i % PALETTE.len()].filled();
            let rects: Vec<Rectangle<(f64, f64)>> = stack
                .values
                .iter()
                .enumerate()
                .map(|(c, &v)| {
                    let x = c as f64;
                    Rectangle::new([(x - 0.35, base[c]), (x + 0.35, base[c] + v)], style)
                })
                .collect();
            for (c, &v) in stack.values.iter().enumerate() {
                base[c] += v;
            }

            ctx.draw_series(rects)
                .map_err(plot_err)?
                .label(stack.label.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], style));
        }

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(plot_err)?;
        Ok(())
    }

    fn draw_summary(area: &Area, summary: &PriceSummary) -> Result<(), RenderError> {
        let describe = |s: &GroupStats| {
            format!(
                "{}: n={} median={:.0} mean={:.0} range={:.0}-{:.0}",
                s.group_name, s.count, s.median, s.mean, s.min, s.max
            )
        };
        let line = format!("{}   |   {}", describe(&summary.first), describe(&summary.second));

        area.draw(&Text::new(line, (20, 10), ("sans-serif", 16).into_font().color(&BLACK)))
            .map_err(plot_err)
    }

    /// Highest bar of the histogram, counting stacked series on top of each other.
    fn histogram_top(chart: &HistogramChart) -> f64 {
        let top = match chart.mode {
            BarMode::Stacked => (0..chart.bins.count)
                .map(|b| chart.series.iter().map(|s| s.values[b]).sum::<f64>())
                .fold(0.0, f64::max),
            BarMode::Overlay => chart
                .series
                .iter()
                .flat_map(|s| s.values.iter().copied())
                .fold(0.0, f64::max),
        };
        if top > 0.0 {
            top
        } else {
            1.0
        }
    }

    /// Padded axis ranges around the points; unit ranges when there are none.
    fn scatter_ranges(points: &[[f64; 2]]) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
        let span = |axis: usize| {
            let (min, max) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p[axis]), hi.max(p[axis]))
            });
            if min > max {
                return 0.0..1.0;
            }
            let pad = ((max - min) * 0.05).max(0.5);
            (min - pad)..(max + pad)
        };
        (span(0), span(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::Series;
    use crate::stats::BinEdges;

    fn histogram(mode: BarMode) -> HistogramChart {
        HistogramChart {
            bins: BinEdges { start: 0.0, width: 1.0, count: 2 },
            series: vec![
                Series { label: "a".into(), values: vec![1.0, 4.0] },
                Series { label: "b".into(), values: vec![3.0, 2.0] },
            ],
            mode,
            x_label: "x",
            y_label: "y",
        }
    }

    #[test]
    fn stacked_top_adds_series() {
        assert_eq!(StaticChartRenderer::histogram_top(&histogram(BarMode::Stacked)), 6.0);
        assert_eq!(StaticChartRenderer::histogram_top(&histogram(BarMode::Overlay)), 4.0);
    }

    #[test]
    fn scatter_ranges_pad_the_points() {
        let (x, y) = StaticChartRenderer::scatter_ranges(&[[2000.0, 100.0], [2020.0, 300.0]]);
        assert_eq!(x, 1999.0..2021.0);
        assert_eq!(y, 90.0..310.0);

        let (x, _) = StaticChartRenderer::scatter_ranges(&[]);
        assert_eq!(x, 0.0..1.0);
    }
}
