//! Chart Viewer Widget
//! Right side scrollable panel showing one card per built chart.

use crate::charts::{ChartData, ChartPlotter};
use egui::{Color32, RichText, ScrollArea};

/// Chart card configuration
const CHART_SPACING: f32 = 15.0;
const CHART_HEIGHT: f32 = 320.0;

/// Scrollable chart display area.
#[derive(Default)]
pub struct ChartViewer {
    pub charts: Vec<ChartData>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_charts(&mut self, charts: Vec<ChartData>) {
        self.charts = charts;
    }

    pub fn clear(&mut self) {
        self.charts.clear();
    }

    /// Draw every chart card in a vertical scroll area.
    pub fn show(&self, ui: &mut egui::Ui) {
        if self.charts.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        }

        ScrollArea::vertical()
            .id_salt("chart_viewer")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for chart in &self.charts {
                    Self::draw_chart_card(ui, chart);
                    ui.add_space(CHART_SPACING);
                }
            });
    }

    fn draw_chart_card(ui: &mut egui::Ui, chart: &ChartData) {
        let border_color = Color32::from_rgb(100, 149, 237);

        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(2.0, border_color))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(
                    RichText::new(chart.title())
                        .size(18.0)
                        .strong()
                        .color(border_color),
                );
                ui.add_space(8.0);
                ChartPlotter::draw_chart(ui, chart, CHART_HEIGHT);
            });
    }
}
