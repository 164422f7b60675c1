//! Data Viewer Widget
//! Collapsible table of the listings the charts are drawn from.

use crate::data::VehicleListing;
use egui::{RichText, ScrollArea};

/// Rows shown in the table; the charts always use every visible row.
pub const PREVIEW_ROWS: usize = 500;

#[derive(Default)]
pub struct DataViewer {
    pub rows: Vec<VehicleListing>,
    pub total_rows: usize,
}

impl DataViewer {
    pub fn set_rows(&mut self, rows: Vec<VehicleListing>, total_rows: usize) {
        self.rows = rows;
        self.total_rows = total_rows;
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new(RichText::new("📋 Data viewer").size(14.0).strong())
            .default_open(false)
            .show(ui, |ui| {
                ui.label(format!(
                    "Showing {} of {} listings",
                    self.rows.len(),
                    self.total_rows
                ));

                ScrollArea::both()
                    .id_salt("data_viewer")
                    .max_height(260.0)
                    .show(ui, |ui| {
                        egui::Grid::new("listings_grid")
                            .striped(true)
                            .min_col_width(60.0)
                            .show(ui, |ui| {
                                for header in [
                                    "price",
                                    "model_year",
                                    "odometer",
                                    "model",
                                    "manufacturer",
                                    "condition",
                                    "type",
                                ] {
                                    ui.label(RichText::new(header).strong());
                                }
                                ui.end_row();

                                for row in &self.rows {
                                    ui.label(row.price.map(|p| format!("{:.0}", p)).unwrap_or_default());
                                    ui.label(format!("{:.0}", row.model_year));
                                    ui.label(format!("{:.0}", row.odometer));
                                    ui.label(row.model.as_deref().unwrap_or(""));
                                    ui.label(row.manufacturer.as_deref().unwrap_or(""));
                                    ui.label(row.condition.as_deref().unwrap_or(""));
                                    ui.label(row.vehicle_type.as_deref().unwrap_or(""));
                                    ui.end_row();
                                }
                            });
                    });
            });
    }
}
