//! Control Panel Widget
//! Left side panel with the data source, filters, chart triggers and
//! manufacturer selectors.

use crate::dashboard::DashboardState;
use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

/// Left side control panel. Edits `state` in place; anything that needs the
/// app (dialogs, exports) comes back as a [`ControlPanelAction`].
pub struct ControlPanel {
    pub state: DashboardState,
    pub manufacturers: Vec<String>,
    pub csv_path: Option<PathBuf>,
    pub row_count: usize,
    pub small_manufacturer_threshold: usize,
    pub status: String,
}

impl ControlPanel {
    pub fn new(state: DashboardState, small_manufacturer_threshold: usize) -> Self {
        Self {
            state,
            manufacturers: Vec::new(),
            csv_path: None,
            row_count: 0,
            small_manufacturer_threshold,
            status: "Ready".to_string(),
        }
    }

    /// Replace the selectable manufacturers, keeping selections that are
    /// still present and falling back to the first two otherwise.
    pub fn update_manufacturers(&mut self, manufacturers: Vec<String>) {
        let keep = |selected: &Option<String>| {
            selected
                .as_ref()
                .filter(|name| manufacturers.contains(name))
                .cloned()
        };
        let a = keep(&self.state.manufacturer_a).or_else(|| manufacturers.first().cloned());
        let b = keep(&self.state.manufacturer_b)
            .or_else(|| manufacturers.get(1).cloned())
            .or_else(|| a.clone());

        self.state.manufacturer_a = a;
        self.state.manufacturer_b = b;
        self.manufacturers = manufacturers;
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🚗 Car Listings")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Used-car ads in the US")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== CSV File Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file loaded".to_string());

                    ui.label(RichText::new(&path_text).size(12.0));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Open").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
                ui.label(
                    RichText::new(format!("{} listings", self.row_count))
                        .size(11.0)
                        .color(Color32::GRAY),
                );
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filter Section =====
        ui.label(RichText::new("⚙️ Filters").size(14.0).strong());
        ui.add_space(5.0);
        ui.checkbox(
            &mut self.state.include_small_mfrs,
            format!(
                "Include manufacturers with fewer than {} ads",
                self.small_manufacturer_threshold
            ),
        );

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Chart Triggers =====
        ui.label(RichText::new("📊 Charts").size(14.0).strong());
        ui.add_space(5.0);
        ui.horizontal(|ui| {
            if ui.button("Build histogram").clicked() {
                self.state.trigger_histogram();
            }
            if ui.button("Build scatter plot").clicked() {
                self.state.trigger_scatter();
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Manufacturer Comparison =====
        ui.label(RichText::new("🔧 Compare Prices").size(14.0).strong());
        ui.add_space(8.0);

        let label_width = 110.0;
        let combo_width = 150.0;
        let manufacturers = &self.manufacturers;

        for (salt, label, selected) in [
            ("manufacturer_a", "Manufacturer 1:", &mut self.state.manufacturer_a),
            ("manufacturer_b", "Manufacturer 2:", &mut self.state.manufacturer_b),
        ] {
            ui.horizontal(|ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new(label));
                ComboBox::from_id_salt(salt)
                    .width(combo_width)
                    .selected_text(selected.clone().unwrap_or_default())
                    .show_ui(ui, |ui| {
                        for name in manufacturers {
                            if ui
                                .selectable_label(selected.as_ref() == Some(name), name)
                                .clicked()
                            {
                                *selected = Some(name.clone());
                            }
                        }
                    });
            });
            ui.add_space(5.0);
        }

        ui.checkbox(&mut self.state.normalize, "Normalize histogram");

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                .min_size(egui::vec2(150.0, 30.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::ExportCharts;
            }
        });

        ui.add_space(10.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    ExportCharts,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn selections_default_to_first_two() {
        let mut panel = ControlPanel::new(DashboardState::default(), 1000);
        panel.update_manufacturers(names(&["bmw", "ford", "toyota"]));
        assert_eq!(panel.state.manufacturer_a.as_deref(), Some("bmw"));
        assert_eq!(panel.state.manufacturer_b.as_deref(), Some("ford"));
    }

    #[test]
    fn vanished_selection_is_replaced() {
        let mut panel = ControlPanel::new(DashboardState::default(), 1000);
        panel.state.manufacturer_a = Some("toyota".into());
        panel.state.manufacturer_b = Some("bmw".into());

        panel.update_manufacturers(names(&["ford", "toyota"]));
        assert_eq!(panel.state.manufacturer_a.as_deref(), Some("toyota"));
        assert_eq!(panel.state.manufacturer_b.as_deref(), Some("toyota"));

        panel.update_manufacturers(Vec::new());
        assert_eq!(panel.state.manufacturer_a, None);
        assert_eq!(panel.state.manufacturer_b, None);
    }
}
