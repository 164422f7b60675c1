//! Car Listings Dashboard Main Application
//! Main window with control panel, data viewer and chart viewer.

use crate::charts::StaticChartRenderer;
use crate::config::DashboardConfig;
use crate::dashboard::{Dashboard, DashboardState};
use crate::data::{DataPreparer, ListingTable};
use crate::gui::data_viewer::PREVIEW_ROWS;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, DataViewer};
use egui::SidePanel;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;

/// CSV loading result from background thread
enum LoadResult {
    Complete(Dashboard, PathBuf),
    Error(String),
}

/// `None` while the loader is still running. A loader that went away
/// without sending (e.g. it panicked) counts as a failed load.
fn poll_load(rx: &Receiver<LoadResult>) -> Option<LoadResult> {
    match rx.try_recv() {
        Ok(result) => Some(result),
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Disconnected) => Some(LoadResult::Error(
            "CSV loading stopped unexpectedly".to_string(),
        )),
    }
}

/// Main application window.
pub struct DashboardApp {
    dashboard: Dashboard,
    config: DashboardConfig,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    data_viewer: DataViewer,

    /// State the current charts were built for; `None` forces a rebuild.
    built_for: Option<DashboardState>,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        dashboard: Dashboard,
        config: DashboardConfig,
        state: DashboardState,
    ) -> Self {
        let mut control_panel = ControlPanel::new(state, config.small_manufacturer_threshold);
        control_panel.csv_path = Some(config.csv_path.clone());
        control_panel.row_count = dashboard.listings().height();

        Self {
            dashboard,
            config,
            control_panel,
            chart_viewer: ChartViewer::new(),
            data_viewer: DataViewer::default(),
            built_for: None,
            load_rx: None,
            is_loading: false,
        }
    }

    /// Rebuild charts and the data preview when the widget state changed.
    fn refresh(&mut self) {
        if self.built_for.as_ref() == Some(&self.control_panel.state) {
            return;
        }

        let visible = match self.dashboard.visible_listings(&self.control_panel.state) {
            Ok(visible) => visible,
            Err(e) => {
                self.fail(&format!("Error: {}", e));
                return;
            }
        };

        match DataPreparer::manufacturers(&visible) {
            Ok(names) => self.control_panel.update_manufacturers(names),
            Err(e) => {
                self.fail(&format!("Error: {}", e));
                return;
            }
        }

        match ListingTable::rows(&visible, PREVIEW_ROWS) {
            Ok(rows) => self.data_viewer.set_rows(rows, visible.height()),
            Err(e) => warn!("Data preview unavailable: {}", e),
        }

        let state = self.control_panel.state.clone();
        match self.dashboard.build_charts(&state) {
            Ok(charts) => {
                let status = format!("{} charts from {} listings", charts.len(), visible.height());
                self.chart_viewer.set_charts(charts);
                self.control_panel.set_status(&status);
            }
            Err(e) => {
                self.chart_viewer.clear();
                self.fail(&format!("Error: {}", e));
            }
        }
        self.built_for = Some(state);
    }

    fn fail(&mut self, status: &str) {
        warn!("{}", status);
        self.control_panel.set_status(status);
        self.built_for = Some(self.control_panel.state.clone());
    }

    /// Open another CSV; it is prepared off the UI thread.
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return; // Already loading
        }

        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        else {
            return;
        };

        self.control_panel.set_status("Loading CSV file...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        let config = DashboardConfig {
            csv_path: path.clone(),
            ..self.config.clone()
        };

        thread::spawn(move || {
            let result = match Dashboard::open(&config) {
                Ok(dashboard) => LoadResult::Complete(dashboard, path),
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match poll_load(&rx) {
            None => self.load_rx = Some(rx),
            Some(LoadResult::Complete(dashboard, path)) => {
                info!("Switched to {}", path.display());
                self.control_panel.row_count = dashboard.listings().height();
                self.control_panel.csv_path = Some(path.clone());
                self.config.csv_path = path;
                self.dashboard = dashboard;
                self.built_for = None;
                self.is_loading = false;
            }
            Some(LoadResult::Error(error)) => {
                warn!("CSV load failed: {}", error);
                self.control_panel.set_status(&format!("Error: {}", error));
                self.is_loading = false;
            }
        }
    }

    /// Write the current charts as PNG files into a chosen folder.
    fn handle_export_charts(&mut self) {
        if self.chart_viewer.charts.is_empty() {
            self.control_panel.set_status("No charts to export");
            return;
        }

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        match StaticChartRenderer::export_all(
            &self.chart_viewer.charts,
            &dir,
            self.config.export_width,
            self.config.export_height,
        ) {
            Ok(written) => self
                .control_panel
                .set_status(&format!("Exported {} charts to {}", written.len(), dir.display())),
            Err(e) => {
                warn!("Export failed: {}", e);
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();
        self.refresh();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::ExportCharts => self.handle_export_charts(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - data preview above the charts
        egui::CentralPanel::default().show(ctx, |ui| {
            self.data_viewer.show(ui);
            ui.add_space(10.0);
            self.chart_viewer.show(ui);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_load_keeps_waiting() {
        let (_tx, rx) = channel::<LoadResult>();
        assert!(poll_load(&rx).is_none());
    }

    #[test]
    fn vanished_loader_is_a_failed_load() {
        let (tx, rx) = channel::<LoadResult>();
        drop(tx);

        assert!(matches!(poll_load(&rx), Some(LoadResult::Error(_))));
    }

    #[test]
    fn load_error_is_passed_through() {
        let (tx, rx) = channel();
        tx.send(LoadResult::Error("bad csv".to_string())).unwrap();
        assert!(matches!(poll_load(&rx), Some(LoadResult::Error(e)) if e == "bad csv"));
    }
}
