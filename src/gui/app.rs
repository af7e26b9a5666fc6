//! Arrears Dashboard Main Application
//! Main window with control panel and the dashboard for the working view.

use crate::charts::{StaticChartRenderer, WordFrequencies};
use crate::config::DashboardConfig;
use crate::data::{export, DataLoader, EnrichedDataset, Enricher, WorkingView};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, TableView};
use crate::stats::Aggregator;
use anyhow::Context;
use egui::SidePanel;
use std::path::Path;

/// Main application window. Holds the dataset of the current session only.
pub struct ArrearsApp {
    config: DashboardConfig,
    loader: DataLoader,
    dataset: Option<EnrichedDataset>,
    view: Option<WorkingView>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    table: TableView,
}

impl ArrearsApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        Self::with_config(config)
    }

    fn with_config(config: DashboardConfig) -> Self {
        Self {
            chart_viewer: ChartViewer::new(&config.currency),
            config,
            loader: DataLoader::new(),
            dataset: None,
            view: None,
            control_panel: ControlPanel::new(),
            table: TableView::default(),
        }
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.control_panel.csv_path = Some(path.clone());
            self.load_dataset(&path);
        }
    }

    /// Load and enrich a new upload. A failure discards the previous dataset so
    /// nothing half-enriched is ever shown.
    fn load_dataset(&mut self, path: &Path) {
        let result = self
            .loader
            .load_csv(path)
            .context("could not read the uploaded CSV")
            .and_then(|df| Enricher::enrich(df).context("could not process the uploaded CSV"));

        match result {
            Ok(dataset) => {
                if dataset.is_empty() {
                    log::warn!("Uploaded CSV has a header but no student rows");
                }
                self.control_panel.update_options(dataset.options.clone());
                self.control_panel.set_status(&format!(
                    "Loaded {} students from {}",
                    dataset.len(),
                    self.loader
                        .get_file_path()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default()
                ));
                self.dataset = Some(dataset);
                self.recompute();
            }
            Err(e) => {
                log::error!("{:#}", e);
                self.dataset = None;
                self.view = None;
                self.chart_viewer.clear();
                self.table = TableView::default();
                self.control_panel.clear_data();
                self.control_panel.set_error(&format!("Error: {:#}", e));
            }
        }
    }

    /// Filter -> aggregate -> presenter caches, from scratch.
    fn recompute(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };

        let view = match dataset.filter(&self.control_panel.selection) {
            Ok(view) => view,
            Err(e) => {
                self.view = None;
                self.chart_viewer.clear();
                self.table = TableView::default();
                self.control_panel.set_error(&format!("Error: {}", e));
                return;
            }
        };

        let summary = Aggregator::summarize(&view.rows);
        let words = WordFrequencies::from_text(&view.fine_text(), self.config.word_cloud_max_words);
        self.chart_viewer.set_view(summary, words);

        self.table = match view.sorted_by_arrears() {
            Ok(sorted) => TableView::from_dataframe(&sorted, self.config.table_row_limit),
            Err(e) => {
                log::warn!("Could not sort table: {}", e);
                TableView::from_dataframe(&view.df, self.config.table_row_limit)
            }
        };

        log::debug!(
            "Working view: {} of {} rows",
            view.len(),
            dataset.len()
        );
        self.view = Some(view);
    }

    /// Handle filtered CSV download
    fn handle_download_csv(&mut self) {
        let Some(view) = &self.view else {
            self.control_panel.set_error("No data to export");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter(format!("CSV ({})", export::EXPORT_MIME), &["csv"])
            .set_file_name(&self.config.export_file_name)
            .save_file()
        else {
            return; // User cancelled
        };

        if view.is_empty() {
            log::warn!("Exporting an empty selection, only the header is written");
        }

        match export::write_csv(view, &path) {
            Ok(()) => self.control_panel.set_status(&format!(
                "Exported {} rows to {}",
                view.len(),
                path.display()
            )),
            Err(e) => self.control_panel.set_error(&format!("Error: {}", e)),
        }
    }

    /// Handle chart PNG export, then open it with the system viewer
    fn handle_export_charts(&mut self) {
        let default_name = Path::new(&self.config.export_file_name)
            .with_extension("png")
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "arrears_charts.png".to_string());

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name(default_name)
            .save_file()
        else {
            return;
        };

        match self.export_charts(&path) {
            Ok(()) => self
                .control_panel
                .set_status(&format!("Charts saved to {}", path.display())),
            Err(e) => self.control_panel.set_error(&format!("Error: {:#}", e)),
        }
    }

    fn export_charts(&self, path: &Path) -> anyhow::Result<()> {
        StaticChartRenderer::render_png(
            &self.chart_viewer.chart_data,
            path,
            self.config.chart_image_width,
            self.config.chart_image_height,
        )?;
        open::that(path).with_context(|| format!("could not open {}", path.display()))?;
        Ok(())
    }
}

impl eframe::App for ArrearsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::FiltersChanged => self.recompute(),
                        ControlPanelAction::DownloadCsv => self.handle_download_csv(),
                        ControlPanelAction::ExportCharts => self.handle_export_charts(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.dataset.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        egui::RichText::new("Upload your arrears CSV file to begin.").size(20.0),
                    );
                });
                return;
            }

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    self.chart_viewer.show_kpis(ui);
                    ui.add_space(10.0);
                    ui.separator();
                    self.chart_viewer.show_charts(ui);
                    ui.add_space(15.0);
                    self.chart_viewer.show_word_cloud(ui);
                    ui.add_space(15.0);
                    self.table.show(ui);
                });
        });
    }
}
