//! Control Panel Widget
//! Left side panel with file upload, filter checkboxes and export actions.

use crate::charts::display_label;
use crate::data::{FilterOptions, FilterSelection, RiskLevel};
use egui::{Color32, RichText, ScrollArea};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Left side control panel.
pub struct ControlPanel {
    pub csv_path: Option<PathBuf>,
    pub options: FilterOptions,
    pub selection: FilterSelection,
    pub status: String,
    pub is_error: bool,
    pub has_data: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            csv_path: None,
            options: FilterOptions::default(),
            selection: FilterSelection::default(),
            status: "Upload your arrears CSV file to begin.".to_string(),
            is_error: false,
            has_data: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset filters to "everything observed" after a new upload.
    pub fn update_options(&mut self, options: FilterOptions) {
        self.selection = options.select_all();
        self.options = options;
        self.has_data = true;
    }

    /// Forget the dataset (failed upload).
    pub fn clear_data(&mut self) {
        self.options = FilterOptions::default();
        self.selection = FilterSelection::default();
        self.has_data = false;
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
        self.is_error = false;
    }

    pub fn set_error(&mut self, error: &str) {
        self.status = error.to_string();
        self.is_error = true;
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🎓 Student Arrears")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Monitoring System")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== CSV File Section =====
        ui.label(RichText::new("📂 Arrears Dataset").size(14.0).strong());
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
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.csv_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Upload").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filter Section =====
        ui.label(RichText::new("🔎 Filter Options").size(14.0).strong());
        ui.add_space(5.0);

        ui.add_enabled_ui(self.has_data, |ui| {
            let levels = self.options.levels.clone();
            if Self::multiselect(ui, "Program Level", &levels, &mut self.selection.levels, |v| {
                display_label(v)
            }) {
                action = ControlPanelAction::FiltersChanged;
            }

            let statuses = self.options.statuses.clone();
            if Self::multiselect(
                ui,
                "Payment Status",
                &statuses,
                &mut self.selection.statuses,
                |v| display_label(v),
            ) {
                action = ControlPanelAction::FiltersChanged;
            }

            let risks = self.options.risk_levels.clone();
            if Self::multiselect(
                ui,
                "Risk Level",
                &risks,
                &mut self.selection.risk_levels,
                |v: &RiskLevel| v.to_string(),
            ) {
                action = ControlPanelAction::FiltersChanged;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.has_data, |ui| {
                let button = egui::Button::new(RichText::new("📥 Download Filtered CSV").size(15.0))
                    .min_size(egui::vec2(220.0, 32.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::DownloadCsv;
                }

                ui.add_space(8.0);

                let png_button = egui::Button::new(RichText::new("🖼 Export Chart PNG").size(14.0))
                    .min_size(egui::vec2(180.0, 30.0));
                if ui.add(png_button).clicked() {
                    action = ControlPanelAction::ExportCharts;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        let status_color = if self.is_error {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Checkbox list bound to a selection set. Returns true when the set changed.
    fn multiselect<T: Ord + Clone>(
        ui: &mut egui::Ui,
        title: &str,
        values: &[T],
        selected: &mut BTreeSet<T>,
        label: impl Fn(&T) -> String,
    ) -> bool {
        let mut changed = false;

        egui::CollapsingHeader::new(format!("{} ({}/{})", title, selected.len(), values.len()))
            .id_salt(title)
            .default_open(true)
            .show(ui, |ui| {
                egui::Frame::none()
                    .fill(ui.visuals().widgets.noninteractive.bg_fill)
                    .rounding(5.0)
                    .inner_margin(5.0)
                    .show(ui, |ui| {
                        ScrollArea::vertical()
                            .id_salt(format!("{title}_values"))
                            .max_height(120.0)
                            .show(ui, |ui| {
                                for value in values {
                                    let mut checked = selected.contains(value);
                                    if ui.checkbox(&mut checked, label(value)).changed() {
                                        if checked {
                                            selected.insert(value.clone());
                                        } else {
                                            selected.remove(value);
                                        }
                                        changed = true;
                                    }
                                }
                            });
                    });

                ui.add_space(5.0);
                ui.horizontal(|ui| {
                    if ui.small_button("Select All").clicked() {
                        selected.extend(values.iter().cloned());
                        changed = true;
                    }
                    if ui.small_button("Clear All").clicked() {
                        selected.clear();
                        changed = true;
                    }
                });
            });

        changed
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    FiltersChanged,
    DownloadCsv,
    ExportCharts,
}
