//! Arrears table widget, rows pre-rendered as strings.

use egui::{RichText, ScrollArea};
use polars::prelude::*;

const COLUMN_WIDTH: f32 = 120.0;
const ROW_HEIGHT: f32 = 20.0;
const TABLE_HEIGHT: f32 = 420.0;

/// Header and cell text of the sorted working view.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows in the view before any display cap.
    pub total_rows: usize,
}

impl TableView {
    pub fn from_dataframe(df: &DataFrame, row_limit: Option<usize>) -> Self {
        let headers: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let shown = row_limit.map_or(df.height(), |limit| limit.min(df.height()));

        let rows = (0..shown)
            .map(|i| {
                df.get_columns()
                    .iter()
                    .map(|col| Self::cell_text(col, i))
                    .collect()
            })
            .collect();

        Self {
            headers,
            rows,
            total_rows: df.height(),
        }
    }

    fn cell_text(col: &Column, i: usize) -> String {
        match col.get(i) {
            Ok(AnyValue::Null) | Err(_) => String::new(),
            Ok(AnyValue::Float64(v)) => format!("{:.2}", v),
            Ok(val) => val.to_string().trim_matches('"').to_string(),
        }
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        ui.label(RichText::new("📋 Student Arrears Table").size(18.0).strong());
        if self.rows.len() < self.total_rows {
            ui.label(
                RichText::new(format!(
                    "Showing the top {} of {} rows by Total_Arrears",
                    self.rows.len(),
                    self.total_rows
                ))
                .size(11.0),
            );
        }
        ui.add_space(6.0);

        ScrollArea::horizontal()
            .id_salt("arrears_table_h")
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    for header in &self.headers {
                        ui.add_sized(
                            [COLUMN_WIDTH, ROW_HEIGHT],
                            egui::Label::new(RichText::new(header).strong()).truncate(),
                        );
                    }
                });
                ui.separator();

                ScrollArea::vertical()
                    .id_salt("arrears_table_v")
                    .max_height(TABLE_HEIGHT)
                    .auto_shrink([false, true])
                    .show_rows(ui, ROW_HEIGHT, self.rows.len(), |ui, row_range| {
                        for row in &self.rows[row_range] {
                            ui.horizontal(|ui| {
                                for cell in row {
                                    ui.add_sized(
                                        [COLUMN_WIDTH, ROW_HEIGHT],
                                        egui::Label::new(cell).truncate(),
                                    );
                                }
                            });
                        }
                    });
            });
    }
}
