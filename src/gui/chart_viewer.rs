//! Chart Viewer Widget
//! KPI cards, the four analytics charts and the fine-description word cloud.

use crate::charts::{ChartData, ChartPlotter, WordCloudError, WordFrequencies};
use crate::stats::Summary;
use egui::{Color32, RichText};

const CARD_SPACING: f32 = 15.0;
const KPI_HEIGHT: f32 = 70.0;

/// Central dashboard content for the current working view.
#[derive(Default)]
pub struct ChartViewer {
    pub summary: Summary,
    pub chart_data: ChartData,
    pub words: Option<Result<WordFrequencies, WordCloudError>>,
    pub currency: String,
}

impl ChartViewer {
    pub fn new(currency: &str) -> Self {
        Self {
            currency: currency.to_string(),
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        self.summary = Summary::default();
        self.chart_data = ChartData::default();
        self.words = None;
    }

    pub fn set_view(
        &mut self,
        summary: Summary,
        words: Result<WordFrequencies, WordCloudError>,
    ) {
        self.chart_data = ChartData::from_summary(&summary);
        self.summary = summary;
        self.words = Some(words);
    }

    /// KPI cards row.
    pub fn show_kpis(&self, ui: &mut egui::Ui) {
        let high_risk_color = if self.summary.high_risk_count > 0 {
            Color32::from_rgb(220, 53, 69)
        } else {
            ui.visuals().text_color()
        };
        let kpis = [
            (
                "📊 Total Students",
                self.summary.total_count.to_string(),
                ui.visuals().text_color(),
            ),
            (
                "💸 Avg. Arrears",
                self.summary.format_avg_arrears(&self.currency),
                ui.visuals().text_color(),
            ),
            (
                "⚠ High Risk Students",
                self.summary.high_risk_count.to_string(),
                high_risk_color,
            ),
        ];

        ui.columns(kpis.len(), |columns| {
            for (col, (title, value, color)) in columns.iter_mut().zip(kpis) {
                egui::Frame::none()
                    .rounding(8.0)
                    .fill(col.visuals().widgets.noninteractive.bg_fill)
                    .inner_margin(12.0)
                    .show(col, |ui| {
                        ui.set_min_height(KPI_HEIGHT);
                        ui.set_width(ui.available_width());
                        ui.label(RichText::new(title).size(13.0).color(Color32::GRAY));
                        ui.label(RichText::new(value).size(26.0).strong().color(color));
                    });
            }
        });
    }

    /// Four charts in a 2x2 grid.
    pub fn show_charts(&self, ui: &mut egui::Ui) {
        ui.label(RichText::new("📈 Arrears Analytics").size(18.0).strong());
        ui.add_space(8.0);

        ui.columns(2, |columns| {
            Self::chart_card(&mut columns[0], "Risk Level Distribution", |ui| {
                ChartPlotter::draw_category_chart(
                    ui,
                    "risk_distribution",
                    &self.chart_data.risk_distribution,
                    "Students",
                )
            });
            Self::chart_card(&mut columns[1], "Fuzzy Priority Categories", |ui| {
                ChartPlotter::draw_category_chart(
                    ui,
                    "priority_distribution",
                    &self.chart_data.priority_distribution,
                    "Students",
                )
            });
        });

        ui.add_space(CARD_SPACING);

        ui.columns(2, |columns| {
            Self::chart_card(&mut columns[0], "Average Arrears by School", |ui| {
                ChartPlotter::draw_category_chart(
                    ui,
                    "arrears_by_school",
                    &self.chart_data.arrears_by_school,
                    "Mean Total_Arrears",
                )
            });
            Self::chart_card(&mut columns[1], "Payment Status by Program Level", |ui| {
                ChartPlotter::draw_grouped_chart(
                    ui,
                    "status_by_level",
                    &self.chart_data.status_by_level,
                    "Students",
                )
            });
        });
    }

    /// Word cloud, or an explicit empty state when there is no text.
    pub fn show_word_cloud(&self, ui: &mut egui::Ui) {
        ui.label(RichText::new("☁ Most Frequent Fine Descriptions").size(18.0).strong());
        ui.add_space(8.0);

        match &self.words {
            Some(Ok(words)) => ChartPlotter::draw_word_cloud(ui, words),
            Some(Err(e)) => {
                ui.label(RichText::new(e.to_string()).color(Color32::GRAY));
            }
            None => {}
        }
    }

    fn chart_card(ui: &mut egui::Ui, title: &str, add_chart: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.label(RichText::new(title).size(14.0).strong());
                ui.add_space(6.0);
                add_chart(ui);
            });
    }
}
