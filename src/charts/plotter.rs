//! Chart Plotter Module
//! Interactive bar charts of the working-view summary using egui_plot.

use crate::charts::WordFrequencies;
use crate::data::{FuzzyPriority, RiskLevel};
use crate::stats::Summary;
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Plot};
use std::collections::BTreeMap;

pub const RISK_COLORS: [Color32; 4] = [
    Color32::from_rgb(102, 194, 165), // None
    Color32::from_rgb(252, 141, 98),  // Low
    Color32::from_rgb(141, 160, 203), // Medium
    Color32::from_rgb(231, 138, 195), // High
];

pub const PRIORITY_COLORS: [Color32; 3] = [
    Color32::from_rgb(53, 183, 121), // Low
    Color32::from_rgb(49, 104, 142), // Medium
    Color32::from_rgb(68, 1, 84),    // High
];

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(231, 76, 60),  // Red
    Color32::from_rgb(46, 204, 113), // Green
    Color32::from_rgb(155, 89, 182), // Purple
    Color32::from_rgb(243, 156, 18), // Orange
    Color32::from_rgb(26, 188, 156), // Teal
    Color32::from_rgb(233, 30, 99),  // Pink
    Color32::from_rgb(0, 188, 212),  // Cyan
    Color32::from_rgb(255, 87, 34),  // Deep Orange
    Color32::from_rgb(121, 85, 72),  // Brown
    Color32::from_rgb(96, 125, 139), // Blue Grey
];

/// One bar per category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<Color32>,
}

impl CategorySeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}

/// Side-by-side bars: one group per category, one series per hue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedSeries {
    pub categories: Vec<String>,
    /// (hue name, value per category)
    pub series: Vec<(String, Vec<f64>)>,
}

impl GroupedSeries {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|(_, values)| values.iter().copied())
            .fold(0.0, f64::max)
    }
}

/// Everything the four dashboard charts draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub risk_distribution: CategorySeries,
    pub priority_distribution: CategorySeries,
    pub arrears_by_school: CategorySeries,
    pub status_by_level: GroupedSeries,
}

impl ChartData {
    pub fn from_summary(summary: &Summary) -> Self {
        let risk_distribution = {
            let mut series = CategorySeries::default();
            for (i, level) in RiskLevel::ALL.iter().enumerate() {
                if let Some(count) = summary.risk_level_counts.get(level) {
                    series.labels.push(level.to_string());
                    series.values.push(*count as f64);
                    series.colors.push(RISK_COLORS[i]);
                }
            }
            series
        };

        let priority_distribution = {
            let mut series = CategorySeries::default();
            for (i, priority) in FuzzyPriority::ALL.iter().enumerate() {
                if let Some(count) = summary.fuzzy_priority_counts.get(priority) {
                    series.labels.push(priority.to_string());
                    series.values.push(*count as f64);
                    series.colors.push(PRIORITY_COLORS[i]);
                }
            }
            series
        };

        let arrears_by_school = CategorySeries {
            labels: summary.avg_arrears_by_school.keys().map(|s| display_label(s)).collect(),
            values: summary.avg_arrears_by_school.values().copied().collect(),
            colors: (0..summary.avg_arrears_by_school.len())
                .map(|i| PALETTE[i % PALETTE.len()])
                .collect(),
        };

        Self {
            risk_distribution,
            priority_distribution,
            arrears_by_school,
            status_by_level: Self::group_status_by_level(&summary.status_counts_by_level),
        }
    }

    fn group_status_by_level(counts: &BTreeMap<(String, String), usize>) -> GroupedSeries {
        let mut categories: Vec<String> = Vec::new();
        let mut statuses: Vec<String> = Vec::new();
        for (level, status) in counts.keys() {
            if !categories.contains(level) {
                categories.push(level.clone());
            }
            if !statuses.contains(status) {
                statuses.push(status.clone());
            }
        }
        statuses.sort();

        let series = statuses
            .into_iter()
            .map(|status| {
                let values = categories
                    .iter()
                    .map(|level| {
                        counts
                            .get(&(level.clone(), status.clone()))
                            .copied()
                            .unwrap_or(0) as f64
                    })
                    .collect();
                (display_label(&status), values)
            })
            .collect();

        GroupedSeries {
            categories: categories.iter().map(|c| display_label(c)).collect(),
            series,
        }
    }
}

/// Blank categorical values are shown as `(blank)`.
pub fn display_label(value: &str) -> String {
    if value.is_empty() {
        "(blank)".to_string()
    } else {
        value.to_string()
    }
}

/// Draws the dashboard charts with egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub const CHART_HEIGHT: f32 = 260.0;

    /// Single-series bar chart with categorical x labels.
    pub fn draw_category_chart(
        ui: &mut egui::Ui,
        id: &str,
        series: &CategorySeries,
        y_label: &str,
    ) {
        if series.is_empty() {
            Self::draw_empty(ui);
            return;
        }

        let bars: Vec<Bar> = series
            .labels
            .iter()
            .zip(&series.values)
            .zip(&series.colors)
            .enumerate()
            .map(|(i, ((label, value), color))| {
                Bar::new(i as f64, *value)
                    .name(label)
                    .width(0.6)
                    .fill(color.gamma_multiply(0.85))
                    .stroke(egui::Stroke::new(1.0, *color))
            })
            .collect();

        let x_labels = series.labels.clone();
        Plot::new(id)
            .height(Self::CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .include_y(series.max_value() * 1.1)
            .y_axis_label(y_label)
            .x_axis_formatter(move |mark, _range| Self::category_label(&x_labels, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
    }

    /// Grouped bar chart; each hue gets its own legend entry.
    pub fn draw_grouped_chart(ui: &mut egui::Ui, id: &str, data: &GroupedSeries, y_label: &str) {
        if data.is_empty() {
            Self::draw_empty(ui);
            return;
        }

        let hues = data.series.len().max(1) as f64;
        let bar_width = 0.8 / hues;
        let x_labels = data.categories.clone();

        Plot::new(id)
            .height(Self::CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .include_y(data.max_value() * 1.1)
            .y_axis_label(y_label)
            .legend(Legend::default())
            .x_axis_formatter(move |mark, _range| Self::category_label(&x_labels, mark.value))
            .show(ui, |plot_ui| {
                for (hue_idx, (name, values)) in data.series.iter().enumerate() {
                    let color = PALETTE[hue_idx % PALETTE.len()];
                    let offset = -0.4 + bar_width * (hue_idx as f64 + 0.5);
                    let bars: Vec<Bar> = values
                        .iter()
                        .enumerate()
                        .map(|(cat_idx, value)| {
                            Bar::new(cat_idx as f64 + offset, *value)
                                .width(bar_width * 0.95)
                                .fill(color.gamma_multiply(0.6))
                                .stroke(egui::Stroke::new(1.0, color))
                        })
                        .collect();
                    plot_ui.bar_chart(BarChart::new(bars).name(name).color(color));
                }
            });
    }

    /// Word cloud: words flow left to right, sized by relative frequency.
    pub fn draw_word_cloud(ui: &mut egui::Ui, words: &WordFrequencies) {
        egui::Frame::none()
            .fill(Color32::WHITE)
            .rounding(5.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal_wrapped(|ui| {
                    for (i, word) in words.words.iter().enumerate() {
                        let size = 12.0 + 36.0 * word.weight;
                        let color = PALETTE[i % PALETTE.len()];
                        ui.label(RichText::new(&word.word).size(size).color(color))
                            .on_hover_text(format!("{} occurrences", word.count));
                    }
                });
            });
    }

    /// Label for a whole-number tick, empty between categories.
    pub(crate) fn category_label(labels: &[String], value: f64) -> String {
        let idx = value.round();
        if (value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }

    fn draw_empty(ui: &mut egui::Ui) {
        ui.add_sized(
            [ui.available_width(), Self::CHART_HEIGHT],
            egui::Label::new(RichText::new("No data for the current filters").color(Color32::GRAY)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{fuzzy_priority, ClassifiedRow};
    use crate::stats::Aggregator;

    fn row(level: &str, status: &str, school: &str, arrears: f64) -> ClassifiedRow {
        ClassifiedRow {
            level: level.to_string(),
            status: status.to_string(),
            school: school.to_string(),
            fine_description: None,
            fines: 0.0,
            total_arrears: arrears,
            risk_level: RiskLevel::classify(arrears),
            fuzzy_priority: fuzzy_priority(arrears, level, status),
        }
    }

    #[test]
    fn risk_bars_follow_severity_order() {
        let summary = Aggregator::summarize(&[
            row("Degree", "Unpaid", "FSKM", 9000.0),
            row("Degree", "Paid", "FSKM", 0.0),
            row("Degree", "Paid", "FSKM", 0.0),
        ]);
        let charts = ChartData::from_summary(&summary);
        assert_eq!(charts.risk_distribution.labels, vec!["None", "High"]);
        assert_eq!(charts.risk_distribution.values, vec![2.0, 1.0]);
        assert_eq!(charts.risk_distribution.colors, vec![RISK_COLORS[0], RISK_COLORS[3]]);
    }

    #[test]
    fn grouped_series_zero_fills_within_present_levels() {
        let summary = Aggregator::summarize(&[
            row("Degree", "Unpaid", "A", 100.0),
            row("Master", "Paid", "B", 0.0),
            row("Master", "Unpaid", "B", 100.0),
        ]);
        let grouped = ChartData::from_summary(&summary).status_by_level;
        assert_eq!(grouped.categories, vec!["Degree", "Master"]);
        assert_eq!(
            grouped.series,
            vec![
                ("Paid".to_string(), vec![0.0, 1.0]),
                ("Unpaid".to_string(), vec![1.0, 1.0]),
            ]
        );
    }

    #[test]
    fn school_means_and_blank_labels() {
        let summary = Aggregator::summarize(&[
            row("Degree", "Unpaid", "", 300.0),
            row("Degree", "Unpaid", "FSKM", 100.0),
            row("Degree", "Unpaid", "FSKM", 300.0),
        ]);
        let schools = ChartData::from_summary(&summary).arrears_by_school;
        assert_eq!(schools.labels, vec!["(blank)", "FSKM"]);
        assert_eq!(schools.values, vec![300.0, 200.0]);
        assert_eq!(schools.max_value(), 300.0);
    }

    #[test]
    fn empty_summary_gives_empty_charts() {
        let charts = ChartData::from_summary(&Summary::default());
        assert!(charts.risk_distribution.is_empty());
        assert!(charts.priority_distribution.is_empty());
        assert!(charts.arrears_by_school.is_empty());
        assert!(charts.status_by_level.is_empty());
        assert_eq!(charts.status_by_level.max_value(), 0.0);
    }

    #[test]
    fn axis_labels_only_on_whole_positions() {
        let labels = vec!["Low".to_string(), "High".to_string()];
        assert_eq!(ChartPlotter::category_label(&labels, 1.0), "High");
        assert_eq!(ChartPlotter::category_label(&labels, 0.5), "");
        assert_eq!(ChartPlotter::category_label(&labels, -1.0), "");
        assert_eq!(ChartPlotter::category_label(&labels, 2.0), "");
    }
}
