//! Summary Aggregator Module
//! KPIs and frequency tables over the working view.

use statrs::statistics::Statistics;
use std::collections::BTreeMap;

use crate::data::{ClassifiedRow, FuzzyPriority, RiskLevel};

/// Summary of a working view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub total_count: usize,
    /// `None` when there are no rows to average.
    pub avg_arrears: Option<f64>,
    pub high_risk_count: usize,
    pub avg_arrears_by_school: BTreeMap<String, f64>,
    /// Keyed by (Level, Status).
    pub status_counts_by_level: BTreeMap<(String, String), usize>,
    pub risk_level_counts: BTreeMap<RiskLevel, usize>,
    pub fuzzy_priority_counts: BTreeMap<FuzzyPriority, usize>,
}

impl Summary {
    /// Average arrears formatted for a KPI card, `N/A` when undefined.
    pub fn format_avg_arrears(&self, currency: &str) -> String {
        match self.avg_arrears {
            Some(avg) => format!("{} {}", currency, format_thousands(avg)),
            None => "N/A".to_string(),
        }
    }
}

/// Computes summaries. Categories absent from the rows do not appear in any table.
pub struct Aggregator;

impl Aggregator {
    pub fn summarize(rows: &[ClassifiedRow]) -> Summary {
        let mut by_school: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut status_counts_by_level = BTreeMap::new();
        let mut risk_level_counts = BTreeMap::new();
        let mut fuzzy_priority_counts = BTreeMap::new();

        for row in rows {
            by_school
                .entry(row.school.clone())
                .or_default()
                .push(row.total_arrears);
            *status_counts_by_level
                .entry((row.level.clone(), row.status.clone()))
                .or_insert(0) += 1;
            *risk_level_counts.entry(row.risk_level).or_insert(0) += 1;
            *fuzzy_priority_counts.entry(row.fuzzy_priority).or_insert(0) += 1;
        }

        let avg_arrears_by_school = by_school
            .into_iter()
            .map(|(school, values)| (school, values.mean()))
            .collect();

        Summary {
            total_count: rows.len(),
            avg_arrears: Self::mean(rows.iter().map(|r| r.total_arrears)),
            high_risk_count: risk_level_counts.get(&RiskLevel::High).copied().unwrap_or(0),
            avg_arrears_by_school,
            status_counts_by_level,
            risk_level_counts,
            fuzzy_priority_counts,
        }
    }

    fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
        let mean = values.collect::<Vec<f64>>().mean();
        (!mean.is_nan()).then_some(mean)
    }
}

/// `1234567.891` -> `1,234,567.89`
pub fn format_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, frac) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}
