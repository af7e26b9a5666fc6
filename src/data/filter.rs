//! Filter Module
//! Category-subset filtering of the enriched dataset into a working view.

use polars::prelude::*;
use std::collections::BTreeSet;

use super::enricher::{ClassifiedRow, EnrichedDataset, RiskLevel, TOTAL_ARREARS};

/// Distinct values observed in a dataset, computed once per upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    /// First-appearance order.
    pub levels: Vec<String>,
    /// First-appearance order.
    pub statuses: Vec<String>,
    /// Severity order.
    pub risk_levels: Vec<RiskLevel>,
}

impl FilterOptions {
    pub fn observe(rows: &[ClassifiedRow]) -> Self {
        let mut options = Self::default();
        for row in rows {
            if !options.levels.contains(&row.level) {
                options.levels.push(row.level.clone());
            }
            if !options.statuses.contains(&row.status) {
                options.statuses.push(row.status.clone());
            }
            if !options.risk_levels.contains(&row.risk_level) {
                options.risk_levels.push(row.risk_level);
            }
        }
        options.risk_levels.sort();
        options
    }

    /// Default selection: every observed value.
    pub fn select_all(&self) -> FilterSelection {
        FilterSelection {
            levels: self.levels.iter().cloned().collect(),
            statuses: self.statuses.iter().cloned().collect(),
            risk_levels: self.risk_levels.iter().copied().collect(),
        }
    }
}

/// Allowed values per dimension. An empty set admits nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub levels: BTreeSet<String>,
    pub statuses: BTreeSet<String>,
    pub risk_levels: BTreeSet<RiskLevel>,
}

impl FilterSelection {
    pub fn matches(&self, row: &ClassifiedRow) -> bool {
        self.levels.contains(&row.level)
            && self.statuses.contains(&row.status)
            && self.risk_levels.contains(&row.risk_level)
    }
}

/// Rows currently visible after filtering. `df` and `rows` share height and order.
#[derive(Debug, Clone)]
pub struct WorkingView {
    pub df: DataFrame,
    pub rows: Vec<ClassifiedRow>,
}

impl WorkingView {
    /// Unfiltered view of a dataset.
    pub fn full(dataset: &EnrichedDataset) -> Self {
        Self {
            df: dataset.df.clone(),
            rows: dataset.rows.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep the rows admitted by `selection`, preserving order.
    pub fn filter(&self, selection: &FilterSelection) -> PolarsResult<WorkingView> {
        let keep: Vec<bool> = self.rows.iter().map(|row| selection.matches(row)).collect();
        let mask = BooleanChunked::from_slice("mask".into(), &keep);
        let df = self.df.filter(&mask)?;
        let rows: Vec<ClassifiedRow> = self
            .rows
            .iter()
            .zip(&keep)
            .filter(|(_, keep)| **keep)
            .map(|(row, _)| row.clone())
            .collect();

        log::debug!("Filter kept {} of {} rows", rows.len(), self.rows.len());
        Ok(WorkingView { df, rows })
    }

    /// Space-joined non-blank fine descriptions, for the word-frequency view.
    pub fn fine_text(&self) -> String {
        self.rows
            .iter()
            .filter_map(|row| row.fine_description.as_deref())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Frame ordered for display, highest arrears first.
    pub fn sorted_by_arrears(&self) -> PolarsResult<DataFrame> {
        self.df.sort(
            [TOTAL_ARREARS],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
    }
}

impl EnrichedDataset {
    pub fn filter(&self, selection: &FilterSelection) -> PolarsResult<WorkingView> {
        WorkingView::full(self).filter(selection)
    }
}
