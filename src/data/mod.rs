//! Data module - CSV loading, enrichment, filtering and export

mod enricher;
pub mod export;
mod filter;
mod loader;

#[cfg(test)]
pub use enricher::fuzzy_priority;
pub use enricher::{ClassifiedRow, EnrichedDataset, Enricher, FuzzyPriority, RiskLevel};
pub use filter::{FilterOptions, FilterSelection, WorkingView};
pub use loader::DataLoader;
