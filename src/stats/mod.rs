//! Stats module - Summary KPIs over the working view

mod aggregator;

pub use aggregator::{Aggregator, Summary};
