//! Charts module - Chart data, interactive plots, static export, word cloud

mod plotter;
mod renderer;
mod wordcloud;

pub use plotter::{display_label, CategorySeries, ChartData, ChartPlotter, GroupedSeries};
pub use renderer::StaticChartRenderer;
pub use wordcloud::{WordCloudError, WordFrequencies};
