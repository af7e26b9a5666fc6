//! Static Chart Renderer
//! Writes the four dashboard charts to a single PNG with plotters.
//!
//! Layout (2x2):
//! 1. Risk Level Distribution      2. Fuzzy Priority Categories
//! 3. Average Arrears by School    4. Payment Status by Program Level

use crate::charts::plotter::PALETTE;
use crate::charts::{CategorySeries, ChartData, ChartPlotter, GroupedSeries};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Chart drawing failed: {0}")]
    Drawing(String),
}

fn drawing_error<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Drawing(e.to_string())
}

fn to_rgb(color: egui::Color32) -> RGBColor {
    RGBColor(color.r(), color.g(), color.b())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the dashboard charts into `path` as a PNG of `width` x `height`.
    pub fn render_png(
        data: &ChartData,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(drawing_error)?;

        let panels = root.split_evenly((2, 2));
        Self::draw_category(
            &panels[0],
            "Risk Level Distribution",
            &data.risk_distribution,
            "Students",
        )?;
        Self::draw_category(
            &panels[1],
            "Fuzzy Priority Categories",
            &data.priority_distribution,
            "Students",
        )?;
        Self::draw_category(
            &panels[2],
            "Average Arrears by School",
            &data.arrears_by_school,
            "Mean Total_Arrears",
        )?;
        Self::draw_grouped(
            &panels[3],
            "Payment Status by Program Level",
            &data.status_by_level,
            "Students",
        )?;

        root.present().map_err(drawing_error)?;
        log::info!("Chart image written to {}", path.display());
        Ok(())
    }

    fn draw_category<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        title: &str,
        series: &CategorySeries,
        y_desc: &str,
    ) -> Result<(), RenderError> {
        let n = series.labels.len().max(1);
        let y_max = (series.max_value() * 1.1).max(1.0);
        let labels = series.labels.clone();

        let mut chart = ChartBuilder::on(area)
            .caption(title, ("sans-serif", 24.0))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)
            .map_err(drawing_error)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| ChartPlotter::category_label(&labels, *x))
            .y_desc(y_desc)
            .draw()
            .map_err(drawing_error)?;

        chart
            .draw_series(
                series
                    .values
                    .iter()
                    .zip(&series.colors)
                    .enumerate()
                    .map(|(i, (value, color))| {
                        let x = i as f64;
                        Rectangle::new([(x - 0.3, 0.0), (x + 0.3, *value)], to_rgb(*color).filled())
                    }),
            )
            .map_err(drawing_error)?;

        Ok(())
    }

    fn draw_grouped<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        title: &str,
        data: &GroupedSeries,
        y_desc: &str,
    ) -> Result<(), RenderError> {
        let n = data.categories.len().max(1);
        let y_max = (data.max_value() * 1.1).max(1.0);
        let labels = data.categories.clone();
        let bar_width = 0.8 / data.series.len().max(1) as f64;

        let mut chart = ChartBuilder::on(area)
            .caption(title, ("sans-serif", 24.0))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)
            .map_err(drawing_error)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| ChartPlotter::category_label(&labels, *x))
            .y_desc(y_desc)
            .draw()
            .map_err(drawing_error)?;

        for (hue_idx, (name, values)) in data.series.iter().enumerate() {
            let color = to_rgb(PALETTE[hue_idx % PALETTE.len()]);
            let offset = -0.4 + bar_width * hue_idx as f64;
            chart
                .draw_series(values.iter().enumerate().map(|(cat_idx, value)| {
                    let x0 = cat_idx as f64 + offset;
                    Rectangle::new([(x0, 0.0), (x0 + bar_width * 0.95, *value)], color.filled())
                }))
                .map_err(drawing_error)?
                .label(name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        if !data.series.is_empty() {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(drawing_error)?;
        }

        Ok(())
    }
}
