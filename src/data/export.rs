//! CSV export of the working view.

use polars::prelude::*;
use std::path::Path;
use thiserror::Error;

use super::filter::WorkingView;

pub const EXPORT_FILE_NAME: &str = "Filtered_Student_Arrears.csv";
pub const EXPORT_MIME: &str = "text/csv";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to encode CSV: {0}")]
    Polars(#[from] PolarsError),
    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialise exactly the filtered rows, all original and derived columns, as UTF-8 CSV.
pub fn to_csv_bytes(view: &WorkingView) -> Result<Vec<u8>, ExportError> {
    let mut df = view.df.clone();
    df.as_single_chunk_par();
    let mut buffer: Vec<u8> = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(&mut df)?;
    Ok(buffer)
}

pub fn write_csv(view: &WorkingView, path: &Path) -> Result<(), ExportError> {
    let bytes = to_csv_bytes(view)?;
    std::fs::write(path, bytes)?;
    log::info!("Exported {} rows to {}", view.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataLoader, Enricher, FilterSelection, RiskLevel};

    const SAMPLE: &str = "\
Total_Fee,Amount_Paid,Total_Fine,Level,Status,School,Fine_Descriptions
3000,1000,,Master,Unpaid,FSKM,Late library return
500,500,0,Diploma,Paid,FPA,
9000,1000,200,Degree,Partial,FSKM,Hostel damage
";

    fn view_for(selection: impl Fn(&mut FilterSelection)) -> WorkingView {
        let df = DataLoader::parse_bytes(SAMPLE.as_bytes().to_vec()).unwrap();
        let data = Enricher::enrich(df).unwrap();
        let mut sel = data.options.select_all();
        selection(&mut sel);
        data.filter(&sel).unwrap()
    }

    fn data_lines(bytes: &[u8]) -> Vec<String> {
        String::from_utf8(bytes.to_vec())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn header_carries_original_and_derived_columns() {
        let bytes = to_csv_bytes(&view_for(|_| {})).unwrap();
        let lines = data_lines(&bytes);
        assert_eq!(
            lines[0],
            "Total_Fee,Amount_Paid,Total_Fine,Level,Status,School,Fine_Descriptions,Fines,Total_Arrears,Risk_Level,Fuzzy_Priority"
        );
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn row_count_matches_filtered_view() {
        let selections: Vec<Box<dyn Fn(&mut FilterSelection)>> = vec![
            Box::new(|_: &mut FilterSelection| {}),
            Box::new(|s: &mut FilterSelection| s.levels.clear()),
            Box::new(|s: &mut FilterSelection| {
                s.risk_levels = [RiskLevel::High].into_iter().collect()
            }),
            Box::new(|s: &mut FilterSelection| {
                s.statuses = ["Unpaid".to_string(), "Paid".to_string()]
                    .into_iter()
                    .collect()
            }),
        ];
        for select in selections {
            let view = view_for(select);
            let lines = data_lines(&to_csv_bytes(&view).unwrap());
            assert_eq!(lines.len() - 1, view.len());
        }
    }

    #[test]
    fn high_risk_selection_exports_only_that_row() {
        let view = view_for(|s| s.risk_levels = [RiskLevel::High].into_iter().collect());
        let lines = data_lines(&to_csv_bytes(&view).unwrap());
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("9000,1000,200,Degree,Partial,FSKM,Hostel damage,"));
        assert!(lines[1].ends_with(",High,High"));
    }

    #[test]
    fn written_file_round_trips_through_loader() {
        let view = view_for(|s| s.risk_levels = [RiskLevel::Medium].into_iter().collect());
        let path = std::env::temp_dir().join(format!("arrears_export_{}.csv", std::process::id()));
        write_csv(&view, &path).unwrap();
        let reloaded = DataLoader::new().load_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(reloaded.height(), 1);
        assert_eq!(reloaded.width(), view.df.width());
    }
}
