//! Enricher Module
//! Validates the uploaded schema and derives the arrears classification columns.

use polars::prelude::*;
use std::fmt;
use thiserror::Error;

use super::filter::FilterOptions;

pub const TOTAL_FEE: &str = "Total_Fee";
pub const AMOUNT_PAID: &str = "Amount_Paid";
pub const TOTAL_FINE: &str = "Total_Fine";
pub const LEVEL: &str = "Level";
pub const STATUS: &str = "Status";
pub const SCHOOL: &str = "School";
pub const FINE_DESCRIPTIONS: &str = "Fine_Descriptions";

pub const FINES: &str = "Fines";
pub const TOTAL_ARREARS: &str = "Total_Arrears";
pub const RISK_LEVEL: &str = "Risk_Level";
pub const FUZZY_PRIORITY: &str = "Fuzzy_Priority";

pub const REQUIRED_COLUMNS: [&str; 5] = [TOTAL_FEE, AMOUNT_PAID, LEVEL, STATUS, SCHOOL];

/// Upper bounds (inclusive) of each risk band, checked in order.
/// Anything above the last bound is `High`.
const RISK_BANDS: [(f64, RiskLevel); 3] = [
    (0.0, RiskLevel::None),
    (500.0, RiskLevel::Low),
    (2000.0, RiskLevel::Medium),
];

/// Tolerance used when comparing a supplied Total_Arrears with the recomputed one.
const ARREARS_EPSILON: f64 = 1e-6;

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("Missing required column(s): {}", .0.join(", "))]
    Schema(Vec<String>),
    #[error("Column '{column}', row {row}: cannot read '{value}' as a number")]
    Parse {
        column: String,
        row: usize,
        value: String,
    },
    #[error("Column '{column}', row {row}: value is missing")]
    MissingValue { column: String, row: usize },
    #[error("Column '{column}' must be numeric, found {dtype}")]
    NotNumeric { column: String, dtype: String },
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Coarse bucket of arrears magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::None,
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
    ];

    pub fn classify(arrears: f64) -> Self {
        RISK_BANDS
            .iter()
            .find(|(upper, _)| arrears <= *upper)
            .map(|(_, level)| *level)
            .unwrap_or(RiskLevel::High)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::None => "None",
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite urgency label derived from arrears, program level and payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FuzzyPriority {
    Low,
    Medium,
    High,
}

impl FuzzyPriority {
    pub const ALL: [FuzzyPriority; 3] = [
        FuzzyPriority::Low,
        FuzzyPriority::Medium,
        FuzzyPriority::High,
    ];

    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= 4 => FuzzyPriority::High,
            s if s >= 2 => FuzzyPriority::Medium,
            _ => FuzzyPriority::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FuzzyPriority::Low => "Low",
            FuzzyPriority::Medium => "Medium",
            FuzzyPriority::High => "High",
        }
    }
}

impl fmt::Display for FuzzyPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Additive priority score in `0..=6`.
pub fn priority_score(arrears: f64, level: &str, status: &str) -> u8 {
    let arrears_points = if arrears > 5000.0 {
        2
    } else if arrears > 1000.0 {
        1
    } else {
        0
    };
    let level_points = match level {
        "Master" => 2,
        "Degree" => 1,
        _ => 0,
    };
    let status_points = match status {
        "Unpaid" => 2,
        "Partial" => 1,
        _ => 0,
    };
    arrears_points + level_points + status_points
}

pub fn fuzzy_priority(arrears: f64, level: &str, status: &str) -> FuzzyPriority {
    FuzzyPriority::from_score(priority_score(arrears, level, status))
}

/// Typed mirror of one enriched DataFrame row.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRow {
    pub level: String,
    pub status: String,
    pub school: String,
    pub fine_description: Option<String>,
    pub fines: f64,
    pub total_arrears: f64,
    pub risk_level: RiskLevel,
    pub fuzzy_priority: FuzzyPriority,
}

/// Enriched upload: frame with derived columns plus the typed rows in the same order.
#[derive(Debug, Clone)]
pub struct EnrichedDataset {
    pub df: DataFrame,
    pub rows: Vec<ClassifiedRow>,
    pub options: FilterOptions,
}

impl EnrichedDataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Derives Fines, Total_Arrears, Risk_Level and Fuzzy_Priority.
pub struct Enricher;

impl Enricher {
    pub fn enrich(mut df: DataFrame) -> Result<EnrichedDataset, EnrichError> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| df.column(name).is_err())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(EnrichError::Schema(missing));
        }

        let fees = Self::required_numbers(&df, TOTAL_FEE)?;
        let paid = Self::required_numbers(&df, AMOUNT_PAID)?;
        let fines: Vec<f64> = if df.column(TOTAL_FINE).is_ok() {
            Self::numeric_values(&df, TOTAL_FINE)?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect()
        } else {
            vec![0.0; df.height()]
        };

        let arrears: Vec<f64> = fees
            .iter()
            .zip(&paid)
            .zip(&fines)
            .map(|((fee, paid), fine)| fee - paid + fine)
            .collect();

        if df.column(TOTAL_ARREARS).is_ok() {
            Self::report_supplied_arrears(&df, &arrears);
        }

        let levels = Self::text_values(&df, LEVEL)?;
        let statuses = Self::text_values(&df, STATUS)?;
        let schools = Self::text_values(&df, SCHOOL)?;
        let descriptions = if df.column(FINE_DESCRIPTIONS).is_ok() {
            Self::text_values(&df, FINE_DESCRIPTIONS)?
        } else {
            vec![None; df.height()]
        };

        let rows: Vec<ClassifiedRow> = (0..df.height())
            .map(|i| {
                let level = levels[i].clone().unwrap_or_default();
                let status = statuses[i].clone().unwrap_or_default();
                ClassifiedRow {
                    risk_level: RiskLevel::classify(arrears[i]),
                    fuzzy_priority: fuzzy_priority(arrears[i], &level, &status),
                    level,
                    status,
                    school: schools[i].clone().unwrap_or_default(),
                    fine_description: descriptions[i].clone().filter(|d| !d.is_empty()),
                    fines: fines[i],
                    total_arrears: arrears[i],
                }
            })
            .collect();

        let risk_labels: Vec<&str> = rows.iter().map(|r| r.risk_level.as_str()).collect();
        let priority_labels: Vec<&str> = rows.iter().map(|r| r.fuzzy_priority.as_str()).collect();

        df.with_column(Column::new(FINES.into(), fines))?;
        df.with_column(Column::new(TOTAL_ARREARS.into(), arrears))?;
        df.with_column(Column::new(RISK_LEVEL.into(), risk_labels))?;
        df.with_column(Column::new(FUZZY_PRIORITY.into(), priority_labels))?;
        // Reader output is multi-chunk while the derived columns are not; filters and the
        // CSV writer expect every column chunked alike.
        df.as_single_chunk_par();

        let options = FilterOptions::observe(&rows);
        log::info!(
            "Enriched {} records: {} levels, {} statuses, {} risk levels observed",
            rows.len(),
            options.levels.len(),
            options.statuses.len(),
            options.risk_levels.len()
        );

        Ok(EnrichedDataset { df, rows, options })
    }

    /// Numeric column that must have a value on every row.
    fn required_numbers(df: &DataFrame, name: &str) -> Result<Vec<f64>, EnrichError> {
        Self::numeric_values(df, name)?
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                v.ok_or_else(|| EnrichError::MissingValue {
                    column: name.to_string(),
                    row: i + 1,
                })
            })
            .collect()
    }

    /// Read a numeric column strictly. Text columns are parsed cell by cell so the
    /// offending value can be reported; nothing is coerced to zero.
    fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, EnrichError> {
        let column = df.column(name)?;

        let values: Vec<Option<f64>> = match column.dtype() {
            DataType::String => {
                let ca = column.as_materialized_series().str()?;
                ca.into_iter()
                    .enumerate()
                    .map(|(i, v)| match v.map(str::trim) {
                        None | Some("") => Ok(None),
                        Some(raw) => raw.parse::<f64>().map(Some).map_err(|_| EnrichError::Parse {
                            column: name.to_string(),
                            row: i + 1,
                            value: raw.to_string(),
                        }),
                    })
                    .collect::<Result<_, _>>()?
            }
            DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Null => {
                let as_f64 = column.cast(&DataType::Float64)?;
                as_f64.f64()?.into_iter().collect()
            }
            other => {
                return Err(EnrichError::NotNumeric {
                    column: name.to_string(),
                    dtype: other.to_string(),
                })
            }
        };

        if let Some((i, v)) = values
            .iter()
            .enumerate()
            .find_map(|(i, v)| v.filter(|x| !x.is_finite()).map(|x| (i, x)))
        {
            return Err(EnrichError::Parse {
                column: name.to_string(),
                row: i + 1,
                value: v.to_string(),
            });
        }

        Ok(values)
    }

    /// Read a categorical/text column; surrounding whitespace is trimmed.
    fn text_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, EnrichError> {
        let column = df.column(name)?.cast(&DataType::String)?;
        let ca = column.as_materialized_series().str()?;
        Ok(ca
            .into_iter()
            .map(|v| v.map(|s| s.trim().to_string()))
            .collect())
    }

    /// A supplied Total_Arrears column is replaced by the recomputed value.
    /// Disagreements are only reported.
    fn report_supplied_arrears(df: &DataFrame, computed: &[f64]) {
        match Self::numeric_values(df, TOTAL_ARREARS) {
            Ok(supplied) => {
                let mismatched = supplied
                    .iter()
                    .zip(computed)
                    .filter(|(s, c)| s.map_or(true, |s| (s - **c).abs() > ARREARS_EPSILON))
                    .count();
                if mismatched > 0 {
                    log::warn!(
                        "{} of {} supplied {} values differ from {} - {} + {}; using recomputed values",
                        mismatched,
                        computed.len(),
                        TOTAL_ARREARS,
                        TOTAL_FEE,
                        AMOUNT_PAID,
                        FINES
                    );
                }
            }
            Err(e) => log::warn!("Ignoring unreadable {} column: {}", TOTAL_ARREARS, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataLoader;

    fn enrich_csv(csv: &str) -> Result<EnrichedDataset, EnrichError> {
        let df = DataLoader::parse_bytes(csv.as_bytes().to_vec()).unwrap();
        Enricher::enrich(df)
    }

    #[test]
    fn risk_band_boundaries_are_upper_inclusive() {
        assert_eq!(RiskLevel::classify(-250.0), RiskLevel::None);
        assert_eq!(RiskLevel::classify(0.0), RiskLevel::None);
        assert_eq!(RiskLevel::classify(0.01), RiskLevel::Low);
        assert_eq!(RiskLevel::classify(500.0), RiskLevel::Low);
        assert_eq!(RiskLevel::classify(500.01), RiskLevel::Medium);
        assert_eq!(RiskLevel::classify(2000.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::classify(2000.01), RiskLevel::High);
        assert_eq!(RiskLevel::classify(1e9), RiskLevel::High);
    }

    #[test]
    fn risk_level_is_monotonic() {
        let mut previous = RiskLevel::None;
        for step in -100..5000 {
            let level = RiskLevel::classify(step as f64);
            assert!(level >= previous, "risk dropped at {step}");
            previous = level;
        }
    }

    #[test]
    fn priority_score_tiers() {
        assert_eq!(priority_score(1000.0, "Diploma", "Paid"), 0);
        assert_eq!(priority_score(1000.01, "Diploma", "Paid"), 1);
        assert_eq!(priority_score(5000.0, "Diploma", "Paid"), 1);
        assert_eq!(priority_score(5000.01, "Diploma", "Paid"), 2);
        assert_eq!(priority_score(0.0, "Degree", "Partial"), 2);
        assert_eq!(priority_score(9000.0, "Master", "Unpaid"), 6);
    }

    #[test]
    fn priority_label_thresholds() {
        assert_eq!(FuzzyPriority::from_score(0), FuzzyPriority::Low);
        assert_eq!(FuzzyPriority::from_score(1), FuzzyPriority::Low);
        assert_eq!(FuzzyPriority::from_score(2), FuzzyPriority::Medium);
        assert_eq!(FuzzyPriority::from_score(3), FuzzyPriority::Medium);
        assert_eq!(FuzzyPriority::from_score(4), FuzzyPriority::High);
        assert_eq!(FuzzyPriority::from_score(6), FuzzyPriority::High);
    }

    #[test]
    fn level_and_status_match_exactly() {
        assert_eq!(priority_score(0.0, "master", "unpaid"), 0);
        assert_eq!(priority_score(0.0, "Masters", "Unpaid "), 0);
    }

    #[test]
    fn master_unpaid_at_medium_boundary() {
        let data = enrich_csv(
            "Total_Fee,Amount_Paid,Total_Fine,Level,Status,School\n3000,1000,,Master,Unpaid,FSKM\n",
        )
        .unwrap();
        let row = &data.rows[0];
        assert_eq!(row.fines, 0.0);
        assert_eq!(row.total_arrears, 2000.0);
        assert_eq!(row.risk_level, RiskLevel::Medium);
        assert_eq!(priority_score(row.total_arrears, &row.level, &row.status), 5);
        assert_eq!(row.fuzzy_priority, FuzzyPriority::High);
    }

    #[test]
    fn fully_paid_diploma() {
        let data = enrich_csv(
            "Total_Fee,Amount_Paid,Total_Fine,Level,Status,School\n500,500,0,Diploma,Paid,FPA\n",
        )
        .unwrap();
        let row = &data.rows[0];
        assert_eq!(row.total_arrears, 0.0);
        assert_eq!(row.risk_level, RiskLevel::None);
        assert_eq!(row.fuzzy_priority, FuzzyPriority::Low);
    }

    #[test]
    fn derived_columns_are_appended() {
        let data = enrich_csv(
            "Total_Fee,Amount_Paid,Total_Fine,Level,Status,School\n1000,200,50,Degree,Partial,FSKM\n",
        )
        .unwrap();
        let names: Vec<String> = data
            .df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            &names[names.len() - 4..],
            &[FINES, TOTAL_ARREARS, RISK_LEVEL, FUZZY_PRIORITY]
        );
        let arrears = data.df.column(TOTAL_ARREARS).unwrap().f64().unwrap().get(0);
        assert_eq!(arrears, Some(850.0));
        assert_eq!(data.rows[0].risk_level, RiskLevel::Medium);
    }

    #[test]
    fn enriched_columns_share_one_chunk() {
        let data = enrich_csv(
            "Total_Fee,Amount_Paid,Total_Fine,Level,Status,School\n\
             3000,1000,,Master,Unpaid,FSKM\n\
             500,500,0,Diploma,Paid,FPA\n\
             9000,1000,200,Degree,Partial,FSKM\n",
        )
        .unwrap();
        for column in data.df.get_columns() {
            assert_eq!(column.n_chunks(), 1, "{} is split", column.name());
        }
    }

    #[test]
    fn missing_fine_column_defaults_to_zero() {
        let data =
            enrich_csv("Total_Fee,Amount_Paid,Level,Status,School\n800,100,Degree,Unpaid,FSKM\n")
                .unwrap();
        assert_eq!(data.rows[0].fines, 0.0);
        assert_eq!(data.rows[0].total_arrears, 700.0);
        assert!(data.rows[0].fine_description.is_none());
    }

    #[test]
    fn supplied_arrears_are_recomputed() {
        let data = enrich_csv(
            "Total_Fee,Amount_Paid,Total_Arrears,Level,Status,School\n800,100,99999,Degree,Unpaid,FSKM\n",
        )
        .unwrap();
        assert_eq!(data.rows[0].total_arrears, 700.0);
        assert_eq!(data.rows[0].risk_level, RiskLevel::Medium);
        let names = data.df.get_column_names();
        assert_eq!(
            names.iter().filter(|n| n.as_str() == TOTAL_ARREARS).count(),
            1
        );
    }

    #[test]
    fn missing_required_columns_are_all_reported() {
        let err = enrich_csv("Total_Fee,Level,Status\n100,Degree,Paid\n").unwrap_err();
        match err {
            EnrichError::Schema(missing) => {
                assert_eq!(missing, vec![AMOUNT_PAID.to_string(), SCHOOL.to_string()])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_fee_is_rejected() {
        let err = enrich_csv(
            "Total_Fee,Amount_Paid,Level,Status,School\n100,50,Degree,Paid,A\nabc,50,Degree,Paid,A\n",
        )
        .unwrap_err();
        match err {
            EnrichError::Parse { column, row, value } => {
                assert_eq!(column, TOTAL_FEE);
                assert_eq!(row, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_fine_is_rejected() {
        let err = enrich_csv(
            "Total_Fee,Amount_Paid,Total_Fine,Level,Status,School\n100,50,late,Degree,Paid,A\n",
        )
        .unwrap_err();
        assert!(matches!(err, EnrichError::Parse { ref column, .. } if column == TOTAL_FINE));
    }

    #[test]
    fn null_payment_is_rejected() {
        let err = enrich_csv(
            "Total_Fee,Amount_Paid,Level,Status,School\n100,50,Degree,Paid,A\n100,,Degree,Paid,A\n",
        )
        .unwrap_err();
        assert!(
            matches!(err, EnrichError::MissingValue { ref column, row } if column == AMOUNT_PAID && row == 2)
        );
    }

    #[test]
    fn boolean_fee_column_is_not_coerced() {
        let df = df!(
            TOTAL_FEE => [true, false],
            AMOUNT_PAID => [0.0, 0.0],
            LEVEL => ["Degree", "Degree"],
            STATUS => ["Paid", "Paid"],
            SCHOOL => ["A", "B"]
        )
        .unwrap();
        let err = Enricher::enrich(df).unwrap_err();
        assert!(matches!(err, EnrichError::NotNumeric { .. }));
    }

    #[test]
    fn enrichment_is_deterministic() {
        let csv = "Total_Fee,Amount_Paid,Total_Fine,Level,Status,School\n7000,500,100,Master,Partial,A\n300,0,,Diploma,Unpaid,B\n";
        let first = enrich_csv(csv).unwrap();
        let second = enrich_csv(csv).unwrap();
        assert_eq!(first.rows, second.rows);
        assert!(first.df.equals_missing(&second.df));
    }

    #[test]
    fn blank_descriptions_are_dropped() {
        let data = enrich_csv(
            "Total_Fee,Amount_Paid,Level,Status,School,Fine_Descriptions\n100,0,Degree,Unpaid,A,Late library return\n100,0,Degree,Unpaid,A,\"  \"\n",
        )
        .unwrap();
        assert_eq!(
            data.rows[0].fine_description.as_deref(),
            Some("Late library return")
        );
        assert!(data.rows[1].fine_description.is_none());
    }
}
