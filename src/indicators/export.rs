//! CSV export of indicator datasets
//!
//! One row per (series, period): datasets in order, then periods in their
//! original order, then the series of the dataset.

use super::{Dataset, IndicatorError};
use chrono::NaiveDate;
use std::io::{self, Write};

/// Fixed header row of the export
pub const CSV_HEADER: [&str; 5] = ["Indicator", "Period", "Value", "Unit", "Source"];

/// Write every row of every dataset to `writer`
pub fn write_csv<W: Write>(datasets: &[Dataset], writer: W) -> Result<(), IndicatorError> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(CSV_HEADER)?;

    for dataset in datasets {
        for (idx, period) in dataset.periods().iter().enumerate() {
            for series in dataset.series() {
                let value = series.values()[idx].to_string();
                wtr.write_record([
                    series.name(),
                    period.as_str(),
                    value.as_str(),
                    series.unit(),
                    series.source(),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Render the export as a string
pub fn export_csv(datasets: &[Dataset]) -> Result<String, IndicatorError> {
    let mut buf = Vec::new();
    write_csv(datasets, &mut buf)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

/// Download name of the export for a given day
pub fn export_file_name(date: NaiveDate) -> String {
    format!("dette_publique_indicateurs_{}.csv", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::Series;

    fn dataset(title: &str, names: &[&str], periods: &[&str]) -> Dataset {
        let series = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let values = (0..periods.len()).map(|p| (i * 10 + p) as f64).collect();
                Series::new(*name, "%", "Test", periods.iter().copied(), values).unwrap()
            })
            .collect();
        Dataset::new(title, series).unwrap()
    }

    #[test]
    fn test_row_count_and_order() {
        let rg = dataset(
            "r-g",
            &["r", "g", "r-g"],
            &["2020", "2021", "2022", "2023", "2024", "2025"],
        );
        let schedule = dataset("schedule", &["nominal", "indexed"], &["2025", "2026", "2027", "2028", "2029"]);

        let csv = export_csv(&[rg, schedule]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 1 + 6 * 3 + 5 * 2);
        assert_eq!(lines[0], "Indicator,Period,Value,Unit,Source");
        assert_eq!(lines[1], "r,2020,0,%,Test");
        assert_eq!(lines[2], "g,2020,10,%,Test");
        assert_eq!(lines[3], "r-g,2020,20,%,Test");
        assert_eq!(lines[4], "r,2021,1,%,Test");
        assert_eq!(lines[19], "nominal,2025,0,%,Test");
        assert_eq!(lines[20], "indexed,2025,10,%,Test");
        assert_eq!(lines[28], "indexed,2029,14,%,Test");
        assert!(csv.ends_with('\n'));
        assert!(!csv.contains('\r'));
    }

    #[test]
    fn test_export_is_deterministic() {
        let make = || vec![dataset("a", &["x", "y"], &["2024", "2025"])];
        assert_eq!(export_csv(&make()).unwrap(), export_csv(&make()).unwrap());
    }

    #[test]
    fn test_empty_export_is_header_only() {
        assert_eq!(export_csv(&[]).unwrap(), "Indicator,Period,Value,Unit,Source\n");
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let s = Series::new("Dette, APU", "Mds€", "INSEE", ["2025"], vec![3416.3]).unwrap();
        let csv = export_csv(&[Dataset::new("d", vec![s]).unwrap()]).unwrap();
        assert_eq!(csv.lines().nth(1), Some("\"Dette, APU\",2025,3416.3,Mds€,INSEE"));
    }

    #[test]
    fn test_file_name() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 14).unwrap();
        assert_eq!(export_file_name(date), "dette_publique_indicateurs_2025-10-14.csv");
    }
}
