//! Spreadsheet export and import of scored records.

pub mod columns;
mod export;
mod parser;
mod reconstruct;

use crate::scorecard::domain::{Budget, KpiRecord, MainCategory, Measurement, MethodKind};
use crate::scorecard::normalizer::renormalize;
use crate::scorecard::scoring::score;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use columns::SheetRow;

pub use export::{details_text, sheet_row, SpreadsheetExporter};
pub use reconstruct::{DetailsReconstructor, KeywordReconstructor, RatioKeywords};

#[derive(Debug, thiserror::Error)]
pub enum InterchangeError {
    #[error("failed to access spreadsheet: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid spreadsheet data: {0}")]
    Csv(#[from] csv::Error),
}

/// Outcome of reading a sheet.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub records: Vec<KpiRecord>,
    /// 1-based data row numbers whose details could not be reconstructed.
    pub degraded_rows: Vec<usize>,
    /// Rows whose score cell disagrees with the recomputed score.
    pub score_mismatches: usize,
}

pub struct SpreadsheetImporter<D = KeywordReconstructor> {
    reconstructor: D,
}

impl SpreadsheetImporter<KeywordReconstructor> {
    pub fn standard() -> Self {
        Self::with_reconstructor(KeywordReconstructor::standard())
    }
}

impl Default for SpreadsheetImporter<KeywordReconstructor> {
    fn default() -> Self {
        Self::standard()
    }
}

impl<D: DetailsReconstructor> SpreadsheetImporter<D> {
    pub fn with_reconstructor(reconstructor: D) -> Self {
        Self { reconstructor }
    }

    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<ImportReport, InterchangeError> {
        let file = std::fs::File::open(path)?;
        self.from_reader(file)
    }

    pub fn from_reader<R: Read>(&self, reader: R) -> Result<ImportReport, InterchangeError> {
        let mut report = ImportReport::default();

        for (position, row) in parser::parse_rows(reader)?.into_iter().enumerate() {
            let row_number = position + 1;
            let (record, degraded) = self.record_from_row(&row);

            if degraded {
                debug!(
                    row = row_number,
                    method = %row.method,
                    "details could not be reconstructed"
                );
                report.degraded_rows.push(row_number);
            }

            let computed = score(&record).to_string();
            if !row.score.is_empty() && row.score != computed {
                debug!(
                    row = row_number,
                    imported = %row.score,
                    computed = %computed,
                    "imported score differs from recomputed score"
                );
                report.score_mismatches += 1;
            }

            report.records.push(record);
        }

        info!(
            rows = report.records.len(),
            degraded = report.degraded_rows.len(),
            score_mismatches = report.score_mismatches,
            "scorecard sheet imported"
        );
        Ok(report)
    }

    fn record_from_row(&self, row: &SheetRow) -> (KpiRecord, bool) {
        let mut degraded = false;
        let measurement = match row.method.parse::<MethodKind>() {
            Ok(kind) => self
                .reconstructor
                .reconstruct(kind, &row.details)
                .unwrap_or_else(|| {
                    degraded = true;
                    Measurement::empty(kind)
                }),
            Err(unknown) => Measurement::Unrecognized { label: unknown.0 },
        };

        let (allocated, spent) = clean_budget(&row.allocated, &row.spent);
        let record = renormalize(KpiRecord {
            id: None,
            department: row.department.clone(),
            main_category: MainCategory::parse(&row.category),
            statement: row.statement.clone(),
            target: row.target.clone(),
            measurement,
            budget: Budget {
                allocated,
                spent,
                utilization_percent: String::new(),
            },
        });
        (record, degraded)
    }
}

/// Undo currency formatting on both budget cells.
fn clean_budget(allocated: &str, spent: &str) -> (String, String) {
    let allocated = clean_amount(allocated);
    let spent = clean_amount(spent);
    if allocated == "NaN" || spent == "NaN" {
        return ("0".to_string(), "0".to_string());
    }
    (allocated, spent)
}

fn clean_amount(raw: &str) -> String {
    let without_prefix = raw
        .strip_prefix("RM")
        .map(str::trim_start)
        .unwrap_or(raw);
    let cleaned: String = without_prefix
        .chars()
        .filter(|ch| *ch != ',' && !ch.is_whitespace())
        .collect();
    match cleaned.as_str() {
        "" | "0.00" | "0" => "0".to_string(),
        _ => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorecard::domain::{CountData, StageData};
    use std::io::Cursor;

    const HEADER: &str = "Bil,Bahagian,Kategori,Pernyataan,Kaedah Pengukuran,Target,Perincian,Peratus Pencapaian,Peruntukan (RM),Perbelanjaan (RM),% Perbelanjaan\n";

    fn import(body: &str) -> ImportReport {
        SpreadsheetImporter::standard()
            .from_reader(Cursor::new(format!("{HEADER}{body}")))
            .expect("import succeeds")
    }

    #[test]
    fn budget_cells_lose_currency_formatting() {
        assert_eq!(clean_amount("RM 1,234.50"), "1234.50");
        assert_eq!(clean_amount("RM 0.00"), "0");
        assert_eq!(clean_amount(""), "0");
        assert_eq!(
            clean_budget("RM 1,000.00", "NaN"),
            ("0".to_string(), "0".to_string())
        );
    }

    #[test]
    fn count_row_is_rebuilt_and_scored() {
        let report = import(
            "1,BKP,KPI,Program,Bilangan,200,\"Sasaran: 200\nPencapaian: 250\",100.00%,\"RM 1,000.00\",RM 250.00,25.00%\n",
        );
        assert_eq!(report.records.len(), 1);
        assert!(report.degraded_rows.is_empty());
        assert_eq!(report.score_mismatches, 0);

        let record = &report.records[0];
        assert_eq!(record.main_category, Some(MainCategory::Kpi));
        assert_eq!(
            record.measurement,
            Measurement::Count(CountData {
                achieved: "250".to_string()
            })
        );
        assert_eq!(record.budget.allocated, "1000.00");
        assert_eq!(record.budget.utilization_percent, "25.00%");
    }

    #[test]
    fn unreadable_details_degrade_without_aborting() {
        let report = import(
            "1,BKP,-,Program,Masa,2025-06-30,belum siap,-,RM 0.00,RM 0.00,-\n\
2,MCP,SKU,Pindaan,Tahap Kemajuan,,Kelulusan JKUU (50%),50.00%,RM 0.00,RM 0.00,-\n",
        );
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.degraded_rows, vec![1]);
        assert_eq!(report.records[0].main_category, None);
        assert_eq!(
            report.records[1].measurement,
            Measurement::StageProgress(StageData::canonical(Some(1)))
        );
    }

    #[test]
    fn score_mismatches_are_counted() {
        let report = import(
            "1,BKP,KPI,Program,Bilangan,200,\"Sasaran: 200\nPencapaian: 50\",99.00%,RM 0.00,RM 0.00,-\n",
        );
        assert_eq!(report.score_mismatches, 1);
    }

    #[test]
    fn unknown_method_is_preserved() {
        let report = import("1,BKP,KPI,Program,Purata,10,-,-,RM 0.00,RM 0.00,-\n");
        assert_eq!(
            report.records[0].measurement,
            Measurement::Unrecognized {
                label: "Purata".to_string()
            }
        );
        assert!(report.degraded_rows.is_empty());
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let error = SpreadsheetImporter::standard()
            .from_path("./does-not-exist.csv")
            .expect_err("expected io error");
        match error {
            InterchangeError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
