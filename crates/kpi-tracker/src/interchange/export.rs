use super::columns::{SheetRow, HEADERS};
use super::InterchangeError;
use crate::scorecard::domain::{KpiRecord, Measurement, RatioData};
use crate::scorecard::numeric::{fixed_2, format_ringgit};
use crate::scorecard::scoring::{ratio_actual, score};
use std::io::Write;
use std::path::Path;
use tracing::info;

pub struct SpreadsheetExporter;

impl SpreadsheetExporter {
    pub fn to_path<P: AsRef<Path>>(records: &[KpiRecord], path: P) -> Result<(), InterchangeError> {
        let file = std::fs::File::create(path)?;
        Self::to_writer(records, file)
    }

    pub fn to_writer<W: Write>(records: &[KpiRecord], writer: W) -> Result<(), InterchangeError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(HEADERS)?;
        for (index, record) in records.iter().enumerate() {
            csv_writer.write_record(sheet_row(index, record).cells())?;
        }
        csv_writer.flush()?;
        info!(rows = records.len(), "scorecard sheet exported");
        Ok(())
    }

    pub fn to_bytes(records: &[KpiRecord]) -> Result<Vec<u8>, InterchangeError> {
        let mut buffer = Vec::new();
        Self::to_writer(records, &mut buffer)?;
        Ok(buffer)
    }
}

pub fn sheet_row(index: usize, record: &KpiRecord) -> SheetRow {
    SheetRow {
        number: (index + 1).to_string(),
        department: record.department.clone(),
        category: record
            .main_category
            .map_or("-", |category| category.label())
            .to_string(),
        statement: record.statement.clone(),
        method: record.measurement.method_label().to_string(),
        target: record.target.clone(),
        details: details_text(record),
        score: score(record).to_string(),
        allocated: format_ringgit(&record.budget.allocated),
        spent: format_ringgit(&record.budget.spent),
        utilization: record.budget.utilization_percent.clone(),
    }
}

/// Human-readable `Perincian` cell for a record.
pub fn details_text(record: &KpiRecord) -> String {
    match &record.measurement {
        Measurement::Count(data) => format!(
            "Sasaran: {}\nPencapaian: {}",
            or_dash(&record.target),
            or_dash(&data.achieved)
        ),
        Measurement::Ratio(data) => ratio_details(data, "y", "x"),
        Measurement::MinimumRatio(data) => ratio_details(data, "Peruntukan", "Perbelanjaan"),
        Measurement::Time(data) => format!(
            "Sasaran Tarikh: {}\nTarikh Berjaya Dicapai: {}",
            or_dash(&record.target),
            or_dash(&data.achieved_date)
        ),
        Measurement::StageProgress(data) => match data.selected_stage() {
            Some(stage) => format!("{} ({}%)", stage.label, stage.percent),
            None => "-".to_string(),
        },
        Measurement::Unrecognized { .. } => "-".to_string(),
    }
}

fn ratio_details(data: &RatioData, denominator_label: &str, numerator_label: &str) -> String {
    let actual = ratio_actual(data).map_or_else(|| "-".to_string(), fixed_2);
    format!(
        "{}: {}\n{}: {}\n% Sebenar: {actual}%",
        or_default(&data.denominator_label, denominator_label),
        data.denominator,
        or_default(&data.numerator_label, numerator_label),
        data.numerator,
    )
}

fn or_dash(value: &str) -> &str {
    or_default(value, "-")
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorecard::domain::{CountData, StageData, TimeData};
    use crate::scorecard::normalizer::{normalize, RecordDraft};

    fn draft(method: &str, target: &str) -> RecordDraft {
        RecordDraft {
            department: "BKP".to_string(),
            statement: "Program".to_string(),
            method: method.to_string(),
            target: target.to_string(),
            ..RecordDraft::default()
        }
    }

    #[test]
    fn count_details_fall_back_to_dashes() {
        let record = normalize(RecordDraft {
            count: Some(CountData {
                achieved: "120".to_string(),
            }),
            ..draft("Bilangan", "")
        });
        assert_eq!(details_text(&record), "Sasaran: -\nPencapaian: 120");
    }

    #[test]
    fn ratio_details_use_default_axis_labels() {
        let record = normalize(RecordDraft {
            ratio: Some(RatioData {
                numerator: "80".to_string(),
                denominator: "100".to_string(),
                ..RatioData::default()
            }),
            ..draft("Peratus", "80")
        });
        assert_eq!(details_text(&record), "y: 100\nx: 80\n% Sebenar: 80.00%");

        let record = normalize(draft("Peratus Minimum", "90"));
        assert_eq!(
            details_text(&record),
            "Peruntukan: \nPerbelanjaan: \n% Sebenar: -%"
        );
    }

    #[test]
    fn time_and_stage_details() {
        let record = normalize(RecordDraft {
            time: Some(TimeData {
                achieved_date: "2025-07-10".to_string(),
            }),
            ..draft("Masa", "2025-06-30")
        });
        assert_eq!(
            details_text(&record),
            "Sasaran Tarikh: 2025-06-30\nTarikh Berjaya Dicapai: 2025-07-10"
        );

        let mut record = normalize(draft("Tahap Kemajuan", ""));
        assert_eq!(details_text(&record), "-");
        record.measurement = Measurement::StageProgress(StageData::canonical(Some(1)));
        assert_eq!(details_text(&record), "Kelulusan JKUU (50%)");
    }

    #[test]
    fn row_formats_currency_and_category() {
        let record = normalize(RecordDraft {
            budget_allocated: "1234567.5".to_string(),
            budget_spent: "0.00".to_string(),
            ..draft("Bilangan", "10")
        });
        let row = sheet_row(0, &record);
        assert_eq!(row.number, "1");
        assert_eq!(row.category, "-");
        assert_eq!(row.allocated, "RM 1,234,567.50");
        assert_eq!(row.spent, "RM 0.00");
        assert_eq!(row.utilization, "0.00%");
        assert_eq!(row.score, "-");
    }
}
