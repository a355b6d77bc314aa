use crate::scorecard::domain::{
    CountData, Measurement, MethodKind, RatioData, StageData, TimeData, STAGE_LADDER,
};
use crate::scorecard::numeric::parse_number;
use regex::Regex;
use std::sync::OnceLock;

/// Rebuilds a measurement sub-record from the free-text `Perincian` cell.
///
/// Returns `None` when nothing usable could be recovered; the importer then
/// keeps empty defaults and reports the row as degraded.
pub trait DetailsReconstructor: Send + Sync {
    fn reconstruct(&self, kind: MethodKind, details: &str) -> Option<Measurement>;
}

/// Label keywords deciding which side of a ratio a `label: value` line fills.
#[derive(Debug, Clone)]
pub struct RatioKeywords {
    pub numerator: Vec<&'static str>,
    pub denominator: Vec<&'static str>,
    /// Labels given to numbers recovered without a recognised label.
    pub fallback_numerator_label: &'static str,
    pub fallback_denominator_label: &'static str,
}

impl RatioKeywords {
    fn labels_numerator(&self, label: &str) -> bool {
        self.numerator.iter().any(|keyword| label.contains(keyword))
    }

    fn labels_denominator(&self, label: &str) -> bool {
        self.denominator.iter().any(|keyword| label.contains(keyword))
    }
}

/// The keyword heuristics used for sheets produced by the dashboard.
#[derive(Debug, Clone)]
pub struct KeywordReconstructor {
    pub ratio: RatioKeywords,
    pub minimum_ratio: RatioKeywords,
}

impl KeywordReconstructor {
    pub fn standard() -> Self {
        Self {
            ratio: RatioKeywords {
                numerator: vec!["x", "Perbelanjaan", "Keluar Kemiskinan", "Belanja"],
                denominator: vec!["y", "Peruntukan", "Overall", "Zakat"],
                fallback_numerator_label: "Pencapaian",
                fallback_denominator_label: "Sasaran",
            },
            minimum_ratio: RatioKeywords {
                numerator: vec!["x", "Perbelanjaan", "Amil", "Belanja"],
                denominator: vec!["y", "Peruntukan", "Zakat"],
                fallback_numerator_label: "Perbelanjaan",
                fallback_denominator_label: "Peruntukan",
            },
        }
    }
}

impl Default for KeywordReconstructor {
    fn default() -> Self {
        Self::standard()
    }
}

impl DetailsReconstructor for KeywordReconstructor {
    fn reconstruct(&self, kind: MethodKind, details: &str) -> Option<Measurement> {
        match kind {
            MethodKind::Count => count_from(details).map(Measurement::Count),
            MethodKind::Ratio => ratio_from(details, &self.ratio).map(Measurement::Ratio),
            MethodKind::MinimumRatio => {
                ratio_from(details, &self.minimum_ratio).map(Measurement::MinimumRatio)
            }
            MethodKind::Time => time_from(details).map(Measurement::Time),
            MethodKind::StageProgress => stage_from(details).map(Measurement::StageProgress),
        }
    }
}

static ACHIEVED_COUNT: OnceLock<Regex> = OnceLock::new();
static ACHIEVED_DATE: OnceLock<Regex> = OnceLock::new();
static BARE_NUMBER: OnceLock<Regex> = OnceLock::new();
static STAGE_CELL: OnceLock<Regex> = OnceLock::new();

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("details pattern compiles"))
}

fn count_from(details: &str) -> Option<CountData> {
    let captures =
        pattern(&ACHIEVED_COUNT, r"Pencapaian:\s*([0-9,]+(?:\.[0-9]+)?)").captures(details)?;
    Some(CountData {
        achieved: captures[1].replace(',', ""),
    })
}

fn time_from(details: &str) -> Option<TimeData> {
    let captures = pattern(
        &ACHIEVED_DATE,
        r"Tarikh Berjaya Dicapai:\s*([0-9][0-9T:.+\-Z]*)",
    )
    .captures(details)?;
    Some(TimeData {
        achieved_date: captures[1].to_string(),
    })
}

fn ratio_from(details: &str, keywords: &RatioKeywords) -> Option<RatioData> {
    let mut data = RatioData::default();

    for line in details.split('\n') {
        let mut parts = line.split(':');
        let (Some(label), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let (label, value) = (label.trim(), value.trim());
        if label.is_empty() || value.is_empty() {
            continue;
        }
        let numeric = value.replace([',', '%'], "");
        if parse_number(&numeric).is_none() {
            continue;
        }
        if keywords.labels_numerator(label) {
            data.numerator = numeric;
            data.numerator_label = label.to_string();
        } else if keywords.labels_denominator(label) {
            data.denominator = numeric;
            data.denominator_label = label.to_string();
        }
    }

    if data.numerator.is_empty() || data.denominator.is_empty() {
        let mut numbers = pattern(&BARE_NUMBER, r"\d+(?:,\d+)*").find_iter(details);
        if let (Some(x), Some(y)) = (numbers.next(), numbers.next()) {
            data.numerator = x.as_str().replace(',', "");
            data.denominator = y.as_str().replace(',', "");
            data.numerator_label = keywords.fallback_numerator_label.to_string();
            data.denominator_label = keywords.fallback_denominator_label.to_string();
        }
    }

    if data.numerator.is_empty() && data.denominator.is_empty() {
        None
    } else {
        Some(data)
    }
}

fn stage_from(details: &str) -> Option<StageData> {
    let captures = pattern(&STAGE_CELL, r"(.+?)\s*\((\d+)%\)").captures(details)?;
    let statement = captures[1].trim();

    let by_label = STAGE_LADDER
        .iter()
        .enumerate()
        .filter(|(_, (label, _))| statement.contains(label) || label.contains(statement))
        .map(|(index, _)| index)
        .last();

    let selected = by_label.or_else(|| {
        let percent: u64 = captures[2].parse().ok()?;
        match percent {
            0..=25 => Some(0),
            26..=50 => Some(1),
            51..=75 => Some(2),
            76..=100 => Some(3),
            _ => None,
        }
    });

    Some(StageData::canonical(selected))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(kind: MethodKind, details: &str) -> Option<Measurement> {
        KeywordReconstructor::standard().reconstruct(kind, details)
    }

    #[test]
    fn count_reads_achievement_line() {
        assert_eq!(
            reconstruct(MethodKind::Count, "Sasaran: 200\nPencapaian: 1,250"),
            Some(Measurement::Count(CountData {
                achieved: "1250".to_string()
            }))
        );
        assert_eq!(reconstruct(MethodKind::Count, "Sasaran: 200\nPencapaian: -"), None);
    }

    #[test]
    fn count_keeps_decimal_achievement() {
        assert_eq!(
            reconstruct(MethodKind::Count, "Sasaran: 50\nPencapaian: 1,012.5"),
            Some(Measurement::Count(CountData {
                achieved: "1012.5".to_string()
            }))
        );
    }

    #[test]
    fn ratio_matches_keyword_labels() {
        let measurement = reconstruct(
            MethodKind::Ratio,
            "Jumlah Zakat: 1,000\nKeluar Kemiskinan: 800\n% Sebenar: 80.00%",
        );
        assert_eq!(
            measurement,
            Some(Measurement::Ratio(RatioData {
                numerator: "800".to_string(),
                denominator: "1000".to_string(),
                numerator_label: "Keluar Kemiskinan".to_string(),
                denominator_label: "Jumlah Zakat".to_string(),
            }))
        );
    }

    #[test]
    fn ratio_numerator_keywords_win() {
        // "Belanja y" contains both keyword families.
        let Some(Measurement::Ratio(data)) =
            reconstruct(MethodKind::Ratio, "Belanja y: 30\ny: 60")
        else {
            panic!("expected ratio");
        };
        assert_eq!(data.numerator, "30");
        assert_eq!(data.denominator, "60");
    }

    #[test]
    fn ratio_falls_back_to_bare_numbers() {
        let Some(Measurement::Ratio(data)) =
            reconstruct(MethodKind::Ratio, "Sasaran: 100\nPencapaian: 80")
        else {
            panic!("expected ratio");
        };
        assert_eq!(data.numerator, "100");
        assert_eq!(data.denominator, "80");
        assert_eq!(data.numerator_label, "Pencapaian");
        assert_eq!(data.denominator_label, "Sasaran");

        assert_eq!(reconstruct(MethodKind::Ratio, "tiada data"), None);
    }

    #[test]
    fn minimum_ratio_uses_its_own_keywords() {
        let Some(Measurement::MinimumRatio(data)) = reconstruct(
            MethodKind::MinimumRatio,
            "Kutipan Zakat: 5000\nBelanja Amil: 450\n% Sebenar: 9.00%",
        ) else {
            panic!("expected minimum ratio");
        };
        assert_eq!(data.numerator, "450");
        assert_eq!(data.denominator, "5000");
    }

    #[test]
    fn time_reads_achieved_date() {
        assert_eq!(
            reconstruct(
                MethodKind::Time,
                "Sasaran Tarikh: 2025-06-30\nTarikh Berjaya Dicapai: 2025-07-10"
            ),
            Some(Measurement::Time(TimeData {
                achieved_date: "2025-07-10".to_string()
            }))
        );
    }

    #[test]
    fn time_keeps_time_of_day() {
        assert_eq!(
            reconstruct(
                MethodKind::Time,
                "Sasaran Tarikh: 2025-06-30\nTarikh Berjaya Dicapai: 2025-06-30T09:00"
            ),
            Some(Measurement::Time(TimeData {
                achieved_date: "2025-06-30T09:00".to_string()
            }))
        );
        assert_eq!(
            reconstruct(
                MethodKind::Time,
                "Sasaran Tarikh: 2025-06-30\nTarikh Berjaya Dicapai: 2025-07-01T08:30:00+08:00"
            ),
            Some(Measurement::Time(TimeData {
                achieved_date: "2025-07-01T08:30:00+08:00".to_string()
            }))
        );
    }

    #[test]
    fn stage_matches_ladder_then_percent() {
        assert_eq!(
            reconstruct(MethodKind::StageProgress, "Kelulusan JKUU (50%)"),
            Some(Measurement::StageProgress(StageData::canonical(Some(1))))
        );
        assert_eq!(
            reconstruct(MethodKind::StageProgress, "Kelulusan Mesyuarat MAIWP (75%)"),
            Some(Measurement::StageProgress(StageData::canonical(Some(2))))
        );
        assert_eq!(
            reconstruct(MethodKind::StageProgress, "Draf kertas (60%)"),
            Some(Measurement::StageProgress(StageData::canonical(Some(2))))
        );
        assert_eq!(
            reconstruct(MethodKind::StageProgress, "Lain-lain (140%)"),
            Some(Measurement::StageProgress(StageData::canonical(None)))
        );
        assert_eq!(reconstruct(MethodKind::StageProgress, "-"), None);
    }
}
