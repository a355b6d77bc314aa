use super::super::domain::{KpiRecord, MainCategory};
use super::super::numeric::fixed_2;
use super::super::scoring::Score;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dashboard tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    Kpi,
    Sku,
}

impl CategoryFilter {
    pub fn admits(self, category: Option<MainCategory>) -> bool {
        match self {
            Self::All => true,
            Self::Kpi => category == Some(MainCategory::Kpi),
            Self::Sku => category == Some(MainCategory::Sku),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Kpi => "kpi",
            Self::Sku => "sku",
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "kpi" => Ok(Self::Kpi),
            "sku" => Ok(Self::Sku),
            other => Err(format!("unknown category filter '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Full,
    Ninety,
    Eighty,
    Seventy,
    BelowSeventy,
}

impl ScoreBand {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Full,
            Self::Ninety,
            Self::Eighty,
            Self::Seventy,
            Self::BelowSeventy,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Full => "100%",
            Self::Ninety => "90-99%",
            Self::Eighty => "80-89%",
            Self::Seventy => "70-79%",
            Self::BelowSeventy => "<70%",
        }
    }

    pub fn for_score(value: f64) -> Self {
        if value >= 100.0 {
            Self::Full
        } else if value >= 90.0 {
            Self::Ninety
        } else if value >= 80.0 {
            Self::Eighty
        } else if value >= 70.0 {
            Self::Seventy
        } else {
            Self::BelowSeventy
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandCount {
    pub band: ScoreBand,
    pub band_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub total: usize,
    pub scored: usize,
    /// Mean of the unrounded scores, rounded to two decimals. Zero when
    /// nothing is scored.
    pub average: f64,
    pub met_target: usize,
    pub below_target: usize,
    pub distribution: Vec<BandCount>,
}

impl GroupStats {
    pub fn average_text(&self) -> String {
        fixed_2(self.average)
    }

    pub fn band(&self, band: ScoreBand) -> usize {
        self.distribution
            .iter()
            .find(|entry| entry.band == band)
            .map(|entry| entry.count)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentEntry {
    pub department: String,
    #[serde(flatten)]
    pub stats: GroupStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryEntry {
    pub category: Option<MainCategory>,
    pub category_label: &'static str,
    #[serde(flatten)]
    pub stats: GroupStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub filter: CategoryFilter,
    pub overall: GroupStats,
    pub departments: Vec<DepartmentEntry>,
    pub categories: Vec<CategoryEntry>,
}

/// A stored record as listed to a session, with its position and score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredRecordView {
    pub index: usize,
    #[serde(flatten)]
    pub record: KpiRecord,
    pub score: Score,
}

/// A record scored without being stored.
#[derive(Debug, Clone, Serialize)]
pub struct ScorePreview {
    #[serde(flatten)]
    pub record: KpiRecord,
    pub score: Score,
    pub details: String,
}
