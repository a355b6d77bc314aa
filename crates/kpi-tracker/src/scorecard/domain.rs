use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Organizational unit codes accepted on form-created records.
pub const DEPARTMENTS: [&str; 21] = [
    "BKP",
    "MCP",
    "BWP",
    "UI",
    "UUU",
    "BPA",
    "MCL",
    "UAD",
    "BPPH",
    "UKK",
    "BPSM",
    "BAZ",
    "BTM",
    "BPI - Dar Assaadah",
    "BPI - Darul Ilmi",
    "BPI - Darul Kifayah",
    "BPI - HQ",
    "BPI - IKB",
    "BPI - PMA",
    "BPI - SMA-MAIWP",
    "BPI - SMISTA",
];

pub fn is_known_department(code: &str) -> bool {
    DEPARTMENTS.contains(&code.trim())
}

/// Collapse the `BPI - <institution>` family into its parent unit.
pub fn parent_department(code: &str) -> &str {
    if code.starts_with("BPI-") || code.starts_with("BPI - ") {
        "BPI"
    } else {
        code
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MainCategory {
    #[serde(rename = "KPI", alias = "kpi")]
    Kpi,
    #[serde(rename = "SKU", alias = "sku")]
    Sku,
}

impl MainCategory {
    pub const fn ordered() -> [Self; 2] {
        [Self::Kpi, Self::Sku]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Kpi => "KPI",
            Self::Sku => "SKU",
        }
    }

    /// Case-insensitive lookup; anything else (including `-`) is uncategorised.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "KPI" => Some(Self::Kpi),
            "SKU" => Some(Self::Sku),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    Count,
    Ratio,
    MinimumRatio,
    Time,
    StageProgress,
}

impl MethodKind {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Count,
            Self::Ratio,
            Self::MinimumRatio,
            Self::Time,
            Self::StageProgress,
        ]
    }

    /// Label used in the `Kaedah Pengukuran` spreadsheet column.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Count => "Bilangan",
            Self::Ratio => "Peratus",
            Self::MinimumRatio => "Peratus Minimum",
            Self::Time => "Masa",
            Self::StageProgress => "Tahap Kemajuan",
        }
    }

    const fn key(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Ratio => "ratio",
            Self::MinimumRatio => "minimum_ratio",
            Self::Time => "time",
            Self::StageProgress => "stage_progress",
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown measurement method '{}'", self.0)
    }
}

impl std::error::Error for UnknownMethod {}

impl FromStr for MethodKind {
    type Err = UnknownMethod;

    /// Accepts the spreadsheet label or the snake-case key, ignoring case.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ordered()
            .into_iter()
            .find(|kind| {
                kind.label().eq_ignore_ascii_case(wanted) || kind.key().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownMethod(wanted.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountData {
    pub achieved: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatioData {
    /// `x`: the achieved quantity, or the spend for minimum ratios.
    pub numerator: String,
    /// `y`: the base quantity, or the allocation for minimum ratios.
    pub denominator: String,
    pub numerator_label: String,
    pub denominator_label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeData {
    pub achieved_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub label: String,
    pub percent: String,
}

impl Stage {
    pub fn new(label: impl Into<String>, percent: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            percent: percent.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.label.trim().is_empty() && self.percent.trim().is_empty()
    }
}

pub const STAGE_COUNT: usize = 4;

/// Milestones used by every stage-progress indicator in the organization.
pub const STAGE_LADDER: [(&str, &str); STAGE_COUNT] = [
    ("Mesyuarat Pengurusan", "25"),
    ("Kelulusan JKUU", "50"),
    ("Kelulusan Mesyuarat MAIWP", "75"),
    ("Kelulusan Parlimen", "100"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageData {
    pub stages: [Stage; STAGE_COUNT],
    #[serde(default)]
    pub selected: Option<usize>,
}

impl StageData {
    pub fn canonical(selected: Option<usize>) -> Self {
        Self {
            stages: STAGE_LADDER.map(|(label, percent)| Stage::new(label, percent)),
            selected,
        }
    }

    pub fn blank() -> Self {
        Self {
            stages: Default::default(),
            selected: None,
        }
    }

    pub fn selected_stage(&self) -> Option<&Stage> {
        self.selected.and_then(|index| self.stages.get(index))
    }
}

impl Default for StageData {
    fn default() -> Self {
        Self::canonical(None)
    }
}

/// The sub-record that is authoritative for a record, tagged by method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Measurement {
    Count(CountData),
    Ratio(RatioData),
    MinimumRatio(RatioData),
    Time(TimeData),
    StageProgress(StageData),
    /// A method name nobody recognises; kept so exports reproduce it.
    Unrecognized { label: String },
}

impl Measurement {
    /// Empty sub-record for a method.
    pub fn empty(kind: MethodKind) -> Self {
        match kind {
            MethodKind::Count => Self::Count(CountData::default()),
            MethodKind::Ratio => Self::Ratio(RatioData::default()),
            MethodKind::MinimumRatio => Self::MinimumRatio(RatioData::default()),
            MethodKind::Time => Self::Time(TimeData::default()),
            MethodKind::StageProgress => Self::StageProgress(StageData::default()),
        }
    }

    pub fn kind(&self) -> Option<MethodKind> {
        match self {
            Self::Count(_) => Some(MethodKind::Count),
            Self::Ratio(_) => Some(MethodKind::Ratio),
            Self::MinimumRatio(_) => Some(MethodKind::MinimumRatio),
            Self::Time(_) => Some(MethodKind::Time),
            Self::StageProgress(_) => Some(MethodKind::StageProgress),
            Self::Unrecognized { .. } => None,
        }
    }

    pub fn method_label(&self) -> &str {
        match self {
            Self::Unrecognized { label } => label.as_str(),
            other => other.kind().map(MethodKind::label).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub allocated: String,
    pub spent: String,
    /// Derived by the normalizer; `-` or `NN.NN%`.
    #[serde(default = "unscored_text")]
    pub utilization_percent: String,
}

fn unscored_text() -> String {
    "-".to_string()
}

/// One KPI or SKU entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub department: String,
    #[serde(default)]
    pub main_category: Option<MainCategory>,
    pub statement: String,
    #[serde(default)]
    pub target: String,
    pub measurement: Measurement,
    #[serde(default)]
    pub budget: Budget,
}

impl KpiRecord {
    pub fn key(&self) -> RecordKey {
        RecordKey {
            department: self.department.clone(),
            statement: self.statement.clone(),
            main_category: self.main_category,
        }
    }

    pub fn matches_key(&self, key: &RecordKey) -> bool {
        self.department == key.department
            && self.statement == key.statement
            && self.main_category == key.main_category
    }
}

/// Composite key used to address records that carry no generated id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordKey {
    pub department: String,
    pub statement: String,
    #[serde(default)]
    pub main_category: Option<MainCategory>,
}
