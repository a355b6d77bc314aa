use super::domain::{
    Budget, CountData, KpiRecord, MainCategory, Measurement, MethodKind, RatioData, Stage,
    StageData, TimeData, STAGE_COUNT,
};
use super::numeric::{format_percent, parse_number};
use serde::{Deserialize, Serialize};

/// Partially filled record as submitted by a form.
///
/// Every sub-record is optional; only the one named by `method` is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordDraft {
    pub department: String,
    pub main_category: Option<String>,
    pub statement: String,
    pub target: String,
    pub method: String,
    pub count: Option<CountData>,
    pub ratio: Option<RatioData>,
    pub minimum_ratio: Option<RatioData>,
    pub time: Option<TimeData>,
    pub stages: Option<Vec<Stage>>,
    pub selected_stage: Option<usize>,
    pub budget_allocated: String,
    pub budget_spent: String,
}

impl RecordDraft {
    pub fn from_record(record: &KpiRecord) -> Self {
        let mut draft = Self {
            department: record.department.clone(),
            main_category: record.main_category.map(|category| category.label().to_string()),
            statement: record.statement.clone(),
            target: record.target.clone(),
            method: record.measurement.method_label().to_string(),
            budget_allocated: record.budget.allocated.clone(),
            budget_spent: record.budget.spent.clone(),
            ..Self::default()
        };
        match &record.measurement {
            Measurement::Count(data) => draft.count = Some(data.clone()),
            Measurement::Ratio(data) => draft.ratio = Some(data.clone()),
            Measurement::MinimumRatio(data) => draft.minimum_ratio = Some(data.clone()),
            Measurement::Time(data) => draft.time = Some(data.clone()),
            Measurement::StageProgress(data) => {
                draft.stages = Some(data.stages.to_vec());
                draft.selected_stage = data.selected;
            }
            Measurement::Unrecognized { .. } => {}
        }
        draft
    }
}

/// Build a complete record from a draft.
pub fn normalize(draft: RecordDraft) -> KpiRecord {
    let measurement = match draft.method.parse::<MethodKind>() {
        Ok(MethodKind::Count) => Measurement::Count(draft.count.unwrap_or_default()),
        Ok(MethodKind::Ratio) => Measurement::Ratio(draft.ratio.unwrap_or_default()),
        Ok(MethodKind::MinimumRatio) => {
            Measurement::MinimumRatio(draft.minimum_ratio.unwrap_or_default())
        }
        Ok(MethodKind::Time) => Measurement::Time(draft.time.unwrap_or_default()),
        Ok(MethodKind::StageProgress) => Measurement::StageProgress(stage_data(
            draft.stages.unwrap_or_default(),
            draft.selected_stage,
        )),
        Err(unknown) => Measurement::Unrecognized { label: unknown.0 },
    };

    renormalize(KpiRecord {
        id: None,
        department: draft.department,
        main_category: draft.main_category.as_deref().and_then(MainCategory::parse),
        statement: draft.statement,
        target: draft.target,
        measurement,
        budget: Budget {
            allocated: draft.budget_allocated,
            spent: draft.budget_spent,
            utilization_percent: String::new(),
        },
    })
}

/// Repair an existing record in place of a full rebuild.
///
/// Running this twice gives the same record as running it once.
pub fn renormalize(mut record: KpiRecord) -> KpiRecord {
    trim_in_place(&mut record.department);
    trim_in_place(&mut record.statement);
    trim_in_place(&mut record.target);

    record.measurement = match record.measurement {
        Measurement::Count(mut data) => {
            trim_in_place(&mut data.achieved);
            Measurement::Count(data)
        }
        Measurement::Ratio(data) => Measurement::Ratio(trim_ratio(data)),
        Measurement::MinimumRatio(data) => Measurement::MinimumRatio(trim_ratio(data)),
        Measurement::Time(mut data) => {
            trim_in_place(&mut data.achieved_date);
            Measurement::Time(data)
        }
        Measurement::StageProgress(data) => {
            Measurement::StageProgress(stage_data(data.stages.to_vec(), data.selected))
        }
        Measurement::Unrecognized { label } => Measurement::Unrecognized {
            label: label.trim().to_string(),
        },
    };

    let allocated = canonical_amount(&record.budget.allocated);
    let spent = canonical_amount(&record.budget.spent);
    record.budget = Budget {
        utilization_percent: budget_utilization(&allocated, &spent),
        allocated,
        spent,
    };
    record
}

/// `spent / allocated` as a capped percentage, or `-` when the allocation
/// is missing or not positive.
pub fn budget_utilization(allocated: &str, spent: &str) -> String {
    let (Some(allocated), Some(spent)) = (parse_number(allocated), parse_number(spent)) else {
        return "-".to_string();
    };
    if allocated <= 0.0 {
        return "-".to_string();
    }
    format_percent((spent / allocated * 100.0).clamp(0.0, 100.0))
}

/// Trim a currency amount; blank and zero spellings collapse to `0`.
pub fn canonical_amount(raw: &str) -> String {
    match raw.trim() {
        "" | "0" | "0.00" => "0".to_string(),
        other => other.to_string(),
    }
}

fn stage_data(stages: Vec<Stage>, selected: Option<usize>) -> StageData {
    let selected = selected.filter(|index| *index < STAGE_COUNT);
    if stages.iter().all(Stage::is_blank) {
        return StageData::canonical(selected);
    }

    let mut data = StageData::blank();
    for (slot, stage) in data.stages.iter_mut().zip(stages) {
        *slot = Stage::new(stage.label.trim(), stage.percent.trim());
    }
    data.selected = selected;
    data
}

fn trim_ratio(mut data: RatioData) -> RatioData {
    trim_in_place(&mut data.numerator);
    trim_in_place(&mut data.denominator);
    trim_in_place(&mut data.numerator_label);
    trim_in_place(&mut data.denominator_label);
    data
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}
