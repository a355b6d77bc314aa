use super::super::domain::{parent_department, KpiRecord, MainCategory};
use super::super::numeric::fixed_2;
use super::super::scoring::score;
use super::views::{
    BandCount, CategoryEntry, CategoryFilter, DashboardSummary, DepartmentEntry, GroupStats,
    ScoreBand,
};
use std::collections::HashMap;

const UNCATEGORISED_LABEL: &str = "Uncategorised";

#[derive(Debug, Default, Clone)]
struct GroupTally {
    total: usize,
    scores: Vec<f64>,
}

impl GroupTally {
    fn record(&mut self, score: Option<f64>) {
        self.total += 1;
        if let Some(value) = score {
            self.scores.push(value);
        }
    }

    fn to_stats(&self) -> GroupStats {
        let distribution = ScoreBand::ordered()
            .into_iter()
            .map(|band| BandCount {
                band,
                band_label: band.label(),
                count: self
                    .scores
                    .iter()
                    .filter(|value| ScoreBand::for_score(**value) == band)
                    .count(),
            })
            .collect();

        let met_target = self.scores.iter().filter(|value| **value >= 100.0).count();

        GroupStats {
            total: self.total,
            scored: self.scores.len(),
            average: self.average(),
            met_target,
            below_target: self.scores.len() - met_target,
            distribution,
        }
    }

    fn average(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        let mean = self.scores.iter().sum::<f64>() / self.scores.len() as f64;
        fixed_2(mean).parse().unwrap_or_default()
    }
}

/// Dashboard figures for the records admitted by `filter`.
pub fn summarize(records: &[KpiRecord], filter: CategoryFilter) -> DashboardSummary {
    let mut overall = GroupTally::default();
    let mut departments: Vec<(String, GroupTally)> = Vec::new();
    let mut department_index: HashMap<String, usize> = HashMap::new();
    let mut categories: HashMap<Option<MainCategory>, GroupTally> = HashMap::new();

    for record in records
        .iter()
        .filter(|record| filter.admits(record.main_category))
    {
        let value = score(record).value();
        overall.record(value);
        categories
            .entry(record.main_category)
            .or_default()
            .record(value);

        if let Some(value) = value {
            let department = parent_department(&record.department).to_string();
            let slot = *department_index
                .entry(department.clone())
                .or_insert_with(|| {
                    departments.push((department, GroupTally::default()));
                    departments.len() - 1
                });
            departments[slot].1.record(Some(value));
        }
    }

    let mut departments: Vec<DepartmentEntry> = departments
        .into_iter()
        .map(|(department, tally)| DepartmentEntry {
            department,
            stats: tally.to_stats(),
        })
        .collect();
    departments.sort_by(|a, b| b.stats.average.total_cmp(&a.stats.average));

    let categories = MainCategory::ordered()
        .into_iter()
        .map(Some)
        .chain(std::iter::once(None))
        .filter_map(|category| {
            categories.get(&category).map(|tally| CategoryEntry {
                category,
                category_label: category.map_or(UNCATEGORISED_LABEL, MainCategory::label),
                stats: tally.to_stats(),
            })
        })
        .collect();

    DashboardSummary {
        filter,
        overall: overall.to_stats(),
        departments,
        categories,
    }
}
