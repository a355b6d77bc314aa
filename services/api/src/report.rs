use chrono::NaiveDateTime;
use kpi_tracker::scorecard::report::{DashboardSummary, GroupStats, ScorePreview};
use kpi_tracker::scorecard::ScoreBand;
use std::fmt::Write;

/// Plain-text dashboard for the `summary` command.
pub(crate) fn render_summary(summary: &DashboardSummary, generated_at: NaiveDateTime) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "KPI scorecard summary ({})", summary.filter);
    let _ = writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M"));
    write_stats(&mut out, "Overall", &summary.overall);

    if summary.departments.is_empty() {
        let _ = writeln!(out, "\nDepartments: none scored");
    } else {
        let _ = writeln!(out, "\nDepartments (by average score)");
        for (rank, entry) in summary.departments.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {:>2}. {:<8} {:>7}% | {} scored | {} met target",
                rank + 1,
                entry.department,
                entry.stats.average_text(),
                entry.stats.scored,
                entry.stats.met_target
            );
        }
    }

    if !summary.categories.is_empty() {
        let _ = writeln!(out, "\nCategories");
        for entry in &summary.categories {
            let _ = writeln!(
                out,
                "  - {}: {} records | {}% average",
                entry.category_label,
                entry.stats.total,
                entry.stats.average_text()
            );
        }
    }
    out
}

fn write_stats(out: &mut String, heading: &str, stats: &GroupStats) {
    let _ = writeln!(
        out,
        "{heading}: {} records, {} scored, {}% average",
        stats.total,
        stats.scored,
        stats.average_text()
    );
    let _ = writeln!(
        out,
        "  Met target: {} | Below target: {}",
        stats.met_target, stats.below_target
    );
    let bands: Vec<String> = ScoreBand::ordered()
        .into_iter()
        .map(|band| format!("{} {}", band.label(), stats.band(band)))
        .collect();
    let _ = writeln!(out, "  Distribution: {}", bands.join(" | "));
}

pub(crate) fn render_preview(preview: &ScorePreview) -> String {
    let mut out = String::new();
    let record = &preview.record;
    let _ = writeln!(
        out,
        "{} [{}] {}",
        record.department,
        record.measurement.method_label(),
        record.statement
    );
    let _ = writeln!(out, "Score: {}", preview.score);
    for line in preview.details.lines() {
        let _ = writeln!(out, "  {line}");
    }
    let _ = writeln!(out, "Budget used: {}", record.budget.utilization_percent);
    out
}
