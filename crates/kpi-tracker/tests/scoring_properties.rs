use kpi_tracker::scorecard::{normalize, score, RecordDraft, Score};
use kpi_tracker::scorecard::{CountData, RatioData, Stage, TimeData};
use regex::Regex;

fn draft(method: &str, target: &str) -> RecordDraft {
    RecordDraft {
        department: "BKP".to_string(),
        statement: "Petunjuk".to_string(),
        target: target.to_string(),
        method: method.to_string(),
        ..RecordDraft::default()
    }
}

fn count(target: &str, achieved: &str) -> RecordDraft {
    RecordDraft {
        count: Some(CountData {
            achieved: achieved.to_string(),
        }),
        ..draft("Bilangan", target)
    }
}

fn ratio(method: &str, target: &str, numerator: &str, denominator: &str) -> RecordDraft {
    let data = RatioData {
        numerator: numerator.to_string(),
        denominator: denominator.to_string(),
        ..RatioData::default()
    };
    let mut draft = draft(method, target);
    if method == "Peratus" {
        draft.ratio = Some(data);
    } else {
        draft.minimum_ratio = Some(data);
    }
    draft
}

fn time(target: &str, achieved: &str) -> RecordDraft {
    RecordDraft {
        time: Some(TimeData {
            achieved_date: achieved.to_string(),
        }),
        ..draft("Masa", target)
    }
}

fn rendered(draft: RecordDraft) -> String {
    score(&normalize(draft)).to_string()
}

#[test]
fn every_score_renders_as_bounded_percentage_or_dash() {
    let shape = Regex::new(r"^\d{1,3}\.\d{2}%$").expect("pattern compiles");
    let values = ["", "0", "-5", "1", "33.3", "100", "250", "1e3", "abc", "12abc"];

    let mut drafts = Vec::new();
    for target in values {
        for achieved in values {
            drafts.push(count(target, achieved));
            drafts.push(ratio("Peratus", target, achieved, "7"));
            drafts.push(ratio("Peratus", target, "7", achieved));
            drafts.push(ratio("Peratus Minimum", target, achieved, "100"));
        }
    }
    for (target, achieved) in [
        ("2024-01-01", "2023-12-31"),
        ("2024-01-01", "2024-12-31"),
        ("2024-01-01", "2030-01-01"),
        ("2024-01-01", "semalam"),
        ("", "2024-01-01"),
    ] {
        drafts.push(time(target, achieved));
    }
    for selected in [None, Some(0), Some(3), Some(7)] {
        drafts.push(RecordDraft {
            selected_stage: selected,
            ..draft("Tahap Kemajuan", "")
        });
    }

    for draft in drafts {
        let method = draft.method.clone();
        let text = rendered(draft);
        assert!(
            text == "-" || shape.is_match(&text),
            "{method} produced '{text}'"
        );
        if let Some(value) = text.strip_suffix('%') {
            let value: f64 = value.parse().expect("numeric score");
            assert!((0.0..=100.0).contains(&value), "{method} produced {value}");
        }
    }
}

#[test]
fn count_scores_follow_achievement() {
    assert_eq!(rendered(count("200", "150")), "75.00%");
    assert_eq!(rendered(count("200", "400")), "100.00%");
    assert_eq!(rendered(count("3", "1")), "33.33%");
    assert_eq!(rendered(count("0", "5")), "-");
    assert_eq!(rendered(count("200", "")), "-");
}

#[test]
fn ratio_scores_against_target() {
    assert_eq!(rendered(ratio("Peratus", "90", "80", "100")), "88.89%");
    assert_eq!(rendered(ratio("Peratus", "90", "95", "100")), "100.00%");
    assert_eq!(rendered(ratio("Peratus", "", "45", "60")), "75.00%");
    assert_eq!(rendered(ratio("Peratus", "90", "45", "0")), "-");
}

#[test]
fn minimum_ratio_penalises_spend_over_target() {
    assert_eq!(rendered(ratio("Peratus Minimum", "80", "70", "100")), "100.00%");
    assert_eq!(rendered(ratio("Peratus Minimum", "80", "90", "100")), "50.00%");
    assert_eq!(rendered(ratio("Peratus Minimum", "80", "100", "100")), "0.00%");
    assert_eq!(rendered(ratio("Peratus Minimum", "100", "90", "100")), "100.00%");
    assert_eq!(rendered(ratio("Peratus Minimum", "100", "110", "100")), "0.00%");
}

#[test]
fn time_scores_lose_a_fraction_per_late_day() {
    assert_eq!(rendered(time("2024-03-01", "2024-02-20")), "100.00%");
    assert_eq!(rendered(time("2024-03-01", "2024-03-01")), "100.00%");
    assert_eq!(rendered(time("2024-03-01", "2024-03-02")), "99.73%");
    assert_eq!(rendered(time("2024-03-01", "2024-03-01T06:00")), "99.73%");
    assert_eq!(rendered(time("2024-03-01", "")), "-");
}

#[test]
fn stage_score_is_selected_percentage() {
    let selected = RecordDraft {
        selected_stage: Some(1),
        ..draft("Tahap Kemajuan", "")
    };
    assert_eq!(rendered(selected), "50.00%");

    let custom = RecordDraft {
        stages: Some(vec![Stage::new("Draf", "10"), Stage::new("Semakan", "40")]),
        selected_stage: Some(1),
        ..draft("Tahap Kemajuan", "")
    };
    assert_eq!(rendered(custom), "40.00%");

    let unselected = draft("Tahap Kemajuan", "");
    assert_eq!(score(&normalize(unselected)), Score::Unscored);
}

#[test]
fn unknown_method_is_unscored() {
    assert_eq!(rendered(draft("Kualiti", "100")), "-");
}
