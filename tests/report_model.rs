use ecoscan::envelope::decode_analysis;
use ecoscan::model::DeviceAnalysis;
use ecoscan::report::{ScanReport, render_text};
use ecoscan::score::ScoreBand;

fn full_analysis() -> DeviceAnalysis {
    decode_analysis(
        r#"{
        "device_info": {"name": "Galaxy S8", "type": "Smartphone"},
        "eco_score": {
            "repairability": 72,
            "recyclability": 85,
            "toxicity": 55,
            "resale_value": 30,
            "environmental_impact": "Moderate footprint."
        },
        "components": [
            {"name": "Aluminium", "percentage": 24},
            {"name": "Glass", "percentage": 18}
        ],
        "recommendations": {
            "repair": true, "repair_notes": "Battery swap is easy.",
            "reuse": false, "reuse_notes": "Too old for resale.",
            "recycle": true, "recycle_notes": "Certified recycler only."
        },
        "toxic_components": [
            {"name": "Lithium", "risk_level": "High", "found_in": "Battery"}
        ],
        "disposal_guidelines": {
            "battery": "Remove before disposal.",
            "plastic": "",
            "general": "Take to a collection point."
        },
        "ai_summary": "A well-studied device."
    }"#,
    )
    .unwrap()
}

#[test]
fn projects_all_groupings() {
    let analysis = full_analysis();
    let report = ScanReport::from_analysis(&analysis);

    assert_eq!(report.device_name, "Galaxy S8");
    assert_eq!(report.device_kind, "Smartphone");
    assert_eq!(
        report.highlights,
        vec!["High Recyclability", "Repair-Friendly", "Smart Suggestions"]
    );

    assert_eq!(report.scores.len(), 4);
    assert_eq!(report.scores[0].label, "repairability");
    assert_eq!(report.scores[0].band, ScoreBand::Good);
    assert_eq!(report.scores[2].value, 55);
    assert_eq!(report.scores[2].band, ScoreBand::Caution);
    assert_eq!(report.scores[3].band, ScoreBand::Risk);

    assert_eq!(report.composition.len(), 2);
    assert_eq!(report.suggestions.len(), 3);
    assert!(report.suggestions[0].recommended);
    assert!(!report.suggestions[1].recommended);
    assert_eq!(report.suggestions[2].notes, "Certified recycler only.");

    assert_eq!(report.toxic_components.len(), 1);
    assert_eq!(report.toxic_components[0].risk_level, "High");

    // The empty plastic guideline is omitted.
    let titles: Vec<&str> = report.disposal.iter().map(|d| d.title).collect();
    assert_eq!(titles, vec!["Battery", "General"]);
}

#[test]
fn projection_never_mutates_the_input() {
    let analysis = full_analysis();
    let before = serde_json::to_value(&analysis).unwrap();
    let _ = ScanReport::from_analysis(&analysis);
    assert_eq!(serde_json::to_value(&analysis).unwrap(), before);
}

#[test]
fn empty_analysis_projects_without_panicking() {
    let report = ScanReport::from_analysis(&DeviceAnalysis::default());
    assert_eq!(report.device_name, "");
    assert_eq!(report.highlights, vec!["Smart Suggestions"]);
    assert!(report.composition.is_empty());
    assert!(report.toxic_components.is_empty());
    assert!(report.disposal.is_empty());
    assert_eq!(report.scores.len(), 4);
    for row in &report.scores {
        assert_eq!(row.band, ScoreBand::Risk);
    }

    let text = render_text(&report);
    assert!(text.contains("Unknown device"));
    assert!(text.contains("Eco scores"));
}

#[test]
fn free_text_is_cleaned() {
    let analysis = decode_analysis(
        "{\"ai_summary\": \"A \\u0007clean \\ufb01nish\", \"device_info\": {\"name\": \" padded \"}}",
    )
    .unwrap();
    let report = ScanReport::from_analysis(&analysis);

    // Control characters are stripped, the ligature is normalized and the
    // name is trimmed.
    assert_eq!(report.summary, "A clean finish");
    assert_eq!(report.device_name, "padded");
}

#[test]
fn rendered_text_carries_every_section() {
    let report = ScanReport::from_analysis(&full_analysis());
    let text = render_text(&report);
    for needle in [
        "Galaxy S8",
        "Highlights:",
        "Eco scores:",
        "Environmental impact:",
        "Composition:",
        "Suggestions:",
        "Toxic components:",
        "Disposal guidelines:",
        "Summary:",
    ] {
        assert!(text.contains(needle), "missing section: {needle}");
    }
}
