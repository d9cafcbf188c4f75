//! Projection of a decoded analysis into display groupings.
//!
//! Pure mapping: the input is never mutated and a missing or empty field
//! never panics, it just produces an empty section. Free text comes from an
//! AI backend, so it is NFKC-normalized and stripped of stray control
//! characters before anyone renders it.

use crate::model::DeviceAnalysis;
use crate::score::{self, ScoreBand};
use serde::Serialize;
use std::fmt::Write as _;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub device_name: String,
    pub device_kind: String,
    pub highlights: Vec<String>,
    pub scores: Vec<ScoreRow>,
    pub environmental_impact: String,
    pub composition: Vec<CompositionRow>,
    pub suggestions: Vec<SuggestionRow>,
    pub toxic_components: Vec<ToxicRow>,
    pub disposal: Vec<DisposalSection>,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreRow {
    pub label: &'static str,
    pub value: u8,
    pub band: ScoreBand,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompositionRow {
    pub name: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestionRow {
    pub title: &'static str,
    pub recommended: bool,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToxicRow {
    pub name: String,
    pub risk_level: String,
    pub found_in: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DisposalSection {
    pub title: &'static str,
    pub body: String,
}

impl ScanReport {
    pub fn from_analysis(analysis: &DeviceAnalysis) -> Self {
        let scores = &analysis.eco_score;
        let rec = &analysis.recommendations;

        let disposal = [
            ("Battery", &analysis.disposal_guidelines.battery),
            ("Plastic", &analysis.disposal_guidelines.plastic),
            ("General", &analysis.disposal_guidelines.general),
        ]
        .into_iter()
        .filter(|(_, body)| !body.trim().is_empty())
        .map(|(title, body)| DisposalSection {
            title,
            body: clean_text(body),
        })
        .collect();

        ScanReport {
            device_name: clean_text(&analysis.device_info.name),
            device_kind: clean_text(&analysis.device_info.kind),
            highlights: score::highlights(scores)
                .into_iter()
                .map(String::from)
                .collect(),
            scores: vec![
                score_row("repairability", scores.repairability),
                score_row("recyclability", scores.recyclability),
                score_row("toxicity", scores.toxicity),
                score_row("resale value", scores.resale_value),
            ],
            environmental_impact: clean_text(&scores.environmental_impact),
            composition: analysis
                .components
                .iter()
                .map(|c| CompositionRow {
                    name: clean_text(&c.name),
                    percentage: c.percentage,
                })
                .collect(),
            suggestions: vec![
                suggestion_row("Repair", rec.repair, &rec.repair_notes),
                suggestion_row("Reuse", rec.reuse, &rec.reuse_notes),
                suggestion_row("Recycle", rec.recycle, &rec.recycle_notes),
            ],
            toxic_components: analysis
                .toxic_components
                .iter()
                .map(|t| ToxicRow {
                    name: clean_text(&t.name),
                    risk_level: clean_text(&t.risk_level),
                    found_in: clean_text(&t.found_in),
                })
                .collect(),
            disposal,
            summary: clean_text(&analysis.ai_summary),
        }
    }
}

fn score_row(label: &'static str, value: u8) -> ScoreRow {
    ScoreRow {
        label,
        value,
        band: score::band(value),
    }
}

fn suggestion_row(title: &'static str, recommended: bool, notes: &str) -> SuggestionRow {
    SuggestionRow {
        title,
        recommended,
        notes: clean_text(notes),
    }
}

/// NFKC + C0 control stripping, keeping newline and tab.
fn clean_text(s: &str) -> String {
    s.nfkc()
        .filter(|&ch| ch == '\n' || ch == '\t' || !ch.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn render_text(report: &ScanReport) -> String {
    let mut out = String::new();

    let title = if report.device_name.is_empty() {
        "Unknown device".to_string()
    } else if report.device_kind.is_empty() {
        report.device_name.clone()
    } else {
        format!("{} ({})", report.device_name, report.device_kind)
    };
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "Highlights: {}", report.highlights.join(", "));

    let _ = writeln!(out, "\nEco scores:");
    for row in &report.scores {
        let _ = writeln!(
            out,
            "  {:<13} {:>3}  [{}]",
            row.label,
            row.value,
            row.band.label()
        );
    }

    if !report.environmental_impact.is_empty() {
        let _ = writeln!(out, "\nEnvironmental impact:\n  {}", report.environmental_impact);
    }

    if !report.composition.is_empty() {
        let _ = writeln!(out, "\nComposition:");
        for row in &report.composition {
            let _ = writeln!(out, "  {:<20} {:>5.1}%", row.name, row.percentage);
        }
    }

    let _ = writeln!(out, "\nSuggestions:");
    for s in &report.suggestions {
        let verdict = if s.recommended { "yes" } else { "no" };
        if s.notes.is_empty() {
            let _ = writeln!(out, "  {:<8} {}", s.title, verdict);
        } else {
            let _ = writeln!(out, "  {:<8} {}: {}", s.title, verdict, s.notes);
        }
    }

    if !report.toxic_components.is_empty() {
        let _ = writeln!(out, "\nToxic components:");
        for t in &report.toxic_components {
            let _ = writeln!(out, "  {} [{}] in {}", t.name, t.risk_level, t.found_in);
        }
    }

    if !report.disposal.is_empty() {
        let _ = writeln!(out, "\nDisposal guidelines:");
        for d in &report.disposal {
            let _ = writeln!(out, "  {}: {}", d.title, d.body);
        }
    }

    if !report.summary.is_empty() {
        let _ = writeln!(out, "\nSummary:\n  {}", report.summary);
    }

    out
}
