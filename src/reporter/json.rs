//! JSON reporter for machine-readable output

use crate::analyzer::AggregateStats;
use crate::{Evaluation, Rating};
use serde::Serialize;

/// Reporter for JSON output
pub struct JsonReporter {
    /// Whether to pretty-print JSON
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Enable pretty-printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn render<T: Serialize + ?Sized>(&self, value: &T, fallback: &str) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.unwrap_or_else(|e| {
            log::warn!("Failed to serialize report: {}", e);
            fallback.to_string()
        })
    }

    /// Report a single evaluation as JSON
    pub fn report(&self, evaluation: &Evaluation) -> String {
        self.render(evaluation, "{}")
    }

    /// Report multiple evaluations as a JSON array
    pub fn report_many(&self, evaluations: &[Evaluation]) -> String {
        self.render(evaluations, "[]")
    }

    /// Report evaluations together with a summary block
    pub fn report_with_summary(&self, evaluations: &[Evaluation], stats: &AggregateStats) -> String {
        let output = JsonOutput {
            results: evaluations,
            summary: JsonSummary {
                documents_evaluated: stats.documents_evaluated,
                average_percentage: stats.average_percentage,
                average_rating: stats.average_rating,
                high: stats.high,
                moderate: stats.moderate,
                low: stats.low,
                generated_at: chrono::Utc::now().to_rfc3339(),
            },
        };
        self.render(&output, "{}")
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    results: &'a [Evaluation],
    summary: JsonSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSummary {
    documents_evaluated: usize,
    average_percentage: f64,
    average_rating: Option<Rating>,
    high: usize,
    moderate: usize,
    low: usize,
    generated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::EvaluationEngine;
    use crate::rules::builtin_table;
    use std::path::Path;

    fn make_result(path: &str, text: &str) -> Evaluation {
        EvaluationEngine::new(builtin_table().unwrap())
            .evaluate_text(text, Path::new(path))
            .unwrap()
    }

    #[test]
    fn test_json_single_result_has_expected_keys() {
        let result = make_result("study.txt", "Vehicle control in DMSO; cells from ATCC.");
        let json = JsonReporter::new().report(&result);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["filePath"], "study.txt");
        assert!(parsed.get("stats").is_some());
        assert_eq!(parsed["checklists"].as_array().unwrap().len(), 3);
        assert_eq!(parsed["overall"]["scope"], "combined");

        let rq = &parsed["checklists"][0];
        assert_eq!(rq["module"], "RQ");
        assert_eq!(rq["maxPossible"], 24.0);
        let rq4 = &rq["results"][3];
        assert_eq!(rq4["id"], "RQ4");
        assert_eq!(rq4["tier"], "Fulfilled");
        assert_eq!(rq4["kind"], "strong");
        assert_eq!(rq4["score"], 1.0);
        assert_eq!(rq4["matchedKeywords"][0], "dmso");
    }

    #[test]
    fn test_json_default_tier_omits_kind() {
        let result = make_result("empty.txt", "");
        let json = JsonReporter::new().report(&result);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &parsed["checklists"][0]["results"][0];
        assert!(first.get("kind").is_none());
        assert_eq!(first["tier"], "Not reported");
        assert_eq!(first["score"], 0.0);
    }

    #[test]
    fn test_json_pretty_output() {
        let result = make_result("study.txt", "dmso");
        let json = JsonReporter::new().pretty().report(&result);
        assert!(json.contains('\n'), "pretty JSON should have newlines");
        assert!(json.contains("  "), "pretty JSON should have indentation");
    }

    #[test]
    fn test_json_report_many() {
        let r1 = make_result("a.txt", "dmso");
        let r2 = make_result("b.txt", "ethanol");
        let json = JsonReporter::new().report_many(&[r1, r2]);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        let arr = parsed.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["filePath"], "a.txt");
        assert_eq!(arr[1]["filePath"], "b.txt");
    }

    #[test]
    fn test_json_report_many_empty() {
        let json = JsonReporter::new().report_many(&[]);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.as_array().unwrap().is_empty());
    }

    #[test]
    fn test_json_report_with_summary() {
        let r1 = make_result("a.txt", "dmso");
        let r2 = make_result("b.txt", "");
        let stats = AggregateStats {
            documents_evaluated: 2,
            average_percentage: 12.5,
            average_rating: Some(Rating::Low),
            high: 0,
            moderate: 0,
            low: 2,
        };

        let json = JsonReporter::new().report_with_summary(&[r1, r2], &stats);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        let summary = &parsed["summary"];
        assert_eq!(summary["documentsEvaluated"], 2);
        assert_eq!(summary["averagePercentage"], 12.5);
        assert_eq!(summary["averageRating"], "Low");
        assert_eq!(summary["low"], 2);
        assert!(summary["generatedAt"].as_str().unwrap().contains('T'));
        assert_eq!(parsed["results"].as_array().unwrap().len(), 2);
    }
}
