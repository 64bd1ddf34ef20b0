//! SciRAP: rule-based evaluator for in vitro toxicology studies
//!
//! This library scores the extracted text of a study against the SciRAP
//! Reporting Quality, Methodological Quality and Relevance checklists using
//! literal keyword evidence, and classifies the result as High, Moderate or Low.

pub mod access;
pub mod analyzer;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod reporter;
pub mod rules;

pub use error::{Result, ScoringError};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// SciRAP checklist family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Module {
    /// Reporting Quality (RQ1-RQ24)
    #[serde(rename = "RQ")]
    Reporting,
    /// Methodological Quality (MQ1-MQ16)
    #[serde(rename = "MQ")]
    Methodological,
    /// Relevance (R1-R4)
    #[serde(rename = "R")]
    Relevance,
}

impl Module {
    pub const ALL: [Module; 3] = [Module::Reporting, Module::Methodological, Module::Relevance];

    /// Short code used in criterion identifiers
    pub fn code(&self) -> &'static str {
        match self {
            Module::Reporting => "RQ",
            Module::Methodological => "MQ",
            Module::Relevance => "R",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Module::Reporting => "Reporting Quality",
            Module::Methodological => "Methodological Quality",
            Module::Relevance => "Relevance",
        }
    }

    /// File name of the CSV export for this checklist
    pub fn export_filename(&self) -> &'static str {
        match self {
            Module::Reporting => "RQ_results.csv",
            Module::Methodological => "MQ_results.csv",
            Module::Relevance => "Relevance_results.csv",
        }
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Numeric score of an evidence tier. Only 0, 0.5 and 1 are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub enum Points {
    Zero,
    Half,
    Full,
}

impl Points {
    pub fn value(self) -> f64 {
        match self {
            Points::Zero => 0.0,
            Points::Half => 0.5,
            Points::Full => 1.0,
        }
    }

    /// Score counted in half points, for exact summation
    pub fn half_units(self) -> u32 {
        match self {
            Points::Zero => 0,
            Points::Half => 1,
            Points::Full => 2,
        }
    }
}

impl From<Points> for f64 {
    fn from(points: Points) -> f64 {
        points.value()
    }
}

impl TryFrom<f64> for Points {
    type Error = String;

    fn try_from(value: f64) -> std::result::Result<Self, Self::Error> {
        if value == 0.0 {
            Ok(Points::Zero)
        } else if value == 0.5 {
            Ok(Points::Half)
        } else if value == 1.0 {
            Ok(Points::Full)
        } else {
            Err(format!("score {} is not one of 0, 0.5, 1", value))
        }
    }
}

impl std::fmt::Display for Points {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Points::Zero => write!(f, "0"),
            Points::Half => write!(f, "0.5"),
            Points::Full => write!(f, "1"),
        }
    }
}

/// Evidence tier kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TierKind {
    /// Explicit evidence the criterion is met
    Strong,
    /// Indirect or partial evidence
    Weak,
    /// Evidence the criterion is violated (methodological quality)
    Contradict,
    /// Directly relevant terms
    Direct,
    /// Indirectly relevant terms
    Indirect,
    /// Terms that place the study out of scope
    Excluded,
}

impl TierKind {
    /// Prefix used when describing matched evidence
    pub fn evidence_prefix(&self) -> &'static str {
        match self {
            TierKind::Strong => "Strong",
            TierKind::Weak => "Weak",
            TierKind::Contradict => "Contradictory",
            TierKind::Direct => "Direct",
            TierKind::Indirect => "Indirect",
            TierKind::Excluded => "Excluded terms",
        }
    }
}

impl std::fmt::Display for TierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TierKind::Strong => write!(f, "strong"),
            TierKind::Weak => write!(f, "weak"),
            TierKind::Contradict => write!(f, "contradict"),
            TierKind::Direct => write!(f, "direct"),
            TierKind::Indirect => write!(f, "indirect"),
            TierKind::Excluded => write!(f, "excluded"),
        }
    }
}

/// Outcome of scoring one criterion against one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionResult {
    /// Criterion identifier (e.g. "RQ7")
    pub id: String,
    /// Checklist question
    pub question: String,
    /// Label of the winning tier (e.g. "Partially fulfilled")
    pub tier: String,
    /// Kind of the winning tier; None when the default tier applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TierKind>,
    /// Numeric score of the winning tier
    pub score: Points,
    /// Keywords of the winning tier found in the document
    pub matched_keywords: Vec<String>,
}

impl CriterionResult {
    /// True when no tier matched and the rule's default applied
    pub fn is_default(&self) -> bool {
        self.kind.is_none()
    }

    /// Human-readable evidence summary, e.g. "Strong: hplc, lot number"
    pub fn evidence(&self) -> String {
        match self.kind {
            Some(kind) => format!("{}: {}", kind.evidence_prefix(), self.matched_keywords.join(", ")),
            None => "No information found.".to_string(),
        }
    }
}

/// Scores of every criterion in one checklist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistResult {
    pub module: Module,
    /// Per-criterion results in declaration order
    pub results: Vec<CriterionResult>,
    /// Sum of criterion scores
    pub total: f64,
    /// Sum of each criterion's highest attainable score
    pub max_possible: f64,
    /// total / max_possible * 100
    pub percentage: f64,
}

impl ChecklistResult {
    /// Rows for tabular export, one per criterion
    pub fn rows(&self) -> impl Iterator<Item = ExportRow<'_>> {
        self.results.iter().map(|r| ExportRow {
            criterion: &r.id,
            question: &r.question,
            tier: &r.tier,
            score: r.score.value(),
            matched_keywords: r.matched_keywords.join("; "),
            evidence: r.evidence(),
            status: "scored",
        })
    }

    pub fn result(&self, id: &str) -> Option<&CriterionResult> {
        self.results.iter().find(|r| r.id == id)
    }
}

/// One exported table row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow<'a> {
    #[serde(rename = "Criterion")]
    pub criterion: &'a str,
    #[serde(rename = "Question")]
    pub question: &'a str,
    #[serde(rename = "Tier")]
    pub tier: &'a str,
    #[serde(rename = "Score")]
    pub score: f64,
    #[serde(rename = "Matched Keywords")]
    pub matched_keywords: String,
    #[serde(rename = "Explanation")]
    pub evidence: String,
    /// Always "scored": evaluation is fail-fast, so unscored rows never reach export
    #[serde(rename = "Status")]
    pub status: &'static str,
}

/// Qualitative study rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    High,
    Moderate,
    Low,
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rating::High => write!(f, "High"),
            Rating::Moderate => write!(f, "Moderate"),
            Rating::Low => write!(f, "Low"),
        }
    }
}

/// Which checklist results a rating was computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingScope {
    Reporting,
    Methodological,
    Relevance,
    /// Reporting + methodological (+ relevance when present)
    Combined,
}

impl RatingScope {
    pub fn for_module(module: Module) -> Self {
        match module {
            Module::Reporting => RatingScope::Reporting,
            Module::Methodological => RatingScope::Methodological,
            Module::Relevance => RatingScope::Relevance,
        }
    }
}

impl std::fmt::Display for RatingScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatingScope::Reporting => write!(f, "reporting"),
            RatingScope::Methodological => write!(f, "methodological"),
            RatingScope::Relevance => write!(f, "relevance"),
            RatingScope::Combined => write!(f, "combined"),
        }
    }
}

/// Rating with the totals it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalRating {
    pub scope: RatingScope,
    pub rating: Rating,
    pub total: f64,
    pub max_possible: f64,
    pub percentage: f64,
}

/// Statistics about the evaluated document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    /// Characters in the extracted text
    pub characters: usize,
    /// Words in the normalized text
    pub words: usize,
}

/// Full evaluation of one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    /// Path of the evaluated document
    pub file_path: PathBuf,
    pub stats: DocumentStats,
    /// One result per checklist in the rule table
    pub checklists: Vec<ChecklistResult>,
    /// Per-checklist ratings
    pub ratings: Vec<FinalRating>,
    /// Combined rating
    pub overall: FinalRating,
}

impl Evaluation {
    pub fn checklist(&self, module: Module) -> Option<&ChecklistResult> {
        self.checklists.iter().find(|c| c.module == module)
    }

    pub fn rating_for(&self, module: Module) -> Option<&FinalRating> {
        let scope = RatingScope::for_module(module);
        self.ratings.iter().find(|r| r.scope == scope)
    }
}

/// Public API: evaluate a single document. Used by programmatic consumers.
///
/// * `path` - study file (.txt/.md, or .pdf with the `pdf` feature)
/// * `work_dir` - directory for config lookup
/// * `config_path` - optional path to .sciraprc.json; if None, searches from work_dir
pub fn evaluate_file(
    path: &std::path::Path,
    work_dir: &std::path::Path,
    config_path: Option<&std::path::Path>,
) -> anyhow::Result<Evaluation> {
    let config = crate::config::load_config(work_dir, config_path)?;
    let table = crate::config::load_rule_table(&config)?;
    let engine = crate::analyzer::EvaluationEngine::new(&table);
    let extractor = crate::extract::AutoExtractor::new();
    Ok(engine.evaluate(path, &extractor)?)
}
