//! Rule file schema and deserialization

use crate::analyzer::RatingThresholds;
use crate::{Module, TierKind};
use serde::{Deserialize, Serialize};

pub const RULE_SET_VERSION: u32 = 1;

fn default_version() -> u32 {
    RULE_SET_VERSION
}

/// Root of a rule file: every checklist plus the rating cut points
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Checklists in evaluation order
    pub checklists: Vec<ChecklistDef>,

    /// Percentage cut points per rating scope
    #[serde(default)]
    pub thresholds: RatingThresholds,
}

/// One checklist (RQ, MQ or R) and its criteria in declaration order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistDef {
    pub module: Module,
    pub criteria: Vec<CriterionDef>,
}

/// One checklist item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionDef {
    /// Identifier such as "RQ7"
    pub id: String,

    #[serde(default)]
    pub question: String,

    /// Tiers in priority order; the first tier with a matching keyword wins
    pub tiers: Vec<TierDef>,

    /// Applied when no tier matches
    #[serde(default)]
    pub default: DefaultTierDef,
}

/// An evidence tier. The score is kept as a raw number here so that values
/// outside 0 / 0.5 / 1 are reported as malformed rule data at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierDef {
    pub kind: TierKind,
    pub label: String,
    pub score: f64,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultTierDef {
    pub label: String,
    pub score: f64,
}

impl Default for DefaultTierDef {
    fn default() -> Self {
        Self {
            label: "Not reported".to_string(),
            score: 0.0,
        }
    }
}
