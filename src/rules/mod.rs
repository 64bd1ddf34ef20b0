//! Keyword rule table: per-criterion evidence tiers, loaded once and read-only

mod builtin;
mod schema;

pub use builtin::scirap_rule_set;
pub use schema::{ChecklistDef, CriterionDef, DefaultTierDef, RuleSet, TierDef, RULE_SET_VERSION};

use crate::analyzer::{normalize, RatingThresholds};
use crate::{Module, Points, Result, ScoringError, TierKind};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// A keyword or phrase, kept as declared and in normalized match form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    text: String,
    /// Normalized phrase padded with single spaces for whole-word matching
    needle: String,
}

impl Keyword {
    /// Returns None when the keyword has no alphanumeric content
    pub fn new(text: &str) -> Option<Self> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            needle: format!(" {} ", normalized),
        })
    }

    /// Keyword as declared in the rule data
    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn needle(&self) -> &str {
        &self.needle
    }
}

/// One evidence tier of a criterion
#[derive(Debug, Clone, PartialEq)]
pub struct Tier {
    pub kind: TierKind,
    pub label: String,
    pub score: Points,
    pub keywords: Vec<Keyword>,
}

/// Label and score used when no tier matches
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultTier {
    pub label: String,
    pub score: Points,
}

impl Default for DefaultTier {
    fn default() -> Self {
        Self {
            label: "Not reported".to_string(),
            score: Points::Zero,
        }
    }
}

/// One checklist item with its tiers in priority order
#[derive(Debug, Clone, PartialEq)]
pub struct CriterionRule {
    pub id: String,
    pub question: String,
    pub tiers: Vec<Tier>,
    pub default: DefaultTier,
}

impl CriterionRule {
    pub fn new(
        id: impl Into<String>,
        question: impl Into<String>,
        tiers: Vec<Tier>,
        default: DefaultTier,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            tiers,
            default,
        }
    }

    /// Highest score this criterion can produce
    pub fn max_score(&self) -> Points {
        self.tiers
            .iter()
            .map(|t| t.score)
            .chain(std::iter::once(self.default.score))
            .max()
            .unwrap_or(Points::Zero)
    }
}

/// An ordered checklist of criteria for one module
#[derive(Debug, Clone, PartialEq)]
pub struct Checklist {
    pub module: Module,
    pub rules: Vec<CriterionRule>,
}

impl Checklist {
    pub fn new(module: Module, rules: Vec<CriterionRule>) -> Self {
        Self { module, rules }
    }
}

/// Validated, immutable rule table
#[derive(Debug, Clone)]
pub struct RuleTable {
    checklists: Vec<Checklist>,
    /// Criterion id -> (checklist index, rule index)
    index: HashMap<String, (usize, usize)>,
    thresholds: RatingThresholds,
    fingerprint: String,
}

impl RuleTable {
    /// Validate raw rule data and build the table.
    ///
    /// Fails with `MalformedRuleData` when a tier score is not 0, 0.5 or 1,
    /// a criterion id or module appears twice, a criterion has no tiers, a
    /// keyword has no alphanumeric content, or thresholds are out of range.
    pub fn load(set: RuleSet) -> Result<Self> {
        set.thresholds.validate()?;
        let fingerprint = fingerprint_of(&set)?;

        let mut checklists = Vec::with_capacity(set.checklists.len());
        let mut index = HashMap::new();
        let mut modules = HashSet::new();

        for def in set.checklists {
            if !modules.insert(def.module) {
                return Err(ScoringError::MalformedRuleData(format!(
                    "checklist {} is declared more than once",
                    def.module
                )));
            }

            let checklist_idx = checklists.len();
            let mut rules = Vec::with_capacity(def.criteria.len());
            for criterion in def.criteria {
                if index.contains_key(&criterion.id) {
                    return Err(ScoringError::MalformedRuleData(format!(
                        "duplicate criterion id {}",
                        criterion.id
                    )));
                }
                index.insert(criterion.id.clone(), (checklist_idx, rules.len()));
                rules.push(compile_criterion(criterion)?);
            }
            checklists.push(Checklist::new(def.module, rules));
        }

        log::info!(
            "Loaded rule table: {} checklists, {} criteria",
            checklists.len(),
            index.len()
        );

        Ok(Self {
            checklists,
            index,
            thresholds: set.thresholds,
            fingerprint,
        })
    }

    /// Look up a criterion by id
    pub fn get_rule(&self, criterion_id: &str) -> Result<&CriterionRule> {
        let (c, r) = self
            .index
            .get(criterion_id)
            .ok_or_else(|| ScoringError::UnknownCriterion(criterion_id.to_string()))?;
        Ok(&self.checklists[*c].rules[*r])
    }

    pub fn checklist(&self, module: Module) -> Option<&Checklist> {
        self.checklists.iter().find(|c| c.module == module)
    }

    pub fn checklists(&self) -> &[Checklist] {
        &self.checklists
    }

    pub fn thresholds(&self) -> &RatingThresholds {
        &self.thresholds
    }

    /// SHA-256 of the rule data and thresholds; changes whenever scoring could
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn criteria_count(&self) -> usize {
        self.index.len()
    }

    /// Replace the rating thresholds (e.g. from project config)
    pub fn with_thresholds(mut self, thresholds: RatingThresholds) -> Result<Self> {
        thresholds.validate()?;
        let mut hasher = Sha256::new();
        hasher.update(self.fingerprint.as_bytes());
        hasher.update(serialize_for_hash(&thresholds)?);
        self.fingerprint = hex::encode(hasher.finalize());
        self.thresholds = thresholds;
        Ok(self)
    }
}

fn compile_criterion(def: CriterionDef) -> Result<CriterionRule> {
    if def.tiers.is_empty() {
        return Err(ScoringError::MalformedRuleData(format!(
            "criterion {} declares no tiers",
            def.id
        )));
    }

    let mut tiers = Vec::with_capacity(def.tiers.len());
    for tier in def.tiers {
        let score = Points::try_from(tier.score).map_err(|e| {
            ScoringError::MalformedRuleData(format!("{} tier '{}': {}", def.id, tier.label, e))
        })?;
        let mut keywords = Vec::with_capacity(tier.keywords.len());
        for text in &tier.keywords {
            let keyword = Keyword::new(text).ok_or_else(|| {
                ScoringError::MalformedRuleData(format!(
                    "{} tier '{}': keyword {:?} has no letters or digits",
                    def.id, tier.label, text
                ))
            })?;
            keywords.push(keyword);
        }
        tiers.push(Tier {
            kind: tier.kind,
            label: tier.label,
            score,
            keywords,
        });
    }

    let default_score = Points::try_from(def.default.score).map_err(|e| {
        ScoringError::MalformedRuleData(format!("{} default tier: {}", def.id, e))
    })?;

    Ok(CriterionRule {
        id: def.id,
        question: def.question,
        tiers,
        default: DefaultTier {
            label: def.default.label,
            score: default_score,
        },
    })
}

fn serialize_for_hash<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|e| ScoringError::MalformedRuleData(format!("unserializable rule data: {}", e)))
}

fn fingerprint_of(set: &RuleSet) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(serialize_for_hash(set)?);
    Ok(hex::encode(hasher.finalize()))
}

/// Process-wide built-in SciRAP table, validated on first use
pub fn builtin_table() -> Result<&'static RuleTable> {
    static TABLE: OnceLock<RuleTable> = OnceLock::new();
    if let Some(table) = TABLE.get() {
        return Ok(table);
    }
    let table = RuleTable::load(scirap_rule_set())?;
    Ok(TABLE.get_or_init(|| table))
}
