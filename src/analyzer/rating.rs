//! Rating classification: checklist percentages to High / Moderate / Low

use crate::{ChecklistResult, FinalRating, Module, Rating, RatingScope, Result, ScoringError};
use serde::{Deserialize, Serialize};

/// Default cut points: at least 75% is High, at least 50% is Moderate
pub const DEFAULT_HIGH: f64 = 75.0;
pub const DEFAULT_MODERATE: f64 = 50.0;

/// Percentage cut points for one scope. Ranges are closed below and open
/// above: `[high, 100]` is High, `[moderate, high)` Moderate, `[0, moderate)` Low.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPair {
    pub high: f64,
    pub moderate: f64,
}

impl ThresholdPair {
    pub fn new(high: f64, moderate: f64) -> Self {
        Self { high, moderate }
    }

    pub fn classify(&self, percentage: f64) -> Rating {
        if percentage >= self.high {
            Rating::High
        } else if percentage >= self.moderate {
            Rating::Moderate
        } else {
            Rating::Low
        }
    }

    fn validate(&self, scope: RatingScope) -> std::result::Result<(), String> {
        let in_range = |v: f64| v.is_finite() && (0.0..=100.0).contains(&v);
        if !in_range(self.high) || !in_range(self.moderate) {
            return Err(format!(
                "{} thresholds must lie within 0..=100 (high {}, moderate {})",
                scope, self.high, self.moderate
            ));
        }
        if self.moderate > self.high {
            return Err(format!(
                "{} moderate threshold {} exceeds high threshold {}",
                scope, self.moderate, self.high
            ));
        }
        Ok(())
    }
}

impl Default for ThresholdPair {
    fn default() -> Self {
        Self::new(DEFAULT_HIGH, DEFAULT_MODERATE)
    }
}

/// Cut points for every rating scope
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingThresholds {
    #[serde(default)]
    pub reporting: ThresholdPair,
    #[serde(default)]
    pub methodological: ThresholdPair,
    #[serde(default)]
    pub relevance: ThresholdPair,
    #[serde(default)]
    pub combined: ThresholdPair,
}

impl RatingThresholds {
    pub fn for_scope(&self, scope: RatingScope) -> ThresholdPair {
        match scope {
            RatingScope::Reporting => self.reporting,
            RatingScope::Methodological => self.methodological,
            RatingScope::Relevance => self.relevance,
            RatingScope::Combined => self.combined,
        }
    }

    /// Check that every pair satisfies `0 <= moderate <= high <= 100`
    pub fn validate(&self) -> Result<()> {
        for scope in [
            RatingScope::Reporting,
            RatingScope::Methodological,
            RatingScope::Relevance,
            RatingScope::Combined,
        ] {
            self.for_scope(scope)
                .validate(scope)
                .map_err(ScoringError::MalformedRuleData)?;
        }
        Ok(())
    }
}

/// Maps checklist results to a final rating using configured thresholds
#[derive(Debug, Clone)]
pub struct RatingClassifier {
    thresholds: RatingThresholds,
}

impl RatingClassifier {
    pub fn new(thresholds: RatingThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &RatingThresholds {
        &self.thresholds
    }

    /// Combined rating. Requires reporting and methodological results;
    /// relevance counts toward the total when present.
    pub fn classify(&self, results: &[ChecklistResult]) -> Result<FinalRating> {
        self.classify_scope(results, RatingScope::Combined)
    }

    /// Rating for one scope
    pub fn classify_scope(
        &self,
        results: &[ChecklistResult],
        scope: RatingScope,
    ) -> Result<FinalRating> {
        let included: Vec<&ChecklistResult> = match scope {
            RatingScope::Reporting => vec![require(results, Module::Reporting)?],
            RatingScope::Methodological => vec![require(results, Module::Methodological)?],
            RatingScope::Relevance => vec![require(results, Module::Relevance)?],
            RatingScope::Combined => {
                let mut parts = vec![
                    require(results, Module::Reporting)?,
                    require(results, Module::Methodological)?,
                ];
                parts.extend(results.iter().find(|r| r.module == Module::Relevance));
                parts
            }
        };

        let total: f64 = included.iter().map(|r| r.total).sum();
        let max_possible: f64 = included.iter().map(|r| r.max_possible).sum();
        if max_possible <= 0.0 {
            return Err(ScoringError::EmptyChecklist(included[0].module));
        }
        let percentage = total * 100.0 / max_possible;
        let rating = self.thresholds.for_scope(scope).classify(percentage);
        log::debug!("{} rating: {:.2}% -> {}", scope, percentage, rating);

        Ok(FinalRating {
            scope,
            rating,
            total,
            max_possible,
            percentage,
        })
    }

    /// Get a description of the rating
    pub fn rating_description(rating: Rating) -> &'static str {
        match rating {
            Rating::High => "Most checklist criteria are supported by explicit evidence",
            Rating::Moderate => "Key information is present but several criteria lack evidence",
            Rating::Low => "Many criteria are unreported or contradicted",
        }
    }
}

impl Default for RatingClassifier {
    fn default() -> Self {
        Self::new(RatingThresholds::default())
    }
}

fn require(results: &[ChecklistResult], module: Module) -> Result<&ChecklistResult> {
    results
        .iter()
        .find(|r| r.module == module)
        .ok_or(ScoringError::MissingModule(module))
}
