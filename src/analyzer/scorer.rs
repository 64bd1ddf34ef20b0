//! Criterion scorer: first matching evidence tier wins

use super::Document;
use crate::rules::CriterionRule;
use crate::{CriterionResult, Result, ScoringError};

/// Score one criterion against a document.
///
/// Tiers are tried in declared order. A tier matches when at least one of its
/// keywords occurs in the normalized text as a whole-word phrase. Only the
/// winning tier's matched keywords are recorded, in declared keyword order.
pub fn score(document: &Document, rule: &CriterionRule) -> Result<CriterionResult> {
    if rule.tiers.is_empty() {
        return Err(ScoringError::InvalidRule {
            id: rule.id.clone(),
            reason: "no evidence tiers declared".to_string(),
        });
    }

    for tier in &rule.tiers {
        let matched: Vec<String> = tier
            .keywords
            .iter()
            .filter(|k| document.contains_phrase(k.needle()))
            .map(|k| k.text().to_string())
            .collect();

        if !matched.is_empty() {
            log::debug!(
                "{}: {} tier '{}' via {:?}",
                rule.id,
                tier.kind,
                tier.label,
                matched
            );
            return Ok(CriterionResult {
                id: rule.id.clone(),
                question: rule.question.clone(),
                tier: tier.label.clone(),
                kind: Some(tier.kind),
                score: tier.score,
                matched_keywords: matched,
            });
        }
    }

    log::debug!("{}: no evidence, default '{}'", rule.id, rule.default.label);
    Ok(CriterionResult {
        id: rule.id.clone(),
        question: rule.question.clone(),
        tier: rule.default.label.clone(),
        kind: None,
        score: rule.default.score,
        matched_keywords: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{builtin_table, DefaultTier, Keyword, Tier};
    use crate::{Points, TierKind};

    fn tier(kind: TierKind, label: &str, score: Points, keywords: &[&str]) -> Tier {
        Tier {
            kind,
            label: label.to_string(),
            score,
            keywords: keywords.iter().filter_map(|k| Keyword::new(k)).collect(),
        }
    }

    fn strong_weak(strong: &[&str], weak: &[&str]) -> CriterionRule {
        CriterionRule::new(
            "RQ7",
            "Source of test system stated",
            vec![
                tier(TierKind::Strong, "Fulfilled", Points::Full, strong),
                tier(TierKind::Weak, "Partially fulfilled", Points::Half, weak),
            ],
            DefaultTier::default(),
        )
    }

    #[test]
    fn test_strong_beats_weak() {
        let rule = strong_weak(&["atcc"], &["obtained from"]);
        let doc = Document::new("Cells were obtained from ATCC.");
        let result = score(&doc, &rule).unwrap();
        assert_eq!(result.tier, "Fulfilled");
        assert_eq!(result.kind, Some(TierKind::Strong));
        assert_eq!(result.score, Points::Full);
        assert_eq!(result.matched_keywords, vec!["atcc"]);
    }

    #[test]
    fn test_weak_only() {
        let rule = strong_weak(&["atcc"], &["obtained from"]);
        let doc = Document::new("Cells were obtained from a collaborator.");
        let result = score(&doc, &rule).unwrap();
        assert_eq!(result.tier, "Partially fulfilled");
        assert_eq!(result.score, Points::Half);
        assert_eq!(result.matched_keywords, vec!["obtained from"]);
    }

    #[test]
    fn test_no_evidence_gives_default() {
        let rule = strong_weak(&["atcc"], &["obtained from"]);
        let result = score(&Document::new("Nothing relevant here."), &rule).unwrap();
        assert_eq!(result.tier, "Not reported");
        assert!(result.is_default());
        assert_eq!(result.score, Points::Zero);
        assert!(result.matched_keywords.is_empty());
        assert_eq!(result.evidence(), "No information found.");
    }

    #[test]
    fn test_empty_text_gives_default() {
        let table = builtin_table().unwrap();
        for checklist in table.checklists() {
            for rule in &checklist.rules {
                let result = score(&Document::new(""), rule).unwrap();
                assert!(result.is_default(), "{} matched empty text", rule.id);
                assert_eq!(result.score, rule.default.score);
            }
        }
    }

    #[test]
    fn test_case_insensitive() {
        let rule = strong_weak(&["cell line"], &[]);
        let doc = Document::new("The CELL LINE was authenticated.");
        assert_eq!(score(&doc, &rule).unwrap().score, Points::Full);
    }

    #[test]
    fn test_phrase_must_be_contiguous() {
        let rule = strong_weak(&["vehicle control"], &[]);
        let doc = Document::new("The vehicle was used as a control.");
        assert!(score(&doc, &rule).unwrap().is_default());
    }

    #[test]
    fn test_phrase_spans_line_break_and_punctuation() {
        let rule = strong_weak(&["vehicle control"], &[]);
        let doc = Document::new("a vehicle\ncontrol (0.1% DMSO)");
        assert_eq!(score(&doc, &rule).unwrap().score, Points::Full);
    }

    #[test]
    fn test_word_bounded_matching() {
        let rule = strong_weak(&["trial"], &[]);
        let doc = Document::new("An industrial solvent was used.");
        assert!(score(&doc, &rule).unwrap().is_default());
    }

    #[test]
    fn test_no_stemming() {
        let rule = strong_weak(&["replicates"], &[]);
        let doc = Document::new("Each assay was run in one replicate.");
        assert!(score(&doc, &rule).unwrap().is_default());
    }

    #[test]
    fn test_matched_keywords_in_declared_order() {
        let rule = strong_weak(&["hplc", "lot number", "batch number"], &[]);
        let doc = Document::new("Batch number 4, lot number 7, purity by HPLC.");
        let result = score(&doc, &rule).unwrap();
        assert_eq!(
            result.matched_keywords,
            vec!["hplc", "lot number", "batch number"]
        );
        assert_eq!(result.evidence(), "Strong: hplc, lot number, batch number");
    }

    #[test]
    fn test_only_winning_tier_keywords_recorded() {
        let rule = strong_weak(&["atcc"], &["obtained from", "purchased from"]);
        let doc = Document::new("Purchased from ATCC and obtained from stock.");
        let result = score(&doc, &rule).unwrap();
        assert_eq!(result.matched_keywords, vec!["atcc"]);
    }

    #[test]
    fn test_contradiction_beats_strong() {
        let table = builtin_table().unwrap();
        let rule = table.get_rule("MQ4").unwrap();
        let doc = Document::new("A vehicle control was planned, but there was no control group.");
        let result = score(&doc, rule).unwrap();
        assert_eq!(result.kind, Some(TierKind::Contradict));
        assert_eq!(result.tier, "Not fulfilled");
        assert_eq!(result.score, Points::Zero);
        assert_eq!(result.evidence(), "Contradictory: no control");
    }

    #[test]
    fn test_exclusion_beats_direct_relevance() {
        let table = builtin_table().unwrap();
        let rule = table.get_rule("R2").unwrap();
        let doc = Document::new("Oligodendrocyte toxicity was compared in HepG2 cells.");
        let result = score(&doc, rule).unwrap();
        assert_eq!(result.kind, Some(TierKind::Excluded));
        assert_eq!(result.tier, "Not relevant");
        assert_eq!(result.score, Points::Zero);
        assert_eq!(result.matched_keywords, vec!["hepg2"]);
    }

    #[test]
    fn test_direct_relevance() {
        let table = builtin_table().unwrap();
        let rule = table.get_rule("R1").unwrap();
        let doc = Document::new("Exposure to bisphenol A and cadmium.");
        let result = score(&doc, rule).unwrap();
        assert_eq!(result.tier, "Directly relevant");
        assert_eq!(result.matched_keywords, vec!["bisphenol", "cadmium"]);
    }

    #[test]
    fn test_tierless_rule_is_invalid() {
        let rule = CriterionRule::new("X1", "", vec![], DefaultTier::default());
        let err = score(&Document::new("anything"), &rule).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidRule { ref id, .. } if id == "X1"));
    }

    #[test]
    fn test_score_is_declared_score() {
        let table = builtin_table().unwrap();
        let doc = Document::new(
            "HepG2 cells from ATCC were treated with 10 uM bisphenol for 24h in DMEM \
             with FBS at 37C and 5% CO2. Viability was measured by MTT in triplicate; \
             ANOVA was used. Funded by grant 12. No competing interests.",
        );
        for checklist in table.checklists() {
            for rule in &checklist.rules {
                let result = score(&doc, rule).unwrap();
                let mut declared = rule
                    .tiers
                    .iter()
                    .map(|t| t.score)
                    .chain(std::iter::once(rule.default.score));
                assert!(declared.any(|s| s == result.score));
            }
        }
    }
}
