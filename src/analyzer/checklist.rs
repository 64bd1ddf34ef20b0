//! Checklist aggregation: score every criterion and total the results

use super::{score, Document};
use crate::rules::Checklist;
use crate::{ChecklistResult, Result, ScoringError};

/// Score every criterion of a checklist in declaration order.
///
/// Fails fast: the first criterion that cannot be scored aborts the checklist.
/// Totals are summed in half points, so they are exact.
pub fn evaluate(document: &Document, checklist: &Checklist) -> Result<ChecklistResult> {
    if checklist.rules.is_empty() {
        return Err(ScoringError::EmptyChecklist(checklist.module));
    }

    let max_units: u32 = checklist
        .rules
        .iter()
        .map(|r| r.max_score().half_units())
        .sum();
    if max_units == 0 {
        return Err(ScoringError::EmptyChecklist(checklist.module));
    }

    let results = checklist
        .rules
        .iter()
        .map(|rule| score(document, rule))
        .collect::<Result<Vec<_>>>()?;

    let total_units: u32 = results.iter().map(|r| r.score.half_units()).sum();
    let total = f64::from(total_units) / 2.0;
    let max_possible = f64::from(max_units) / 2.0;
    let percentage = f64::from(total_units) * 100.0 / f64::from(max_units);

    log::debug!(
        "{} checklist: {} / {} ({:.2}%)",
        checklist.module,
        total,
        max_possible,
        percentage
    );

    Ok(ChecklistResult {
        module: checklist.module,
        results,
        total,
        max_possible,
        percentage,
    })
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use crate::rules::builtin_table;
    use proptest::prelude::*;

    fn arbitrary_methods_text() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop::sample::select(vec![
                "dmso", "vehicle control", "no control", "hplc", "lot number",
                "hepg2", "oligodendrocyte", "triplicate", "anova", "precipitate",
                "cell line", "24h", "funded by", "the", "and", "were",
            ]),
            0..25,
        )
        .prop_map(|parts| parts.join(" "))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn totals_are_bounded_sums_of_declared_scores(ref input in arbitrary_methods_text()) {
            let doc = Document::new(input.as_str());
            for checklist in builtin_table().unwrap().checklists() {
                let result = evaluate(&doc, checklist).unwrap();
                prop_assert_eq!(result.results.len(), checklist.rules.len());

                let mut units = 0u32;
                for (r, rule) in result.results.iter().zip(&checklist.rules) {
                    prop_assert_eq!(&r.id, &rule.id);
                    let declared = rule.tiers.iter().any(|t| t.score == r.score)
                        || rule.default.score == r.score;
                    prop_assert!(declared);
                    units += r.score.half_units();
                }
                prop_assert_eq!(result.total, f64::from(units) / 2.0);
                prop_assert!(result.total <= result.max_possible);
                prop_assert!((0.0..=100.0).contains(&result.percentage));
            }
        }
    }
}
