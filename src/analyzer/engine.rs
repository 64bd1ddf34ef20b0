//! Evaluation engine - runs every checklist and the rating classifier

use super::{evaluate, Document, RatingClassifier};
use crate::extract::TextExtractor;
use crate::rules::RuleTable;
use crate::{Evaluation, FinalRating, Rating, RatingScope, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Main evaluation engine that scores documents against a rule table
pub struct EvaluationEngine<'a> {
    table: &'a RuleTable,
    classifier: RatingClassifier,
}

impl<'a> EvaluationEngine<'a> {
    /// Create an engine using the table's rating thresholds
    pub fn new(table: &'a RuleTable) -> Self {
        Self {
            table,
            classifier: RatingClassifier::new(*table.thresholds()),
        }
    }

    pub fn table(&self) -> &RuleTable {
        self.table
    }

    pub fn classifier(&self) -> &RatingClassifier {
        &self.classifier
    }

    /// Extract a study file and evaluate it
    pub fn evaluate(&self, path: &Path, extractor: &dyn TextExtractor) -> Result<Evaluation> {
        let text = extractor.extract(path)?;
        self.evaluate_text(&text, path)
    }

    /// Evaluate text that is already in memory (e.g. stdin).
    /// `virtual_path` is only recorded in the result.
    pub fn evaluate_text(&self, text: &str, virtual_path: &Path) -> Result<Evaluation> {
        self.evaluate_document(&Document::new(text), virtual_path)
    }

    /// Run every checklist of the table, then classify each module and the
    /// combined result
    pub fn evaluate_document(&self, document: &Document, path: &Path) -> Result<Evaluation> {
        let checklists = self
            .table
            .checklists()
            .iter()
            .map(|c| evaluate(document, c))
            .collect::<Result<Vec<_>>>()?;

        let ratings = checklists
            .iter()
            .map(|c| {
                self.classifier
                    .classify_scope(&checklists, RatingScope::for_module(c.module))
            })
            .collect::<Result<Vec<FinalRating>>>()?;

        let overall = self.classifier.classify(&checklists)?;
        log::debug!(
            "{}: overall {} ({:.2}%)",
            path.display(),
            overall.rating,
            overall.percentage
        );

        Ok(Evaluation {
            file_path: path.to_path_buf(),
            stats: document.stats(),
            checklists,
            ratings,
            overall,
        })
    }

    /// Evaluate multiple documents sequentially
    pub fn evaluate_many(
        &self,
        paths: &[&Path],
        extractor: &dyn TextExtractor,
    ) -> Vec<Result<Evaluation>> {
        paths.iter().map(|p| self.evaluate(p, extractor)).collect()
    }

    /// Evaluate multiple documents in parallel using rayon
    pub fn evaluate_parallel(
        &self,
        paths: &[PathBuf],
        extractor: &dyn TextExtractor,
    ) -> Vec<Result<Evaluation>> {
        use rayon::prelude::*;

        paths.par_iter().map(|p| self.evaluate(p, extractor)).collect()
    }

    /// Get aggregate stats from multiple evaluations
    pub fn aggregate_stats(&self, evaluations: &[Evaluation]) -> AggregateStats {
        if evaluations.is_empty() {
            return AggregateStats::default();
        }

        let total_pct: f64 = evaluations.iter().map(|e| e.overall.percentage).sum();
        let average_percentage = total_pct / evaluations.len() as f64;
        let count = |rating: Rating| {
            evaluations
                .iter()
                .filter(|e| e.overall.rating == rating)
                .count()
        };

        AggregateStats {
            documents_evaluated: evaluations.len(),
            average_percentage,
            average_rating: Some(
                self.classifier
                    .thresholds()
                    .combined
                    .classify(average_percentage),
            ),
            high: count(Rating::High),
            moderate: count(Rating::Moderate),
            low: count(Rating::Low),
        }
    }
}

/// Aggregate statistics from multiple document evaluations
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    /// Number of documents evaluated
    pub documents_evaluated: usize,
    /// Mean combined percentage
    pub average_percentage: f64,
    /// Rating of the mean percentage; None when nothing was evaluated
    pub average_rating: Option<Rating>,
    pub high: usize,
    pub moderate: usize,
    pub low: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::PlainTextExtractor;
    use crate::rules::{builtin_table, scirap_rule_set, ChecklistDef, RuleSet};
    use crate::{Module, ScoringError};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const STRONG_STUDY: &str = "\
        Bisphenol A (CAS number 80-05-7, 99% purity by HPLC, lot number 123) was \
        purchased from Sigma. Solubility in DMSO was confirmed; the compound was \
        fully dissolved. A vehicle control and a positive control were included. \
        Primary oligodendrocyte precursor cells (OPC) from ATCC, passage number 3, \
        were cultured in DMEM with 10% FBS and antibiotic at 37C and 5% CO2. \
        Mycoplasma testing was negative. Cells were seeded at a cell density of \
        10000 cells per well and exposed for 24h and 48h to multiple concentrations \
        in a dose response design (nM range, low dose). Viability was measured by \
        MTT and LDH cytotoxicity assays in triplicate using a validated method. \
        Samples were measured at each time point. Results are shown in figure 2 \
        and table 1. ANOVA with GraphPad was used; p value below 0.05. Myelin \
        basic protein (MBP), Olig2 and oxidative stress were examined. This work \
        was funded by grant 42. The authors declare no conflict of interest.";

    fn make_doc(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".txt").unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_evaluate_strong_study() {
        let table = builtin_table().unwrap();
        let engine = EvaluationEngine::new(table);
        let eval = engine
            .evaluate_text(STRONG_STUDY, Path::new("study.txt"))
            .unwrap();

        assert_eq!(eval.checklists.len(), 3);
        assert_eq!(eval.ratings.len(), 3);
        assert_eq!(eval.overall.scope, RatingScope::Combined);
        assert_eq!(eval.overall.max_possible, 44.0);
        assert_eq!(eval.overall.rating, Rating::High);
        assert_eq!(
            eval.checklist(Module::Reporting).unwrap().result("RQ23").unwrap().tier,
            "Fulfilled"
        );
    }

    #[test]
    fn test_evaluate_empty_text_is_low() {
        let table = builtin_table().unwrap();
        let engine = EvaluationEngine::new(table);
        let eval = engine.evaluate_text("", Path::new("empty.txt")).unwrap();
        assert_eq!(eval.overall.total, 0.0);
        assert_eq!(eval.overall.rating, Rating::Low);
        assert_eq!(eval.stats.words, 0);
        for rating in &eval.ratings {
            assert_eq!(rating.rating, Rating::Low);
        }
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let table = builtin_table().unwrap();
        let engine = EvaluationEngine::new(table);
        let a = engine.evaluate_text(STRONG_STUDY, Path::new("a.txt")).unwrap();
        let b = engine.evaluate_text(STRONG_STUDY, Path::new("a.txt")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rating_for_module() {
        let table = builtin_table().unwrap();
        let engine = EvaluationEngine::new(table);
        let eval = engine.evaluate_text(STRONG_STUDY, Path::new("s.txt")).unwrap();
        let r = eval.rating_for(Module::Relevance).unwrap();
        assert_eq!(r.scope, RatingScope::Relevance);
        assert_eq!(r.max_possible, 4.0);
    }

    #[test]
    fn test_table_without_methodological_is_missing_module() {
        let mut set: RuleSet = scirap_rule_set();
        set.checklists.retain(|c: &ChecklistDef| c.module != Module::Methodological);
        let table = RuleTable::load(set).unwrap();
        let engine = EvaluationEngine::new(&table);
        let err = engine.evaluate_text("dmso", Path::new("x.txt")).unwrap_err();
        assert!(matches!(err, ScoringError::MissingModule(Module::Methodological)));
    }

    #[test]
    fn test_evaluate_file() {
        let file = make_doc(STRONG_STUDY);
        let table = builtin_table().unwrap();
        let engine = EvaluationEngine::new(table);
        let eval = engine.evaluate(file.path(), &PlainTextExtractor).unwrap();
        assert_eq!(eval.file_path, file.path());
        assert!(eval.stats.characters > 0);
    }

    #[test]
    fn test_evaluate_many_keeps_going_after_failure() {
        let good = make_doc(STRONG_STUDY);
        let missing = Path::new("/definitely/not/here.txt");
        let table = builtin_table().unwrap();
        let engine = EvaluationEngine::new(table);

        let results = engine.evaluate_many(&[missing, good.path()], &PlainTextExtractor);
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Err(ScoringError::UnreadableFile { .. })));
        assert!(results[1].is_ok());
    }

    #[test]
    fn test_evaluate_parallel_matches_sequential() {
        let a = make_doc(STRONG_STUDY);
        let b = make_doc("Cells were treated with DMSO.");
        let table = builtin_table().unwrap();
        let engine = EvaluationEngine::new(table);

        let paths = vec![a.path().to_path_buf(), b.path().to_path_buf()];
        let parallel = engine.evaluate_parallel(&paths, &PlainTextExtractor);
        let sequential = engine.evaluate_many(&[a.path(), b.path()], &PlainTextExtractor);

        assert_eq!(parallel.len(), 2);
        for (p, s) in parallel.iter().zip(sequential.iter()) {
            assert_eq!(p.as_ref().unwrap(), s.as_ref().unwrap());
        }
    }

    #[test]
    fn test_aggregate_stats_empty() {
        let engine = EvaluationEngine::new(builtin_table().unwrap());
        let stats = engine.aggregate_stats(&[]);
        assert_eq!(stats.documents_evaluated, 0);
        assert_eq!(stats.average_rating, None);
    }

    #[test]
    fn test_aggregate_stats_multiple() {
        let engine = EvaluationEngine::new(builtin_table().unwrap());
        let strong = engine.evaluate_text(STRONG_STUDY, Path::new("a.txt")).unwrap();
        let empty = engine.evaluate_text("", Path::new("b.txt")).unwrap();

        let stats = engine.aggregate_stats(&[strong.clone(), empty]);
        assert_eq!(stats.documents_evaluated, 2);
        assert_eq!(stats.high, 1);
        assert_eq!(stats.low, 1);
        assert_eq!(stats.average_percentage, strong.overall.percentage / 2.0);
    }
}
