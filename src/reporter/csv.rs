//! CSV export: one table per checklist

use crate::{ChecklistResult, Evaluation};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes checklist results as CSV tables
#[derive(Debug, Default)]
pub struct CsvReporter;

impl CsvReporter {
    pub fn new() -> Self {
        Self
    }

    /// Render one checklist with a header row
    pub fn to_string(&self, checklist: &ChecklistResult) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in checklist.rows() {
            writer
                .serialize(row)
                .with_context(|| format!("Failed to serialize {} row", checklist.module))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e))?;
        String::from_utf8(bytes).context("CSV output is not UTF-8")
    }

    /// Write one checklist to `path`
    pub fn write(&self, checklist: &ChecklistResult, path: &Path) -> Result<()> {
        let content = self.to_string(checklist)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write CSV to {}", path.display()))
    }

    /// Write every checklist of an evaluation into `dir` (RQ_results.csv,
    /// MQ_results.csv, Relevance_results.csv), creating `dir` if needed
    pub fn export_all(&self, evaluation: &Evaluation, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create export directory {}", dir.display()))?;

        let mut written = Vec::with_capacity(evaluation.checklists.len());
        for checklist in &evaluation.checklists {
            let path = dir.join(checklist.module.export_filename());
            self.write(checklist, &path)?;
            log::debug!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::EvaluationEngine;
    use crate::rules::builtin_table;
    use crate::Module;
    use tempfile::TempDir;

    fn evaluation(text: &str) -> Evaluation {
        EvaluationEngine::new(builtin_table().unwrap())
            .evaluate_text(text, Path::new("study.txt"))
            .unwrap()
    }

    #[test]
    fn test_csv_header_and_rows() {
        let eval = evaluation("Purity by HPLC, lot number 12.");
        let rq = eval.checklist(Module::Reporting).unwrap();
        let csv = CsvReporter::new().to_string(rq).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "Criterion,Question,Tier,Score,Matched Keywords,Explanation,Status"
        );
        assert_eq!(lines.len(), 1 + 24);
        assert!(lines[2].starts_with("RQ2,Purity was stated or traceable,Fulfilled,1.0,"));
        assert!(lines[2].ends_with(",scored"));
    }

    #[test]
    fn test_csv_quotes_embedded_commas() {
        let eval = evaluation("HPLC and lot number were reported.");
        let rq = eval.checklist(Module::Reporting).unwrap();
        let csv = CsvReporter::new().to_string(rq).unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        let rq2 = &rows[1];
        assert_eq!(&rq2[0], "RQ2");
        assert_eq!(&rq2[4], "hplc; lot number");
        assert_eq!(&rq2[5], "Strong: hplc, lot number");
        assert!(csv.contains("\"Strong: hplc, lot number\""));
    }

    #[test]
    fn test_csv_default_row() {
        let eval = evaluation("");
        let r = eval.checklist(Module::Relevance).unwrap();
        let csv = CsvReporter::new().to_string(r).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[1],
            "R1,Identity of the tested substance,Not relevant,0.0,,No information found.,scored"
        );
    }

    #[test]
    fn test_export_all_writes_three_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("exports");
        let eval = evaluation("dmso");

        let written = CsvReporter::new().export_all(&eval, &out).unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["RQ_results.csv", "MQ_results.csv", "Relevance_results.csv"]
        );
        for path in &written {
            assert!(fs::read_to_string(path).unwrap().starts_with("Criterion,"));
        }
    }
}
