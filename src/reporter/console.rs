//! Console reporter with colored output

use crate::analyzer::{AggregateStats, RatingClassifier};
use crate::{ChecklistResult, CriterionResult, Evaluation, FinalRating, Rating, TierKind};
use colored::Colorize;

/// Reporter for terminal output
pub struct ConsoleReporter {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to show verbose output
    verbose: bool,
}

impl ConsoleReporter {
    /// Create a new console reporter
    pub fn new() -> Self {
        Self {
            use_colors: true,
            verbose: false,
        }
    }

    /// Disable colors
    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    /// Enable verbose output (checklist questions and default-tier items)
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Report a single evaluation
    pub fn report(&self, evaluation: &Evaluation) {
        self.print_header(evaluation);
        self.print_overall(&evaluation.overall);
        for checklist in &evaluation.checklists {
            let rating = evaluation.rating_for(checklist.module);
            self.print_checklist(checklist, rating);
        }
        println!();
    }

    /// Report multiple evaluations with summary
    pub fn report_many(&self, evaluations: &[Evaluation], stats: &AggregateStats) {
        for evaluation in evaluations {
            self.report(evaluation);
            println!("{}", "─".repeat(60));
        }

        self.print_summary(stats);
    }

    /// Report in quiet mode (just the combined percentage and rating)
    pub fn report_quiet(&self, evaluation: &Evaluation) {
        println!("{}", self.quiet_line(evaluation));
    }

    fn quiet_line(&self, evaluation: &Evaluation) -> String {
        format!(
            "{}: {:.1}% ({})",
            evaluation.file_path.display(),
            evaluation.overall.percentage,
            self.colorize_rating(evaluation.overall.rating)
        )
    }

    fn print_header(&self, evaluation: &Evaluation) {
        println!();
        println!(
            "{}",
            format!("SciRAP Evaluation: {}", evaluation.file_path.display()).bold()
        );
        println!(
            "   Characters: {} | Words: {}",
            evaluation.stats.characters, evaluation.stats.words
        );
        println!();
    }

    fn print_overall(&self, overall: &FinalRating) {
        let bar = self.create_score_bar(overall.percentage, overall.rating);
        println!(
            "   Overall: {} {}",
            bar,
            self.colorize_rating(overall.rating).bold()
        );
        println!(
            "   {} / {} points",
            format_points(overall.total),
            format_points(overall.max_possible)
        );
        println!(
            "   {}",
            RatingClassifier::rating_description(overall.rating).dimmed()
        );
        println!();
    }

    fn print_checklist(&self, checklist: &ChecklistResult, rating: Option<&FinalRating>) {
        let rating_str = rating
            .map(|r| format!(" {}", self.colorize_rating(r.rating)))
            .unwrap_or_default();
        println!(
            "   {} ({}): {}/{} {}{}",
            checklist.module.title().bold(),
            checklist.module,
            format_points(checklist.total),
            format_points(checklist.max_possible),
            self.create_mini_bar(checklist.percentage),
            rating_str
        );

        let mut hidden = 0;
        for result in &checklist.results {
            if result.is_default() && !self.verbose {
                hidden += 1;
                continue;
            }
            self.print_criterion(result);
        }
        if hidden > 0 {
            println!(
                "   {} {} items without evidence (use --verbose to show)",
                "·".dimmed(),
                hidden
            );
        }
        println!();
    }

    fn print_criterion(&self, result: &CriterionResult) {
        let icon = match result.kind {
            Some(TierKind::Strong | TierKind::Direct) => "✓".green(),
            Some(TierKind::Weak | TierKind::Indirect) => "◐".yellow(),
            Some(TierKind::Contradict | TierKind::Excluded) => "✗".red(),
            None => "·".dimmed(),
        };
        println!(
            "   {} {:<5} {:<20} {}",
            icon,
            result.id,
            result.tier,
            result.evidence().dimmed()
        );
        if self.verbose && !result.question.is_empty() {
            println!("       {} {}", "↳".dimmed(), result.question.italic());
        }
    }

    fn print_summary(&self, stats: &AggregateStats) {
        println!();
        println!("{}", "═".repeat(60));
        println!("{}", "Summary".bold());
        println!("{}", "═".repeat(60));
        println!(
            "   Documents evaluated: {}",
            stats.documents_evaluated.to_string().bold()
        );
        let average_rating = stats
            .average_rating
            .map(|r| self.colorize_rating(r).to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   Average:             {:.1}% ({})",
            stats.average_percentage, average_rating
        );
        println!(
            "   High / Moderate / Low: {} / {} / {}",
            stats.high, stats.moderate, stats.low
        );
        println!();
    }

    fn colorize_rating(&self, rating: Rating) -> colored::ColoredString {
        let s = rating.to_string();
        if !self.use_colors {
            return s.normal();
        }
        match rating {
            Rating::High => s.green().bold(),
            Rating::Moderate => s.yellow(),
            Rating::Low => s.red().bold(),
        }
    }

    /// Bar coloured by the rating, so configured cut points carry through
    fn create_score_bar(&self, percentage: f64, rating: Rating) -> String {
        let filled = bar_cells(percentage, 20);
        let bar = format!(
            "[{}{}] {:>5.1}%",
            "█".repeat(filled),
            "░".repeat(20 - filled),
            percentage
        );

        if !self.use_colors {
            return bar;
        }
        match rating {
            Rating::High => bar.green().to_string(),
            Rating::Moderate => bar.yellow().to_string(),
            Rating::Low => bar.red().to_string(),
        }
    }

    fn create_mini_bar(&self, percentage: f64) -> String {
        let filled = bar_cells(percentage, 10);
        format!("[{}{}]", "▓".repeat(filled), "░".repeat(10 - filled))
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn bar_cells(percentage: f64, width: usize) -> usize {
    ((percentage.clamp(0.0, 100.0) * width as f64) / 100.0).floor() as usize
}

/// Points without a trailing ".0" for whole numbers
fn format_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{}", points as u64)
    } else {
        format!("{}", points)
    }
}
