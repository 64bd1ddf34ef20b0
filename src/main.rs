//! SciRAP: in vitro study evaluator CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use scirap::access::{self, AccessGate, ACCESS_KEY_ENV};
use scirap::analyzer::{EvaluationEngine, RatingThresholds};
use scirap::cache::EvaluationCache;
use scirap::config::{
    build_ignore_set, check_threshold, find_project_root, is_ignored, load_config,
    load_rule_file, load_rule_table, validate_thresholds, Config, CONFIG_FILENAME,
};
use scirap::extract::{AutoExtractor, TextExtractor};
use scirap::reporter::{ConsoleReporter, CsvReporter, JsonReporter};
use scirap::rules::{scirap_rule_set, RuleTable};
use scirap::Evaluation;
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

/// SciRAP: keyword-evidence evaluator for in vitro toxicology studies
#[derive(Parser, Debug)]
#[command(name = "scirap")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Study file or directory to evaluate, or "-" for stdin (omit when using a subcommand)
    #[arg(required = true)]
    path: Option<PathBuf>,

    /// Output format as JSON
    #[arg(long, short)]
    json: bool,

    /// Minimum combined percentage (exit 1 if below)
    #[arg(long, short)]
    threshold: Option<f64>,

    /// Quiet mode (minimal output)
    #[arg(long, short)]
    quiet: bool,

    /// Verbose output (also enables debug logging)
    #[arg(long, short)]
    verbose: bool,

    /// Write RQ/MQ/Relevance CSV tables into this directory
    #[arg(long, value_name = "DIR")]
    csv: Option<PathBuf>,

    /// Custom rule file (JSON) replacing the built-in SciRAP keywords
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Path to config file (default: search .sciraprc.json in current dir and parents)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Shared access key, required when the config sets accessKeySha256
    #[arg(long, env = ACCESS_KEY_ENV, hide_env_values = true)]
    access_key: Option<String>,

    /// Disable caching (re-evaluate all documents even if unchanged)
    #[arg(long)]
    no_cache: bool,

    /// Clear the evaluation cache before running
    #[arg(long)]
    clear_cache: bool,

    /// Evaluate in parallel (default for directories with many documents)
    #[arg(long)]
    parallel: bool,

    /// Number of parallel threads (default: number of CPU cores)
    #[arg(long, value_name = "N")]
    jobs: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create .sciraprc.json with default settings
    Init {
        /// Minimum combined percentage (e.g. 50)
        #[arg(long)]
        threshold: Option<f64>,

        /// Require this access key (its SHA-256 is stored, not the key)
        #[arg(long, value_name = "KEY")]
        require_key: Option<String>,

        /// Directory in which to create config (default: current)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Print the built-in rule set as JSON, or validate a rule file
    Rules {
        /// Validate this rule file instead of printing the built-in set
        #[arg(long, value_name = "FILE")]
        check: Option<PathBuf>,

        /// Write the built-in rule set to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .try_init();
}

fn run() -> Result<ExitCode> {
    let mut args = Args::parse();
    init_logging(args.verbose);

    if let Some(cmd) = args.command.take() {
        return match cmd {
            Commands::Init {
                threshold,
                require_key,
                dir,
            } => run_init(threshold, require_key.as_deref(), dir.as_deref()),
            Commands::Rules { check, output } => run_rules(check.as_deref(), output.as_deref()),
        };
    }

    let Some(path) = args.path.clone() else {
        anyhow::bail!("a study path is required when not using a subcommand");
    };
    let from_stdin = path.as_os_str() == "-";

    // Resolve work directory for config search
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let work_dir = if from_stdin {
        cwd.clone()
    } else if path.is_file() {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.clone())
    } else {
        path.clone()
    };

    // Load config (CLI flags override config file)
    let cli_rules = args.rules.as_ref().map(|r| cwd.join(r));
    let config = load_config(&work_dir, args.config.as_deref())?
        .merge_with_cli(args.threshold, cli_rules.as_deref());
    validate_thresholds(&config)?;

    // Access gate runs before any document is read
    let gate = AccessGate::from_config(config.access_key_sha256.as_deref())?;
    gate.check(args.access_key.as_deref())?;

    let table = load_rule_table(&config)?;
    log::info!("Rule table fingerprint {}", table.fingerprint());
    let engine = EvaluationEngine::new(&table);

    if from_stdin {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read study text from stdin")?;
        let evaluation = engine.evaluate_text(&text, Path::new("stdin"))?;
        return finish(&args, &config, &engine, &path, vec![evaluation], false);
    }

    let ignore_set = if config.ignore.is_empty() {
        None
    } else {
        Some(build_ignore_set(&config.ignore)?)
    };

    let extensions = config.document_extensions();
    let files = collect_documents(&path, ignore_set.as_ref(), &extensions)?;
    if files.is_empty() {
        eprintln!("{}: No study documents found", "Warning".yellow());
        return Ok(ExitCode::from(2));
    }

    // Set up cache
    let project_root = find_project_root(&work_dir).unwrap_or_else(|| work_dir.clone());
    let mut cache = if args.no_cache {
        EvaluationCache::disabled()
    } else {
        EvaluationCache::new(&project_root)
    };

    if args.clear_cache {
        cache.clear();
        if !args.quiet {
            eprintln!("{}: Cache cleared", "Info".blue());
        }
    }

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let extractor = AutoExtractor::new();
    let use_parallel = args.parallel || files.len() > 10;
    let (evaluations, had_errors) = if use_parallel {
        evaluate_files_parallel_cached(&engine, &extractor, &files, &mut cache, args.quiet)
    } else {
        evaluate_files_sequential_cached(&engine, &extractor, &files, &mut cache, args.quiet)
    };

    if path.is_dir() {
        cache.cleanup(&path, &files);
    }
    if let Err(e) = cache.save() {
        if !args.quiet {
            eprintln!("{}: Failed to save cache: {}", "Warning".yellow(), e);
        }
    }

    if evaluations.is_empty() {
        eprintln!("{}: All documents failed to evaluate", "Error".red());
        return Ok(ExitCode::from(2));
    }

    finish(&args, &config, &engine, &path, evaluations, had_errors)
}

/// Report, export and apply thresholds
fn finish(
    args: &Args,
    config: &Config,
    engine: &EvaluationEngine<'_>,
    root: &Path,
    evaluations: Vec<Evaluation>,
    had_errors: bool,
) -> Result<ExitCode> {
    let stats = engine.aggregate_stats(&evaluations);

    if args.json {
        let reporter = JsonReporter::new().pretty();
        if evaluations.len() == 1 {
            println!("{}", reporter.report(&evaluations[0]));
        } else {
            println!("{}", reporter.report_with_summary(&evaluations, &stats));
        }
    } else if args.quiet {
        let reporter = ConsoleReporter::new();
        for evaluation in &evaluations {
            reporter.report_quiet(evaluation);
        }
    } else {
        let mut reporter = ConsoleReporter::new();
        if args.verbose {
            reporter = reporter.verbose();
        }
        if evaluations.len() == 1 {
            reporter.report(&evaluations[0]);
        } else {
            reporter.report_many(&evaluations, &stats);
        }
    }

    if let Some(ref dir) = args.csv {
        export_csv(dir, root, &evaluations, args.quiet || args.json)?;
    }

    let mut below = false;
    for evaluation in &evaluations {
        let threshold = args
            .threshold
            .or(config.effective_for_file(&evaluation.file_path).threshold);
        if let Some(threshold) = threshold {
            if evaluation.overall.percentage < threshold {
                below = true;
                if !args.quiet && !args.json {
                    eprintln!(
                        "{}: {} scored {:.1}%, below threshold {}",
                        "Failed".red().bold(),
                        evaluation.file_path.display(),
                        evaluation.overall.percentage,
                        threshold
                    );
                }
            }
        }
    }

    if below {
        Ok(ExitCode::from(1))
    } else if had_errors {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// One directory for a single document; one subdirectory per document otherwise
fn export_csv(dir: &Path, root: &Path, evaluations: &[Evaluation], quiet: bool) -> Result<()> {
    let reporter = CsvReporter::new();
    let targets = if evaluations.len() == 1 {
        vec![dir.to_path_buf()]
    } else {
        let documents: Vec<&Path> = evaluations.iter().map(|e| e.file_path.as_path()).collect();
        export_dirs(dir, root, &documents)?
    };

    for (evaluation, target) in evaluations.iter().zip(&targets) {
        let written = reporter.export_all(evaluation, target)?;
        if !quiet {
            eprintln!(
                "{}: Wrote {} tables to {}",
                "Info".blue(),
                written.len(),
                target.display()
            );
        }
    }
    Ok(())
}

/// Subdirectory per document: its path under `root` without the extension,
/// or with the extension kept as `-ext` when two documents share a stem.
fn export_dirs(dir: &Path, root: &Path, documents: &[&Path]) -> Result<Vec<PathBuf>> {
    let relative: Vec<&Path> = documents
        .iter()
        .map(|&doc| {
            doc.strip_prefix(root)
                .ok()
                .filter(|r| !r.as_os_str().is_empty())
                .or_else(|| doc.file_name().map(Path::new))
                .unwrap_or(Path::new("document"))
        })
        .collect();
    let stems: Vec<PathBuf> = relative.iter().map(|r| r.with_extension("")).collect();

    let mut seen = HashSet::new();
    let mut targets = Vec::with_capacity(documents.len());
    for (rel, stem) in relative.iter().zip(&stems) {
        let name = if stems.iter().filter(|s| *s == stem).count() > 1 {
            let file_name = rel
                .file_name()
                .map(|n| n.to_string_lossy().replace('.', "-"))
                .unwrap_or_default();
            rel.with_file_name(file_name)
        } else {
            stem.clone()
        };
        let target = dir.join(name);
        if !seen.insert(target.clone()) {
            anyhow::bail!(
                "Two documents would export CSV tables to {}; rename one of them",
                target.display()
            );
        }
        targets.push(target);
    }
    Ok(targets)
}

fn run_init(threshold: Option<f64>, access_key: Option<&str>, dir: Option<&Path>) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let dir = dir.unwrap_or(&cwd);
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() {
        eprintln!(
            "{}: {} already exists; use --dir to write elsewhere or remove it first",
            "Warning".yellow(),
            config_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let threshold_value = threshold.unwrap_or(50.0);
    check_threshold(threshold_value)?;

    let config = Config {
        threshold: Some(threshold_value),
        rating_thresholds: Some(RatingThresholds::default()),
        ignore: vec!["**/drafts/**".to_string()],
        access_key_sha256: access_key.map(access::digest),
        ..Config::default()
    };
    let json = serde_json::to_string_pretty(&config).context("Failed to serialize config")?;

    std::fs::write(&config_path, json + "\n")
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!(
        "{}: Created {} with threshold={}{}",
        "Done".green().bold(),
        config_path.display(),
        threshold_value,
        if access_key.is_some() { ", access key required" } else { "" }
    );
    Ok(ExitCode::SUCCESS)
}

fn run_rules(check: Option<&Path>, output: Option<&Path>) -> Result<ExitCode> {
    if let Some(path) = check {
        let table: RuleTable = load_rule_file(path)?;
        println!(
            "{}: {} is valid ({} checklists, {} criteria, fingerprint {})",
            "Done".green().bold(),
            path.display(),
            table.checklists().len(),
            table.criteria_count(),
            &table.fingerprint()[..12]
        );
        return Ok(ExitCode::SUCCESS);
    }

    let json = serde_json::to_string_pretty(&scirap_rule_set())
        .context("Failed to serialize built-in rules")?;
    match output {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write rules to {}", path.display()))?;
            eprintln!("{}: Wrote {}", "Done".green().bold(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(ExitCode::SUCCESS)
}

fn collect_documents(
    path: &Path,
    ignore_set: Option<&globset::GlobSet>,
    extensions: &[String],
) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        if let Some(set) = ignore_set {
            if is_ignored(path, set) {
                return Ok(vec![]);
            }
        }
        return Ok(vec![path.to_path_buf()]);
    }

    if !path.is_dir() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let file_path = entry.path();
        if entry.file_type().is_file() && is_document_file(file_path, extensions) {
            if let Some(set) = ignore_set {
                if is_ignored(file_path, set) {
                    continue;
                }
            }
            files.push(file_path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

fn is_document_file(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with('.') {
        return false;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

fn report_failure(file: &Path, error: &scirap::ScoringError, quiet: bool) {
    log::warn!("{}: {}", file.display(), error);
    if !quiet {
        eprintln!(
            "{}: Failed to evaluate {}: {}",
            "Error".red(),
            file.display(),
            error
        );
    }
}

/// Evaluate documents sequentially with caching
fn evaluate_files_sequential_cached(
    engine: &EvaluationEngine<'_>,
    extractor: &dyn TextExtractor,
    files: &[PathBuf],
    cache: &mut EvaluationCache,
    quiet: bool,
) -> (Vec<Evaluation>, bool) {
    let fingerprint = engine.table().fingerprint().to_string();
    let mut evaluations = Vec::new();
    let mut had_errors = false;
    let mut cache_hits = 0;

    for file in files {
        let content = std::fs::read(file).ok();

        if let Some(ref bytes) = content {
            if let Some(cached) = cache.get(file, bytes, &fingerprint) {
                evaluations.push(cached);
                cache_hits += 1;
                continue;
            }
        }

        match engine.evaluate(file, extractor) {
            Ok(evaluation) => {
                if let Some(ref bytes) = content {
                    cache.set(file, bytes, &fingerprint, evaluation.clone());
                }
                evaluations.push(evaluation);
            }
            Err(e) => {
                report_failure(file, &e, quiet);
                had_errors = true;
            }
        }
    }

    if !quiet && cache_hits > 0 {
        eprintln!(
            "{}: {} documents from cache, {} evaluated",
            "Cache".blue(),
            cache_hits,
            files.len() - cache_hits
        );
    }

    (evaluations, had_errors)
}

/// Evaluate documents in parallel; cache lookups and stores happen around the parallel pass
fn evaluate_files_parallel_cached(
    engine: &EvaluationEngine<'_>,
    extractor: &dyn TextExtractor,
    files: &[PathBuf],
    cache: &mut EvaluationCache,
    quiet: bool,
) -> (Vec<Evaluation>, bool) {
    use rayon::prelude::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    let fingerprint = engine.table().fingerprint().to_string();
    let had_errors = AtomicBool::new(false);
    let cache_hits = AtomicUsize::new(0);
    let shared: &EvaluationCache = cache;

    let outcomes: Vec<(Evaluation, Option<Vec<u8>>)> = files
        .par_iter()
        .filter_map(|file| {
            let content = std::fs::read(file).ok();
            if let Some(ref bytes) = content {
                if let Some(cached) = shared.get(file, bytes, &fingerprint) {
                    cache_hits.fetch_add(1, Ordering::Relaxed);
                    return Some((cached, None));
                }
            }

            match engine.evaluate(file, extractor) {
                Ok(evaluation) => Some((evaluation, content)),
                Err(e) => {
                    had_errors.store(true, Ordering::Relaxed);
                    report_failure(file, &e, quiet);
                    None
                }
            }
        })
        .collect();

    let mut evaluations = Vec::with_capacity(outcomes.len());
    for (evaluation, fresh) in outcomes {
        if let Some(bytes) = fresh {
            cache.set(&evaluation.file_path, &bytes, &fingerprint, evaluation.clone());
        }
        evaluations.push(evaluation);
    }

    let hits = cache_hits.load(Ordering::Relaxed);
    if !quiet && hits > 0 {
        eprintln!(
            "{}: {} documents from cache, {} evaluated",
            "Cache".blue(),
            hits,
            files.len() - hits
        );
    }

    (evaluations, had_errors.load(Ordering::Relaxed))
}
