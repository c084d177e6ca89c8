#![deny(missing_docs)]
//! CodeLitmus command-line interface.
//!
//! Scores Python files locally or through a running CodeLitmus server.

use clap::{Args, Parser, Subcommand, ValueEnum};
use codelitmus_core::{
    AnalysisStatus, DEFAULT_EMPTY_SCORE, FileReport, FileSystem, PythonAnalyzer, ScoreResult,
    Scorer, ScorerConfig, StdFileSystem, Summary, collect_python_sources, render_json,
    render_markdown,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "codelitmus", version, about = "CodeLitmus CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct AnalyzeArgs {
    /// Python files or directories to analyze.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// Maximum number of files analyzed concurrently.
    #[arg(short = 'j', long, default_value_t = 4)]
    concurrency: usize,
    /// Base URL of a CodeLitmus server to upload files to.
    #[arg(long, env = "LITMUS_SERVER")]
    server: Option<String>,
    /// Score reported for empty files.
    #[arg(long, default_value_t = DEFAULT_EMPTY_SCORE, allow_negative_numbers = true)]
    empty_score: i32,
}

#[derive(Args, Clone)]
struct OutputArgs {
    /// Output format for report data.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the report to a file instead of stdout.
    #[arg(long = "report-output")]
    report_output: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Score Python files and directories.
    Analyze {
        #[command(flatten)]
        analyze: AnalyzeArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { analyze, report } => run_analyze(analyze, report).await?,
    }

    Ok(())
}

#[cfg(test)]
fn main() {}

/// Where each file gets scored.
enum Backend {
    Local(ScorerConfig),
    Remote {
        client: reqwest::Client,
        base_url: String,
    },
}

#[derive(Deserialize)]
struct ServerError {
    error: String,
}

#[derive(Default)]
struct Targets {
    files: Vec<PathBuf>,
    failures: Vec<FileReport>,
}

async fn run_analyze(args: AnalyzeArgs, report: OutputArgs) -> CliResult<()> {
    let Targets { files, failures } = resolve_targets(&StdFileSystem::new(), &args.paths);
    if files.is_empty() && failures.is_empty() {
        println!("No Python files found to analyze.");
        return Ok(());
    }

    let backend = match args.server {
        Some(base_url) => Backend::Remote {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        },
        None => Backend::Local(ScorerConfig {
            empty_score: args.empty_score,
            ..ScorerConfig::default()
        }),
    };
    let backend = Arc::new(backend);
    let concurrency = if args.concurrency == 0 {
        1
    } else {
        args.concurrency
    };
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut tasks = JoinSet::new();

    let mut pending = HashMap::new();

    for path in files {
        let permit = semaphore.clone().acquire_owned().await?;
        let backend = backend.clone();
        let target = path.clone();
        let handle = tasks.spawn(async move {
            let _permit = permit;
            analyze_target(target, backend).await
        });
        pending.insert(handle.id(), path);
    }

    let mut reports = failures;
    reports.append(&mut join_reports(tasks, pending).await);
    reports.sort_by(|left, right| left.path.cmp(&right.path));

    emit_reports(&reports, &report).await
}

fn resolve_targets<F: FileSystem>(fs: &F, paths: &[PathBuf]) -> Targets {
    let mut targets = Targets::default();
    for path in paths {
        match collect_python_sources(fs, path) {
            Ok(mut sources) => targets.files.append(&mut sources),
            Err(err) => targets
                .failures
                .push(FileReport::failed(path.clone(), err.to_string())),
        }
    }
    targets.files.sort();
    targets.files.dedup();
    targets
}

async fn analyze_target(path: PathBuf, backend: Arc<Backend>) -> FileReport {
    match backend.as_ref() {
        Backend::Local(config) => {
            let config = config.clone();
            let fallback = path.clone();
            task::spawn_blocking(move || analyze_local(&StdFileSystem::new(), path, config))
                .await
                .unwrap_or_else(|err| FileReport::failed(fallback, err.to_string()))
        }
        Backend::Remote { client, base_url } => upload_file(client, base_url, path).await,
    }
}

fn analyze_local<F: FileSystem>(fs: &F, path: PathBuf, config: ScorerConfig) -> FileReport {
    match fs.read_source(&path) {
        Ok(code) => {
            let result = Scorer::with_config(PythonAnalyzer::new(), config).score(&code);
            FileReport::analyzed(path, result)
        }
        Err(err) => FileReport::failed(path, err.to_string()),
    }
}

async fn upload_file(client: &reqwest::Client, base_url: &str, path: PathBuf) -> FileReport {
    match request_analysis(client, base_url, &path).await {
        Ok(result) => FileReport::analyzed(path, result),
        Err(err) => FileReport::failed(path, err.to_string()),
    }
}

async fn request_analysis(
    client: &reqwest::Client,
    base_url: &str,
    path: &Path,
) -> CliResult<ScoreResult> {
    let contents = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("code.py")
        .to_string();
    let part = reqwest::multipart::Part::bytes(contents)
        .file_name(filename)
        .mime_str("text/x-python")?;
    let form = reqwest::multipart::Form::new().part("file", part);

    let response = client
        .post(format!("{base_url}/analyze/"))
        .multipart(form)
        .send()
        .await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<ScoreResult>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ServerError>(&body) {
        Ok(error) => Err(error.error.into()),
        Err(_) => Err(format!("server returned {status}").into()),
    }
}

async fn join_reports(
    mut tasks: JoinSet<FileReport>,
    mut pending: HashMap<task::Id, PathBuf>,
) -> Vec<FileReport> {
    let mut reports = Vec::new();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(report) => reports.push(report),
            Err(err) => {
                let path = pending.remove(&err.id()).unwrap_or_default();
                reports.push(report_from_task_error(path, err));
            }
        }
    }
    reports
}

fn report_from_task_error(path: PathBuf, error: task::JoinError) -> FileReport {
    FileReport::failed(path, error.to_string())
}

async fn emit_reports(reports: &[FileReport], output: &OutputArgs) -> CliResult<()> {
    let contents = match output.format {
        OutputFormat::Text => render_text(reports),
        OutputFormat::Markdown => render_markdown(reports),
        OutputFormat::Json => render_json(reports)?,
    };
    emit_output(output, contents).await
}

async fn emit_output(output: &OutputArgs, contents: String) -> CliResult<()> {
    if let Some(path) = &output.report_output {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, contents).await?;
    } else {
        print!("{contents}");
    }
    Ok(())
}

fn render_text(reports: &[FileReport]) -> String {
    let mut output = String::new();
    for report in reports {
        let _ = writeln!(output, "Path: {}", report.path.display());
        match &report.status {
            AnalysisStatus::Analyzed => {
                let _ = writeln!(output, "Status: analyzed");
            }
            AnalysisStatus::Failed(error) => {
                let _ = writeln!(output, "Status: failed ({error})");
                let _ = writeln!(output);
                continue;
            }
        }

        let Some(result) = &report.result else {
            let _ = writeln!(output);
            continue;
        };
        let _ = writeln!(
            output,
            "Verdict: {} ({}/3) - {}",
            result.verdict, result.score, result.verdict_explanation
        );
        let _ = writeln!(output, "Feedback:");
        for line in &result.feedback {
            let _ = writeln!(output, "- {line}");
        }

        let detailed = &result.detailed_feedback;
        if !detailed.good_points.is_empty() {
            let _ = writeln!(output, "Good points:");
            for point in &detailed.good_points {
                let _ = writeln!(output, "- {point}");
            }
        }
        if !detailed.areas_for_improvement.is_empty() {
            let _ = writeln!(output, "Areas for improvement:");
            for area in &detailed.areas_for_improvement {
                let _ = writeln!(output, "- {area}");
            }
        }

        let _ = writeln!(output);
    }

    let summary = Summary::of(reports);
    let _ = writeln!(
        output,
        "{} files: {} basic, {} neutral, {} acidic, {} failed",
        summary.total(),
        summary.basic,
        summary.neutral,
        summary.acidic,
        summary.failed
    );
    output
}
