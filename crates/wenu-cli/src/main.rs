//! wenu CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use wenu_core::{CandidateRecord, EventRecord};
use wenu_plots::Plotter;
use wenu_select::{CandidateSelector, CutFlow};

mod job;
mod jsonl;
mod pipeline;

use job::{JobConfig, prepare_out_dir, read_job_config};
use jsonl::{JsonLines, JsonLinesWriter};
use pipeline::{Pipeline, RunSummary, plot_candidate, write_outputs};

#[derive(Parser)]
#[command(name = "wenu")]
#[command(about = "W -> e nu candidate selection, cut evaluation and histogramming")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select candidates and fill histograms and ntuples in one pass
    Run {
        /// Job configuration (YAML, or JSON by extension)
        #[arg(short, long)]
        config: PathBuf,

        /// Input events (JSON Lines of event records)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory. Overrides `output.dir`.
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Allow writing into a non-empty output directory.
        #[arg(long)]
        overwrite: bool,
    },

    /// Run only the candidate selector and stream accepted candidates
    Select {
        /// Job configuration (YAML, or JSON by extension)
        #[arg(short, long)]
        config: PathBuf,

        /// Input events (JSON Lines of event records)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for candidates (JSON Lines). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the cut flow (pretty JSON) here.
        #[arg(long)]
        cutflow: Option<PathBuf>,
    },

    /// Evaluate cuts and fill outputs from previously selected candidates
    Plot {
        /// Job configuration (YAML, or JSON by extension)
        #[arg(short, long)]
        config: PathBuf,

        /// Input candidates (JSON Lines produced by `wenu select`)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory. Overrides `output.dir`.
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Allow writing into a non-empty output directory.
        #[arg(long)]
        overwrite: bool,
    },

    /// Validate a job configuration and print it with defaults filled in
    CheckConfig {
        /// Job configuration (YAML, or JSON by extension)
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries JSON results.
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run { config, input, out_dir, overwrite } => {
            cmd_run(&config, &input, out_dir.as_deref(), overwrite)
        }
        Commands::Select { config, input, output, cutflow } => {
            cmd_select(&config, &input, output.as_deref(), cutflow.as_deref())
        }
        Commands::Plot { config, input, out_dir, overwrite } => {
            cmd_plot(&config, &input, out_dir.as_deref(), overwrite)
        }
        Commands::CheckConfig { config } => cmd_check_config(&config),
    }
}

fn load_job(path: &Path) -> Result<JobConfig> {
    tracing::info!(path = %path.display(), "loading job config");
    read_job_config(path)
}

fn resolve_out_dir(job: &JobConfig, out_dir: Option<&Path>, overwrite: bool) -> Result<PathBuf> {
    let dir = out_dir.map(Path::to_path_buf).unwrap_or_else(|| job.output.dir.clone());
    prepare_out_dir(&dir, overwrite || job.output.overwrite)?;
    Ok(dir)
}

fn cmd_run(config: &Path, input: &Path, out_dir: Option<&Path>, overwrite: bool) -> Result<()> {
    let job = load_job(config)?;
    let mut pipeline = Pipeline::new(&job)?;
    let dir = resolve_out_dir(&job, out_dir, overwrite)?;

    let mut candidates = 0usize;
    for event in JsonLines::<EventRecord>::open(input)? {
        if pipeline.process(&event?) {
            candidates += 1;
        }
    }

    let (results, cutflow) = pipeline.finish();
    cutflow.log_summary();
    let (outputs, cutflow_path) = write_outputs(&dir, &results, Some(&cutflow))?;
    tracing::info!(
        events = cutflow.processed,
        candidates,
        selected = results.selection.len(),
        "run complete"
    );

    print_summary(&RunSummary {
        events: cutflow.processed,
        candidates,
        selected: results.selection.len(),
        outputs,
        cutflow: cutflow_path,
    })
}

fn cmd_select(
    config: &Path,
    input: &Path,
    output: Option<&Path>,
    cutflow_path: Option<&Path>,
) -> Result<()> {
    let job = load_job(config)?;
    let selector = CandidateSelector::new(job.selector).context("invalid selector config")?;
    let mut cutflow = CutFlow::new();
    let mut writer = JsonLinesWriter::create(output)?;

    for event in JsonLines::<EventRecord>::open(input)? {
        let event = event?;
        let selection = selector.select(&event);
        cutflow.record(&selection);
        if let Some(candidate) = selection.candidate() {
            writer.write(&CandidateRecord { id: event.id, candidate, jets: event.jets() })?;
        }
    }
    let written = writer.finish()?;
    cutflow.log_summary();
    tracing::info!(events = cutflow.processed, candidates = written, "selection complete");

    if let Some(path) = cutflow_path {
        std::fs::write(path, serde_json::to_string_pretty(&cutflow)?)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

fn cmd_plot(config: &Path, input: &Path, out_dir: Option<&Path>, overwrite: bool) -> Result<()> {
    let job = load_job(config)?;
    let mut plotter = Plotter::new(job.plots.clone()).context("invalid plots config")?;
    let dir = resolve_out_dir(&job, out_dir, overwrite)?;

    let mut candidates = 0usize;
    for record in JsonLines::<CandidateRecord>::open(input)? {
        plot_candidate(&mut plotter, &record?);
        candidates += 1;
    }

    let results = plotter.finish();
    let (outputs, _) = write_outputs(&dir, &results, None)?;
    tracing::info!(candidates, selected = results.selection.len(), "plotting complete");

    print_summary(&RunSummary {
        events: candidates as u64,
        candidates,
        selected: results.selection.len(),
        outputs,
        cutflow: None,
    })
}

fn cmd_check_config(config: &Path) -> Result<()> {
    let job = load_job(config)?;
    CandidateSelector::new(job.selector.clone()).context("invalid selector config")?;
    Plotter::new(job.plots.clone()).context("invalid plots config")?;
    println!("{}", serde_json::to_string_pretty(&job)?);
    Ok(())
}

fn print_summary(summary: &RunSummary) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}
