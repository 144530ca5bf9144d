//! Selector -> plotter chain shared by `wenu run` and `wenu plot`.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use wenu_core::{CandidateRecord, EventRecord};
use wenu_plots::{OutputFiles, PlotResults, Plotter, write_results};
use wenu_select::{CandidateSelector, CutFlow, Selection};

use crate::job::JobConfig;

/// Cut-flow file written next to the plot outputs.
pub const CUTFLOW_FILE: &str = "cutflow.json";

/// Runs the selector and feeds accepted candidates to the plotter.
pub struct Pipeline {
    selector: CandidateSelector,
    plotter: Plotter,
    cutflow: CutFlow,
}

impl Pipeline {
    /// Build the selector and plotter; either configuration may be rejected.
    pub fn new(job: &JobConfig) -> Result<Self> {
        let selector =
            CandidateSelector::new(job.selector.clone()).context("invalid selector config")?;
        let plotter = Plotter::new(job.plots.clone()).context("invalid plots config")?;
        Ok(Self { selector, plotter, cutflow: CutFlow::new() })
    }

    /// Select one event; returns `true` if it reached the plotter.
    pub fn process(&mut self, event: &EventRecord) -> bool {
        let selection = self.selector.select(event);
        self.cutflow.record(&selection);
        match selection {
            Selection::Accepted(candidate) => {
                let jets = event.jets();
                self.plotter.analyze(&event.id, &candidate, Some(&jets));
                true
            }
            Selection::Rejected(reason) => {
                tracing::debug!(
                    run = event.id.run,
                    event = event.id.event,
                    %reason,
                    "event rejected"
                );
                false
            }
        }
    }

    /// Hand over the plot accumulators and the cut flow.
    pub fn finish(self) -> (PlotResults, CutFlow) {
        (self.plotter.finish(), self.cutflow)
    }
}

/// Plot candidates produced by an earlier `wenu select`.
pub fn plot_candidate(plotter: &mut Plotter, record: &CandidateRecord) {
    plotter.analyze(&record.id, &record.candidate, Some(&record.jets));
}

/// Summary printed on stdout by `wenu run` and `wenu plot`.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    /// Events (or stored candidates) read
    pub events: u64,
    /// Candidates handed to the plotter
    pub candidates: usize,
    /// Candidates passing the full plot selection
    pub selected: usize,
    /// Files written by the plotter
    pub outputs: OutputFiles,
    /// Cut-flow file, when one was written
    pub cutflow: Option<PathBuf>,
}

/// Write the plot results (and the cut flow, if any) under `dir`.
pub fn write_outputs(
    dir: &Path,
    results: &PlotResults,
    cutflow: Option<&CutFlow>,
) -> Result<(OutputFiles, Option<PathBuf>)> {
    let files = write_results(dir, results)
        .with_context(|| format!("writing results to {}", dir.display()))?;
    let cutflow_path = match cutflow {
        Some(flow) => {
            let path = dir.join(CUTFLOW_FILE);
            std::fs::write(&path, serde_json::to_string_pretty(flow)?)
                .with_context(|| format!("writing {}", path.display()))?;
            Some(path)
        }
        None => None,
    };
    Ok((files, cutflow_path))
}
