//! # wenu-plots
//!
//! Cut evaluation and aggregation for W -> e nu candidates.
//!
//! A [`Plotter`] evaluates each candidate electron against either one
//! precalculated identification score or the 13-variable, two-region
//! [`CutTable`]. It appends flat rows to the "preselection" and "selection"
//! [`NtupleTable`]s and fills the standard [`HistogramBook`]: MET and
//! transverse mass (selected and inverted control samples), supercluster
//! kinematics, per-region discriminating variables and the track-isolation
//! N-1 distribution. [`export::write_results`] writes everything at job end.
//!
//! ```
//! use wenu_core::{Electron, EventId, SuperCluster, WCandidate};
//! use wenu_plots::{PlotsConfig, Plotter};
//!
//! let mut plotter = Plotter::new(PlotsConfig::default()).unwrap();
//! let electron = Electron {
//!     pt: 40.0,
//!     super_cluster: SuperCluster { energy: 40.0, eta: 0.1, phi: 0.0 },
//!     ..Default::default()
//! };
//! let candidate = WCandidate { electron, met: Default::default() };
//! let outcome = plotter.analyze(&EventId::default(), &candidate, None);
//! assert!(outcome.selected);
//! assert_eq!(plotter.results().preselection.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod book;
pub mod config;
pub mod cuts;
pub mod evaluator;
pub mod export;
pub mod histogram;
pub mod jets;
pub mod ntuple;
pub mod plotter;
pub mod preselection;

pub use book::HistogramBook;
pub use config::{JetConfig, PlotPreselection, PlotsConfig};
pub use cuts::{CutEntry, CutTable, CutThresholds, CutVariable, OPEN_THRESHOLD, Region};
pub use evaluator::CutEvaluator;
pub use export::{ExportError, OutputFiles, write_results};
pub use histogram::Histogram1D;
pub use jets::{JetSlots, clean_and_rank};
pub use ntuple::{NtupleRow, NtupleTable};
pub use plotter::{PlotOutcome, PlotResults, Plotter};
