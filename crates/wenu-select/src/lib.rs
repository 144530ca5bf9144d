//! # wenu-select
//!
//! Per-event W -> e nu candidate filter.
//!
//! The [`CandidateSelector`] applies, in order, the trigger gates, the
//! fiducial acceptance, ET ranking, the leading-ET threshold, an optional
//! second-electron veto, hit-pattern and conversion preselection, trigger
//! matching and the MET threshold. An accepted event yields one
//! [`wenu_core::WCandidate`]; a rejected one the first failing
//! [`Rejection`]. [`CutFlow`] tallies both.
//!
//! ```
//! use wenu_core::{Electron, EventRecord, MissingEnergy};
//! use wenu_select::{CandidateSelector, SelectorConfig};
//!
//! let mut cfg = SelectorConfig::default();
//! cfg.trigger.use_trigger_info = false;
//! let selector = CandidateSelector::new(cfg).unwrap();
//!
//! let event = EventRecord {
//!     electrons: Some(vec![Electron { calo_energy: 45.0, ..Default::default() }]),
//!     met: Some(MissingEnergy::default()),
//!     ..Default::default()
//! };
//! assert!(selector.select(&event).is_accepted());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod conversion;
pub mod cutflow;
pub mod selector;

pub use config::{
    CURRENT_TO_FIELD_SCALE, FiducialConfig, FieldStrategy, NOMINAL_FIELD_TESLA,
    PreselectionConfig, SelectorConfig, TriggerConfig,
};
pub use conversion::{HelixPartnerFinder, helix_separation};
pub use cutflow::CutFlow;
pub use selector::{CandidateSelector, Rejection, Selection, rank_by_et};
