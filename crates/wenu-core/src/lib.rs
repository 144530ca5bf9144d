//! # wenu-core
//!
//! Shared vocabulary for the W -> e nu candidate selection: per-event
//! records, the composite [`WCandidate`], kinematic helpers, comparisons
//! against precalculated identification scores and the crate-wide error type.
//!
//! ```
//! use wenu_core::kinematics::transverse_mass;
//!
//! let mt = transverse_mass(40.0, 0.0, 30.0, std::f64::consts::PI);
//! assert!((mt - 4800f64.sqrt()).abs() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod id;
pub mod kinematics;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use id::{IdComparator, IdDecision, IdRequirement};
pub use traits::{ConversionClassifier, ConversionCuts, ConversionInfo};
pub use types::{
    Annotations, CandidateRecord, Electron, EventId, EventJets, EventRecord, GsfTrack, Isolation,
    Jet, MetFlavor, MissingEnergy, Point3, SuperCluster, Track, TriggerObject, UserIsolation,
    WCandidate,
};
