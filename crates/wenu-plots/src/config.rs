//! Plotter configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wenu_core::{Error, IdRequirement, Result};

use crate::cuts::{CutTable, CutThresholds, CutVariable};

/// Full configuration of the candidate plotter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlotsConfig {
    /// Decide the selection with one precalculated ID score instead of the cut table
    #[serde(default)]
    pub precalc_id: Option<IdRequirement>,
    /// Per-variable thresholds; unlisted variables are left open
    #[serde(default)]
    pub cuts: BTreeMap<CutVariable, CutThresholds>,
    /// Annotation-based preselection in front of the histograms
    #[serde(default)]
    pub preselection: PlotPreselection,
    /// Jet information in the ntuples
    #[serde(default)]
    pub jets: JetConfig,
    /// Integer copied into every ntuple row
    #[serde(default)]
    pub dataset_tag: i32,
}

/// Requirements on the annotations written by the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlotPreselection {
    /// Require a valid first pixel hit
    #[serde(default)]
    pub use_valid_first_pixel_hit: bool,
    /// Require the conversion rejection to pass
    #[serde(default)]
    pub use_conversion_rejection: bool,
    /// Require at most `max_expected_missing_hits`
    #[serde(default)]
    pub use_expected_missing_hits: bool,
    /// Maximum expected missing inner hits
    #[serde(default = "default_max_missing_hits")]
    pub max_expected_missing_hits: u32,
}

fn default_max_missing_hits() -> u32 {
    1
}

impl Default for PlotPreselection {
    fn default() -> Self {
        Self {
            use_valid_first_pixel_hit: false,
            use_conversion_rejection: false,
            use_expected_missing_hits: false,
            max_expected_missing_hits: default_max_missing_hits(),
        }
    }
}

impl PlotPreselection {
    /// Whether any requirement is switched on.
    pub fn any(&self) -> bool {
        self.use_valid_first_pixel_hit
            || self.use_conversion_rejection
            || self.use_expected_missing_hits
    }
}

/// Jet cross-cleaning for the ntuples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JetConfig {
    /// Add the five leading cleaned jets of each flavour to the rows
    #[serde(default)]
    pub include: bool,
    /// Calo jet collection label, for log output
    #[serde(default = "default_calo_label")]
    pub calo_label: String,
    /// PF jet collection label, for log output
    #[serde(default = "default_pf_label")]
    pub pf_label: String,
    /// Jets closer than this ΔR to the electron are dropped
    #[serde(default)]
    pub dr_jet_from_electron: Option<f64>,
}

fn default_calo_label() -> String {
    "ak5CaloJets".to_string()
}

fn default_pf_label() -> String {
    "ak5PFJets".to_string()
}

impl Default for JetConfig {
    fn default() -> Self {
        Self {
            include: false,
            calo_label: default_calo_label(),
            pf_label: default_pf_label(),
            dr_jet_from_electron: None,
        }
    }
}

impl PlotsConfig {
    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> Result<()> {
        if let Some(id) = &self.precalc_id
            && id.name.trim().is_empty()
        {
            return Err(Error::Config("precalc_id.name must not be empty".into()));
        }
        if self.jets.include {
            if self.jets.calo_label.trim().is_empty() || self.jets.pf_label.trim().is_empty() {
                return Err(Error::Config("jet collection labels must be set".into()));
            }
            match self.jets.dr_jet_from_electron {
                Some(dr) if dr.is_finite() && dr >= 0.0 => {}
                Some(dr) => {
                    return Err(Error::Config(format!(
                        "dr_jet_from_electron must be non-negative, got {dr}"
                    )));
                }
                None => {
                    return Err(Error::Config(
                        "dr_jet_from_electron is required when jets are included".into(),
                    ));
                }
            }
        }
        self.cut_table().map(|_| ())
    }

    /// Cut table built from `cuts`.
    pub fn cut_table(&self) -> Result<CutTable> {
        CutTable::from_thresholds(&self.cuts)
    }

    /// The preselection gate applies only in cut-table mode.
    pub fn preselection_active(&self) -> bool {
        self.precalc_id.is_none() && self.preselection.any()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wenu_core::IdComparator;

    #[test]
    fn defaults_validate() {
        let cfg = PlotsConfig::default();
        assert!(cfg.validate().is_ok());
        assert!(!cfg.preselection_active());
        assert_eq!(cfg.preselection.max_expected_missing_hits, 1);
    }

    #[test]
    fn yaml_cut_map() {
        let cfg: PlotsConfig = serde_yaml_ng::from_str(
            r#"
dataset_tag: 7
cuts:
  track_iso: { central: 0.15, forward: 0.08, invert_forward: true }
  sigma_ieta_ieta: { central: 0.01, forward: 0.03 }
preselection:
  use_conversion_rejection: true
"#,
        )
        .unwrap();
        assert_eq!(cfg.dataset_tag, 7);
        let table = cfg.cut_table().unwrap();
        let trk = table.entry(CutVariable::TrackIso);
        assert_eq!(trk.central, 0.15);
        assert!(trk.invert_forward);
        assert!(!trk.invert_central);
        assert_eq!(table.entry(CutVariable::HadronicOverEm).central, 1000.0);
        assert!(cfg.preselection_active());
    }

    #[test]
    fn unknown_variable_is_rejected() {
        let res: std::result::Result<PlotsConfig, _> =
            serde_yaml_ng::from_str("cuts:\n  trkiso: { central: 0.1 }\n");
        assert!(res.is_err());
    }

    #[test]
    fn precalc_mode_disables_preselection() {
        let mut cfg = PlotsConfig::default();
        cfg.preselection.use_valid_first_pixel_hit = true;
        assert!(cfg.preselection_active());
        cfg.precalc_id =
            Some(IdRequirement::new("simpleEleId80relIso", IdComparator::Approx, 7.0).unwrap());
        assert!(!cfg.preselection_active());
    }

    #[test]
    fn jets_need_a_cone() {
        let mut cfg = PlotsConfig::default();
        cfg.jets.include = true;
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
        cfg.jets.dr_jet_from_electron = Some(0.3);
        assert!(cfg.validate().is_ok());
        cfg.jets.calo_label.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn precalc_id_from_yaml() {
        let cfg: PlotsConfig = serde_yaml_ng::from_str(
            "precalc_id: { name: simpleEleId95relIso, comparator: '>', value: 5 }\n",
        )
        .unwrap();
        let id = cfg.precalc_id.unwrap();
        assert_eq!(id.comparator, IdComparator::Greater);
        assert_eq!(id.value, 5.0);
    }
}
