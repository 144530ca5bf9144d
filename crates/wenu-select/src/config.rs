//! Selector configuration.
//!
//! Every field has a default so a partial YAML/JSON document is enough; the
//! defaults reproduce the reference W -> e nu working point (ET > 30 GeV,
//! barrel |η| < 1.4442, endcap 1.56 < |η| < 2.5).

use serde::{Deserialize, Serialize};
use wenu_core::{Error, EventRecord, IdRequirement, Result};

/// Calibration turning the monitored solenoid current (A) into Tesla:
/// 3.801 T / 18166 A averaged over a stable running period.
pub const CURRENT_TO_FIELD_SCALE: f64 = 2.09237036221512717e-04;

/// Nominal solenoid field (T).
pub const NOMINAL_FIELD_TESLA: f64 = 3.8;

/// Full configuration of the candidate selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectorConfig {
    /// Minimum ET of the leading fiducial electron (GeV)
    #[serde(default = "default_et_cut")]
    pub et_cut: f64,
    /// Minimum primary MET (GeV)
    #[serde(default)]
    pub met_cut: f64,
    /// Reject events with a second fiducial electron above `et_cut_2nd_ele`
    #[serde(default)]
    pub veto_second_electron_events: bool,
    /// ET threshold of the second-electron veto (GeV)
    #[serde(default = "default_et_cut_2nd_ele")]
    pub et_cut_2nd_ele: f64,
    /// Optional identification the second electron must pass to trigger the veto
    #[serde(default)]
    pub veto_second_electron_id: Option<IdRequirement>,
    /// Fiducial pseudorapidity windows
    #[serde(default)]
    pub fiducial: FiducialConfig,
    /// Trigger requirements
    #[serde(default)]
    pub trigger: TriggerConfig,
    /// Hit-pattern and conversion preselection
    #[serde(default)]
    pub preselection: PreselectionConfig,
}

fn default_et_cut() -> f64 {
    30.0
}

fn default_et_cut_2nd_ele() -> f64 {
    20.0
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            et_cut: default_et_cut(),
            met_cut: 0.0,
            veto_second_electron_events: false,
            et_cut_2nd_ele: default_et_cut_2nd_ele(),
            veto_second_electron_id: None,
            fiducial: FiducialConfig::default(),
            trigger: TriggerConfig::default(),
            preselection: PreselectionConfig::default(),
        }
    }
}

/// Central plus annular forward acceptance, with the transition gap excluded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FiducialConfig {
    /// Upper |η| edge of the barrel (exclusive)
    #[serde(default = "default_barrel_max_eta")]
    pub barrel_max_eta: f64,
    /// Lower |η| edge of the endcap (exclusive)
    #[serde(default = "default_endcap_min_eta")]
    pub endcap_min_eta: f64,
    /// Upper |η| edge of the endcap (exclusive)
    #[serde(default = "default_endcap_max_eta")]
    pub endcap_max_eta: f64,
}

fn default_barrel_max_eta() -> f64 {
    1.4442
}

fn default_endcap_min_eta() -> f64 {
    1.56
}

fn default_endcap_max_eta() -> f64 {
    2.5
}

impl Default for FiducialConfig {
    fn default() -> Self {
        Self {
            barrel_max_eta: default_barrel_max_eta(),
            endcap_min_eta: default_endcap_min_eta(),
            endcap_max_eta: default_endcap_max_eta(),
        }
    }
}

impl FiducialConfig {
    /// `|η| < barrel_max` or `endcap_min < |η| < endcap_max`.
    pub fn contains(&self, eta: f64) -> bool {
        let a = eta.abs();
        a < self.barrel_max_eta || (a > self.endcap_min_eta && a < self.endcap_max_eta)
    }
}

/// Trigger path, filter and matching requirements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerConfig {
    /// Apply the trigger gates at all
    #[serde(default = "default_true")]
    pub use_trigger_info: bool,
    /// Path whose decision must be true
    #[serde(default = "default_hlt_path")]
    pub hlt_path: String,
    /// Filter label whose objects are used for matching
    #[serde(default = "default_hlt_filter")]
    pub hlt_filter: String,
    /// Require the candidate to lie close to one of the filter's objects
    #[serde(default)]
    pub electron_matched_to_hlt: bool,
    /// Matching radius in (η, φ)
    #[serde(default = "default_match_dr")]
    pub electron_matched_to_hlt_dr: f64,
}

fn default_true() -> bool {
    true
}

fn default_hlt_path() -> String {
    "HLT_Ele15_LW_L1R".to_string()
}

fn default_hlt_filter() -> String {
    "hltL1NonIsoHLTNonIsoSingleElectronLWEt15TrackIsolFilter".to_string()
}

fn default_match_dr() -> f64 {
    0.1
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            use_trigger_info: true,
            hlt_path: default_hlt_path(),
            hlt_filter: default_hlt_filter(),
            electron_matched_to_hlt: false,
            electron_matched_to_hlt_dr: default_match_dr(),
        }
    }
}

/// Where the ambient magnetic field for the conversion search comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum FieldStrategy {
    /// Field value from the conditions service (simulation / fixed setups).
    Service {
        /// Field at the origin (T)
        #[serde(default = "default_tesla")]
        tesla: f64,
    },
    /// Field derived from the event's monitored magnet current (collision data).
    MonitoredCurrent {
        /// Tesla per ampere
        #[serde(default = "default_scale")]
        scale: f64,
    },
}

fn default_tesla() -> f64 {
    NOMINAL_FIELD_TESLA
}

fn default_scale() -> f64 {
    CURRENT_TO_FIELD_SCALE
}

impl Default for FieldStrategy {
    fn default() -> Self {
        FieldStrategy::Service { tesla: NOMINAL_FIELD_TESLA }
    }
}

impl FieldStrategy {
    /// Field in Tesla for this event, `None` when the event lacks the reading.
    pub fn field_tesla(&self, event: &EventRecord) -> Option<f64> {
        match *self {
            FieldStrategy::Service { tesla } => Some(tesla),
            FieldStrategy::MonitoredCurrent { scale } => event.magnet_current.map(|i| i * scale),
        }
    }
}

/// Hit-pattern and conversion requirements on the leading electron.
///
/// `use_*` rejects the event when the check fails; `calculate_*` stores the
/// result on the electron's annotations regardless of the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreselectionConfig {
    /// Enforce a valid hit in the first pixel barrel layer
    #[serde(default)]
    pub use_valid_first_pixel_hit: bool,
    /// Annotate the first-pixel-layer flag
    #[serde(default)]
    pub calculate_valid_first_pixel_hit: bool,
    /// Enforce `expected missing inner hits <= max_expected_missing_hits`
    #[serde(default)]
    pub use_expected_missing_hits: bool,
    /// Annotate the expected-missing-hits count
    #[serde(default)]
    pub calculate_expected_missing_hits: bool,
    /// Maximum allowed expected missing inner hits
    #[serde(default = "default_max_missing_hits")]
    pub max_expected_missing_hits: u32,
    /// Enforce conversion rejection
    #[serde(default)]
    pub use_conversion_rejection: bool,
    /// Annotate the conversion verdict and partner geometry
    #[serde(default)]
    pub calculate_conversion_rejection: bool,
    /// Maximum |dist| of a conversion partner (cm)
    #[serde(default = "default_conversion_cut")]
    pub conversion_rejection_dist: f64,
    /// Maximum |Δcot θ| of a conversion partner
    #[serde(default = "default_conversion_cut")]
    pub conversion_rejection_dcot: f64,
    /// Magnetic field source
    #[serde(default)]
    pub field: FieldStrategy,
}

fn default_max_missing_hits() -> u32 {
    1
}

fn default_conversion_cut() -> f64 {
    0.02
}

impl Default for PreselectionConfig {
    fn default() -> Self {
        Self {
            use_valid_first_pixel_hit: false,
            calculate_valid_first_pixel_hit: false,
            use_expected_missing_hits: false,
            calculate_expected_missing_hits: false,
            max_expected_missing_hits: default_max_missing_hits(),
            use_conversion_rejection: false,
            calculate_conversion_rejection: false,
            conversion_rejection_dist: default_conversion_cut(),
            conversion_rejection_dcot: default_conversion_cut(),
            field: FieldStrategy::default(),
        }
    }
}

impl PreselectionConfig {
    /// Whether the conversion search runs at all.
    pub fn conversion_active(&self) -> bool {
        self.use_conversion_rejection || self.calculate_conversion_rejection
    }
}

fn require_finite(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::Config(format!("{name} must be finite, got {value}")));
    }
    Ok(())
}

impl SelectorConfig {
    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> Result<()> {
        require_finite("et_cut", self.et_cut)?;
        require_finite("met_cut", self.met_cut)?;
        require_finite("et_cut_2nd_ele", self.et_cut_2nd_ele)?;

        let f = &self.fiducial;
        require_finite("barrel_max_eta", f.barrel_max_eta)?;
        require_finite("endcap_min_eta", f.endcap_min_eta)?;
        require_finite("endcap_max_eta", f.endcap_max_eta)?;
        if f.barrel_max_eta <= 0.0 {
            return Err(Error::Config(format!(
                "barrel_max_eta must be positive, got {}",
                f.barrel_max_eta
            )));
        }
        if f.endcap_min_eta < f.barrel_max_eta {
            return Err(Error::Config(format!(
                "endcap_min_eta ({}) must not be below barrel_max_eta ({})",
                f.endcap_min_eta, f.barrel_max_eta
            )));
        }
        if f.endcap_max_eta <= f.endcap_min_eta {
            return Err(Error::Config(format!(
                "endcap_max_eta ({}) must exceed endcap_min_eta ({})",
                f.endcap_max_eta, f.endcap_min_eta
            )));
        }

        let t = &self.trigger;
        if t.use_trigger_info {
            if t.hlt_path.trim().is_empty() {
                return Err(Error::Config("hlt_path must be set when use_trigger_info".into()));
            }
            if t.hlt_filter.trim().is_empty() {
                return Err(Error::Config("hlt_filter must be set when use_trigger_info".into()));
            }
            if t.electron_matched_to_hlt
                && !(t.electron_matched_to_hlt_dr.is_finite() && t.electron_matched_to_hlt_dr > 0.0)
            {
                return Err(Error::Config(format!(
                    "electron_matched_to_hlt_dr must be positive, got {}",
                    t.electron_matched_to_hlt_dr
                )));
            }
        }

        if let Some(id) = &self.veto_second_electron_id
            && id.name.trim().is_empty()
        {
            return Err(Error::Config("veto_second_electron_id.name must not be empty".into()));
        }

        let p = &self.preselection;
        if p.conversion_active() {
            for (name, v) in [
                ("conversion_rejection_dist", p.conversion_rejection_dist),
                ("conversion_rejection_dcot", p.conversion_rejection_dcot),
            ] {
                if !(v.is_finite() && v > 0.0) {
                    return Err(Error::Config(format!("{name} must be positive, got {v}")));
                }
            }
            match p.field {
                FieldStrategy::Service { tesla } => require_finite("field.tesla", tesla)?,
                FieldStrategy::MonitoredCurrent { scale } => {
                    if !(scale.is_finite() && scale > 0.0) {
                        return Err(Error::Config(format!(
                            "field.scale must be positive, got {scale}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = SelectorConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.et_cut, 30.0);
        assert_eq!(cfg.et_cut_2nd_ele, 20.0);
        assert_eq!(cfg.fiducial.barrel_max_eta, 1.4442);
    }

    #[test]
    fn fiducial_edges_are_exclusive() {
        let f = FiducialConfig::default();
        assert!(f.contains(0.0));
        assert!(f.contains(-1.4441));
        assert!(!f.contains(1.4442));
        assert!(!f.contains(-1.4442));
        assert!(!f.contains(1.5));
        assert!(!f.contains(1.56));
        assert!(f.contains(1.5601));
        assert!(f.contains(-2.49));
        assert!(!f.contains(2.5));
        assert!(!f.contains(3.0));
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let cfg: SelectorConfig = serde_yaml_ng::from_str(
            r#"
et_cut: 20
trigger:
  use_trigger_info: false
preselection:
  calculate_conversion_rejection: true
  field:
    source: monitored_current
"#,
        )
        .unwrap();
        assert_eq!(cfg.et_cut, 20.0);
        assert!(!cfg.trigger.use_trigger_info);
        assert_eq!(cfg.trigger.hlt_path, "HLT_Ele15_LW_L1R");
        assert_eq!(
            cfg.preselection.field,
            FieldStrategy::MonitoredCurrent { scale: CURRENT_TO_FIELD_SCALE }
        );
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let res: std::result::Result<SelectorConfig, _> =
            serde_yaml_ng::from_str("et_cutt: 20\n");
        assert!(res.is_err());
    }

    #[test]
    fn overlapping_windows_fail_validation() {
        let mut cfg = SelectorConfig::default();
        cfg.fiducial.endcap_min_eta = 1.2;
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));

        let mut cfg = SelectorConfig::default();
        cfg.fiducial.endcap_max_eta = 1.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn matching_radius_must_be_positive() {
        let mut cfg = SelectorConfig::default();
        cfg.trigger.electron_matched_to_hlt = true;
        cfg.trigger.electron_matched_to_hlt_dr = 0.0;
        assert!(cfg.validate().is_err());

        // Irrelevant when the trigger is ignored.
        cfg.trigger.use_trigger_info = false;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn field_strategies() {
        let mut ev = EventRecord::default();
        let service = FieldStrategy::Service { tesla: 3.8 };
        assert_eq!(service.field_tesla(&ev), Some(3.8));

        let current = FieldStrategy::MonitoredCurrent { scale: CURRENT_TO_FIELD_SCALE };
        assert_eq!(current.field_tesla(&ev), None);
        ev.magnet_current = Some(18166.0);
        let b = current.field_tesla(&ev).unwrap();
        assert!((b - 3.801).abs() < 1e-3);
    }
}
