//! Annotation-based preselection in front of the histograms.
//!
//! Each requirement reads an annotation written by the selector. An
//! annotation that was never computed does not fail the electron; the
//! request is reported and disregarded.

use wenu_core::Electron;

use crate::config::PlotPreselection;

/// Evaluate the enabled requirements on `electron`.
pub fn passes(cfg: &PlotPreselection, electron: &Electron) -> bool {
    let ann = &electron.annotations;
    let mut pass = true;

    if cfg.use_conversion_rejection {
        match ann.pass_conversion_rejection {
            Some(ok) => pass &= ok,
            None => log::warn!(
                "conversion rejection request disregarded: not calculated for this electron"
            ),
        }
    }
    if cfg.use_valid_first_pixel_hit {
        match ann.pass_valid_first_pixel_hit {
            Some(ok) => pass &= ok,
            None => log::warn!(
                "valid first pixel hit request disregarded: not calculated for this electron"
            ),
        }
    }
    if cfg.use_expected_missing_hits {
        match ann.expected_missing_hits {
            Some(n) => pass &= n <= cfg.max_expected_missing_hits,
            None => log::warn!(
                "expected missing hits request disregarded: not calculated for this electron"
            ),
        }
    }
    pass
}
