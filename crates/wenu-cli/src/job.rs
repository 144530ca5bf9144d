//! Job configuration: selector, plotter and output settings in one document.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wenu_plots::PlotsConfig;
use wenu_select::SelectorConfig;

/// One `wenu` job; every section may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Candidate selector settings.
    #[serde(default)]
    pub selector: SelectorConfig,
    /// Cut evaluation, histogram and ntuple settings.
    #[serde(default)]
    pub plots: PlotsConfig,
    /// Where results are written.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory receiving Parquet tables, histograms and the cut flow.
    #[serde(default = "default_out_dir")]
    pub dir: PathBuf,
    /// Allow writing into a non-empty directory (overwrites known filenames).
    #[serde(default)]
    pub overwrite: bool,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("wenu-out")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: default_out_dir(), overwrite: false }
    }
}

/// Read a job file: JSON for a `.json` extension, YAML otherwise.
pub fn read_job_config(path: &Path) -> Result<JobConfig> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("").to_ascii_lowercase();
    let cfg: JobConfig = if ext == "json" {
        serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing JSON config {}", path.display()))?
    } else {
        serde_yaml_ng::from_slice(&bytes)
            .with_context(|| format!("parsing YAML config {}", path.display()))?
    };
    Ok(cfg)
}

/// Create `dir`, refusing a non-empty one unless `overwrite` is set.
pub fn prepare_out_dir(dir: &Path, overwrite: bool) -> Result<()> {
    if dir.exists() {
        let non_empty = std::fs::read_dir(dir)
            .with_context(|| format!("listing {}", dir.display()))?
            .next()
            .is_some();
        if non_empty && !overwrite {
            anyhow::bail!(
                "output directory {} is not empty (set output.overwrite or pass --overwrite)",
                dir.display()
            );
        }
    }
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_uses_defaults() {
        let cfg: JobConfig = serde_yaml_ng::from_str(
            r#"
selector:
  et_cut: 25.0
plots:
  dataset_tag: 7
"#,
        )
        .unwrap();
        assert_eq!(cfg.selector.et_cut, 25.0);
        assert_eq!(cfg.selector.et_cut_2nd_ele, 20.0);
        assert_eq!(cfg.plots.dataset_tag, 7);
        assert_eq!(cfg.output, OutputConfig::default());
    }

    #[test]
    fn unknown_section_is_rejected() {
        let res: std::result::Result<JobConfig, _> = serde_yaml_ng::from_str("histos: {}\n");
        assert!(res.is_err());
    }

    #[test]
    fn json_by_extension() {
        let mut p = std::env::temp_dir();
        p.push(format!("wenu_job_{}.json", std::process::id()));
        std::fs::write(&p, r#"{"output": {"dir": "elsewhere"}}"#).unwrap();
        let cfg = read_job_config(&p).unwrap();
        assert_eq!(cfg.output.dir, PathBuf::from("elsewhere"));
        let _ = std::fs::remove_file(&p);
    }
}
