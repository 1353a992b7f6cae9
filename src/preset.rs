use std::{fmt, path::Path, path::PathBuf, str::FromStr};

use crate::error::{PipelineError, PipelineResult};

/// Closed set of dance presets. Each preset names one motion document and
/// one retargeting document under the preset root:
///
/// ```text
/// <preset_root>/motion/<name>.yaml
/// <preset_root>/retarget/<name>.yaml
/// ```
///
/// The documents' schema is owned by the external animator; the pipeline
/// only resolves and existence-checks them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[derive(clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DancePreset {
    Anxiety,
}

impl DancePreset {
    pub const ALL: &'static [DancePreset] = &[DancePreset::Anxiety];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anxiety => "anxiety",
        }
    }

    /// Resolve both config documents for this preset, failing before any
    /// stage runs if either is missing. Missing documents tag as an
    /// animation failure since the documents belong to the animator.
    pub fn resolve(&self, preset_root: &Path) -> PipelineResult<ResolvedPreset> {
        let motion_cfg = preset_root.join("motion").join(format!("{self}.yaml"));
        let retarget_cfg = preset_root.join("retarget").join(format!("{self}.yaml"));

        for (kind, path) in [("motion", &motion_cfg), ("retarget", &retarget_cfg)] {
            if !path.is_file() {
                return Err(PipelineError::animation(anyhow::anyhow!(
                    "{kind} config '{}' not found for preset '{self}'",
                    path.display()
                )));
            }
        }

        Ok(ResolvedPreset {
            preset: *self,
            motion_cfg,
            retarget_cfg,
        })
    }
}

impl fmt::Display for DancePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DancePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown dance preset '{s}'"))
    }
}

/// A preset whose config documents were confirmed to exist on disk.
#[derive(Clone, Debug)]
pub struct ResolvedPreset {
    pub preset: DancePreset,
    pub motion_cfg: PathBuf,
    pub retarget_cfg: PathBuf,
}
