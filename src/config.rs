use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::error::{PipelineError, PipelineResult};

/// Default video settings, matching what the result consumers expect.
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
pub const DEFAULT_VIDEO_FPS: u32 = 30;

/// Everything the pipeline reads from its environment, resolved once up
/// front and passed into [`Pipeline::new`](crate::Pipeline::new). Stage code
/// never touches process environment directly.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PipelineConfig {
    /// Root holding the `background/` and `character/` source image trees.
    pub source_root: PathBuf,
    /// Root under which each job's result subtree is created.
    pub result_root: PathBuf,
    /// Root holding the `motion/` and `retarget/` preset documents.
    pub preset_root: PathBuf,
    #[serde(default)]
    pub video: VideoConfig,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct VideoConfig {
    pub codec: String,
    pub fps: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            fps: DEFAULT_VIDEO_FPS,
        }
    }
}

impl PipelineConfig {
    pub fn new(
        source_root: impl Into<PathBuf>,
        result_root: impl Into<PathBuf>,
        preset_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            result_root: result_root.into(),
            preset_root: preset_root.into(),
            video: VideoConfig::default(),
        }
    }

    /// Read a config document from a JSON file.
    pub fn from_json_file(path: &Path) -> PipelineResult<Self> {
        let f = File::open(path)
            .with_context(|| format!("open config '{}'", path.display()))
            .map_err(PipelineError::io)?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse config '{}'", path.display()))
            .map_err(PipelineError::io)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Resolve the directory roots from process environment, falling back to
    /// a layout under `base` for anything unset.
    pub fn from_env(base: &Path) -> Self {
        let dir = |var: &str, default: &str| {
            std::env::var_os(var)
                .map(PathBuf::from)
                .unwrap_or_else(|| base.join(default))
        };
        Self {
            source_root: dir("MOTIONCANVAS_SOURCE_ROOT", "source"),
            result_root: dir("MOTIONCANVAS_RESULT_ROOT", "result"),
            preset_root: dir("MOTIONCANVAS_PRESET_ROOT", "presets"),
            video: VideoConfig::default(),
        }
    }

    pub fn validate(&self) -> PipelineResult<()> {
        self.video.validate()
    }
}

impl VideoConfig {
    pub fn validate(&self) -> PipelineResult<()> {
        if self.fps == 0 {
            return Err(PipelineError::io(anyhow::anyhow!(
                "video fps must be non-zero"
            )));
        }
        if self.codec.is_empty() {
            return Err(PipelineError::io(anyhow::anyhow!(
                "video codec must be non-empty"
            )));
        }
        Ok(())
    }
}
