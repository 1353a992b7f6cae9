use std::path::PathBuf;

use anyhow::Context as _;

use crate::{
    config::PipelineConfig,
    error::{PipelineError, PipelineResult},
    job::JobKey,
};

pub const BACKGROUND_DIR: &str = "background";
pub const CHARACTER_DIR: &str = "character";

/// Fixed name the animator writes the raw sequence under; the compositor
/// rewrites it in place, so it is also the GIF deliverable.
pub const ANIMATION_FILE: &str = "video.gif";
pub const VIDEO_FILE: &str = "video.mp4";

/// Per-job filesystem scope. One instance owns the job's directory tree for
/// the lifetime of a run; all operations are local filesystem mutations under
/// the two configured roots.
#[derive(Clone, Debug)]
pub struct Workspace {
    key: JobKey,
    source_root: PathBuf,
    result_root: PathBuf,
}

/// Resolved paths every stage works against.
#[derive(Clone, Debug)]
pub struct WorkspacePaths {
    pub background_image: PathBuf,
    pub character_image: PathBuf,
    /// Job directory: annotation files, the raw/composited animation and the
    /// transcoded video all live here.
    pub job_dir: PathBuf,
    pub gif: PathBuf,
    pub mp4: PathBuf,
}

impl Workspace {
    pub fn new(config: &PipelineConfig, key: &JobKey) -> Self {
        Self {
            key: *key,
            source_root: config.source_root.clone(),
            result_root: config.result_root.clone(),
        }
    }

    pub fn paths(&self) -> WorkspacePaths {
        let image = format!("{}.png", self.key.user);
        let job_dir = self
            .result_root
            .join(self.key.user.to_string())
            .join(self.key.dance.as_str());
        WorkspacePaths {
            background_image: self.source_root.join(BACKGROUND_DIR).join(&image),
            character_image: self.source_root.join(CHARACTER_DIR).join(&image),
            gif: job_dir.join(ANIMATION_FILE),
            mp4: job_dir.join(VIDEO_FILE),
            job_dir,
        }
    }

    /// Create the directory structure the stages require. Idempotent: a
    /// stale job directory from an earlier run is removed first so a re-run
    /// overwrites rather than appends.
    pub fn prepare(&self) -> PipelineResult<WorkspacePaths> {
        let paths = self.paths();

        for dir in [
            self.source_root.join(BACKGROUND_DIR),
            self.source_root.join(CHARACTER_DIR),
        ] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("create source dir '{}'", dir.display()))
                .map_err(PipelineError::io)?;
        }

        if paths.job_dir.exists() {
            std::fs::remove_dir_all(&paths.job_dir)
                .with_context(|| format!("clear stale job dir '{}'", paths.job_dir.display()))
                .map_err(PipelineError::io)?;
        }
        std::fs::create_dir_all(&paths.job_dir)
            .with_context(|| format!("create job dir '{}'", paths.job_dir.display()))
            .map_err(PipelineError::io)?;

        Ok(paths)
    }

    /// Remove the two source-image copies. Runs on paths that may already be
    /// gone; failures are logged, not raised, since this executes on error
    /// paths as well.
    pub fn cleanup_sources(&self) {
        let paths = self.paths();
        for file in [&paths.background_image, &paths.character_image] {
            if let Err(err) = std::fs::remove_file(file)
                && file.exists()
            {
                tracing::warn!(job = %self.key, file = %file.display(), %err, "source cleanup failed");
            }
        }
    }

    /// Remove annotation intermediates from the job directory, keeping the
    /// two deliverables.
    pub fn cleanup_intermediates(&self) {
        let paths = self.paths();
        let entries = match std::fs::read_dir(&paths.job_dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(job = %self.key, %err, "intermediate cleanup failed");
                return;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path == paths.gif || path == paths.mp4 {
                continue;
            }
            let removed = if path.is_dir() {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
            if let Err(err) = removed {
                tracing::warn!(job = %self.key, file = %path.display(), %err, "intermediate cleanup failed");
            }
        }
    }

    /// Recursively remove the job's result subtree.
    pub fn cleanup_results(&self) {
        let paths = self.paths();
        if paths.job_dir.exists()
            && let Err(err) = std::fs::remove_dir_all(&paths.job_dir)
        {
            tracing::warn!(job = %self.key, dir = %paths.job_dir.display(), %err, "result cleanup failed");
        }
        // Drop the per-user parent when this was its last job.
        if let Some(parent) = paths.job_dir.parent() {
            let _ = std::fs::remove_dir(parent);
        }
    }
}
