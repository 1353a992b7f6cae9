use std::{fmt, path::PathBuf};

use uuid::Uuid;

use crate::preset::DancePreset;

/// Identifies one pipeline run: an opaque user id plus the dance to render.
///
/// The key determines every temporary and result path. The caller must not
/// submit two concurrent jobs for the same key; both runs would own the same
/// workspace and corrupt each other's intermediates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct JobKey {
    pub user: Uuid,
    pub dance: DancePreset,
}

impl JobKey {
    pub fn new(user: Uuid, dance: DancePreset) -> Self {
        Self { user, dance }
    }

    /// Parse the user id from its transport form (must be a valid UUID).
    pub fn parse(user: &str, dance: DancePreset) -> Result<Self, uuid::Error> {
        Ok(Self {
            user: Uuid::parse_str(user)?,
            dance,
        })
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user, self.dance)
    }
}

/// States the orchestrator moves through, strictly in order. `Failed` is
/// terminal and reachable from every non-terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
    Init,
    SourcesVerified,
    Annotated,
    Animated,
    Composited,
    Transcoded,
    Done,
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::SourcesVerified => "sources_verified",
            Self::Annotated => "annotated",
            Self::Animated => "animated",
            Self::Composited => "composited",
            Self::Transcoded => "transcoded",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two deliverables of a completed job. Ownership passes to the caller
/// (e.g. for upload) once the orchestrator returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobArtifacts {
    pub gif: PathBuf,
    pub mp4: PathBuf,
}

/// Per-run cleanup policy.
#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    /// Keep the two deliverables on disk for later retrieval. Source copies
    /// and annotation intermediates are removed either way. When `false`,
    /// the whole job subtree is removed after the run completes.
    pub retain_results: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            retain_results: true,
        }
    }
}
