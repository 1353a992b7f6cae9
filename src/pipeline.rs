use std::{io::ErrorKind, path::Path};

use crate::{
    animate::Animator,
    annotate::AnnotationExtractor,
    composite::apply_background,
    config::PipelineConfig,
    error::{PipelineError, PipelineResult},
    job::{JobArtifacts, JobKey, JobState, RunOptions},
    transcode::{FfmpegTranscoder, Transcoder},
    workspace::Workspace,
};

/// Sequences one (user, dance) job through annotation, animation,
/// compositing and transcoding.
///
/// Strictly sequential: no stage runs until the prior stage's postcondition
/// is confirmed. The stage calls are long-running and blocking with no
/// mid-stage cancellation; callers wanting a timeout must wrap the whole
/// [`run`](Pipeline::run) call. Concurrent runs are fine for distinct job
/// keys only; two runs for the same key would share a workspace.
pub struct Pipeline {
    config: PipelineConfig,
    extractor: Box<dyn AnnotationExtractor>,
    animator: Box<dyn Animator>,
    transcoder: Box<dyn Transcoder>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        extractor: impl AnnotationExtractor + 'static,
        animator: impl Animator + 'static,
    ) -> PipelineResult<Self> {
        Self::with_transcoder(config, extractor, animator, FfmpegTranscoder)
    }

    pub fn with_transcoder(
        config: PipelineConfig,
        extractor: impl AnnotationExtractor + 'static,
        animator: impl Animator + 'static,
        transcoder: impl Transcoder + 'static,
    ) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            extractor: Box::new(extractor),
            animator: Box::new(animator),
            transcoder: Box::new(transcoder),
        })
    }

    /// Run one job to completion, returning the GIF and MP4 paths.
    ///
    /// On failure the workspace is cleaned before the tagged error
    /// propagates; a half-written job directory is never left behind. On
    /// success the source copies and annotation intermediates are removed;
    /// `opts.retain_results` decides whether the two deliverables stay on
    /// disk for the caller to collect.
    #[tracing::instrument(skip(self, opts), fields(job = %key))]
    pub fn run(&self, key: &JobKey, opts: RunOptions) -> PipelineResult<JobArtifacts> {
        let workspace = Workspace::new(&self.config, key);

        match self.run_stages(key, &workspace) {
            Ok(artifacts) => {
                workspace.cleanup_sources();
                if opts.retain_results {
                    workspace.cleanup_intermediates();
                } else {
                    workspace.cleanup_results();
                }
                tracing::info!(state = %JobState::Done, "job complete");
                Ok(artifacts)
            }
            Err(err) => {
                tracing::warn!(
                    state = %JobState::Failed,
                    stage = err.stage(),
                    %err,
                    "job failed, cleaning workspace"
                );
                workspace.cleanup_sources();
                workspace.cleanup_results();
                Err(err)
            }
        }
    }

    fn run_stages(&self, key: &JobKey, workspace: &Workspace) -> PipelineResult<JobArtifacts> {
        // Preset documents must resolve before anything touches the disk.
        let preset = key.dance.resolve(&self.config.preset_root)?;
        let paths = workspace.prepare()?;

        // Init -> SourcesVerified
        for (name, path) in [
            ("background", &paths.background_image),
            ("character", &paths.character_image),
        ] {
            if !path.is_file() {
                return Err(PipelineError::missing_sources(format!(
                    "{name} image '{}' not found for job {key}",
                    path.display()
                )));
            }
        }
        tracing::debug!(state = %JobState::SourcesVerified, "sources present");

        // SourcesVerified -> Annotated. The extractor's own success signal
        // is not trusted blindly: the output directory must be populated.
        self.extractor
            .extract(&paths.character_image, &paths.job_dir)
            .map_err(PipelineError::annotation)?;
        if dir_is_empty(&paths.job_dir).map_err(PipelineError::io)? {
            return Err(PipelineError::annotation(anyhow::anyhow!(
                "extractor reported success but wrote nothing to '{}'",
                paths.job_dir.display()
            )));
        }
        tracing::debug!(state = %JobState::Annotated, "annotations extracted");

        // Annotated -> Animated
        self.animator
            .animate(
                &paths.job_dir,
                &preset.motion_cfg,
                &preset.retarget_cfg,
                &paths.job_dir,
            )
            .map_err(PipelineError::animation)?;
        if !paths.gif.is_file() {
            return Err(PipelineError::animation(anyhow::anyhow!(
                "animator reported success but produced no '{}'",
                paths.gif.display()
            )));
        }
        tracing::debug!(state = %JobState::Animated, "raw animation rendered");

        // Animated -> Composited
        retry_transient(|| apply_background(&paths.background_image, &paths.gif))
            .map_err(PipelineError::compositing)?;
        tracing::debug!(state = %JobState::Composited, "background applied");

        // Composited -> Transcoded
        retry_transient(|| {
            self.transcoder
                .to_video(&paths.gif, &paths.mp4, &self.config.video)
        })
        .map_err(PipelineError::transcode)?;
        tracing::debug!(state = %JobState::Transcoded, "video encoded");

        // Transcoded -> Done: guard against silent partial writes upstream.
        for path in [&paths.gif, &paths.mp4] {
            if !path.is_file() {
                return Err(PipelineError::missing_results(format!(
                    "'{}' missing after all stages reported success",
                    path.display()
                )));
            }
        }

        Ok(JobArtifacts {
            gif: paths.gif,
            mp4: paths.mp4,
        })
    }
}

fn dir_is_empty(dir: &Path) -> std::io::Result<bool> {
    Ok(std::fs::read_dir(dir)?.next().is_none())
}

/// Retry an operation once iff its cause chain contains a transient
/// `std::io::Error`. Model-stage failures never come through here; they are
/// pure functions of their inputs and retrying cannot succeed.
fn retry_transient(mut op: impl FnMut() -> anyhow::Result<()>) -> anyhow::Result<()> {
    match op() {
        Ok(()) => Ok(()),
        Err(err) if is_transient_io(&err) => {
            tracing::warn!(%err, "transient i/o error, retrying once");
            op()
        }
        Err(err) => Err(err),
    }
}

fn is_transient_io(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause.downcast_ref::<std::io::Error>().is_some_and(|io| {
            matches!(
                io.kind(),
                ErrorKind::Interrupted | ErrorKind::TimedOut | ErrorKind::WouldBlock
            )
        })
    })
}
