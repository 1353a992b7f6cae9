pub type PipelineResult<T> = Result<T, PipelineError>;

/// One variant per pipeline stage that can fail, plus the two
/// precondition/postcondition checks the orchestrator performs itself.
///
/// Stage variants carry the underlying cause chain; the display prefix
/// identifies which stage failed and is stable for callers that match on it.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("missing source images: {0}")]
    MissingSourceImages(String),

    #[error("annotation stage failed: {0}")]
    Annotation(anyhow::Error),

    #[error("animation stage failed: {0}")]
    Animation(anyhow::Error),

    #[error("compositing stage failed: {0}")]
    Compositing(anyhow::Error),

    #[error("transcode stage failed: {0}")]
    Transcode(anyhow::Error),

    #[error("missing result artifacts: {0}")]
    MissingResultArtifacts(String),

    #[error("workspace i/o failure: {0}")]
    Io(anyhow::Error),
}

impl PipelineError {
    pub fn missing_sources(msg: impl Into<String>) -> Self {
        Self::MissingSourceImages(msg.into())
    }

    pub fn annotation(err: impl Into<anyhow::Error>) -> Self {
        Self::Annotation(err.into())
    }

    pub fn animation(err: impl Into<anyhow::Error>) -> Self {
        Self::Animation(err.into())
    }

    pub fn compositing(err: impl Into<anyhow::Error>) -> Self {
        Self::Compositing(err.into())
    }

    pub fn transcode(err: impl Into<anyhow::Error>) -> Self {
        Self::Transcode(err.into())
    }

    pub fn missing_results(msg: impl Into<String>) -> Self {
        Self::MissingResultArtifacts(msg.into())
    }

    pub fn io(err: impl Into<anyhow::Error>) -> Self {
        Self::Io(err.into())
    }

    /// Short tag naming the failed stage, used in log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::MissingSourceImages(_) => "sources",
            Self::Annotation(_) => "annotation",
            Self::Animation(_) => "animation",
            Self::Compositing(_) => "compositing",
            Self::Transcode(_) => "transcode",
            Self::MissingResultArtifacts(_) => "results",
            Self::Io(_) => "workspace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            PipelineError::missing_sources("x")
                .to_string()
                .contains("missing source images:")
        );
        assert!(
            PipelineError::annotation(anyhow::anyhow!("x"))
                .to_string()
                .contains("annotation stage failed:")
        );
        assert!(
            PipelineError::animation(anyhow::anyhow!("x"))
                .to_string()
                .contains("animation stage failed:")
        );
        assert!(
            PipelineError::compositing(anyhow::anyhow!("x"))
                .to_string()
                .contains("compositing stage failed:")
        );
        assert!(
            PipelineError::transcode(anyhow::anyhow!("x"))
                .to_string()
                .contains("transcode stage failed:")
        );
        assert!(
            PipelineError::missing_results("x")
                .to_string()
                .contains("missing result artifacts:")
        );
    }

    #[test]
    fn stage_variants_preserve_source() {
        let base = std::io::Error::other("boom");
        let err = PipelineError::compositing(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
        assert_eq!(err.stage(), "compositing");
    }
}
