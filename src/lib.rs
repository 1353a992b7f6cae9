#![forbid(unsafe_code)]

pub mod animate;
pub mod annotate;
pub mod composite;
pub mod config;
pub mod error;
pub mod job;
pub mod pipeline;
pub mod preset;
pub mod transcode;
pub mod workspace;

pub use animate::{Animator, CommandAnimator};
pub use annotate::{AnnotationExtractor, CommandAnnotationExtractor};
pub use config::{PipelineConfig, VideoConfig};
pub use error::{PipelineError, PipelineResult};
pub use job::{JobArtifacts, JobKey, JobState, RunOptions};
pub use pipeline::Pipeline;
pub use preset::{DancePreset, ResolvedPreset};
pub use transcode::{FfmpegTranscoder, Transcoder};
pub use workspace::{Workspace, WorkspacePaths};
