use std::{
    path::Path,
    process::{Command, Stdio},
};

use anyhow::Context as _;

use crate::config::VideoConfig;

/// Seam for the GIF-to-MP4 encoding step.
///
/// A narrow interface like the two model stages, so orchestrator tests can
/// simulate encoder failures and silent partial writes without ffmpeg.
pub trait Transcoder {
    fn to_video(&self, animation: &Path, video: &Path, cfg: &VideoConfig) -> anyhow::Result<()>;
}

/// Production transcoder backed by the system `ffmpeg` binary.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegTranscoder;

impl Transcoder for FfmpegTranscoder {
    fn to_video(&self, animation: &Path, video: &Path, cfg: &VideoConfig) -> anyhow::Result<()> {
        to_video(animation, video, cfg)
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Transcode the composited animation at `animation` into an MP4 container
/// at `video`, at the configured codec and frame rate.
///
/// Uses the system `ffmpeg` binary rather than linking FFmpeg, which keeps
/// the build free of native dev header/lib requirements.
pub fn to_video(animation: &Path, video: &Path, cfg: &VideoConfig) -> anyhow::Result<()> {
    cfg.validate()?;

    if let Some(parent) = video.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    if !is_ffmpeg_on_path() {
        anyhow::bail!("ffmpeg is required for MP4 encoding, but was not found on PATH");
    }

    let output = Command::new("ffmpeg")
        .arg("-y")
        .args(["-loglevel", "error"])
        .arg("-i")
        .arg(animation)
        .args([
            "-an",
            "-c:v",
            &cfg.codec,
            "-r",
            &cfg.fps.to_string(),
            "-pix_fmt",
            "yuv420p",
            // yuv420p requires even dimensions; GIFs come in odd sizes.
            "-vf",
            "scale=trunc(iw/2)*2:trunc(ih/2)*2",
            "-movflags",
            "+faststart",
        ])
        .arg(video)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .context("spawn ffmpeg (is it installed and on PATH?)")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!(
            "ffmpeg exited with status {}: {}",
            output.status,
            stderr.trim()
        );
    }
    Ok(())
}
