use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::Context as _;

/// Seam for the external motion-retargeting engine.
///
/// Assumed deterministic for identical inputs. Writes the raw animated
/// sequence at the fixed name [`ANIMATION_FILE`](crate::workspace::ANIMATION_FILE)
/// inside `out_dir`.
pub trait Animator {
    fn animate(
        &self,
        annotation_dir: &Path,
        motion_cfg: &Path,
        retarget_cfg: &Path,
        out_dir: &Path,
    ) -> anyhow::Result<()>;
}

/// Runs a configured external program as
/// `<program> <annotation_dir> <motion_cfg> <retarget_cfg> <out_dir>`.
#[derive(Clone, Debug)]
pub struct CommandAnimator {
    program: PathBuf,
}

impl CommandAnimator {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Animator for CommandAnimator {
    fn animate(
        &self,
        annotation_dir: &Path,
        motion_cfg: &Path,
        retarget_cfg: &Path,
        out_dir: &Path,
    ) -> anyhow::Result<()> {
        let output = Command::new(&self.program)
            .arg(annotation_dir)
            .arg(motion_cfg)
            .arg(retarget_cfg)
            .arg(out_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("spawn animator '{}'", self.program.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "animator exited with status {}: {}",
                output.status,
                stderr.trim()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_an_error() {
        let animator = CommandAnimator::new("/nonexistent/animator");
        let err = animator
            .animate(
                Path::new("annotations"),
                Path::new("motion.yaml"),
                Path::new("retarget.yaml"),
                Path::new("out"),
            )
            .unwrap_err();
        assert!(err.to_string().contains("spawn animator"));
    }
}
