use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::Context as _;

/// Seam for the external pose/segmentation extractor.
///
/// The real extractor is a long-running, blocking model invocation; it is
/// assumed idempotent for identical input and to write one or more files
/// into `out_dir`. The orchestrator, not the implementation, verifies that
/// `out_dir` was actually populated.
pub trait AnnotationExtractor {
    fn extract(&self, character_image: &Path, out_dir: &Path) -> anyhow::Result<()>;
}

/// Runs a configured external program as `<program> <character_image> <out_dir>`.
#[derive(Clone, Debug)]
pub struct CommandAnnotationExtractor {
    program: PathBuf,
}

impl CommandAnnotationExtractor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl AnnotationExtractor for CommandAnnotationExtractor {
    fn extract(&self, character_image: &Path, out_dir: &Path) -> anyhow::Result<()> {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("create annotation dir '{}'", out_dir.display()))?;

        let output = Command::new(&self.program)
            .arg(character_image)
            .arg(out_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| {
                format!("spawn annotation extractor '{}'", self.program.display())
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "annotation extractor exited with status {}: {}",
                output.status,
                stderr.trim()
            );
        }
        Ok(())
    }
}
