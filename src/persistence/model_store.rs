//! On-disk home of the fitted pipeline.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, info};

use crate::error::{Result, SlotwiseError};
use crate::ml::Pipeline;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read and check the artifact.
    ///
    /// Missing file → `ArtifactMissing`; undecodable or structurally broken →
    /// `ArtifactCorrupt`; fitted on another feature set → `ArtifactIncompatible`.
    pub fn load(&self) -> Result<Pipeline> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SlotwiseError::ArtifactMissing(self.path.clone()));
            }
            Err(e) => return Err(SlotwiseError::Io(e)),
        };

        let pipeline: Pipeline = serde_json::from_str(&content).map_err(|e| {
            SlotwiseError::ArtifactCorrupt(format!("{}: {e}", self.path.display()))
        })?;

        if !pipeline.is_compatible() {
            return Err(SlotwiseError::ArtifactIncompatible(format!(
                "{} was fitted on {:?} ({})",
                self.path.display(),
                pipeline.metadata.features,
                pipeline.metadata.format
            )));
        }
        pipeline.validate().map_err(|e| {
            SlotwiseError::ArtifactCorrupt(format!("{}: {e}", self.path.display()))
        })?;

        debug!(
            "Loaded model from {} (trained {}, {} trees)",
            self.path.display(),
            pipeline.metadata.trained_at,
            pipeline.forest().n_trees()
        );
        Ok(pipeline)
    }

    /// Replace the artifact.
    ///
    /// The body goes to a sibling temp file which is then renamed over the
    /// target, so readers see either the old artifact or the new one.
    pub fn save(&self, pipeline: &Pipeline) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SlotwiseError::write(parent, e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_string(pipeline)?;
        fs::write(&tmp, body).map_err(|e| SlotwiseError::write(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| SlotwiseError::write(&self.path, e))?;

        info!("Saved model to {}", self.path.display());
        Ok(())
    }

    /// Last modification time, `None` when there is no artifact.
    pub fn modified(&self) -> Result<Option<SystemTime>> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(Some(meta.modified()?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SlotwiseError::Io(e)),
        }
    }

    /// Time since the artifact was last written.
    pub fn age(&self) -> Result<Option<Duration>> {
        Ok(self
            .modified()?
            .map(|m| SystemTime::now().duration_since(m).unwrap_or_default()))
    }
}
