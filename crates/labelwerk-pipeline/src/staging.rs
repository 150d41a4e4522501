// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Staging directories and file lifecycle. A label job moves
// incoming → original → printed, or lands in failed/ when processing
// aborts. The filesystem move is the atomicity boundary for claiming a
// file; no locking beyond that is implemented.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use labelwerk_core::error::{LabelwerkError, Result};

/// Lifecycle location of a staged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Incoming,
    Original,
    Printed,
    Failed,
}

impl Stage {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Original => "original",
            Self::Printed => "printed",
            Self::Failed => "failed",
        }
    }
}

/// The four-way directory set under a configured base directory.
#[derive(Debug, Clone)]
pub struct StagingArea {
    base: PathBuf,
}

impl StagingArea {
    /// Open a staging area, creating any missing stage directories.
    #[instrument(skip_all, fields(base = %base.display()))]
    pub fn open(base: &Path) -> Result<Self> {
        for stage in [Stage::Incoming, Stage::Original, Stage::Printed, Stage::Failed] {
            fs::create_dir_all(base.join(stage.dir_name()))?;
        }
        Ok(Self {
            base: base.to_path_buf(),
        })
    }

    pub fn dir(&self, stage: Stage) -> PathBuf {
        self.base.join(stage.dir_name())
    }

    pub fn path(&self, stage: Stage, name: &str) -> PathBuf {
        self.dir(stage).join(name)
    }

    /// Claim an incoming file by moving it to `original/` — the durable
    /// backup that must exist before any transform runs.
    ///
    /// A source already moved by a prior invocation is tolerated only when
    /// the backup is present; otherwise the file is genuinely missing and
    /// that is a fatal staging error.
    #[instrument(skip(self))]
    pub fn claim(&self, name: &str) -> Result<PathBuf> {
        let incoming = self.path(Stage::Incoming, name);
        let original = self.path(Stage::Original, name);

        if incoming.exists() {
            fs::rename(&incoming, &original)?;
            info!(original = %original.display(), "incoming file claimed");
        } else if original.exists() {
            warn!(name, "already claimed by a prior invocation; reusing backup");
        } else {
            return Err(LabelwerkError::Staging(format!(
                "{} not found in incoming/ or original/",
                name
            )));
        }

        Ok(original)
    }

    /// Park the failure evidence in `failed/`: the furthest-progressed
    /// artifact if one exists, else a copy of the original. The original
    /// backup itself is never deleted.
    pub fn park_failure(&self, original: &Path, artifacts: &[PathBuf]) -> Result<PathBuf> {
        for artifact in artifacts.iter().rev() {
            if artifact.exists() {
                let name = artifact
                    .file_name()
                    .ok_or_else(|| {
                        LabelwerkError::Staging(format!(
                            "artifact path {} has no file name",
                            artifact.display()
                        ))
                    })?;
                let parked = self.dir(Stage::Failed).join(name);
                fs::rename(artifact, &parked)?;
                debug!(parked = %parked.display(), "partial artifact moved to failed/");
                return Ok(parked);
            }
        }

        let name = original.file_name().ok_or_else(|| {
            LabelwerkError::Staging(format!("{} has no file name", original.display()))
        })?;
        let parked = self.dir(Stage::Failed).join(name);
        fs::copy(original, &parked)?;
        debug!(parked = %parked.display(), "original copied to failed/");
        Ok(parked)
    }
}

/// A label job's identity through its lifecycle.
#[derive(Debug, Clone)]
pub struct StagedFile {
    original_name: String,
    location: Stage,
    artifacts: Vec<PathBuf>,
}

impl StagedFile {
    /// A job starts life as an incoming file.
    pub fn new(original_name: &str) -> Self {
        Self {
            original_name: original_name.to_string(),
            location: Stage::Incoming,
            artifacts: Vec::new(),
        }
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn location(&self) -> Stage {
        self.location
    }

    pub fn set_location(&mut self, stage: Stage) {
        self.location = stage;
    }

    /// Record an intermediate or final artifact, in creation order, so
    /// failure handling can pick the furthest-progressed one.
    pub fn record_artifact(&mut self, path: PathBuf) {
        self.artifacts.push(path);
    }

    pub fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }
}
