//! State behind the interactive shell: the staged upload, the artifacts of
//! the last successful run, and the progress last reported by the worker.
//!
//! Only the UI task touches a `Session`. The worker reports through
//! [`ProgressEvent`]s, which the UI feeds back in with [`Session::apply`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uamap_core::{AppConfig, Coordinates, DeliveryClassifier};

use crate::error::{PipelineError, SessionError};
use crate::pipeline::{ProgressEvent, RunContext, RunStage, RunState, RunSummary};

/// Extensions the spreadsheet reader understands.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// Files produced by the last successful run, waiting to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputArtifacts {
    pub map_path: PathBuf,
    pub missing_path: PathBuf,
    pub summary: RunSummary,
}

/// Where [`Session::save`] put the artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifacts {
    pub map: PathBuf,
    /// `None` when there was no missing-coordinates file or no destination
    /// was given for it.
    pub missing: Option<PathBuf>,
}

#[derive(Debug)]
pub struct Session {
    uploads_dir: PathBuf,
    map_path: PathBuf,
    missing_path: PathBuf,
    center: Coordinates,
    zoom: u8,
    classifier: DeliveryClassifier,
    uploaded: Option<PathBuf>,
    artifacts: Option<OutputArtifacts>,
    running: bool,
    stage: RunStage,
    progress: Option<RunState>,
}

impl Session {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            uploads_dir: config.uploads_dir.clone(),
            map_path: config.output_map_path.clone(),
            missing_path: config.missing_coords_path.clone(),
            center: config.map_center,
            zoom: config.map_zoom,
            classifier: config.delivery.clone(),
            uploaded: None,
            artifacts: None,
            running: false,
            stage: RunStage::Idle,
            progress: None,
        }
    }

    #[must_use]
    pub fn uploaded(&self) -> Option<&Path> {
        self.uploaded.as_deref()
    }

    #[must_use]
    pub fn artifacts(&self) -> Option<&OutputArtifacts> {
        self.artifacts.as_ref()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn stage(&self) -> RunStage {
        self.stage
    }

    #[must_use]
    pub fn progress(&self) -> Option<RunState> {
        self.progress
    }

    /// Copies `source` into the uploads directory and makes it the file to
    /// process. Previously staged files are removed and any unsaved run
    /// state is forgotten.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Busy`] while a run is in progress.
    /// - [`SessionError::UnsupportedFile`] for non-spreadsheet extensions.
    /// - [`SessionError::InputMissing`] if `source` is not a file.
    /// - [`SessionError::Upload`] if staging fails.
    pub fn upload(&mut self, source: &Path) -> Result<PathBuf, SessionError> {
        if self.running {
            return Err(SessionError::Busy);
        }
        if !is_spreadsheet(source) {
            return Err(SessionError::UnsupportedFile {
                path: source.to_path_buf(),
            });
        }
        if !source.is_file() {
            return Err(SessionError::InputMissing {
                path: Some(source.to_path_buf()),
            });
        }
        let Some(file_name) = source.file_name() else {
            return Err(SessionError::UnsupportedFile {
                path: source.to_path_buf(),
            });
        };

        fs::create_dir_all(&self.uploads_dir).map_err(upload_error(&self.uploads_dir))?;
        let target = self.uploads_dir.join(file_name);

        if !same_file(source, &target) {
            self.clear_staging(&target);
            fs::copy(source, &target).map_err(upload_error(&target))?;
        }
        tracing::info!(source = %source.display(), staged = %target.display(), "file uploaded");

        self.uploaded = Some(target.clone());
        self.artifacts = None;
        self.stage = RunStage::Idle;
        self.progress = None;
        Ok(target)
    }

    /// Builds the context for a new run and marks the session busy.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Busy`] while a run is in progress.
    /// - [`SessionError::InputMissing`] if nothing has been uploaded or the
    ///   staged file has disappeared.
    pub fn begin_run(&mut self) -> Result<RunContext, SessionError> {
        if self.running {
            return Err(SessionError::Busy);
        }
        let Some(input) = self.uploaded.clone() else {
            return Err(SessionError::InputMissing { path: None });
        };
        if !input.is_file() {
            return Err(SessionError::InputMissing { path: Some(input) });
        }

        self.running = true;
        self.artifacts = None;
        self.progress = None;
        Ok(RunContext {
            input,
            map_path: self.map_path.clone(),
            missing_path: self.missing_path.clone(),
            center: self.center,
            zoom: self.zoom,
            classifier: self.classifier.clone(),
        })
    }

    /// Records a progress event reported by the worker.
    pub fn apply(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Stage(stage) => self.stage = *stage,
            ProgressEvent::Row(state) => self.progress = Some(*state),
            ProgressEvent::Loaded { .. }
            | ProgressEvent::Filtered { .. }
            | ProgressEvent::Finished(_)
            | ProgressEvent::Failed(_) => {}
        }
    }

    /// Marks the run finished. A successful run's files become saveable.
    pub fn finish_run(&mut self, result: &Result<RunSummary, PipelineError>) {
        self.running = false;
        match result {
            Ok(summary) => {
                self.stage = RunStage::Done;
                self.artifacts = Some(OutputArtifacts {
                    map_path: summary.map_path.clone(),
                    missing_path: summary.missing_path.clone(),
                    summary: summary.clone(),
                });
            }
            Err(_) => self.stage = RunStage::Error,
        }
    }

    /// Moves the generated map to `map_dest` and, if one was written and a
    /// destination is given, the missing-coordinates file to `missing_dest`.
    /// Destinations without an extension get `.html` / `.txt`.
    ///
    /// Either both files move and the run state is cleared, or the call
    /// fails and the session is unchanged.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Busy`] while a run is in progress.
    /// - [`SessionError::NothingToSave`] if no run has produced a map; no
    ///   file is moved.
    /// - [`SessionError::Save`] if a move fails. A missing-coordinates file
    ///   that was already moved is put back.
    pub fn save(
        &mut self,
        map_dest: &Path,
        missing_dest: Option<&Path>,
    ) -> Result<SavedArtifacts, SessionError> {
        if self.running {
            return Err(SessionError::Busy);
        }
        let Some(artifacts) = self.artifacts.as_ref() else {
            return Err(SessionError::NothingToSave);
        };
        if !artifacts.map_path.is_file() {
            tracing::warn!(path = %artifacts.map_path.display(), "generated map is gone");
            return Err(SessionError::NothingToSave);
        }

        let missing = match missing_dest {
            Some(dest) if artifacts.missing_path.is_file() => {
                let dest = with_default_extension(dest, "txt");
                move_file(&artifacts.missing_path, &dest).map_err(|source| {
                    SessionError::Save {
                        path: dest.clone(),
                        source,
                    }
                })?;
                Some(dest)
            }
            _ => None,
        };

        let map_dest = with_default_extension(map_dest, "html");
        if let Err(source) = move_file(&artifacts.map_path, &map_dest) {
            if let Some(moved) = &missing {
                if let Err(e) = move_file(moved, &artifacts.missing_path) {
                    tracing::error!(
                        from = %moved.display(),
                        to = %artifacts.missing_path.display(),
                        error = %e,
                        "failed to restore missing-coordinates file"
                    );
                }
            }
            return Err(SessionError::Save {
                path: map_dest,
                source,
            });
        }

        tracing::info!(path = %map_dest.display(), "map saved");
        if let Some(dest) = &missing {
            tracing::info!(path = %dest.display(), "missing-coordinates file saved");
        }
        self.artifacts = None;
        self.stage = RunStage::Idle;
        self.progress = None;

        Ok(SavedArtifacts {
            map: map_dest,
            missing,
        })
    }

    fn clear_staging(&self, keep: &Path) {
        let entries = match fs::read_dir(&self.uploads_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(dir = %self.uploads_dir.display(), error = %e, "cannot list uploads");
                return;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path == keep || !path.is_file() {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => tracing::info!(path = %path.display(), "removed staged file"),
                Err(e) => tracing::error!(path = %path.display(), error = %e, "failed to remove staged file"),
            }
        }
    }
}

fn upload_error(path: &Path) -> impl FnOnce(io::Error) -> SessionError {
    let path = path.to_path_buf();
    move |source| SessionError::Upload { path, source }
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|allowed| e.eq_ignore_ascii_case(allowed))
        })
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn with_default_extension(path: &Path, ext: &str) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(ext)
    }
}

/// `rename`, falling back to copy + delete when the destination is on
/// another filesystem.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
