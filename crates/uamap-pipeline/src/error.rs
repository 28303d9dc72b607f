use std::path::{Path, PathBuf};

use thiserror::Error;

/// The spreadsheet could not be turned into input records.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("failed to open spreadsheet: {0}")]
    Open(#[from] calamine::Error),

    #[error("spreadsheet contains no worksheets")]
    NoSheets,

    #[error("failed to read worksheet \"{sheet}\": {source}")]
    Range {
        sheet: String,
        #[source]
        source: calamine::Error,
    },

    #[error("worksheet \"{sheet}\" has no header row")]
    EmptySheet { sheet: String },

    #[error("required column \"{column}\" not found in header")]
    MissingColumn { column: String },
}

/// Errors that abort a processing run.
///
/// Per-row geocoding failures never show up here; they become
/// missing-coordinates entries.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input file not found: {}", path.display())]
    InputMissing { path: PathBuf },

    #[error("could not parse spreadsheet: {0}")]
    Parse(#[from] SheetError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("processing worker stopped unexpectedly: {0}")]
    Worker(String),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors surfaced by the interactive session (upload / process / save).
#[derive(Debug, Error)]
pub enum SessionError {
    /// `path` is `None` when nothing has been uploaded yet.
    #[error("{}", input_missing_message(.path.as_deref()))]
    InputMissing { path: Option<PathBuf> },

    #[error("unsupported file type {}; expected .xlsx, .xlsm, .xls or .ods", path.display())]
    UnsupportedFile { path: PathBuf },

    #[error("a run is already in progress")]
    Busy,

    #[error("nothing to save; process a file first")]
    NothingToSave,

    #[error("failed to stage upload {}: {source}", path.display())]
    Upload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

fn input_missing_message(path: Option<&Path>) -> String {
    match path {
        Some(path) => format!("input file not found: {}", path.display()),
        None => "no file to process; upload a spreadsheet first".to_owned(),
    }
}
