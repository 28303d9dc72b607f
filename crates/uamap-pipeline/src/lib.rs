pub mod error;
pub mod map;
pub mod missing_log;
pub mod pipeline;
pub mod session;
pub mod sheet;
pub mod worker;

pub use error::{PipelineError, SessionError, SheetError};
pub use map::MapBuilder;
pub use missing_log::MissingLog;
pub use pipeline::{Pipeline, ProgressEvent, RunContext, RunStage, RunState, RunSummary};
pub use session::{OutputArtifacts, SavedArtifacts, Session};
pub use sheet::{dedup_records, read_records};
pub use worker::{spawn_run, RunHandle};
