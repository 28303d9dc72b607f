//! Runs a pipeline on a background task and hands progress back over a channel.

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use uamap_geocoder::{Pacer, Resolver};

use crate::error::PipelineError;
use crate::pipeline::{Pipeline, ProgressEvent, RunContext, RunSummary};

type RunOutput<R, P> = (Pipeline<R, P>, Result<RunSummary, PipelineError>);

/// A run in flight. Drain [`RunHandle::next_event`] until it returns `None`,
/// then call [`RunHandle::finish`].
pub struct RunHandle<R, P> {
    events: UnboundedReceiver<ProgressEvent>,
    join: JoinHandle<RunOutput<R, P>>,
}

/// Moves `pipeline` onto a tokio task and starts processing `ctx`.
///
/// The task is the only writer of run state; the caller only ever sees
/// [`ProgressEvent`]s. There is no cancellation.
pub fn spawn_run<R, P>(mut pipeline: Pipeline<R, P>, ctx: RunContext) -> RunHandle<R, P>
where
    R: Resolver + 'static,
    P: Pacer + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let join = tokio::spawn(async move {
        let result = pipeline.run(&ctx, &tx).await;
        (pipeline, result)
    });
    RunHandle { events: rx, join }
}

impl<R, P> RunHandle<R, P> {
    /// Next progress event, or `None` once the worker has finished.
    pub async fn next_event(&mut self) -> Option<ProgressEvent> {
        self.events.recv().await
    }

    /// Waits for the worker and returns the pipeline for reuse along with
    /// the run result. The pipeline is `None` if the worker panicked.
    pub async fn finish(self) -> (Option<Pipeline<R, P>>, Result<RunSummary, PipelineError>) {
        match self.join.await {
            Ok((pipeline, result)) => (Some(pipeline), result),
            Err(e) => {
                tracing::error!(error = %e, "processing worker did not complete");
                (None, Err(PipelineError::Worker(e.to_string())))
            }
        }
    }
}
