//! Processing run: load → filter → geocode → save.
//!
//! A run owns everything it mutates (map builder, missing log, timers) and
//! reports progress only through [`ProgressEvent`]s on a channel, so the
//! caller's UI task stays the sole owner of display state.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use uamap_core::{
    Coordinates, DeliveryClassifier, InputRecord, MapMarker, MarkerColor, ResolvedPoint,
};
use uamap_geocoder::{Pacer, Resolution, Resolver};

use crate::error::PipelineError;
use crate::map::MapBuilder;
use crate::missing_log::MissingLog;
use crate::sheet::{dedup_records, read_records};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Idle,
    Loading,
    Filtering,
    Geocoding,
    Saving,
    Done,
    Error,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStage::Idle => "idle",
            RunStage::Loading => "loading",
            RunStage::Filtering => "filtering",
            RunStage::Geocoding => "geocoding",
            RunStage::Saving => "saving",
            RunStage::Done => "done",
            RunStage::Error => "error",
        };
        f.write_str(s)
    }
}

/// Progress snapshot after a row has been processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    pub processed: usize,
    pub total: usize,
    pub elapsed: Duration,
}

impl RunState {
    /// Extrapolated time left: `elapsed / processed * total - elapsed`.
    /// Zero before the first row completes.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn remaining(&self) -> Duration {
        if self.processed == 0 || self.processed >= self.total {
            return Duration::ZERO;
        }
        let per_row = self.elapsed.as_secs_f64() / self.processed as f64;
        let estimated_total = per_row * self.total as f64;
        Duration::from_secs_f64((estimated_total - self.elapsed.as_secs_f64()).max(0.0))
    }

    /// `"elapsed: 12s | remaining: 30s"`, whole seconds, truncated.
    #[must_use]
    pub fn progress_text(&self) -> String {
        format!(
            "elapsed: {}s | remaining: {}s",
            self.elapsed.as_secs(),
            self.remaining().as_secs()
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Stage(RunStage),
    Loaded { rows: usize },
    Filtered { unique: usize },
    Row(RunState),
    Finished(RunSummary),
    Failed(String),
}

/// Totals for a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total_rows: usize,
    pub unique_rows: usize,
    pub green: usize,
    pub red: usize,
    /// The service answered with no match.
    pub not_found: usize,
    /// The service could not be asked (transport or protocol failure).
    pub failed: usize,
    pub map_path: PathBuf,
    pub missing_path: PathBuf,
    pub elapsed: Duration,
}

impl RunSummary {
    #[must_use]
    pub fn markers(&self) -> usize {
        self.green + self.red
    }

    /// Lines written to the missing-coordinates file.
    #[must_use]
    pub fn missing(&self) -> usize {
        self.not_found + self.failed
    }
}

/// Everything one run needs to know, owned by that run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub input: PathBuf,
    pub map_path: PathBuf,
    pub missing_path: PathBuf,
    pub center: Coordinates,
    pub zoom: u8,
    pub classifier: DeliveryClassifier,
}

/// Drives a [`Resolver`] over the unique rows of a spreadsheet, pacing
/// requests through a [`Pacer`].
pub struct Pipeline<R, P> {
    resolver: R,
    pacer: P,
}

impl<R, P> Pipeline<R, P>
where
    R: Resolver,
    P: Pacer,
{
    pub fn new(resolver: R, pacer: P) -> Self {
        Self { resolver, pacer }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Runs every stage and reports through `events`.
    ///
    /// On failure a [`RunStage::Error`] stage and a [`ProgressEvent::Failed`]
    /// are emitted before the error is returned. Files written before the
    /// failure are left in place.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::InputMissing`] if `ctx.input` does not exist; no
    ///   output file is touched in that case.
    /// - [`PipelineError::Parse`] if the spreadsheet cannot be read.
    /// - [`PipelineError::Io`] if the missing log or the map cannot be written.
    /// - [`PipelineError::Worker`] if the spreadsheet reader task panics.
    pub async fn run(
        &mut self,
        ctx: &RunContext,
        events: &UnboundedSender<ProgressEvent>,
    ) -> Result<RunSummary, PipelineError> {
        match self.run_stages(ctx, events).await {
            Ok(summary) => {
                emit(events, ProgressEvent::Stage(RunStage::Done));
                emit(events, ProgressEvent::Finished(summary.clone()));
                Ok(summary)
            }
            Err(e) => {
                tracing::error!(input = %ctx.input.display(), error = %e, "processing run failed");
                emit(events, ProgressEvent::Stage(RunStage::Error));
                emit(events, ProgressEvent::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    async fn run_stages(
        &mut self,
        ctx: &RunContext,
        events: &UnboundedSender<ProgressEvent>,
    ) -> Result<RunSummary, PipelineError> {
        if !ctx.input.is_file() {
            return Err(PipelineError::InputMissing {
                path: ctx.input.clone(),
            });
        }

        let missing = MissingLog::new(&ctx.missing_path);
        missing
            .reset()
            .map_err(|e| PipelineError::io(&ctx.missing_path, e))?;

        emit(events, ProgressEvent::Stage(RunStage::Loading));
        tracing::info!(input = %ctx.input.display(), "reading spreadsheet");
        // calamine decodes the whole workbook synchronously.
        let input = ctx.input.clone();
        let records = tokio::task::spawn_blocking(move || read_records(&input))
            .await
            .map_err(|e| PipelineError::Worker(e.to_string()))??;
        let total_rows = records.len();
        tracing::info!(rows = total_rows, "spreadsheet loaded");
        emit(events, ProgressEvent::Loaded { rows: total_rows });

        emit(events, ProgressEvent::Stage(RunStage::Filtering));
        let unique = dedup_records(records);
        tracing::info!(unique = unique.len(), "removed duplicate rows");
        emit(
            events,
            ProgressEvent::Filtered {
                unique: unique.len(),
            },
        );

        emit(events, ProgressEvent::Stage(RunStage::Geocoding));
        let mut map = MapBuilder::new(ctx.center, ctx.zoom);
        let tally = self
            .geocode_rows(&unique, ctx, &missing, &mut map, events)
            .await?;

        emit(events, ProgressEvent::Stage(RunStage::Saving));
        tracing::info!(path = %ctx.map_path.display(), markers = map.len(), "saving map");
        map.save(&ctx.map_path)
            .map_err(|e| PipelineError::io(&ctx.map_path, e))?;

        let summary = RunSummary {
            total_rows,
            unique_rows: unique.len(),
            green: tally.green,
            red: tally.red,
            not_found: tally.not_found,
            failed: tally.failed,
            map_path: ctx.map_path.clone(),
            missing_path: ctx.missing_path.clone(),
            elapsed: tally.elapsed,
        };
        tracing::info!(
            markers = summary.markers(),
            green = summary.green,
            red = summary.red,
            not_found = summary.not_found,
            failed = summary.failed,
            elapsed_secs = summary.elapsed.as_secs(),
            "map generated"
        );
        Ok(summary)
    }

    async fn geocode_rows(
        &mut self,
        rows: &[InputRecord],
        ctx: &RunContext,
        missing: &MissingLog,
        map: &mut MapBuilder,
        events: &UnboundedSender<ProgressEvent>,
    ) -> Result<Tally, PipelineError> {
        let start = Instant::now();
        let mut tally = Tally::default();

        for (i, record) in rows.iter().enumerate() {
            self.pacer.pace().await;

            let coordinates = match self.resolver.resolve(&record.city, &record.area).await {
                Ok(Resolution::Found(coordinates)) => Some(coordinates),
                Ok(Resolution::NotFound) => {
                    tracing::warn!(city = %record.city, area = %record.area, "no coordinates found");
                    tally.not_found += 1;
                    None
                }
                Err(e) => {
                    tracing::error!(
                        city = %record.city,
                        area = %record.area,
                        transient = e.is_transient(),
                        error = %e,
                        "geocoding failed"
                    );
                    tally.failed += 1;
                    None
                }
            };
            let point = ResolvedPoint {
                city: record.city.clone(),
                area: record.area.clone(),
                coordinates,
            };

            match point.coordinates {
                Some(coordinates) => {
                    let marker = MapMarker::for_record(record, coordinates, &ctx.classifier);
                    match marker.color {
                        MarkerColor::Green => tally.green += 1,
                        MarkerColor::Red => tally.red += 1,
                    }
                    map.add_marker(marker);
                }
                None => missing
                    .append(&point.city, &point.area)
                    .map_err(|e| PipelineError::io(missing.path(), e))?,
            }

            emit(
                events,
                ProgressEvent::Row(RunState {
                    processed: i + 1,
                    total: rows.len(),
                    elapsed: start.elapsed(),
                }),
            );
        }

        tally.elapsed = start.elapsed();
        Ok(tally)
    }
}

#[derive(Debug, Default)]
struct Tally {
    green: usize,
    red: usize,
    not_found: usize,
    failed: usize,
    elapsed: Duration,
}

/// Sends an event, ignoring a receiver that has gone away.
fn emit(events: &UnboundedSender<ProgressEvent>, event: ProgressEvent) {
    if events.send(event).is_err() {
        tracing::trace!("progress receiver dropped");
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
