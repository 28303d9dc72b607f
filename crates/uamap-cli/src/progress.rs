//! Terminal rendering of worker progress.

use indicatif::{ProgressBar, ProgressStyle};
use uamap_pipeline::{ProgressEvent, RunStage, RunSummary};

const BAR_TEMPLATE: &str = "{bar:40.cyan/blue} {pos}/{len} {msg}";

/// Turns [`ProgressEvent`]s into a progress bar and status lines.
pub(crate) struct ProgressView {
    bar: Option<ProgressBar>,
}

impl ProgressView {
    pub(crate) fn new() -> Self {
        Self { bar: None }
    }

    pub(crate) fn handle(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Stage(RunStage::Loading) => self.println("Reading spreadsheet..."),
            ProgressEvent::Stage(RunStage::Saving) => self.println("Saving map..."),
            ProgressEvent::Stage(_) => {}
            ProgressEvent::Loaded { rows } => self.println(&format!("Loaded {rows} rows")),
            ProgressEvent::Filtered { unique } => {
                self.println(&format!("{unique} unique rows to geocode"));
                self.start_bar(*unique as u64);
            }
            ProgressEvent::Row(state) => {
                if let Some(bar) = &self.bar {
                    bar.set_position(state.processed as u64);
                    bar.set_message(state.progress_text());
                }
            }
            ProgressEvent::Finished(summary) => {
                if let Some(bar) = self.bar.take() {
                    bar.finish_and_clear();
                }
                println!("{}", summary_text(summary));
            }
            ProgressEvent::Failed(message) => {
                if let Some(bar) = self.bar.take() {
                    bar.abandon();
                }
                eprintln!("Processing failed: {message}");
            }
        }
    }

    /// Prints above the bar when one is active.
    pub(crate) fn println(&self, line: &str) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{line}"),
        }
    }

    fn start_bar(&mut self, len: u64) {
        let bar = ProgressBar::new(len);
        match ProgressStyle::with_template(BAR_TEMPLATE) {
            Ok(style) => bar.set_style(style.progress_chars("=>-")),
            Err(e) => tracing::debug!(error = %e, "falling back to default progress style"),
        }
        self.bar = Some(bar);
    }
}

pub(crate) fn summary_text(summary: &RunSummary) -> String {
    format!(
        "Processing finished in {}s: {} unique rows, {} markers ({} delivered, {} not delivered), \
         {} without coordinates ({} not found, {} lookup errors)",
        summary.elapsed.as_secs(),
        summary.unique_rows,
        summary.markers(),
        summary.green,
        summary.red,
        summary.missing(),
        summary.not_found,
        summary.failed,
    )
}
