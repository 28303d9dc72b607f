//! Interactive session: `upload`, `process`, `status`, `save`, `quit`.
//!
//! Processing runs on a background worker. The loop below waits on stdin and
//! on the worker's progress channel at the same time, so commands such as
//! `status` keep working mid-run. Only this loop mutates the [`Session`].

use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader};
use uamap_core::AppConfig;
use uamap_geocoder::{FixedIntervalPacer, NominatimClient};
use uamap_pipeline::{spawn_run, ProgressEvent, RunHandle, RunStage, Session, SessionError};

use crate::commands::{build_pipeline, AppPipeline};
use crate::progress::{summary_text, ProgressView};

type AppRun = RunHandle<NominatimClient, FixedIntervalPacer>;

const HELP: &str = "\
Commands:
  upload <path>             stage a spreadsheet (.xlsx, .xlsm, .xls, .ods)
  process                   geocode the staged spreadsheet and build the map
  status                    show the current stage and progress
  save <map> [missing]      move the generated map (and missing-coordinates file)
  help                      show this message
  quit                      exit; a run in progress is abandoned";

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ShellCommand {
    Upload(PathBuf),
    Process,
    Status,
    Save {
        map: PathBuf,
        missing: Option<PathBuf>,
    },
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `Ok(None)`.
///
/// `upload` takes the rest of the line as the path so names with spaces
/// work; `save` splits its two destinations on whitespace.
pub(crate) fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(v, r)| (v, r.trim()));

    let command = match verb.to_lowercase().as_str() {
        "upload" | "u" => {
            if rest.is_empty() {
                return Err("usage: upload <path>".to_owned());
            }
            ShellCommand::Upload(PathBuf::from(rest))
        }
        "process" | "p" => ShellCommand::Process,
        "status" | "s" => ShellCommand::Status,
        "save" => {
            let mut args = rest.split_whitespace();
            let Some(map) = args.next() else {
                return Err("usage: save <map> [missing]".to_owned());
            };
            let missing = args.next().map(PathBuf::from);
            if args.next().is_some() {
                return Err("usage: save <map> [missing]".to_owned());
            }
            ShellCommand::Save {
                map: PathBuf::from(map),
                missing,
            }
        }
        "help" | "h" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("unknown command \"{other}\"; type `help`")),
    };
    Ok(Some(command))
}

struct Shell<'a> {
    config: &'a AppConfig,
    session: Session,
    idle: Option<AppPipeline>,
    active: Option<AppRun>,
    view: ProgressView,
}

/// Runs the interactive loop until `quit` or end of input. At end of input
/// a run in progress is allowed to finish first.
pub(crate) async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let mut shell = Shell {
        config,
        session: Session::from_config(config),
        idle: Some(build_pipeline(config)?),
        active: None,
        view: ProgressView::new(),
    };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    println!("{HELP}");

    while stdin_open || shell.active.is_some() {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    continue;
                };
                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(ShellCommand::Quit)) => {
                        if shell.active.is_some() {
                            tracing::warn!("quitting with a run in progress");
                        }
                        break;
                    }
                    Ok(Some(command)) => shell.execute(command)?,
                    Err(message) => shell.view.println(&message),
                }
            }
            event = next_event(&mut shell.active), if shell.active.is_some() => {
                match event {
                    Some(event) => {
                        shell.session.apply(&event);
                        shell.view.handle(&event);
                    }
                    None => shell.complete_run().await?,
                }
            }
        }
    }
    Ok(())
}

async fn next_event(active: &mut Option<AppRun>) -> Option<ProgressEvent> {
    match active {
        Some(handle) => handle.next_event().await,
        None => std::future::pending().await,
    }
}

impl Shell<'_> {
    fn execute(&mut self, command: ShellCommand) -> anyhow::Result<()> {
        match command {
            ShellCommand::Upload(path) => match self.session.upload(&path) {
                Ok(staged) => self
                    .view
                    .println(&format!("File uploaded as {}", staged.display())),
                Err(e) => self.report(&e),
            },
            ShellCommand::Process => self.start_run()?,
            ShellCommand::Status => self.view.println(&self.status_text()),
            ShellCommand::Save { map, missing } => {
                match self.session.save(&map, missing.as_deref()) {
                    Ok(saved) => {
                        self.view
                            .println(&format!("Map saved as {}", saved.map.display()));
                        if let Some(missing) = saved.missing {
                            self.view.println(&format!(
                                "Missing coordinates saved as {}",
                                missing.display()
                            ));
                        }
                    }
                    Err(e) => self.report(&e),
                }
            }
            ShellCommand::Help => self.view.println(HELP),
            // Handled by the loop.
            ShellCommand::Quit => {}
        }
        Ok(())
    }

    fn start_run(&mut self) -> anyhow::Result<()> {
        let ctx = match self.session.begin_run() {
            Ok(ctx) => ctx,
            Err(e) => {
                self.report(&e);
                return Ok(());
            }
        };
        let pipeline = match self.idle.take() {
            Some(pipeline) => pipeline,
            None => build_pipeline(self.config)?,
        };
        tracing::info!(input = %ctx.input.display(), "processing started");
        self.active = Some(spawn_run(pipeline, ctx));
        Ok(())
    }

    async fn complete_run(&mut self) -> anyhow::Result<()> {
        let Some(handle) = self.active.take() else {
            return Ok(());
        };
        let (pipeline, result) = handle.finish().await;
        self.session.finish_run(&result);
        self.idle = match pipeline {
            Some(pipeline) => Some(pipeline),
            None => Some(build_pipeline(self.config)?),
        };
        if let Ok(summary) = &result {
            self.view.println(&format!(
                "Map generated at {}. Use `save <map> [missing]` to keep it and the missing-coordinates file.",
                summary.map_path.display()
            ));
        }
        Ok(())
    }

    fn status_text(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!("stage: {}", self.session.stage()));
        match self.session.uploaded() {
            Some(path) => lines.push(format!("uploaded: {}", path.display())),
            None => lines.push("uploaded: (none)".to_owned()),
        }
        if self.session.stage() == RunStage::Geocoding {
            if let Some(progress) = self.session.progress() {
                lines.push(format!(
                    "progress: {}/{} | {}",
                    progress.processed,
                    progress.total,
                    progress.progress_text()
                ));
            }
        }
        if let Some(artifacts) = self.session.artifacts() {
            lines.push(format!("ready to save: {}", artifacts.map_path.display()));
            lines.push(summary_text(&artifacts.summary));
        }
        lines.join("\n")
    }

    fn report(&self, error: &SessionError) {
        tracing::error!(error = %error, "command failed");
        self.view.println(&format!("Error: {error}"));
    }
}
