//! One-shot commands and the pipeline wiring shared with the shell.

use std::path::Path;
use std::time::Duration;

use uamap_core::AppConfig;
use uamap_geocoder::{FixedIntervalPacer, NominatimClient, Resolution, Resolver};
use uamap_pipeline::{spawn_run, Pipeline, Session};

use crate::progress::ProgressView;

pub(crate) type AppPipeline = Pipeline<NominatimClient, FixedIntervalPacer>;

/// Builds the production pipeline: Nominatim client paced at
/// `request_delay_ms`.
pub(crate) fn build_pipeline(config: &AppConfig) -> anyhow::Result<AppPipeline> {
    let client = NominatimClient::from_config(config)?;
    let pacer = FixedIntervalPacer::new(Duration::from_millis(config.request_delay_ms));
    Ok(Pipeline::new(client, pacer))
}

/// `uamap process`: stage `input`, run it, and save if `map_out` is given.
pub(crate) async fn process_once(
    config: &AppConfig,
    input: &Path,
    map_out: Option<&Path>,
    missing_out: Option<&Path>,
) -> anyhow::Result<()> {
    let mut session = Session::from_config(config);
    session.upload(input)?;
    let ctx = session.begin_run()?;

    let mut handle = spawn_run(build_pipeline(config)?, ctx);
    let mut view = ProgressView::new();
    while let Some(event) = handle.next_event().await {
        session.apply(&event);
        view.handle(&event);
    }
    let (_, result) = handle.finish().await;
    session.finish_run(&result);
    let summary = result?;

    match map_out {
        Some(map_out) => {
            let saved = session.save(map_out, missing_out)?;
            println!("Map saved to {}", saved.map.display());
            if let Some(missing) = saved.missing {
                println!("Missing coordinates saved to {}", missing.display());
            }
        }
        None => {
            println!("Map written to {}", summary.map_path.display());
            if summary.missing() > 0 {
                println!(
                    "Missing coordinates written to {}",
                    summary.missing_path.display()
                );
            }
        }
    }
    Ok(())
}

/// `uamap geocode`: resolve one pair and print what the service said.
pub(crate) async fn geocode_once(config: &AppConfig, city: &str, region: &str) -> anyhow::Result<()> {
    let client = NominatimClient::from_config(config)?;
    match client.resolve(city, region).await? {
        Resolution::Found(coordinates) => println!("{city}, {region}: {coordinates}"),
        Resolution::NotFound => println!("{city}, {region}: not found"),
    }
    Ok(())
}
