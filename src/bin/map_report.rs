//! Offline map report: runs the KPI map pipeline over a JSON export and prints the result.
//!
//! Usage: `map_report <api-data.json> "<KPI name>"`

use anyhow::Context;
use rust_bi_geo_api::config::Config;
use rust_bi_geo_api::enrichment::EnrichmentOptions;
use rust_bi_geo_api::map_data::build_map_report;
use rust_bi_geo_api::models::ApiData;
use rust_bi_geo_api::resolver::UfResolver;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_bi_geo_api=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let (path, kpi) = match args.as_slice() {
        [_, path, kpi] => (path, kpi),
        _ => anyhow::bail!("usage: map_report <api-data.json> \"<KPI name>\""),
    };

    let config = Config::from_env()?;
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path))?;
    let api_data: ApiData =
        serde_json::from_str(&content).with_context(|| format!("invalid api data in {}", path))?;

    let resolver = UfResolver::new(&config)?;
    let report = build_map_report(
        &resolver,
        &api_data,
        kpi,
        &EnrichmentOptions::from_config(&config),
    )
    .await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
