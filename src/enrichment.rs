//! Batch enrichment driver
//!
//! Resolves the UF of many records while keeping external lookup services happy:
//! 1. Split the input into fixed-size batches
//! 2. Resolve every record of a batch concurrently
//! 3. Pause between batches
//!
//! Results always follow input order, whatever order the lookups complete in.

use crate::config::Config;
use crate::models::{EnrichedRecord, TransactionRecord};
use crate::resolver::UfResolver;
use futures::future::join_all;
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentOptions {
    pub batch_size: usize,
    pub delay: Duration,
}

impl Default for EnrichmentOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            delay: DEFAULT_BATCH_DELAY,
        }
    }
}

impl EnrichmentOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            batch_size: config.enrich_batch_size,
            delay: config.enrich_batch_delay,
        }
    }
}

/// Resolves the UF of every record, batch by batch.
///
/// A batch size of 0 is treated as 1. Records with an explicit UF never
/// trigger I/O; failures are absorbed by the resolver.
pub async fn enrich_records(
    resolver: &UfResolver,
    records: Vec<TransactionRecord>,
    options: &EnrichmentOptions,
) -> Vec<EnrichedRecord> {
    let batch_size = options.batch_size.max(1);
    let total_batches = records.len().div_ceil(batch_size);
    let mut resolved = Vec::with_capacity(records.len());

    for (index, batch) in records.chunks(batch_size).enumerate() {
        let batch_ufs = join_all(
            batch
                .iter()
                .map(|record| resolver.resolve_uf(&record.location)),
        )
        .await;
        resolved.extend(batch_ufs);

        tracing::debug!(
            "Enrichment batch {}/{} done ({} records)",
            index + 1,
            total_batches,
            batch.len()
        );

        if index + 1 < total_batches && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }
    }

    records
        .into_iter()
        .zip(resolved)
        .map(|(record, uf)| EnrichedRecord { record, uf })
        .collect()
}
