//! KPI-driven map data factory.
//!
//! Selects the KPI's sources, filters them, resolves the UF of each record,
//! aggregates value and count per state and emits one marker per state, sorted
//! by value. Every call starts from scratch; only the lookup caches persist.

use crate::enrichment::{enrich_records, EnrichmentOptions};
use crate::kpi::{Kpi, StateAggregate};
use crate::models::{ApiData, MapReport, MapStateData, TransactionRecord};
use crate::resolver::UfResolver;
use crate::uf::Uf;
use std::collections::HashMap;

/// Builds the map markers for `kpi_name`. Unknown KPIs yield an empty list.
pub async fn build_map_data(
    resolver: &UfResolver,
    api_data: &ApiData,
    kpi_name: &str,
    options: &EnrichmentOptions,
) -> Vec<MapStateData> {
    build_map_report(resolver, api_data, kpi_name, options)
        .await
        .estados
}

/// Same as [`build_map_data`], with record counters for the dashboard.
pub async fn build_map_report(
    resolver: &UfResolver,
    api_data: &ApiData,
    kpi_name: &str,
    options: &EnrichmentOptions,
) -> MapReport {
    let Some(kpi) = Kpi::from_name(kpi_name) else {
        tracing::warn!("Unknown KPI '{}', returning empty map data", kpi_name);
        return MapReport {
            kpi: kpi_name.to_string(),
            estados: Vec::new(),
            total_registros: 0,
            registros_sem_uf: 0,
        };
    };

    let records: Vec<TransactionRecord> = kpi
        .sources()
        .iter()
        .flat_map(|source| api_data.source(*source))
        .map(TransactionRecord::from_raw)
        .filter(|record| kpi.includes(record))
        .collect();
    let total_registros = records.len();

    let enriched = enrich_records(resolver, records, options).await;

    let mut order: Vec<Uf> = Vec::new();
    let mut aggregates: HashMap<Uf, StateAggregate> = HashMap::new();
    let mut registros_sem_uf = 0;

    for item in &enriched {
        let Some(uf) = item.uf.known() else {
            registros_sem_uf += 1;
            continue;
        };
        aggregates
            .entry(uf)
            .or_insert_with(|| {
                order.push(uf);
                StateAggregate::default()
            })
            .add(item.record.valor);
    }

    let mut estados: Vec<MapStateData> = order
        .into_iter()
        .filter_map(|uf| aggregates.get(&uf).map(|aggregate| (uf, aggregate)))
        .map(|(uf, aggregate)| state_data(kpi, uf, aggregate))
        .collect();

    // Stable: ties keep first-seen order.
    estados.sort_by(|a, b| b.valor_principal.total_cmp(&a.valor_principal));

    tracing::info!(
        "Map data for '{}': {} states, {} records, {} without UF",
        kpi.name(),
        estados.len(),
        total_registros,
        registros_sem_uf
    );

    MapReport {
        kpi: kpi.name().to_string(),
        estados,
        total_registros,
        registros_sem_uf,
    }
}

fn state_data(kpi: Kpi, uf: Uf, aggregate: &StateAggregate) -> MapStateData {
    let info = uf.info();
    MapStateData {
        uf,
        nome: info.name,
        lat: info.lat,
        lng: info.lng,
        valor_principal: aggregate.total,
        contagem: aggregate.count,
        popup: kpi.popup(aggregate),
        tema: kpi.theme(),
    }
}
