//! BI Geo Enrichment API Library
//!
//! This library places fiscal records on the map of Brazil: it resolves the
//! state (UF) of each record from an explicit field, a CEP lookup or a CNPJ
//! lookup, and aggregates KPI values per state for map rendering.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `core`: Resolution, enrichment and aggregation logic.
//! - `integrations`: External lookup services.
//! - `cache`: Bounded, expiring CEP/CNPJ lookup caches.
//! - `circuit_breaker`: Circuit breaker for lookup services.
//! - `config`: Configuration management.
//! - `enrichment`: Batch enrichment driver.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `kpi`: KPI catalogue.
//! - `map_data`: KPI-driven map data factory.
//! - `models`: Records, inputs and map outputs.
//! - `money`: Monetary parsing and formatting.
//! - `resolver`: UF resolver.
//! - `services`: CEP and CNPJ lookup clients.
//! - `uf`: Brazilian states and their geography.

pub mod api;
pub mod core;
pub mod integrations;

pub mod cache;
pub mod circuit_breaker;
pub mod config;
pub mod enrichment;
pub mod errors;
pub mod handlers;
pub mod kpi;
pub mod map_data;
pub mod models;
pub mod money;
pub mod resolver;
pub mod services;
pub mod uf;
