//! UF resolution with strict priority: explicit field → CEP → CNPJ → unknown.
//!
//! Lookup failures never escape: they are logged, cached as negative results and
//! the record falls through to the next source.

use crate::cache::LookupCache;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{normalize_cep, normalize_cnpj, LocationKeys};
use crate::services::{CepService, CnpjService};
use crate::uf::{ResolvedUf, Uf};
use serde::Serialize;

/// Where a resolved UF came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionSource {
    Explicit,
    Cep,
    Cnpj,
    Unresolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UfResolution {
    pub uf: ResolvedUf,
    pub source: ResolutionSource,
}

impl UfResolution {
    fn found(uf: Uf, source: ResolutionSource) -> Self {
        Self {
            uf: ResolvedUf::Known(uf),
            source,
        }
    }

    fn unresolved() -> Self {
        Self {
            uf: ResolvedUf::Unknown,
            source: ResolutionSource::Unresolved,
        }
    }
}

/// Outcome of a single external lookup, kept apart so timeouts are
/// distinguishable from "not found" in the logs.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(Uf),
    NotFound,
    TimedOut,
    Failed(String),
}

impl LookupOutcome {
    fn from_result(result: Result<Option<Uf>, AppError>) -> Self {
        match result {
            Ok(Some(uf)) => LookupOutcome::Found(uf),
            Ok(None) => LookupOutcome::NotFound,
            Err(e) if e.is_timeout() => LookupOutcome::TimedOut,
            Err(e) => LookupOutcome::Failed(e.to_string()),
        }
    }

    pub fn uf(&self) -> Option<Uf> {
        match self {
            LookupOutcome::Found(uf) => Some(*uf),
            _ => None,
        }
    }
}

pub struct UfResolver {
    cep_service: CepService,
    cnpj_service: CnpjService,
    cep_cache: LookupCache,
    cnpj_cache: LookupCache,
}

impl UfResolver {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            cep_service: CepService::new(config)?,
            cnpj_service: CnpjService::new(config)?,
            cep_cache: LookupCache::from_config("CEP", config),
            cnpj_cache: LookupCache::from_config("CNPJ", config),
        })
    }

    pub fn cep_cache(&self) -> &LookupCache {
        &self.cep_cache
    }

    pub fn cnpj_cache(&self) -> &LookupCache {
        &self.cnpj_cache
    }

    /// Drops every cached lookup, positive and negative.
    pub fn invalidate_caches(&self) {
        self.cep_cache.invalidate_all();
        self.cnpj_cache.invalidate_all();
    }

    /// Resolves the state of a record, returning only the UF.
    pub async fn resolve_uf(&self, location: &LocationKeys) -> ResolvedUf {
        self.resolve(location).await.uf
    }

    /// Resolves the state of a record along with the source that produced it.
    pub async fn resolve(&self, location: &LocationKeys) -> UfResolution {
        if let Some(uf) = location.uf.as_deref().and_then(Uf::from_code) {
            return UfResolution::found(uf, ResolutionSource::Explicit);
        }

        if let Some(cep) = location.cep.as_deref().and_then(normalize_cep) {
            if let Some(uf) = self.lookup_cep(&cep).await {
                return UfResolution::found(uf, ResolutionSource::Cep);
            }
        }

        if let Some(cnpj) = location.cnpj.as_deref().and_then(normalize_cnpj) {
            if let Some(uf) = self.lookup_cnpj(&cnpj).await {
                return UfResolution::found(uf, ResolutionSource::Cnpj);
            }
        }

        tracing::debug!("Could not resolve UF for {:?}", location);
        UfResolution::unresolved()
    }

    async fn lookup_cep(&self, cep: &str) -> Option<Uf> {
        self.cep_cache
            .get_or_lookup(cep, async {
                let outcome = LookupOutcome::from_result(self.cep_service.lookup_uf(cep).await);
                log_outcome("CEP", cep, &outcome);
                outcome.uf()
            })
            .await
    }

    async fn lookup_cnpj(&self, cnpj: &str) -> Option<Uf> {
        self.cnpj_cache
            .get_or_lookup(cnpj, async {
                let outcome =
                    LookupOutcome::from_result(self.cnpj_service.lookup_uf(cnpj).await);
                log_outcome("CNPJ", cnpj, &outcome);
                outcome.uf()
            })
            .await
    }
}

fn log_outcome(kind: &str, key: &str, outcome: &LookupOutcome) {
    match outcome {
        LookupOutcome::Found(uf) => tracing::debug!("✓ {} {} → {}", kind, key, uf),
        LookupOutcome::NotFound => tracing::debug!("{} {} not found", kind, key),
        LookupOutcome::TimedOut => tracing::warn!("❌ {} lookup for {} timed out", kind, key),
        LookupOutcome::Failed(e) => tracing::warn!("❌ {} lookup for {} failed: {}", kind, key, e),
    }
}
