use crate::circuit_breaker::{create_lookup_circuit_breaker, LookupCircuitBreaker};
use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::uf::Uf;
use failsafe::futures::CircuitBreaker;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Builds the HTTP client shared by the lookup services.
fn lookup_client(timeout: Duration) -> Result<Client, AppError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::InternalError(format!("Failed to create HTTP client: {}", e)))
}

/// Unwraps the circuit breaker result, turning a rejection into an external API error.
fn breaker_result<T>(
    service: &str,
    result: Result<T, failsafe::Error<AppError>>,
) -> Result<T, AppError> {
    match result {
        Ok(value) => Ok(value),
        Err(failsafe::Error::Inner(e)) => Err(e),
        Err(failsafe::Error::Rejected) => Err(AppError::ExternalApiError(format!(
            "{} circuit breaker is open",
            service
        ))),
    }
}

fn parse_uf_field(service: &str, key: &str, uf: Option<&str>) -> Option<Uf> {
    let parsed = uf.and_then(Uf::from_code);
    if parsed.is_none() {
        tracing::warn!("{} returned no valid UF for {}: {:?}", service, key, uf);
    }
    parsed
}

/// Postal code lookup (ViaCEP-compatible: `GET {base}/{cep}/json/`).
pub struct CepService {
    client: Client,
    base_url: String,
    breaker: LookupCircuitBreaker,
}

#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    uf: Option<String>,
    /// `true` (or `"true"`) when the CEP does not exist.
    erro: Option<Value>,
}

impl ViaCepResponse {
    fn is_not_found(&self) -> bool {
        match &self.erro {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            Some(_) => true,
            None => false,
        }
    }
}

impl CepService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            client: lookup_client(config.lookup_timeout)?,
            base_url: config.cep_api_base_url.trim_end_matches('/').to_string(),
            breaker: create_lookup_circuit_breaker(),
        })
    }

    /// Looks up the UF of a normalized 8-digit CEP.
    ///
    /// `Ok(None)` means the service answered but has no usable UF for it.
    pub async fn lookup_uf(&self, cep: &str) -> Result<Option<Uf>, AppError> {
        let result = self.breaker.call(self.fetch(cep)).await;
        breaker_result("CEP service", result)
    }

    async fn fetch(&self, cep: &str) -> Result<Option<Uf>, AppError> {
        let url = format!("{}/{}/json/", self.base_url, cep);
        tracing::debug!("Fetching CEP {} from {}", cep, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(AppError::from)
            .with_context(|| format!("CEP request for {}", cep))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
            tracing::debug!("CEP {} not found (status {})", cep, status);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::ExternalApiError(format!(
                "CEP service returned status {}",
                status
            )));
        }

        // The client timeout also covers reading the body
        let body: ViaCepResponse = response
            .json()
            .await
            .map_err(AppError::from)
            .with_context(|| format!("Reading CEP response for {}", cep))?;

        if body.is_not_found() {
            tracing::debug!("CEP {} not found", cep);
            return Ok(None);
        }

        Ok(parse_uf_field("CEP service", cep, body.uf.as_deref()))
    }
}

/// Company registry lookup (BrasilAPI-compatible: `GET {base}/{cnpj}`).
pub struct CnpjService {
    client: Client,
    base_url: String,
    breaker: LookupCircuitBreaker,
}

#[derive(Debug, Deserialize)]
struct CnpjResponse {
    uf: Option<String>,
    /// Some registries answer 200 with `{"status": "ERROR"}` for unknown numbers.
    status: Option<String>,
}

impl CnpjService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            client: lookup_client(config.lookup_timeout)?,
            base_url: config.cnpj_api_base_url.trim_end_matches('/').to_string(),
            breaker: create_lookup_circuit_breaker(),
        })
    }

    /// Looks up the UF of a normalized 14-digit CNPJ.
    pub async fn lookup_uf(&self, cnpj: &str) -> Result<Option<Uf>, AppError> {
        let result = self.breaker.call(self.fetch(cnpj)).await;
        breaker_result("CNPJ service", result)
    }

    async fn fetch(&self, cnpj: &str) -> Result<Option<Uf>, AppError> {
        let url = format!("{}/{}", self.base_url, cnpj);
        tracing::debug!("Fetching CNPJ {} from {}", cnpj, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(AppError::from)
            .with_context(|| format!("CNPJ request for {}", cnpj))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
            tracing::debug!("CNPJ {} not found (status {})", cnpj, status);
            return Ok(None);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "CNPJ service returned status {}: {}",
                status, error_text
            )));
        }

        // The client timeout also covers reading the body
        let body: CnpjResponse = response
            .json()
            .await
            .map_err(AppError::from)
            .with_context(|| format!("Reading CNPJ response for {}", cnpj))?;

        if body
            .status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("ERROR"))
        {
            tracing::debug!("CNPJ {} not found", cnpj);
            return Ok(None);
        }

        Ok(parse_uf_field("CNPJ service", cnpj, body.uf.as_deref()))
    }
}
