use std::time::Duration;

pub const DEFAULT_CEP_API_BASE_URL: &str = "https://viacep.com.br/ws";
pub const DEFAULT_CNPJ_API_BASE_URL: &str = "https://brasilapi.com.br/api/cnpj/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub cep_api_base_url: String,
    pub cnpj_api_base_url: String,
    /// Per-call timeout applied to every external lookup.
    pub lookup_timeout: Duration,
    pub enrich_batch_size: usize,
    pub enrich_batch_delay: Duration,
    pub cache_max_capacity: u64,
    pub cache_ttl: Duration,
    /// TTL for "not found" and failed lookups.
    pub cache_negative_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            cep_api_base_url: DEFAULT_CEP_API_BASE_URL.to_string(),
            cnpj_api_base_url: DEFAULT_CNPJ_API_BASE_URL.to_string(),
            lookup_timeout: Duration::from_secs(5),
            enrich_batch_size: 10,
            enrich_batch_delay: Duration::from_millis(100),
            cache_max_capacity: 50_000,
            cache_ttl: Duration::from_secs(86400),
            cache_negative_ttl: Duration::from_secs(300),
        }
    }
}

fn validated_url(name: &str, default: &str) -> anyhow::Result<String> {
    let url = std::env::var(name).unwrap_or_else(|_| default.to_string());
    if url.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", name);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    url::Url::parse(&url).map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
    Ok(url.trim_end_matches('/').to_string())
}

fn parsed_var<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got '{}'", name, raw)),
        _ => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let lookup_timeout_secs: u64 = parsed_var("LOOKUP_TIMEOUT_SECS", 5)?;
        if lookup_timeout_secs == 0 {
            anyhow::bail!("LOOKUP_TIMEOUT_SECS must be greater than zero");
        }

        let enrich_batch_size: usize = parsed_var("ENRICH_BATCH_SIZE", defaults.enrich_batch_size)?;
        if enrich_batch_size == 0 {
            anyhow::bail!("ENRICH_BATCH_SIZE must be greater than zero");
        }

        let config = Self {
            port: parsed_var("PORT", defaults.port)
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            cep_api_base_url: validated_url("CEP_API_BASE_URL", DEFAULT_CEP_API_BASE_URL)?,
            cnpj_api_base_url: validated_url("CNPJ_API_BASE_URL", DEFAULT_CNPJ_API_BASE_URL)?,
            lookup_timeout: Duration::from_secs(lookup_timeout_secs),
            enrich_batch_size,
            enrich_batch_delay: Duration::from_millis(parsed_var("ENRICH_BATCH_DELAY_MS", 100)?),
            cache_max_capacity: parsed_var(
                "LOOKUP_CACHE_MAX_CAPACITY",
                defaults.cache_max_capacity,
            )?,
            cache_ttl: Duration::from_secs(parsed_var("LOOKUP_CACHE_TTL_SECS", 86400)?),
            cache_negative_ttl: Duration::from_secs(parsed_var(
                "LOOKUP_CACHE_NEGATIVE_TTL_SECS",
                300,
            )?),
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("CEP API Base URL: {}", config.cep_api_base_url);
        tracing::debug!("CNPJ API Base URL: {}", config.cnpj_api_base_url);
        tracing::debug!(
            "Lookup timeout: {:?}, batch size: {}, batch delay: {:?}",
            config.lookup_timeout,
            config.enrich_batch_size,
            config.enrich_batch_delay
        );
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}
