use crate::money::parse_valor;
use crate::uf::{ResolvedUf, Uf};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const CEP_LEN: usize = 8;
pub const CNPJ_LEN: usize = 14;

/// Strips everything but ASCII digits.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalizes a CEP, returning it only when it has exactly 8 digits.
pub fn normalize_cep(raw: &str) -> Option<String> {
    let digits = digits_only(raw);
    (digits.len() == CEP_LEN).then_some(digits)
}

/// Normalizes a CNPJ, returning it only when it has exactly 14 digits.
pub fn normalize_cnpj(raw: &str) -> Option<String> {
    let digits = digits_only(raw);
    (digits.len() == CNPJ_LEN).then_some(digits)
}

/// Fields that can place a record in a state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocationKeys {
    pub uf: Option<String>,
    pub cep: Option<String>,
    pub cnpj: Option<String>,
}

/// Fiscal event from one of the raw sources, normalized at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub location: LocationKeys,
    /// Parsed monetary value; 0 when missing or malformed.
    pub valor: f64,
    pub cancelada: bool,
}

/// Returns the first present key as text. Numbers are accepted so that
/// CEPs/CNPJs sent as JSON numbers are not lost.
fn field_text(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl TransactionRecord {
    /// Builds a strict record from a loosely-typed JSON object.
    ///
    /// Key spellings: `UF`/`uf`, `CEP`/`cep`, `CNPJ`/`cnpj`,
    /// `valor`/`VALOR`/`valorTotal`/`valor_total`, `cancelada`/`CANCELADA`.
    pub fn from_raw(raw: &Value) -> Self {
        let location = LocationKeys {
            uf: field_text(raw, &["UF", "uf"]),
            cep: field_text(raw, &["CEP", "cep"]),
            cnpj: field_text(raw, &["CNPJ", "cnpj"]),
        };

        let valor = ["valor", "VALOR", "valorTotal", "valor_total"]
            .iter()
            .find_map(|key| raw.get(*key))
            .map(parse_valor)
            .unwrap_or(0.0);

        let cancelada = match raw.get("cancelada").or_else(|| raw.get("CANCELADA")) {
            Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("S"),
            Some(Value::Bool(b)) => *b,
            _ => false,
        };

        Self {
            location,
            valor,
            cancelada,
        }
    }
}

/// Raw data sources supplied by the backend aggregation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Saidas,
    Servicos,
    Entradas,
}

/// Input of the map data factory: three optional arrays of loosely-typed records.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiData {
    #[serde(default, alias = "outflows")]
    pub saidas: Vec<Value>,
    #[serde(default, alias = "services")]
    pub servicos: Vec<Value>,
    #[serde(default, alias = "inflows")]
    pub entradas: Vec<Value>,
}

impl ApiData {
    pub fn source(&self, source: DataSource) -> &[Value] {
        match source {
            DataSource::Saidas => &self.saidas,
            DataSource::Servicos => &self.servicos,
            DataSource::Entradas => &self.entradas,
        }
    }
}

/// A record paired with its resolved state, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub record: TransactionRecord,
    pub uf: ResolvedUf,
}

/// Marker colors for a KPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapTheme {
    pub color: &'static str,
    pub fill_color: &'static str,
}

/// Popup cell: either a preformatted label or a raw number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PopupValue {
    Text(String),
    Number(f64),
}

/// Per-state output consumed by the map renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapStateData {
    pub uf: Uf,
    pub nome: &'static str,
    pub lat: f64,
    pub lng: f64,
    /// Drives the marker radius.
    pub valor_principal: f64,
    pub contagem: u64,
    pub popup: BTreeMap<String, PopupValue>,
    pub tema: MapTheme,
}

/// Map data plus the counters the dashboard shows next to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapReport {
    pub kpi: String,
    pub estados: Vec<MapStateData>,
    /// Records that passed the KPI filter.
    pub total_registros: usize,
    /// Filtered records whose state could not be resolved.
    pub registros_sem_uf: usize,
}

/// Body of `POST /api/v1/map-data`.
#[derive(Debug, Clone, Deserialize)]
pub struct MapDataRequest {
    pub kpi: String,
    #[serde(default)]
    pub data: ApiData,
}

/// Query of `GET /api/v1/uf/resolve`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolveQueryParams {
    pub uf: Option<String>,
    pub cep: Option<String>,
    pub cnpj: Option<String>,
}

impl From<ResolveQueryParams> for LocationKeys {
    fn from(params: ResolveQueryParams) -> Self {
        LocationKeys {
            uf: params.uf,
            cep: params.cep,
            cnpj: params.cnpj,
        }
    }
}
