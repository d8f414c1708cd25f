//! Brazilian federative units (UF) and the geographic data used to place them on a map.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label used when a record could not be placed in any state.
pub const UNKNOWN_UF_LABEL: &str = "Desconhecido";

/// One of the 27 Brazilian federative units.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Uf {
    AC,
    AL,
    AP,
    AM,
    BA,
    CE,
    DF,
    ES,
    GO,
    MA,
    MT,
    MS,
    MG,
    PA,
    PB,
    PR,
    PE,
    PI,
    RJ,
    RN,
    RS,
    RO,
    RR,
    SC,
    SP,
    SE,
    TO,
}

/// Static metadata for a state: display name and capital coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UfInfo {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Uf {
    pub const ALL: [Uf; 27] = [
        Uf::AC,
        Uf::AL,
        Uf::AP,
        Uf::AM,
        Uf::BA,
        Uf::CE,
        Uf::DF,
        Uf::ES,
        Uf::GO,
        Uf::MA,
        Uf::MT,
        Uf::MS,
        Uf::MG,
        Uf::PA,
        Uf::PB,
        Uf::PR,
        Uf::PE,
        Uf::PI,
        Uf::RJ,
        Uf::RN,
        Uf::RS,
        Uf::RO,
        Uf::RR,
        Uf::SC,
        Uf::SP,
        Uf::SE,
        Uf::TO,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Uf::AC => "AC",
            Uf::AL => "AL",
            Uf::AP => "AP",
            Uf::AM => "AM",
            Uf::BA => "BA",
            Uf::CE => "CE",
            Uf::DF => "DF",
            Uf::ES => "ES",
            Uf::GO => "GO",
            Uf::MA => "MA",
            Uf::MT => "MT",
            Uf::MS => "MS",
            Uf::MG => "MG",
            Uf::PA => "PA",
            Uf::PB => "PB",
            Uf::PR => "PR",
            Uf::PE => "PE",
            Uf::PI => "PI",
            Uf::RJ => "RJ",
            Uf::RN => "RN",
            Uf::RS => "RS",
            Uf::RO => "RO",
            Uf::RR => "RR",
            Uf::SC => "SC",
            Uf::SP => "SP",
            Uf::SE => "SE",
            Uf::TO => "TO",
        }
    }

    /// State name and the coordinates of its capital.
    pub fn info(&self) -> UfInfo {
        let (name, lat, lng) = match self {
            Uf::AC => ("Acre", -9.9747, -67.8100),
            Uf::AL => ("Alagoas", -9.6658, -35.7350),
            Uf::AP => ("Amapá", 0.0349, -51.0694),
            Uf::AM => ("Amazonas", -3.1190, -60.0217),
            Uf::BA => ("Bahia", -12.9714, -38.5014),
            Uf::CE => ("Ceará", -3.7319, -38.5267),
            Uf::DF => ("Distrito Federal", -15.7939, -47.8828),
            Uf::ES => ("Espírito Santo", -20.3155, -40.3128),
            Uf::GO => ("Goiás", -16.6869, -49.2648),
            Uf::MA => ("Maranhão", -2.5307, -44.3068),
            Uf::MT => ("Mato Grosso", -15.6014, -56.0979),
            Uf::MS => ("Mato Grosso do Sul", -20.4697, -54.6201),
            Uf::MG => ("Minas Gerais", -19.9167, -43.9345),
            Uf::PA => ("Pará", -1.4558, -48.4902),
            Uf::PB => ("Paraíba", -7.1195, -34.8450),
            Uf::PR => ("Paraná", -25.4284, -49.2733),
            Uf::PE => ("Pernambuco", -8.0476, -34.8770),
            Uf::PI => ("Piauí", -5.0920, -42.8038),
            Uf::RJ => ("Rio de Janeiro", -22.9068, -43.1729),
            Uf::RN => ("Rio Grande do Norte", -5.7945, -35.2110),
            Uf::RS => ("Rio Grande do Sul", -30.0346, -51.2177),
            Uf::RO => ("Rondônia", -8.7612, -63.9004),
            Uf::RR => ("Roraima", 2.8235, -60.6758),
            Uf::SC => ("Santa Catarina", -27.5954, -48.5480),
            Uf::SP => ("São Paulo", -23.5505, -46.6333),
            Uf::SE => ("Sergipe", -10.9472, -37.0731),
            Uf::TO => ("Tocantins", -10.2491, -48.3243),
        };
        UfInfo { name, lat, lng }
    }

    /// Parses a UF code, ignoring case and surrounding whitespace.
    ///
    /// Only exact 2-letter codes are accepted; anything else yields `None`.
    pub fn from_code(raw: &str) -> Option<Uf> {
        let trimmed = raw.trim();
        if trimmed.len() != 2 {
            return None;
        }
        let upper = trimmed.to_ascii_uppercase();
        Uf::ALL.iter().copied().find(|uf| uf.code() == upper)
    }
}

impl fmt::Display for Uf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Uf {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uf::from_code(s).ok_or_else(|| format!("invalid UF code: {}", s))
    }
}

/// Outcome of resolving a record's state: a UF or the "Desconhecido" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvedUf {
    Known(Uf),
    Unknown,
}

impl ResolvedUf {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedUf::Known(uf) => uf.code(),
            ResolvedUf::Unknown => UNKNOWN_UF_LABEL,
        }
    }

    pub fn known(&self) -> Option<Uf> {
        match self {
            ResolvedUf::Known(uf) => Some(*uf),
            ResolvedUf::Unknown => None,
        }
    }
}

impl From<Option<Uf>> for ResolvedUf {
    fn from(value: Option<Uf>) -> Self {
        value.map(ResolvedUf::Known).unwrap_or(ResolvedUf::Unknown)
    }
}

impl fmt::Display for ResolvedUf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ResolvedUf {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
