//! KPI catalogue: which sources each map view reads, how it filters them,
//! how it is colored and what its popups show.

use crate::models::{DataSource, MapTheme, PopupValue, TransactionRecord};
use crate::money::{format_brl, round2};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kpi {
    ReceitaBrutaTotal,
    ReceitaVendas,
    ReceitaServicos,
    NotasCanceladas,
    ComprasAquisicoes,
}

/// Per-state totals a popup is built from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StateAggregate {
    pub total: f64,
    pub count: u64,
}

impl StateAggregate {
    pub fn add(&mut self, valor: f64) {
        self.total += valor.max(0.0);
        self.count += 1;
    }

    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            round2(self.total / self.count as f64)
        }
    }
}

/// Catalogue entry as listed by `GET /api/v1/kpis`.
#[derive(Debug, Clone, Serialize)]
pub struct KpiSummary {
    pub nome: &'static str,
    pub fontes: &'static [DataSource],
    pub tema: MapTheme,
}

impl Kpi {
    pub const ALL: [Kpi; 5] = [
        Kpi::ReceitaBrutaTotal,
        Kpi::ReceitaVendas,
        Kpi::ReceitaServicos,
        Kpi::NotasCanceladas,
        Kpi::ComprasAquisicoes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Kpi::ReceitaBrutaTotal => "Receita Bruta Total",
            Kpi::ReceitaVendas => "Receita de Vendas",
            Kpi::ReceitaServicos => "Receita de Serviços",
            Kpi::NotasCanceladas => "Notas Canceladas",
            Kpi::ComprasAquisicoes => "Compras e Aquisições",
        }
    }

    /// Finds a KPI by display name, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Kpi> {
        let wanted = name.trim().to_lowercase();
        Kpi::ALL
            .iter()
            .copied()
            .find(|kpi| kpi.name().to_lowercase() == wanted)
    }

    pub fn sources(&self) -> &'static [DataSource] {
        match self {
            Kpi::ReceitaBrutaTotal | Kpi::NotasCanceladas => {
                &[DataSource::Saidas, DataSource::Servicos]
            }
            Kpi::ReceitaVendas => &[DataSource::Saidas],
            Kpi::ReceitaServicos => &[DataSource::Servicos],
            Kpi::ComprasAquisicoes => &[DataSource::Entradas],
        }
    }

    pub fn includes(&self, record: &TransactionRecord) -> bool {
        match self {
            Kpi::ReceitaBrutaTotal | Kpi::ReceitaVendas | Kpi::ReceitaServicos => {
                !record.cancelada
            }
            Kpi::NotasCanceladas => record.cancelada,
            Kpi::ComprasAquisicoes => true,
        }
    }

    pub fn theme(&self) -> MapTheme {
        let (color, fill_color) = match self {
            Kpi::ReceitaBrutaTotal => ("#16a34a", "#22c55e"),
            Kpi::ReceitaVendas => ("#0d9488", "#14b8a6"),
            Kpi::ReceitaServicos => ("#2563eb", "#3b82f6"),
            Kpi::NotasCanceladas => ("#dc2626", "#ef4444"),
            Kpi::ComprasAquisicoes => ("#ea580c", "#f97316"),
        };
        MapTheme { color, fill_color }
    }

    pub fn popup(&self, aggregate: &StateAggregate) -> BTreeMap<String, PopupValue> {
        let total = PopupValue::Text(format_brl(aggregate.total));
        let count = PopupValue::Number(aggregate.count as f64);
        let average = PopupValue::Number(aggregate.average());

        let fields = match self {
            Kpi::ReceitaBrutaTotal => vec![
                ("Faturamento Total", total),
                ("Notas Emitidas", count),
                ("Ticket Médio", average),
            ],
            Kpi::ReceitaVendas => vec![
                ("Faturamento de Vendas", total),
                ("Notas de Venda", count),
                ("Ticket Médio", average),
            ],
            Kpi::ReceitaServicos => vec![
                ("Faturamento de Serviços", total),
                ("Notas de Serviço", count),
                ("Ticket Médio", average),
            ],
            Kpi::NotasCanceladas => vec![("Valor Cancelado", total), ("Notas Canceladas", count)],
            Kpi::ComprasAquisicoes => vec![
                ("Total de Compras", total),
                ("Notas de Entrada", count),
                ("Compra Média", average),
            ],
        };

        fields
            .into_iter()
            .map(|(label, value)| (label.to_string(), value))
            .collect()
    }

    pub fn summary(&self) -> KpiSummary {
        KpiSummary {
            nome: self.name(),
            fontes: self.sources(),
            tema: self.theme(),
        }
    }
}
