// src/models/invoice.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "invoice_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceKind {
    Rent,        // Cuota piso (a única gerada automaticamente)
    Water,
    Electricity,
    Gas,
    Community,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "invoice_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending, // Pendiente
    Paid,    // Pagada (marcada por outros fluxos)
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,

    pub kind: InvoiceKind,

    #[schema(example = "LL1bbn5RyJ65VxYmjCWg")]
    pub property_id: String,

    #[schema(example = "Bajo Izquierda")]
    pub property_name: String,

    pub contract_id: Option<Uuid>,

    #[schema(example = "300.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2024-03-01")]
    pub period_start: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2024-03-31")]
    pub period_end: NaiveDate,

    pub status: InvoiceStatus,

    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

// Fatura a inserir; created_at/updated_at vêm do relógio do banco
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub kind: InvoiceKind,
    pub property_id: String,
    pub property_name: String,
    pub contract_id: Option<Uuid>,
    pub amount: Decimal,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub status: InvoiceStatus,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InvoiceFilter {
    /// Só faturas deste imóvel
    pub property_id: Option<String>,
    /// periodStart >= from
    #[param(value_type = Option<String>, format = Date)]
    pub from: Option<NaiveDate>,
    /// periodStart < until
    #[param(value_type = Option<String>, format = Date)]
    pub until: Option<NaiveDate>,
}

// --- Resultado de uma execução do gerador ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    #[schema(example = "2024-03")]
    pub month: String,
    pub created: usize,
    pub already_billed: usize,
    pub not_started: usize,
    pub invalid: usize,
    pub failed: usize,
    pub invoice_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractOutcome {
    Created(Uuid),
    AlreadyBilled,
    NotStarted,
    Invalid,
    Failed,
}

impl GenerationReport {
    pub fn for_month(month: impl Into<String>) -> Self {
        Self {
            month: month.into(),
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: ContractOutcome) {
        match outcome {
            ContractOutcome::Created(id) => {
                self.created += 1;
                self.invoice_ids.push(id);
            }
            ContractOutcome::AlreadyBilled => self.already_billed += 1,
            ContractOutcome::NotStarted => self.not_started += 1,
            ContractOutcome::Invalid => self.invalid += 1,
            ContractOutcome::Failed => self.failed += 1,
        }
    }
}
