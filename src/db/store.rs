// src/db/store.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        contract::{Contract, NewContract},
        invoice::{Invoice, InvoiceFilter, NewInvoice},
    },
};

// Os serviços falam com estes traits; Postgres em produção, memória nos testes.

#[async_trait]
pub trait ContractStore: Send + Sync {
    /// Contratos com `active = true`.
    async fn active_contracts(&self) -> Result<Vec<Contract>, AppError>;

    async fn list_contracts(&self, active: Option<bool>) -> Result<Vec<Contract>, AppError>;

    async fn get_contract(&self, id: Uuid) -> Result<Option<Contract>, AppError>;

    async fn insert_contract(&self, new: NewContract) -> Result<Contract, AppError>;

    async fn set_active(
        &self,
        id: Uuid,
        active: bool,
        updated_by: &str,
    ) -> Result<Option<Contract>, AppError>;

    /// Novo aluguel após reajuste do IPC (marca `cpi_adjusted = true`).
    async fn update_rate(
        &self,
        id: Uuid,
        monthly_rate: Decimal,
        updated_by: &str,
    ) -> Result<Option<Contract>, AppError>;

    /// Nova data de renovação (zera `cpi_adjusted`).
    async fn renew(
        &self,
        id: Uuid,
        renewal_date: NaiveDate,
        updated_by: &str,
    ) -> Result<Option<Contract>, AppError>;
}

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Faturas de aluguel do imóvel com `period_start` em [from, until).
    async fn rent_invoices_between(
        &self,
        property_id: &str,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<Invoice>, AppError>;

    /// Grava a fatura e devolve o id. Conflito no índice único
    /// (imóvel, tipo, mês) vira `AppError::DuplicateInvoiceRace`.
    async fn insert_invoice(&self, new: NewInvoice) -> Result<Uuid, AppError>;

    async fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, AppError>;
}
