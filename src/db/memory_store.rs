// src/db/memory_store.rs
//
// Store em memória para os testes: implementa os mesmos traits que o Postgres,
// inclusive a regra do índice único (imóvel, aluguel, mês).

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{calendar::first_day_of_month, error::AppError},
    db::store::{ContractStore, InvoiceStore},
    models::{
        contract::{Contract, NewContract},
        invoice::{Invoice, InvoiceFilter, InvoiceKind, NewInvoice},
    },
};

#[derive(Clone, Default)]
pub struct MemoryStore {
    contracts: Arc<RwLock<Vec<Contract>>>,
    invoices: Arc<RwLock<Vec<Invoice>>>,
    failing_inserts: Arc<RwLock<HashSet<String>>>,
    contracts_offline: Arc<AtomicBool>,
    stale_reads: Arc<AtomicBool>,
    read_delay_ms: Arc<AtomicU64>,
    contract_fetches: Arc<AtomicUsize>,
}

fn lock_error<E: std::fmt::Display>(e: E) -> AppError {
    AppError::InternalServerError(anyhow!("Failed to acquire lock: {}", e))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_contract(&self, contract: Contract) {
        self.contracts.write().unwrap().push(contract);
    }

    pub fn invoices(&self) -> Vec<Invoice> {
        self.invoices.read().unwrap().clone()
    }

    pub fn contract(&self, id: Uuid) -> Option<Contract> {
        self.contracts.read().unwrap().iter().find(|c| c.id == id).cloned()
    }

    /// Inserções de fatura deste imóvel falham como se o banco tivesse caído.
    pub fn fail_inserts_for(&self, property_id: &str) {
        self.failing_inserts.write().unwrap().insert(property_id.to_string());
    }

    /// A busca de contratos ativos falha.
    pub fn take_contracts_offline(&self, offline: bool) {
        self.contracts_offline.store(offline, Ordering::SeqCst);
    }

    /// A verificação de faturas existentes não enxerga nada (simula outra
    /// execução concorrente que ainda não tinha gravado).
    pub fn serve_stale_reads(&self, stale: bool) {
        self.stale_reads.store(stale, Ordering::SeqCst);
    }

    pub fn delay_reads(&self, delay: Duration) {
        self.read_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn contract_fetches(&self) -> usize {
        self.contract_fetches.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        let delay = self.read_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    // Mesmo efeito do índice único parcial (imóvel) WHERE active
    fn ensure_no_other_active(contracts: &[Contract], property_id: &str, except: Option<Uuid>) -> Result<(), AppError> {
        let taken = contracts
            .iter()
            .any(|c| c.active && c.property_id == property_id && Some(c.id) != except);
        if taken {
            return Err(AppError::Conflict("O imóvel já tem um contrato ativo".to_string()));
        }
        Ok(())
    }

    fn update_contract<F>(&self, id: Uuid, updated_by: &str, change: F) -> Result<Option<Contract>, AppError>
    where
        F: FnOnce(&mut Contract),
    {
        let mut contracts = self.contracts.write().map_err(lock_error)?;
        Ok(contracts.iter_mut().find(|c| c.id == id).map(|contract| {
            change(contract);
            contract.updated_at = Utc::now();
            contract.updated_by = Some(updated_by.to_string());
            contract.clone()
        }))
    }
}

#[async_trait]
impl ContractStore for MemoryStore {
    async fn active_contracts(&self) -> Result<Vec<Contract>, AppError> {
        self.contract_fetches.fetch_add(1, Ordering::SeqCst);
        if self.contracts_offline.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable(sqlx::Error::PoolTimedOut));
        }
        self.simulate_latency().await;
        self.list_contracts(Some(true)).await
    }

    async fn list_contracts(&self, active: Option<bool>) -> Result<Vec<Contract>, AppError> {
        let contracts = self.contracts.read().map_err(lock_error)?;
        Ok(contracts
            .iter()
            .filter(|c| active.is_none_or(|a| c.active == a))
            .cloned()
            .collect())
    }

    async fn get_contract(&self, id: Uuid) -> Result<Option<Contract>, AppError> {
        Ok(self.contract(id))
    }

    async fn insert_contract(&self, new: NewContract) -> Result<Contract, AppError> {
        let now = Utc::now();
        let contract = Contract {
            id: Uuid::new_v4(),
            property_id: new.property_id,
            property_name: new.property_name,
            tenant_ids: new.tenant_ids,
            monthly_rate: Some(new.monthly_rate),
            start_date: Some(new.start_date),
            renewal_date: Some(new.renewal_date),
            cpi_adjusted: true,
            active: new.active,
            created_at: now,
            created_by: Some(new.created_by.clone()),
            updated_at: now,
            updated_by: Some(new.created_by),
        };
        let mut contracts = self.contracts.write().map_err(lock_error)?;
        if contract.active {
            Self::ensure_no_other_active(&contracts, &contract.property_id, None)?;
        }
        contracts.push(contract.clone());
        Ok(contract)
    }

    async fn set_active(&self, id: Uuid, active: bool, updated_by: &str) -> Result<Option<Contract>, AppError> {
        if active {
            let contracts = self.contracts.read().map_err(lock_error)?;
            if let Some(target) = contracts.iter().find(|c| c.id == id) {
                Self::ensure_no_other_active(&contracts, &target.property_id, Some(id))?;
            }
        }
        self.update_contract(id, updated_by, |c| c.active = active)
    }

    async fn update_rate(&self, id: Uuid, monthly_rate: Decimal, updated_by: &str) -> Result<Option<Contract>, AppError> {
        self.update_contract(id, updated_by, |c| {
            c.monthly_rate = Some(monthly_rate);
            c.cpi_adjusted = true;
        })
    }

    async fn renew(&self, id: Uuid, renewal_date: NaiveDate, updated_by: &str) -> Result<Option<Contract>, AppError> {
        self.update_contract(id, updated_by, |c| {
            c.renewal_date = Some(renewal_date);
            c.cpi_adjusted = false;
        })
    }
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn rent_invoices_between(
        &self,
        property_id: &str,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<Invoice>, AppError> {
        if self.stale_reads.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        let invoices = self.invoices.read().map_err(lock_error)?;
        Ok(invoices
            .iter()
            .filter(|i| {
                i.property_id == property_id
                    && i.kind == InvoiceKind::Rent
                    && i.period_start >= from
                    && i.period_start < until
            })
            .cloned()
            .collect())
    }

    async fn insert_invoice(&self, new: NewInvoice) -> Result<Uuid, AppError> {
        if self.failing_inserts.read().map_err(lock_error)?.contains(&new.property_id) {
            return Err(AppError::StoreUnavailable(sqlx::Error::PoolTimedOut));
        }

        let mut invoices = self.invoices.write().map_err(lock_error)?;

        // Mesmo efeito do índice único parcial do Postgres
        let month = first_day_of_month(new.period_start);
        let duplicated = new.kind == InvoiceKind::Rent
            && invoices.iter().any(|i| {
                i.property_id == new.property_id
                    && i.kind == InvoiceKind::Rent
                    && first_day_of_month(i.period_start) == month
            });
        if duplicated {
            return Err(AppError::DuplicateInvoiceRace {
                property_id: new.property_id,
                month: month.format("%Y-%m").to_string(),
            });
        }

        let now = Utc::now();
        let id = Uuid::new_v4();
        invoices.push(Invoice {
            id,
            kind: new.kind,
            property_id: new.property_id,
            property_name: new.property_name,
            contract_id: new.contract_id,
            amount: new.amount,
            period_start: new.period_start,
            period_end: new.period_end,
            status: new.status,
            created_at: now,
            created_by: new.created_by,
            updated_at: now,
            updated_by: new.updated_by,
        });
        Ok(id)
    }

    async fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, AppError> {
        let invoices = self.invoices.read().map_err(lock_error)?;
        let mut found: Vec<Invoice> = invoices
            .iter()
            .filter(|i| filter.property_id.as_deref().is_none_or(|p| i.property_id == p))
            .filter(|i| filter.from.is_none_or(|from| i.period_start >= from))
            .filter(|i| filter.until.is_none_or(|until| i.period_start < until))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.period_start
                .cmp(&a.period_start)
                .then_with(|| a.property_name.cmp(&b.property_name))
        });
        Ok(found)
    }
}

// ---
// Fixtures compartilhadas pelos testes
// ---

pub fn dec(raw: &str) -> Decimal {
    Decimal::from_str(raw).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn contract_fixture(property_id: &str, monthly_rate: &str, start_date: NaiveDate) -> Contract {
    let now = Utc::now();
    Contract {
        id: Uuid::new_v4(),
        property_id: property_id.to_string(),
        property_name: format!("Imóvel {}", property_id),
        tenant_ids: vec!["inq-1".to_string()],
        monthly_rate: Some(dec(monthly_rate)),
        start_date: Some(start_date),
        renewal_date: Some(crate::common::calendar::renewal_date_for(start_date)),
        cpi_adjusted: true,
        active: true,
        created_at: now,
        created_by: Some("owner-1".to_string()),
        updated_at: now,
        updated_by: Some("owner-2".to_string()),
    }
}
