// src/services/invoice_generator.rs

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::{
    common::{
        calendar::{today_in, BillingMonth, Clock},
        error::AppError,
        money::{prorate_by_days, round2},
    },
    db::{ContractStore, InvoiceStore},
    models::{
        contract::Contract,
        invoice::{ContractOutcome, GenerationReport, InvoiceKind, InvoiceStatus, NewInvoice},
    },
};

/// Cobrança de aluguel calculada para um contrato no mês corrente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RentCharge {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub amount: Decimal,
}

/// Calcula o período e o valor da fatura de aluguel de `contract` em `month`.
///
/// - Contrato iniciado antes do mês: mês inteiro, valor cheio.
/// - Contrato iniciado dentro do mês: do dia de início até o fim do mês,
///   proporcional aos dias (o dia de início conta).
/// - Contrato que só começa num mês futuro: `Ok(None)`.
pub fn plan_rent_charge(contract: &Contract, month: &BillingMonth) -> Result<Option<RentCharge>, AppError> {
    let rate = contract.monthly_rate.ok_or_else(|| {
        AppError::InvalidContractData(format!("contrato {} sem valor mensal", contract.id))
    })?;
    let start_date = contract.start_date.ok_or_else(|| {
        AppError::InvalidContractData(format!("contrato {} sem data de início", contract.id))
    })?;
    if rate.is_sign_negative() {
        return Err(AppError::InvalidContractData(format!(
            "contrato {} com valor mensal negativo ({})",
            contract.id, rate
        )));
    }

    if start_date >= month.next_start {
        return Ok(None);
    }

    if !month.contains(start_date) {
        return Ok(Some(RentCharge {
            period_start: month.start,
            period_end: month.end,
            amount: round2(rate),
        }));
    }

    // Primeiro mês: cobra só os dias de ocupação
    let total_days = month.days();
    let remaining_days = total_days - start_date.day() + 1;
    let amount = prorate_by_days(rate, remaining_days, total_days).ok_or_else(|| {
        AppError::InvalidContractData(format!("mês {} sem dias", month.label()))
    })?;

    Ok(Some(RentCharge {
        period_start: start_date,
        period_end: month.end,
        amount,
    }))
}

#[derive(Clone)]
pub struct InvoiceGenerator {
    contracts: Arc<dyn ContractStore>,
    invoices: Arc<dyn InvoiceStore>,
    clock: Arc<dyn Clock>,
    timezone: Tz,
    timeout: Duration,
    // Uma execução por vez (a checagem "existe fatura?" + insert não é atômica)
    run_lock: Arc<Mutex<()>>,
}

impl InvoiceGenerator {
    pub fn new(
        contracts: Arc<dyn ContractStore>,
        invoices: Arc<dyn InvoiceStore>,
        clock: Arc<dyn Clock>,
        timezone: Tz,
        timeout: Duration,
    ) -> Self {
        Self {
            contracts,
            invoices,
            clock,
            timezone,
            timeout,
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Garante uma fatura de aluguel por contrato ativo no mês corrente.
    ///
    /// Só a busca inicial dos contratos derruba a execução; falhas de um
    /// contrato são logadas e o loop segue para o próximo.
    pub async fn generate_monthly_invoices(&self) -> Result<GenerationReport, AppError> {
        let _guard = self.run_lock.lock().await;

        match tokio::time::timeout(self.timeout, self.run()).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("⏱️ Geração de faturas excedeu {:?}", self.timeout);
                Err(AppError::GenerationTimeout(self.timeout.as_secs()))
            }
        }
    }

    async fn run(&self) -> Result<GenerationReport, AppError> {
        let today = today_in(self.timezone, self.clock.now());
        let month = BillingMonth::containing(today);

        let contracts = self.contracts.active_contracts().await?;
        tracing::info!(
            "🧾 Gerando faturas de aluguel de {} para {} contratos ativos",
            month.label(),
            contracts.len()
        );

        let mut report = GenerationReport::for_month(month.label());
        for contract in contracts.iter().filter(|c| c.active) {
            let outcome = self.bill_contract(contract, &month).await;
            report.record(outcome);
        }

        tracing::info!(
            "✅ Faturas de {}: {} criadas, {} já existentes, {} não iniciados, {} inválidos, {} com falha",
            report.month,
            report.created,
            report.already_billed,
            report.not_started,
            report.invalid,
            report.failed
        );
        Ok(report)
    }

    async fn bill_contract(&self, contract: &Contract, month: &BillingMonth) -> ContractOutcome {
        let charge = match plan_rent_charge(contract, month) {
            Ok(Some(charge)) => charge,
            Ok(None) => {
                tracing::warn!(
                    "Contrato {} ({}) ainda não começou; sem fatura em {}",
                    contract.id,
                    contract.property_name,
                    month.label()
                );
                return ContractOutcome::NotStarted;
            }
            Err(e) => {
                tracing::warn!("Contrato ignorado: {}", e);
                return ContractOutcome::Invalid;
            }
        };

        // Idempotência: já existe fatura de aluguel deste imóvel no mês?
        let existing = match self
            .invoices
            .rent_invoices_between(&contract.property_id, month.start, month.next_start)
            .await
        {
            Ok(existing) => existing,
            Err(e) => {
                tracing::error!(
                    "🔥 Falha ao verificar faturas do imóvel {}: {}",
                    contract.property_id,
                    e
                );
                return ContractOutcome::Failed;
            }
        };
        if !existing.is_empty() {
            tracing::debug!("Imóvel {} já faturado em {}", contract.property_id, month.label());
            return ContractOutcome::AlreadyBilled;
        }

        match self.invoices.insert_invoice(rent_invoice_for(contract, charge)).await {
            Ok(id) => {
                tracing::info!(
                    "Fatura {} criada para {} ({})",
                    id,
                    contract.property_name,
                    contract.property_id
                );
                ContractOutcome::Created(id)
            }
            Err(e @ AppError::DuplicateInvoiceRace { .. }) => {
                tracing::warn!("{}", e);
                ContractOutcome::AlreadyBilled
            }
            Err(e) => {
                tracing::error!(
                    "🔥 Falha ao gravar a fatura do imóvel {}: {}",
                    contract.property_id,
                    e
                );
                ContractOutcome::Failed
            }
        }
    }
}

fn rent_invoice_for(contract: &Contract, charge: RentCharge) -> NewInvoice {
    NewInvoice {
        kind: InvoiceKind::Rent,
        property_id: contract.property_id.clone(),
        property_name: contract.property_name.clone(),
        contract_id: Some(contract.id),
        amount: charge.amount,
        period_start: charge.period_start,
        period_end: charge.period_end,
        status: InvoiceStatus::Pending,
        // Auditoria copiada do próprio contrato
        created_by: contract.created_by.clone(),
        updated_by: contract.updated_by.clone(),
    }
}
