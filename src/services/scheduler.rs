// src/services/scheduler.rs

use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::task::JoinHandle;

use crate::{
    common::{
        calendar::{today_in, BillingMonth},
        error::AppError,
    },
    models::invoice::GenerationReport,
    services::invoice_generator::InvoiceGenerator,
};

#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub retry_count: u32,
    pub max_retry_delay: Duration,
}

/// Próximo disparo: dia 1 às 00:00 no fuso de faturamento, estritamente depois de `now`.
pub fn next_run_after(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    BillingMonth::containing(today_in(tz, now)).next_start_instant(tz)
}

/// Backoff exponencial (1s, 2s, 4s...) limitado a `max`.
pub fn retry_delay(attempt: u32, max: Duration) -> Duration {
    let secs = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_secs(secs).min(max)
}

/// Executa o gerador, repetindo até `retry_count` vezes em falhas recuperáveis.
pub async fn run_with_retries(
    generator: &InvoiceGenerator,
    settings: &SchedulerSettings,
) -> Result<GenerationReport, AppError> {
    let mut attempt = 0;
    loop {
        match generator.generate_monthly_invoices().await {
            Ok(report) => return Ok(report),
            Err(e) if e.is_retryable() && attempt < settings.retry_count => {
                let delay = retry_delay(attempt, settings.max_retry_delay);
                attempt += 1;
                tracing::warn!(
                    "Geração de faturas falhou ({}); tentativa {}/{} em {:?}",
                    e,
                    attempt,
                    settings.retry_count,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Sobe a tarefa mensal (cron "0 0 1 * *" no fuso de faturamento).
pub fn spawn_monthly(generator: InvoiceGenerator, settings: SchedulerSettings) -> JoinHandle<()> {
    tokio::spawn(async move {
        let tz = generator.timezone();
        loop {
            let now = Utc::now();
            let next = next_run_after(now, tz);
            tracing::info!("⏰ Próxima geração de faturas agendada para {} ({})", next, tz);

            let wait = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            match run_with_retries(&generator, &settings).await {
                Ok(_) => tracing::info!("Faturas de aluguel geradas corretamente (agendamento)"),
                Err(e) => tracing::error!("🔥 Erro ao gerar faturas de aluguel (agendamento): {}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::calendar::FixedClock,
        db::{
            memory_store::{contract_fixture, date},
            MemoryStore,
        },
    };
    use chrono::TimeZone;
    use std::sync::Arc;

    #[test]
    fn next_run_is_the_first_of_next_month_at_local_midnight() {
        let madrid = chrono_tz::Europe::Madrid;

        // 15/01 -> 01/02 00:00 CET (UTC+1)
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(next_run_after(now, madrid), Utc.with_ymd_and_hms(2024, 1, 31, 23, 0, 0).unwrap());

        // 10/05 -> 01/06 00:00 CEST (UTC+2)
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap();
        assert_eq!(next_run_after(now, madrid), Utc.with_ymd_and_hms(2024, 5, 31, 22, 0, 0).unwrap());

        // Exatamente no disparo: vai para o mês seguinte
        let fire = Utc.with_ymd_and_hms(2024, 5, 31, 22, 0, 0).unwrap();
        assert_eq!(next_run_after(fire, madrid), Utc.with_ymd_and_hms(2024, 6, 30, 22, 0, 0).unwrap());

        // Dezembro vira o ano
        let now = Utc.with_ymd_and_hms(2024, 12, 20, 0, 0, 0).unwrap();
        assert_eq!(next_run_after(now, madrid), Utc.with_ymd_and_hms(2024, 12, 31, 23, 0, 0).unwrap());
    }

    #[test]
    fn retry_delay_grows_and_is_capped() {
        let max = Duration::from_secs(60);
        assert_eq!(retry_delay(0, max), Duration::from_secs(1));
        assert_eq!(retry_delay(2, max), Duration::from_secs(4));
        assert_eq!(retry_delay(10, max), max);
        assert_eq!(retry_delay(200, max), max);
    }

    fn generator(store: &MemoryStore) -> InvoiceGenerator {
        InvoiceGenerator::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 3, 1, 0, 5, 0).unwrap())),
            chrono_tz::Europe::Madrid,
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn gives_up_after_the_configured_retries() {
        let store = MemoryStore::new();
        store.take_contracts_offline(true);
        let settings = SchedulerSettings { retry_count: 3, max_retry_delay: Duration::ZERO };

        let result = run_with_retries(&generator(&store), &settings).await;

        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
        assert_eq!(store.contract_fetches(), 4);
    }

    #[tokio::test]
    async fn succeeds_without_retrying_when_the_store_is_up() {
        let store = MemoryStore::new();
        store.seed_contract(contract_fixture("P1", "500", date(2024, 1, 1)));
        let settings = SchedulerSettings { retry_count: 3, max_retry_delay: Duration::ZERO };

        let report = run_with_retries(&generator(&store), &settings).await.unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(store.contract_fetches(), 1);
    }
}
