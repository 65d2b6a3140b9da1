//src/main.rs

use std::env;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;

use crate::config::{AppState, Settings};
use crate::services::scheduler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger (RUST_LOG controla o nível; padrão "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env()?;
    let pool = settings.connect().await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app_state = AppState::new(&settings, pool);

    // `rental-billing generate-invoices`: gera as faturas do mês uma vez e sai
    if env::args().nth(1).as_deref() == Some("generate-invoices") {
        return match app_state.invoice_generator.generate_monthly_invoices().await {
            Ok(report) => {
                tracing::info!(
                    "Faturas de aluguel geradas corretamente: {} criadas, {} já faturadas",
                    report.created,
                    report.already_billed
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!("🔥 Erro ao gerar faturas de aluguel: {}", e);
                std::process::exit(1);
            }
        };
    }

    if settings.scheduler_enabled {
        scheduler::spawn_monthly(app_state.invoice_generator.clone(), settings.scheduler());
    } else {
        tracing::warn!("Agendador mensal desativado (SCHEDULER_ENABLED=false)");
    }

    let app = routes::build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
