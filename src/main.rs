use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use car_rental::config::{DatabaseConfig, EnvironmentConfig};
use car_rental::database::{create_pool, run_migrations};
use car_rental::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,car_rental=debug")),
        )
        .init();

    info!("🚗 Car Rental API");
    info!("================================================");

    let config = EnvironmentConfig::from_env().context("Configuración inválida")?;
    info!(environment = %config.environment, "⚙️ Configuración cargada");

    // Inicializar base de datos
    let pool = create_pool(&DatabaseConfig::new(config.database_url.clone())).await?;
    run_migrations(&pool).await?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("HOST/PORT inválidos")?;
    let server_url = config.server_url();

    let state = AppState::new(pool, config).context("Error inicializando el estado")?;
    let app = car_rental::build_router(state).into_make_service_with_connect_info::<SocketAddr>();

    info!("🌐 Servidor iniciando en {}", server_url);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("   /api/auth, /api/cars, /api/reservations, /api/payments");
    info!("   /api/users, /api/totp, /api/notifications, /api/images");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
