//! Conexión a PostgreSQL
//!
//! Creación del pool y aplicación de las migraciones de `migrations/`.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Crear un pool de conexiones a la base de datos
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    tracing::info!("🔌 Conectando a {}", mask_database_url(&config.url));

    let pool = config
        .create_pool()
        .await
        .context("Could not connect to the database")?;

    tracing::info!(
        max_connections = config.max_connections,
        "✅ Pool de conexiones creado"
    );
    Ok(pool)
}

/// Ejecutar migraciones de la base de datos
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("📦 Migraciones aplicadas");
    Ok(())
}

/// Función helper para enmascarar la URL de la base de datos en logs
pub fn mask_database_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://").map(|i| i + 3) else {
        return url.to_string();
    };
    match url[scheme_end..].rfind('@') {
        Some(at) => format!("{}***:***@{}", &url[..scheme_end], &url[scheme_end + at + 1..]),
        None => url.to_string(),
    }
}
