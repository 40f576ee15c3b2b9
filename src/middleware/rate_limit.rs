//! Middleware de Rate Limiting
//!
//! Ventana fija por cliente, aplicada a los endpoints de `/api/auth`.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::config::EnvironmentConfig;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Contador de requests de un cliente dentro de su ventana
#[derive(Debug, Clone)]
struct RateLimitInfo {
    requests: u32,
    window_start: Instant,
}

#[derive(Clone)]
pub struct RateLimitState {
    requests: Arc<RwLock<HashMap<String, RateLimitInfo>>>,
    max_requests: u32,
    window_duration: Duration,
    trust_forwarded: bool,
}

impl RateLimitState {
    pub fn new(config: &EnvironmentConfig) -> Self {
        Self::with_limits(
            config.rate_limit_requests,
            Duration::from_secs(config.rate_limit_window),
        )
        .trusting_forwarded(config.trust_proxy_headers)
    }

    pub fn with_limits(max_requests: u32, window_duration: Duration) -> Self {
        Self {
            requests: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window_duration,
            trust_forwarded: false,
        }
    }

    pub fn trusting_forwarded(mut self, trust: bool) -> Self {
        self.trust_forwarded = trust;
        self
    }

    /// Registra una request del cliente; `RateLimitExceeded` si agotó la ventana
    pub async fn check_rate_limit(&self, client: &str) -> Result<(), AppError> {
        self.check_at(client, Instant::now()).await
    }

    async fn check_at(&self, client: &str, now: Instant) -> Result<(), AppError> {
        let mut requests = self.requests.write().await;

        // Limpiar entradas expiradas
        requests.retain(|_, info| now.duration_since(info.window_start) < self.window_duration);

        let info = requests.entry(client.to_string()).or_insert(RateLimitInfo {
            requests: 0,
            window_start: now,
        });

        if info.requests >= self.max_requests {
            return Err(AppError::RateLimitExceeded);
        }

        info.requests += 1;
        Ok(())
    }
}

/// Identificador del cliente.
///
/// `x-forwarded-for` solo cuenta con `trust_forwarded`; si no, la IP del peer
/// TCP (`ConnectInfo`). Sin ninguna de las dos todo cae en `unknown`.
fn client_key(request: &Request, trust_forwarded: bool) -> String {
    let forwarded = trust_forwarded
        .then(|| {
            request
                .headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(|ip| ip.trim().to_string())
                .filter(|ip| !ip.is_empty())
        })
        .flatten();

    forwarded
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = client_key(&request, state.rate_limit.trust_forwarded);
    if let Err(e) = state.rate_limit.check_rate_limit(&client).await {
        tracing::warn!(client = %client, path = %request.uri().path(), "⛔ Límite de requests excedido");
        return Err(e);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limit_applies_per_client() {
        let state = RateLimitState::with_limits(2, Duration::from_secs(60));

        assert!(state.check_rate_limit("1.1.1.1").await.is_ok());
        assert!(state.check_rate_limit("1.1.1.1").await.is_ok());
        assert!(matches!(
            state.check_rate_limit("1.1.1.1").await,
            Err(AppError::RateLimitExceeded)
        ));
        assert!(state.check_rate_limit("2.2.2.2").await.is_ok());
    }

    #[tokio::test]
    async fn test_window_resets() {
        let state = RateLimitState::with_limits(1, Duration::from_secs(60));
        let start = Instant::now();

        assert!(state.check_at("c", start).await.is_ok());
        assert!(state.check_at("c", start + Duration::from_secs(30)).await.is_err());
        assert!(state.check_at("c", start + Duration::from_secs(61)).await.is_ok());
    }

    fn request_from(peer: Option<&str>, forwarded: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/api/auth/signin");
        if let Some(ip) = forwarded {
            builder = builder.header("x-forwarded-for", ip);
        }
        let mut request = builder.body(axum::body::Body::empty()).unwrap();
        if let Some(peer) = peer {
            let addr: SocketAddr = peer.parse().unwrap();
            request.extensions_mut().insert(ConnectInfo(addr));
        }
        request
    }

    #[test]
    fn test_forwarded_header_ignored_unless_trusted() {
        let request = request_from(Some("192.0.2.10:40000"), Some("10.0.0.1"));
        assert_eq!(client_key(&request, false), "192.0.2.10");
        assert_eq!(client_key(&request, true), "10.0.0.1");

        // Rotar la cabecera no cambia la clave sin proxy de confianza
        let rotated = request_from(Some("192.0.2.10:40001"), Some("10.0.0.2"));
        assert_eq!(client_key(&rotated, false), "192.0.2.10");
    }

    #[test]
    fn test_missing_peer_and_header_share_a_bucket() {
        assert_eq!(client_key(&request_from(None, Some("10.0.0.1")), false), "unknown");
        assert_eq!(client_key(&request_from(None, None), true), "unknown");
    }
}
