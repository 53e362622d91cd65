use std::sync::Arc;

use server::config::Config;
use server::routes;
use server::services::federated::{FederatedConfig, HttpFederatedExchange};
use server::services::users::MemoryUserRepository;
use server::state::{AppState, FederatedLogin};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    // Federated login is optional: missing provider config disables the
    // routes, nothing else.
    let federated = match FederatedConfig::from_env() {
        Some(cfg) => {
            tracing::info!(redirect_uri = %cfg.redirect_uri, "federated login enabled");
            Some(FederatedLogin {
                exchange: Arc::new(HttpFederatedExchange::new(cfg.clone())),
                config: cfg,
            })
        }
        None => {
            tracing::warn!("federated login not configured, provider routes disabled");
            None
        }
    };

    let users = Arc::new(MemoryUserRepository::new());
    let state = AppState::new(users, federated, &config);

    let origin = config
        .allowed_origin
        .parse()
        .expect("ALLOWED_ORIGIN is not a valid header value");
    let app = routes::app(state, origin);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, origin = %config.allowed_origin, "turnstile listening");
    axum::serve(listener, app).await.expect("server failed");
}
