mod auth;
mod config;
mod error;
mod probe;
mod routes;
mod supabase;
mod ui;
mod utils;

use crate::config::Config;
use crate::probe::ConnectivityProbe;
use crate::supabase::SupabaseClient;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

pub struct AppState {
    config: Config,
    /// Anon-key client; `None` until SUPABASE_URL and SUPABASE_ANON_KEY are set
    supabase: Option<SupabaseClient>,
    probe: ConnectivityProbe,
}

impl AppState {
    /// Build the backend clients once from configuration
    fn from_config(config: Config) -> error::Result<Self> {
        let timeout = config.server.request_timeout_seconds;

        let supabase = match config.supabase.public_credentials() {
            Some((url, anon_key)) => Some(SupabaseClient::new(url, anon_key, timeout)?),
            None => {
                warn!("SUPABASE_URL or SUPABASE_ANON_KEY not set; authentication is disabled");
                None
            }
        };

        let mut probe = ConnectivityProbe::new(config.probe.clone());
        if let Some(client) = &supabase {
            probe = probe.with_primary(Arc::new(client.clone()));
        }
        match config.supabase.service_credentials() {
            Some((url, service_key)) => {
                let data_client = SupabaseClient::new(url, service_key, timeout)?;
                probe = probe.with_records(Arc::new(data_client));
            }
            None => info!("SUPABASE_SERVICE_ROLE_KEY not set; data client check disabled"),
        }

        Ok(Self {
            config,
            supabase,
            probe,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quickstarter=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting Quickstarter...");

    // Load configuration
    let config = Config::load()?;
    info!(
        "Configuration loaded successfully (backend configured: {})",
        config.has_env_vars()
    );

    if config.server.request_timeout_seconds > 0 {
        info!(
            "Backend request timeout set to {} seconds",
            config.server.request_timeout_seconds
        );
    } else {
        info!("Backend request timeout disabled (no timeout)");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Create shared application state
    let state = Arc::new(AppState::from_config(config)?);

    // Build the application router
    let app = build_router(state);

    // Start the server
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Graceful shutdown handler
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}

fn build_router(state: Arc<AppState>) -> Router {
    // Credential endpoints: burst of 5, one token back per second
    let auth_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(SmartIpKeyExtractor)
            .per_second(1)
            .burst_size(5)
            .use_headers()
            .finish()
            .expect("Failed to create rate limiter config"),
    );

    let credential_routes = Router::new()
        .route("/api/auth/login", post(routes::login))
        .route("/api/auth/sign-up", post(routes::sign_up))
        .layer(GovernorLayer {
            config: auth_governor_conf,
        });

    let public_routes = Router::new()
        .route("/", get(routes::home))
        .route("/health", get(routes::health_check))
        .route("/api/test-prisma", get(routes::test_connection))
        .route("/api/auth/refresh", post(routes::refresh))
        .route("/api/auth/logout", post(routes::logout))
        .route("/api/theme", post(routes::set_theme))
        .route("/auth/login", get(routes::login_page))
        .route("/auth/sign-up", get(routes::sign_up_page))
        .route("/auth/sign-up-success", get(routes::sign_up_success_page))
        .route("/auth/error", get(routes::auth_error_page))
        .merge(credential_routes);

    // Session required
    let protected_routes = Router::new()
        .route("/protected", get(routes::protected_page))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/public", ServeDir::new(&state.config.site.public_dir))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
