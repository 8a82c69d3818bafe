mod api;
mod middleware;
mod session;

use bizdash_core::Filter;
use bizdash_gbp::DataProvider;
use bizdash_sentiment::GeminiClassifier;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
    session::Session,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = bizdash_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let provider = DataProvider::from_config(&config).await?;
    tracing::info!(
        data_source = %provider.kind(),
        locations = provider.directory().locations.len(),
        "data provider ready"
    );

    let classifier = match config.gemini_api_key.as_deref() {
        Some(key) => Some(GeminiClassifier::new(
            key,
            &config.gemini_model,
            config.gemini_timeout_secs,
        )?),
        None => {
            tracing::warn!("GEMINI_API_KEY not set; review sentiment analysis disabled");
            None
        }
    };

    let session = Session::new(Filter::default_for(chrono::Utc::now().date_naive()));
    let auth = AuthState::from_config(config.env, &config.api_keys)?;
    let app = build_app(
        AppState::new(provider, classifier, session),
        auth,
        default_rate_limit_state(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "bizdash server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
