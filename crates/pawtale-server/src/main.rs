use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use pawtale::{PimsGateway, StoryLlm, StoryStore};

mod adapters;
mod application;
mod config;
mod error;
mod middleware;
mod routes;
#[cfg(test)]
mod test_support;

use adapters::{OpenAiProvider, PimsHttpGateway, XanoStoryStore};
use application::{PetService, StoryService, StorySettings};
use config::AppConfig;
use middleware::{CorsPolicy, RateLimit};

/// How often idle rate-limit buckets are dropped
const LIMITER_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub story_service: Arc<StoryService>,
    pub pet_service: Arc<PetService>,
    pub cors: Arc<CorsPolicy>,
    pub general_limit: Arc<RateLimit>,
    pub generation_limit: Arc<RateLimit>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        llm: Arc<dyn StoryLlm>,
        pims: Arc<dyn PimsGateway>,
        store: Arc<dyn StoryStore>,
    ) -> anyhow::Result<Self> {
        let limits = &config.rate_limit;
        let general_limit = RateLimit::new(
            limits.general_window,
            limits.general_max,
            "Too many requests",
        )?;
        let generation_limit = RateLimit::new(
            limits.generation_window,
            limits.generation_max,
            "Too many AI requests",
        )?
        .with_window_hint(limits.generation_window);

        let cors = CorsPolicy::new(&config.cors, config.is_production())
            .context("invalid CORS origin pattern")?;

        let settings = StorySettings {
            json_mode: config.openai.json_mode,
            moderation_default: config.moderation.default_check,
            moderation_mode: config.moderation.mode,
        };

        Ok(Self {
            story_service: Arc::new(StoryService::new(llm, store, settings)),
            pet_service: Arc::new(PetService::new(pims)),
            cors: Arc::new(cors),
            general_limit: Arc::new(general_limit),
            generation_limit: Arc::new(generation_limit),
            config: Arc::new(config),
        })
    }
}

fn init_tracing(config: &AppConfig) {
    let default_filter = if config.is_production() {
        "info"
    } else {
        "pawtale=debug,pawtale_server=debug,tower_http=debug,info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, shutting down gracefully");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Refuse to boot without OPENAI_API_KEY or with malformed values
    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_tracing(&config);

    tracing::info!("🐾 Pawtale API initializing ({})...", config.environment.as_str());

    let llm = Arc::new(OpenAiProvider::new(&config.openai)?);
    tracing::info!("🤖 LLM provider ready (model: {})", llm.model_id());

    let pims = Arc::new(PimsHttpGateway::new(&config.pims)?);
    if !config.pims.configured {
        tracing::warn!("⚠️  No PIMS_BASE_URL set - using default PIMS endpoint");
    }

    let store = Arc::new(XanoStoryStore::new(config.xano.as_ref())?);
    if !store.is_configured() {
        tracing::warn!("⚠️  No XANO_BASE_URL set - story persistence disabled");
    }

    let frontend_url = config.cors.frontend_url.clone();
    let pims_url = config.pims.base_url.clone();
    let xano_configured = config.persistence_enabled();
    let development = !config.is_production();
    let bind_address = config.bind_address();

    let state = AppState::new(config, llm, pims, store)?;

    let general_limit = state.general_limit.clone();
    let generation_limit = state.generation_limit.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LIMITER_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            general_limit.retain_recent();
            generation_limit.retain_recent();
        }
    });

    let app = routes::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("🚀 Server running on {}", bind_address);
    tracing::info!("📊 Health check: http://{}/api/health", bind_address);
    tracing::info!("🔗 Frontend URL: {}", frontend_url);
    tracing::info!("🐕 PIMS URL: {}", pims_url);
    tracing::info!("💾 Xano configured: {}", xano_configured);
    tracing::info!("📚 Swagger UI: /swagger-ui");

    if development {
        tracing::info!("📋 Available endpoints:");
        tracing::info!("  GET  /api/health");
        tracing::info!("  GET  /api/pets");
        tracing::info!("  GET  /api/pets/:id");
        tracing::info!("  POST /api/generate-story");
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
