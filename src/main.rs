use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use vocab_server::config::Config;
use vocab_server::db::create_pool;
use vocab_server::gemini::{GeminiClient, LanguageModel};
use vocab_server::http_client::HttpClient;
use vocab_server::quiz::QuizEngine;
use vocab_server::routes::{create_router, AppState};
use vocab_server::services::{
    AdminService, DictionaryService, HealthService, LeaderboardService, ProfileService,
    QuizService, VocabularyService,
};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vocab_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!("Starting vocab-server...");
    tracing::info!("Connecting to database...");

    let pool = create_pool(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection established");

    let http = HttpClient::new()?;

    let model: Option<Arc<dyn LanguageModel>> = match &config.gemini_api_key {
        Some(api_key) => {
            tracing::info!("AI quizzes enabled: model={}", config.gemini_model);
            Some(Arc::new(GeminiClient::new(
                http.clone(),
                api_key.clone(),
                config.gemini_model.clone(),
                config.gemini_base_url.clone(),
            )))
        }
        None => {
            tracing::info!("GEMINI_API_KEY not set, quizzes use the local generator only");
            None
        }
    };

    let state = AppState {
        profiles: Arc::new(ProfileService::new(pool.clone())),
        vocabularies: Arc::new(VocabularyService::new(pool.clone())),
        leaderboard: Arc::new(LeaderboardService::new(pool.clone())),
        admin: Arc::new(AdminService::new(pool.clone())),
        quiz: Arc::new(QuizService::new(pool.clone(), QuizEngine::new(model))),
        dictionary: Arc::new(DictionaryService::new(
            http,
            config.dictionary_api_url.clone(),
        )),
        health: Arc::new(HealthService::new(pool.clone())),
    };

    let app = create_router(state, pool, config.supabase_jwt_secret.clone());

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
