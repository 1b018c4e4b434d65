use std::sync::Arc;
use std::time::Duration;

use onboard_assist::config::AssistConfig;
use onboard_assist::knowledge::ContentStore;
use onboard_assist::llm::{LlmConfig, create_provider};
use onboard_assist::session::{
    InMemorySessionStore, SessionDispatcher, SessionStore, chat_routes, spawn_session_sweeper,
};

/// How often idle sessions are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AssistConfig::from_env();
    config.validate()?;

    eprintln!("🤖 Onboard Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Organization: {}", config.organization);

    // ── Knowledge ───────────────────────────────────────────────────────
    let content = Arc::new(
        ContentStore::load(
            &config.knowledge_path,
            config.chunk_max_chars,
            config.store_load_timeout,
        )
        .await,
    );
    eprintln!(
        "   Knowledge: {} ({} chunks)",
        config.knowledge_path.display(),
        content.len()
    );

    // ── Inference ───────────────────────────────────────────────────────
    let llm = match LlmConfig::from_env() {
        Some(llm_config) => match create_provider(&llm_config) {
            Ok(provider) => {
                eprintln!("   Model: {}", llm_config.model);
                Some(provider)
            }
            Err(e) => {
                tracing::warn!(error = %e, "LLM provider unavailable, answering offline");
                None
            }
        },
        None => {
            tracing::warn!("No OPENAI_API_KEY or ANTHROPIC_API_KEY set, answering offline");
            None
        }
    };
    if llm.is_none() {
        eprintln!("   Model: none (offline answers only)");
    }

    // ── Sessions ────────────────────────────────────────────────────────
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let _sweeper = spawn_session_sweeper(Arc::clone(&sessions), config.session_ttl, SWEEP_INTERVAL);

    let dispatcher = Arc::new(
        SessionDispatcher::new(&config, content, llm).with_session_store(sessions),
    );

    // ── HTTP ────────────────────────────────────────────────────────────
    let app = chat_routes(dispatcher);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    eprintln!("   Chat API: http://0.0.0.0:{}/chat\n", config.port);
    tracing::info!(port = config.port, "Chat server started");

    axum::serve(listener, app).await?;

    Ok(())
}
