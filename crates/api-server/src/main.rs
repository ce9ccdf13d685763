use std::net::SocketAddr;
use std::sync::Arc;

use api_server::http::{self, AppState};
use shared::answer::AnswerEngine;
use shared::chat::ChatService;
use shared::config::{ApiConfig, LogFormat, ThreadStoreBackend, load_dotenv};
use shared::llm::{OpenAiClient, OpenAiConfig};
use shared::media::{PixabayClient, PixabayConfig};
use shared::recorder::ConversationRecorder;
use shared::repos::{MemoryThreadStore, Store, ThreadStore};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "api_server=debug,shared=debug,tower_http=info";
const FALLBACK_BIND_ADDR: &str = "0.0.0.0:5000";

#[tokio::main]
async fn main() {
    if let Err(err) = load_dotenv() {
        eprintln!("{err}");
        std::process::exit(1);
    }

    let config = ApiConfig::from_env();
    init_tracing(
        config
            .as_ref()
            .map(|cfg| cfg.log_format)
            .unwrap_or(LogFormat::Text),
    );

    let config = match config {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to read config: {err}");
            std::process::exit(1);
        }
    };

    let openai = match OpenAiConfig::from_env().and_then(OpenAiClient::new) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            error!("failed to configure openai client: {err}");
            std::process::exit(1);
        }
    };

    let pixabay = match PixabayConfig::from_env().and_then(PixabayClient::new) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            error!("failed to configure pixabay client: {err}");
            std::process::exit(1);
        }
    };

    let threads = connect_thread_store(&config).await;

    let engine = AnswerEngine::new(openai.clone(), openai, pixabay);
    let recorder = ConversationRecorder::new(threads.clone());
    let app = http::build_router(
        AppState {
            chat: Arc::new(ChatService::new(engine, recorder)),
            threads,
        },
        &config.cors_allowed_origins,
    );

    let addr: SocketAddr = match config.bind_addr.parse() {
        Ok(addr) => addr,
        Err(_) => {
            warn!(
                bind_addr = %config.bind_addr,
                "invalid API_BIND_ADDR; using {FALLBACK_BIND_ADDR}"
            );
            SocketAddr::from(([0, 0, 0, 0], 5000))
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };

    info!(
        "api server listening on {}",
        listener.local_addr().unwrap_or(addr)
    );
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server stopped with error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(log_format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn connect_thread_store(config: &ApiConfig) -> Arc<dyn ThreadStore> {
    let database_url = match (config.thread_store, config.database_url.as_deref()) {
        (ThreadStoreBackend::Memory, _) => {
            warn!("using in-memory thread store; conversations are lost on restart");
            return Arc::new(MemoryThreadStore::new());
        }
        (ThreadStoreBackend::Postgres, Some(database_url)) => database_url,
        (ThreadStoreBackend::Postgres, None) => {
            error!("DATABASE_URL is required for the postgres thread store");
            std::process::exit(1);
        }
    };

    let store = match Store::connect(database_url, config.database_max_connections).await {
        Ok(store) => store,
        Err(err) => {
            error!("failed to connect to postgres: {err}");
            std::process::exit(1);
        }
    };

    let migrator = match sqlx::migrate::Migrator::new(config.migrations_dir.clone()).await {
        Ok(migrator) => migrator,
        Err(err) => {
            error!("failed to load migrations: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = migrator.run(store.pool()).await {
        error!("failed to run migrations: {err}");
        std::process::exit(1);
    }

    Arc::new(store)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
