use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ticket_booking::{
    config::Config,
    store::{DocumentStore, MemoryStore, PgDocumentStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log));
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    info!("Starting ticket booking backend ({})", config.app.environment);

    // Хранилище документов: PostgreSQL, если задан DATABASE_URL, иначе в памяти
    let store: Arc<dyn DocumentStore> = match &config.database.url {
        Some(url) => {
            let pg = PgDocumentStore::connect(url, config.database.pool_size)
                .await
                .context("failed to connect to database")?;
            info!("Database connected");
            pg.run_migrations().await.context("failed to run migrations")?;
            Arc::new(pg)
        }
        None => {
            warn!("DATABASE_URL is not set, bookings are kept in memory");
            Arc::new(MemoryStore::new())
        }
    };

    // Директория для загрузок создаётся один раз при старте
    tokio::fs::create_dir_all(&config.upload.dir)
        .await
        .with_context(|| format!("failed to create upload dir {}", config.upload.dir.display()))?;
    info!("Uploads go to {}", config.upload.dir.display());

    let app_state = AppState::new(store, config.upload.clone());

    match app_state.bookings().list().await {
        Ok(bookings) => info!("{} ticket bookings in store", bookings.len()),
        Err(e) => warn!("Could not read ticket bookings at startup: {}", e),
    }

    let mut app = ticket_booking::router(app_state);
    if config.app.cors_permissive {
        app = app.layer(CorsLayer::permissive());
    }

    let addr: SocketAddr = format!("{}:{}", config.app.host, config.app.port)
        .parse()
        .context("HOST/PORT do not form a valid socket address")?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
