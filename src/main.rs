//! LuxeWig storefront API server

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use luxewig::api::{self, AppState};
use luxewig::catalog::{InMemoryWigRepository, PgWigRepository, WigRepository};
use luxewig::events::EventPublisher;
use luxewig::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = AppConfig::from_env()?;

    let wigs: Arc<dyn WigRepository> = match &config.database_url {
        Some(url) => {
            let db = PgPoolOptions::new().max_connections(10).connect(url).await?;
            sqlx::migrate!("./migrations").run(&db).await?;
            tracing::info!("wig catalog stored in Postgres");
            Arc::new(PgWigRepository::new(db))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; wig catalog is in memory and lost on restart");
            Arc::new(InMemoryWigRepository::new())
        }
    };

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => { tracing::warn!(error = %e, "NATS unavailable; events are only logged"); None }
        },
        None => None,
    };

    let port = config.port;
    let app = api::router(AppState::new(config, wigs, EventPublisher::new(nats)));

    tracing::info!("LuxeWig API listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}
