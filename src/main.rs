use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use car_marketplace_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    reference::ReferenceData,
    repository::PgRepository,
    routes::create_app,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,car_marketplace_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url).await?;
    let repo = PgRepository::new(pool);
    run_migrations(repo.pool()).await?;

    let reference = ReferenceData::load(config.reference_data_path.as_deref()).await?;
    let state = AppState::new(Arc::new(repo), reference, config.limits);
    let app = create_app(state);

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    tracing::info!(
        default_limit = config.limits.default_limit,
        max_limit = config.limits.max_limit,
        "listening on {}",
        addr
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
