use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod error;
mod expiry;
mod extract;
mod routes;
mod state;
mod crypto {
    pub mod jwt;
    pub mod password;
}

mod models {
    pub mod auth;
    pub mod category;
    pub mod item;
    pub mod user;
}

mod repositories {
    pub mod category;
    pub mod item;
    pub mod user;
}

mod services {
    pub mod auth;
    pub mod categories;
    pub mod items;
}

mod handlers {
    pub mod auth;
    pub mod categories;
    pub mod items;
    pub mod response;
}

mod middleware_layer {
    pub mod auth;
}

mod validation {
    pub mod auth;
    pub mod items;
}

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let state = AppState::new(&config)?;

    if let Err(e) = db::init_schema(&state.db).await {
        tracing::error!("❌ Failed to prepare database schema: {}", e);
        return Err(e.into());
    }

    let app = routes::build_router(state)?;

    let addr = config.bind_addr;
    tracing::info!("🚀 Server listening on http://{}", addr);
    tracing::info!("✅ Urgent listing margin: {} days", config.urgent_margin_days);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
