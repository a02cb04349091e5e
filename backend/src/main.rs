use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subscription_tracker::config::Args;
use subscription_tracker::{create_router, initialize_backend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("subscription_tracker={},tower_http={}", args.log_level, args.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }
    let cors_origin = args.cors_origin_header().map_err(anyhow::Error::msg)?;

    info!("Listen: {}", args.listen);
    info!("Database: {}", args.database_url);
    info!("CORS origin: {}", args.cors_origin);

    let app_state = initialize_backend(&args.database_url).await?;
    let app = create_router(app_state, cors_origin);

    let listener = TcpListener::bind(args.listen).await?;
    info!("Server listening on {}", args.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
