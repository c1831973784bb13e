use jobboard_api::config::ApiConfig;
use jobboard_observability::{LogFormat, LogSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
    jobboard_observability::init_with(LogSettings {
        format: LogFormat::for_environment(&environment),
        ..LogSettings::default()
    });

    let config = ApiConfig::from_env();
    config.validate()?;
    tracing::info!(?config, "starting job board api");

    let addr = config.bind_addr();
    let app = jobboard_api::app::build_app(config).await?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
