use departures_server::cache::{CacheConfig, CachedTransportApi};
use departures_server::config::AppConfig;
use departures_server::store::Store;
use departures_server::transport_api::{DemoBoards, TransportApiClient, TransportApiConfig};
use departures_server::trmnl::{TrmnlClient, TrmnlConfig};
use departures_server::web::{AppState, create_router};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info,sqlx=warn".into()),
        )
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    if config.trmnl_client_id.is_empty() || config.trmnl_client_secret.is_empty() {
        tracing::warn!("TRMNL_CLIENT_ID / TRMNL_CLIENT_SECRET not set; installs will fail");
    }

    // Database
    let store = Store::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    store.migrate().await.expect("Failed to run migrations");

    // Upstream clients
    let mut transport_config = TransportApiConfig::default();
    if let Some(url) = &config.transport_api_base_url {
        transport_config = transport_config.with_base_url(url);
    }
    let transport = TransportApiClient::new(transport_config)
        .expect("Failed to create Transport API client");
    let transport = CachedTransportApi::new(transport, &CacheConfig::default());

    let trmnl = TrmnlClient::new(TrmnlConfig::new(
        &config.trmnl_client_id,
        &config.trmnl_client_secret,
    ))
    .expect("Failed to create TRMNL client");

    let demo = match &config.demo_data_dir {
        Some(dir) => DemoBoards::from_dir(dir).expect("Failed to load demo boards"),
        None => DemoBoards::embedded().expect("Embedded demo boards are invalid"),
    };

    let state = AppState::new(
        store,
        transport,
        trmnl,
        config.policy.clone(),
        demo,
        config.timezone,
    )
    .with_public_base_url(config.public_base_url.clone());

    let app = create_router(state, "static");

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!(
        addr = %config.bind_addr,
        timezone = %config.timezone,
        bus_operators = ?config.policy.bus_operators,
        train_operators = ?config.policy.train_operators,
        "Departures server listening"
    );

    axum::serve(listener, app).await.expect("Server error");
}
