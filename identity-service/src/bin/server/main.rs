use std::sync::Arc;

use auth::Authenticator;
use auth::JwtHandler;
use identity_service::config::Config;
use identity_service::domain::user::ports::UserRepository;
use identity_service::domain::user::service::SessionService;
use identity_service::inbound::http::middleware::AuthenticationGate;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::InMemoryUserRepository;
use identity_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        database = config.database.url.is_some(),
        expiration_ms = config.jwt.expiration_ms,
        "Configuration loaded"
    );

    // A bad key or expiry must stop startup before the listener binds.
    let jwt_handler = JwtHandler::new(&config.jwt.signing_key()?, config.jwt.expiration()?)?;
    let authenticator = Arc::new(Authenticator::new(jwt_handler));

    match &config.database.url {
        Some(url) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await?;
            tracing::info!(
                max_connections = 5,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            let repository = Arc::new(PostgresUserRepository::new(pg_pool));
            serve(&config, repository, authenticator).await
        }
        None => {
            tracing::warn!("No database configured, identities are kept in memory");

            let repository = Arc::new(InMemoryUserRepository::new());
            serve(&config, repository, authenticator).await
        }
    }
}

async fn serve<UR: UserRepository>(
    config: &Config,
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
) -> Result<(), anyhow::Error> {
    let session_service = Arc::new(SessionService::new(
        Arc::clone(&repository),
        Arc::clone(&authenticator),
    ));
    let gate = AuthenticationGate::new(authenticator, repository);

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(session_service, gate)).await?;
    tracing::info!("Server exited");

    Ok(())
}
