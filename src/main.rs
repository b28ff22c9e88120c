use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{App, HttpServer, middleware::Logger, web};
use redis::aio::ConnectionManager;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskflow::{
  adapters::http::{
    AuthMiddleware, AuthRouteDependencies, PUBLIC_PATHS, RequestIdMiddleware,
    configure_auth_routes, configure_health_routes,
  },
  domain::auth::{
    ports::{ActivationTokenRepository, Clock, Mailer, RevocationStore, UserDirectory},
    services::{ActivationTokenService, AuthService, TokenService},
  },
  infrastructure::{
    clock::SystemClock,
    config::{Config, DatabaseConfig, MailConfig, RedisConfig},
    mail::{LoggingMailer, SmtpMailer},
    persistence::{
      memory::{InMemoryActivationTokenRepository, InMemoryUserDirectory},
      postgres::{PostgresActivationTokenRepository, PostgresUserDirectory},
    },
    revocation::{InMemoryRevocationStore, RedisRevocationStore, spawn_revocation_sweeper},
    security::{Argon2PasswordHasher, HmacTokenCodec, SecureTokenGenerator},
  },
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // Initialize environment variables from .env file
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taskflow=debug,actix_web=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::info!("Starting TaskFlow application");

  let config = Config::load().map_err(|e| {
    tracing::error!("Failed to load configuration: {}", e);
    std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
  })?;
  config.validate().map_err(|e| {
    tracing::error!("Invalid configuration: {}", e);
    std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
  })?;
  tracing::info!(security = ?config.security, "Configuration loaded successfully");

  let token_config = config.token_service_config().map_err(invalid_input)?;
  let clock: Arc<dyn Clock> = Arc::new(SystemClock);

  // Persistence: Postgres when configured, otherwise process-local
  let (directory, activation_repo): (Arc<dyn UserDirectory>, Arc<dyn ActivationTokenRepository>) =
    match &config.database {
      Some(database) => {
        let pool = connect_database(database).await?;
        (
          Arc::new(PostgresUserDirectory::new(pool.clone())),
          Arc::new(PostgresActivationTokenRepository::new(pool)),
        )
      }
      None => {
        tracing::warn!("No database configured, accounts are kept in memory");
        (
          Arc::new(InMemoryUserDirectory::new()),
          Arc::new(InMemoryActivationTokenRepository::new()),
        )
      }
    };

  // Revocation set: Redis when configured so every instance shares it
  let revocations: Arc<dyn RevocationStore> = match &config.redis {
    Some(redis_config) => {
      let conn = connect_redis(redis_config).await?;
      Arc::new(RedisRevocationStore::new(
        conn,
        clock.clone(),
        token_config.max_token_lifetime(),
      ))
    }
    None => {
      tracing::info!("No Redis configured, revocations are kept in memory");
      Arc::new(InMemoryRevocationStore::new(
        clock.clone(),
        token_config.max_token_lifetime(),
      ))
    }
  };

  let codec = HmacTokenCodec::new(config.security.jwt_secret.as_bytes()).map_err(invalid_input)?;
  let password_hasher = Argon2PasswordHasher::new().map_err(std::io::Error::other)?;
  let mailer = build_mailer(&config.mail)?;

  let token_service = Arc::new(TokenService::new(
    Arc::new(codec),
    revocations.clone(),
    directory.clone(),
    clock.clone(),
    token_config,
  ));
  let activation_service = Arc::new(ActivationTokenService::new(
    activation_repo,
    Arc::new(SecureTokenGenerator::new()),
    clock.clone(),
    config.activation_ttl(),
  ));
  let auth_service = Arc::new(AuthService::new(
    directory,
    Arc::new(password_hasher),
    mailer,
    token_service.clone(),
    activation_service,
    config.auth_service_config(),
  ));
  let auth_routes = AuthRouteDependencies::from_service(auth_service);

  let shutdown = CancellationToken::new();
  let sweeper = spawn_revocation_sweeper(
    revocations,
    clock,
    Duration::from_secs(config.security.revocation_sweep_interval_seconds),
    shutdown.clone(),
  );

  let governor_config = GovernorConfigBuilder::default()
    .seconds_per_request(config.rate_limit.login_seconds_per_request)
    .burst_size(config.rate_limit.login_burst_size)
    .finish()
    .ok_or_else(|| invalid_input("rate limit period and burst size must be non-zero"))?;

  let server_host = config.server.host.clone();
  let server_port = config.server.port;

  tracing::info!("Starting HTTP server on {}:{}", server_host, server_port);

  let result = HttpServer::new(move || {
    App::new()
      // Innermost: the gate runs after the request id and logger are in place
      .wrap(AuthMiddleware::new(token_service.clone()).with_public_paths(PUBLIC_PATHS))
      .wrap(Logger::default())
      .wrap(RequestIdMiddleware::new())
      .service(
        web::scope("/auth")
          .wrap(Governor::new(&governor_config))
          .configure(|cfg| configure_auth_routes(cfg, auth_routes.clone())),
      )
      .configure(configure_health_routes)
  })
  .bind((server_host.as_str(), server_port))?
  .run()
  .await;

  shutdown.cancel();
  if let Err(e) = sweeper.await {
    tracing::warn!("Revocation sweeper ended abnormally: {}", e);
  }

  result
}

fn invalid_input(error: impl ToString) -> std::io::Error {
  std::io::Error::new(std::io::ErrorKind::InvalidInput, error.to_string())
}

async fn connect_database(database: &DatabaseConfig) -> std::io::Result<PgPool> {
  tracing::info!("Connecting to database");

  let pool = tokio::time::timeout(
    Duration::from_secs(database.connect_timeout_seconds),
    PgPoolOptions::new()
      .max_connections(database.max_connections)
      .acquire_timeout(Duration::from_secs(database.acquire_timeout_seconds))
      .connect(&database.url),
  )
  .await
  .map_err(|_| {
    tracing::error!(
      "Database connection timed out after {} seconds. Is PostgreSQL running?",
      database.connect_timeout_seconds
    );
    std::io::Error::new(
      std::io::ErrorKind::TimedOut,
      format!(
        "Database connection timed out after {} seconds",
        database.connect_timeout_seconds
      ),
    )
  })?
  .map_err(|e| {
    tracing::error!("Failed to connect to database: {}", e);
    match e {
      sqlx::Error::Io(_) => std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "Could not connect to database. Is PostgreSQL running?",
      ),
      _ => std::io::Error::other(format!("Database error: {}", e)),
    }
  })?;

  tracing::info!("Running database migrations");
  sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
    tracing::error!("Failed to run database migrations: {}", e);
    std::io::Error::other(format!("Migration error: {}", e))
  })?;
  tracing::info!("Database migrations completed");

  Ok(pool)
}

async fn connect_redis(redis_config: &RedisConfig) -> std::io::Result<ConnectionManager> {
  tracing::info!("Connecting to Redis");

  let client = redis::Client::open(redis_config.url.clone()).map_err(|e| {
    tracing::error!("Failed to create Redis client: {}", e);
    std::io::Error::new(
      std::io::ErrorKind::InvalidInput,
      format!("Invalid Redis URL: {}", e),
    )
  })?;

  let conn = tokio::time::timeout(
    Duration::from_secs(redis_config.connect_timeout_seconds),
    client.get_connection_manager(),
  )
  .await
  .map_err(|_| {
    tracing::error!(
      "Redis connection timed out after {} seconds. Is Redis running?",
      redis_config.connect_timeout_seconds
    );
    std::io::Error::new(
      std::io::ErrorKind::TimedOut,
      format!(
        "Redis connection timed out after {} seconds",
        redis_config.connect_timeout_seconds
      ),
    )
  })?
  .map_err(|e| {
    tracing::error!("Failed to connect to Redis: {}", e);
    std::io::Error::new(
      std::io::ErrorKind::ConnectionRefused,
      "Could not connect to Redis. Is Redis running?",
    )
  })?;

  tracing::info!("Redis connection established");
  Ok(conn)
}

fn build_mailer(mail: &MailConfig) -> std::io::Result<Arc<dyn Mailer>> {
  if !mail.enabled {
    tracing::info!("Mail delivery disabled, activation links are logged instead");
    return Ok(Arc::new(LoggingMailer::new()));
  }

  let mailer = SmtpMailer::new(mail).map_err(|e| {
    tracing::error!("Failed to configure SMTP transport: {}", e);
    invalid_input(e)
  })?;
  tracing::info!(host = %mail.smtp_host, port = mail.smtp_port, "SMTP mailer configured");

  Ok(Arc::new(mailer))
}
