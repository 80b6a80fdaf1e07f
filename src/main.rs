use docchat::configuration::get_configuration;
use docchat::startup::run;
use docchat::telemetry::{get_subscriber, init_subscriber};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::net::TcpListener;
use std::time::Duration;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let settings = get_configuration().expect("Failed to read configuration.");

    let env_filter = if settings.development { "debug" } else { "info" };
    let subscriber = get_subscriber("docchat".into(), env_filter.into(), std::io::stdout);
    init_subscriber(subscriber);

    tracing::info!(
        db_host = %settings.database.host,
        db_port = settings.database.port,
        db_name = %settings.database.database_name,
        "Connecting to PostgreSQL"
    );

    let connect_options = PgConnectOptions::new()
        .host(&settings.database.host)
        .port(settings.database.port)
        .username(&settings.database.username)
        .password(&settings.database.password)
        .database(&settings.database.database_name)
        .ssl_mode(PgSslMode::Disable);

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(connect_options)
        .await
        .expect("Failed to connect to database.");

    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .expect("Failed to migrate the database.");

    let address = format!("{}:{}", settings.app_host, settings.app_port);
    tracing::info!("Start server at {:?}", &address);
    let listener =
        TcpListener::bind(&address).unwrap_or_else(|_| panic!("failed to bind to {}", address));

    run(listener, pg_pool, settings).await?.await
}
