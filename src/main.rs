use std::net::TcpListener;
use std::sync::Arc;

use gatehouse::auth::{SessionAuthenticator, SystemClock};
use gatehouse::configuration::get_configuration;
use gatehouse::startup::run;
use gatehouse::store;
use gatehouse::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!(auth = ?config.auth, "Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    tracing::info!(backend = ?configuration.database.kind, "Attempting to connect to database");
    let stores = store::connect(&configuration.database).await.map_err(|e| {
        tracing::error!("Failed to create connection pool: {}", e);
        std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "Database connection error",
        )
    })?;

    let authenticator =
        SessionAuthenticator::new(configuration.auth.clone(), stores, Arc::new(SystemClock))
            .map_err(|e| {
                tracing::error!("Failed to build session authenticator: {}", e);
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "Authentication setup error")
            })?;

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, Arc::new(authenticator), &configuration.application)?;
    server.await
}
