use std::sync::Arc;

#[cfg(unix)]
use std::{fs, path::Path};

use actix_web::{middleware::Logger, web, App, HttpServer};
use shipping_domain::config::{ApiConfig, ConfigError};
use shipping_domain::services::{
    events::BroadcastPublisher,
    telemetry::{init_telemetry, TelemetryConfig, TelemetryError},
};
use shipping_storage::SeaOrmStorage;
use thiserror::Error;
use tracing::info;

use crate::{
    access::AccessPolicy,
    handlers::{
        create_address_handler, delete_address_handler, list_addresses_handler,
        metrics_handler, partial_update_address_handler, retrieve_address_handler,
        shipping_cost_handler, shipping_countries_handler, shipping_options_handler,
        update_address_handler,
    },
    listeners::log_address_events,
    state::AppState,
};

pub async fn run() -> Result<(), BootstrapError> {
    let config = ApiConfig::load_from_env()?;

    let telemetry_config = TelemetryConfig::from_env("API");
    let telemetry = init_telemetry(&telemetry_config)?;

    let storage = SeaOrmStorage::builder()
        .database_url(config.database_url())
        .sql_logging(telemetry_config.is_verbose())
        .build()
        .await?;

    let publisher = BroadcastPublisher::default();
    actix_web::rt::spawn(log_address_events(publisher.subscribe()));

    let access_policy = AccessPolicy::from_token(config.access_token());
    let state = AppState::new(
        storage,
        Arc::new(publisher),
        access_policy,
        config.default_site(),
        telemetry,
    );

    let server_state = state.clone();
    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(server_state.clone()))
            .wrap(Logger::default())
            .configure(configure_routes)
    });

    #[cfg(unix)]
    {
        if let Some(socket) = config.api_unix_socket() {
            cleanup_socket(socket)?;
            server = server.bind_uds(socket)?;
        } else {
            server = server.bind(config.api_bind_address())?;
        }
    }

    #[cfg(not(unix))]
    {
        if let Some(socket) = config.api_unix_socket() {
            return Err(BootstrapError::Io(std::io::Error::other(format!(
                "unix socket '{socket}' requested but this platform does not support it"
            ))));
        }
        server = server.bind(config.api_bind_address())?;
    }

    info!(
        bind = config.api_unix_socket().unwrap_or(config.api_bind_address()),
        default_site = config.default_site(),
        access_token = config.access_token().is_some(),
        "shipping api listening"
    );
    server.run().await?;

    Ok(())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/addresses/")
            .route(web::get().to(list_addresses_handler))
            .route(web::post().to(create_address_handler)),
    )
    .service(
        web::resource("/addresses/{id}/")
            .route(web::get().to(retrieve_address_handler))
            .route(web::put().to(update_address_handler))
            .route(web::patch().to(partial_update_address_handler))
            .route(web::delete().to(delete_address_handler)),
    )
    .route("/shipping/cost/", web::get().to(shipping_cost_handler))
    .route(
        "/shipping/countries/",
        web::get().to(shipping_countries_handler),
    )
    .route(
        "/shipping/options/{country}/",
        web::get().to(shipping_options_handler),
    )
    .route("/metrics", web::get().to(metrics_handler));
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("storage error: {0}")]
    Storage(#[from] shipping_domain::storage::StorageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(unix)]
fn cleanup_socket(path: &str) -> std::io::Result<()> {
    let socket_path = Path::new(path);
    if socket_path.exists() {
        fs::remove_file(socket_path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #[cfg(unix)]
    #[actix_web::test]
    async fn cleanup_socket_removes_stale_file() {
        use super::cleanup_socket;

        let path = std::env::temp_dir().join(format!(
            "shipping-api-test-{}-{}.sock",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::SystemTime::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::write(&path, b"stub").expect("write socket file");
        cleanup_socket(path.to_str().unwrap()).expect("cleanup succeeds");
        assert!(!path.exists());
    }
}
