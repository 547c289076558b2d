//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It configures and starts the HTTP server with all necessary routes.

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::analytics::ClickManager;
use crate::api::constants::API_PREFIX;
use crate::api::middleware::{OwnerAuth, RequestIdMiddleware};
use crate::api::services::admin::routes::{redirects_routes, stats_routes};
use crate::api::services::{health_routes, redirect_routes};
use crate::config::CorsConfig;
use crate::services::{GeoIpProvider, GrantService, Resolver};
use crate::storage::StorageFactory;

/// Validate CORS configuration at startup (runs once)
fn validate_cors_config(cors_config: &CorsConfig) {
    if !cors_config.enabled {
        return;
    }

    if cors_config.allowed_origins.is_empty() {
        warn!(
            "CORS enabled but allowed_origins is empty. \
            No cross-origin requests will be allowed. \
            Set allowed_origins explicitly or use '[\"*\"]' for any origin."
        );
    }
}

/// Build CORS middleware from configuration
fn build_cors_middleware(cors_config: &CorsConfig) -> Cors {
    // When CORS is disabled, use browser's default same-origin policy (restrictive)
    if !cors_config.enabled {
        return Cors::default();
    }

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec!["Content-Type", "Authorization", "Accept"])
        .max_age(cors_config.max_age as usize);

    let is_any_origin = cors_config.allowed_origins.iter().any(|o| o == "*");
    if is_any_origin {
        cors = cors.allow_any_origin();
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

/// Run the HTTP server
///
/// **Note**: Config and logging must be initialized before calling this.
pub async fn run_server() -> Result<()> {
    let config = crate::config::get_config();

    // Storage (runs migrations on startup)
    let storage = StorageFactory::create().await.map_err(|e| {
        tracing::error!("{}", e.format_colored());
        anyhow::anyhow!("storage initialization failed: {}", e)
    })?;

    // Click pipeline: buffered manager flushing into the storage sink
    let click_manager = Arc::new(ClickManager::new(
        storage.as_click_sink(),
        Duration::from_secs(config.analytics.flush_interval_secs),
        config.analytics.flush_threshold,
    ));
    {
        let manager = Arc::clone(&click_manager);
        tokio::spawn(async move {
            manager.start_background_task().await;
        });
    }

    let geoip = Arc::new(GeoIpProvider::new(&config.analytics));
    let grants = Arc::new(GrantService::from_config(&config.auth));

    let resolver = Arc::new(Resolver::new(
        storage.clone(),
        Arc::clone(&click_manager),
        Arc::clone(&geoip),
        Arc::clone(&grants),
    ));

    let cors_config = config.cors.clone();
    validate_cors_config(&cors_config);

    if config.auth.jwt_secret.is_empty() {
        warn!("Dashboard API is disabled (auth.jwt_secret not set)");
    } else {
        warn!("Dashboard API available at: {}", API_PREFIX);
    }

    let cpu_count = config.server.cpu_count.min(32);
    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);

    let storage_for_app = storage.clone();
    let server = HttpServer::new(move || {
        let cors = build_cors_middleware(&cors_config);

        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(cors)
            .wrap(Compress::default())
            .app_data(web::Data::new(storage_for_app.clone()))
            .app_data(web::Data::new(Arc::clone(&resolver)))
            .app_data(web::PayloadConfig::new(1024 * 1024))
            .wrap(
                DefaultHeaders::new()
                    .add(("Connection", "keep-alive"))
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .service(
                web::scope(API_PREFIX)
                    .wrap(OwnerAuth)
                    .service(redirects_routes())
                    .service(stats_routes()),
            )
            .service(health_routes())
            .service(redirect_routes())
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .workers(cpu_count);

    server.bind(bind_address)?.run().await?;

    // 退出前把缓冲区里的点击写出去
    warn!("Server stopped, flushing pending clicks");
    click_manager.flush().await;

    Ok(())
}
