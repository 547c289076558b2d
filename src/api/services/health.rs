//! 健康检查端点

use actix_web::{HttpResponse, Responder, web};
use sea_orm::{ConnectionTrait, Statement};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use crate::storage::SeaOrmStorage;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    storage: StorageCheck,
}

#[derive(Serialize)]
struct StorageCheck {
    status: &'static str,
    backend: String,
}

pub async fn health_check(storage: web::Data<Arc<SeaOrmStorage>>) -> impl Responder {
    let db_ok = storage
        .get_db()
        .execute_raw(Statement::from_string(
            storage.get_db().get_database_backend(),
            "SELECT 1".to_string(),
        ))
        .await
        .is_ok();

    if !db_ok {
        error!("Health check: database unreachable");
    }

    let response = HealthResponse {
        status: if db_ok { "ok" } else { "degraded" },
        timestamp: chrono::Utc::now().to_rfc3339(),
        storage: StorageCheck {
            status: if db_ok { "ok" } else { "error" },
            backend: storage.backend_name().to_string(),
        },
    };

    if db_ok {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

pub fn health_routes() -> actix_web::Scope {
    actix_web::web::scope("/health")
        .route("", web::get().to(health_check))
        .route("", web::head().to(health_check))
}
