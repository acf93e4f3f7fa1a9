use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Instant;

use crate::utils::ok;

static STARTED_AT: OnceLock<Instant> = OnceLock::new();

/// Records the process start; later calls keep the first value.
pub fn mark_started() {
    STARTED_AT.get_or_init(Instant::now);
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// Seconds since startup
    pub uptime: u64,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> HttpResponse {
    let uptime = STARTED_AT.get_or_init(Instant::now).elapsed().as_secs();

    ok(
        "Smart Campus API healthy",
        HealthResponse {
            uptime,
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App};

    #[actix_web::test]
    async fn test_health_envelope() {
        mark_started();
        let app = test::init_service(App::new().route("/health", web::get().to(health_check))).await;

        let body: serde_json::Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health").to_request()).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Smart Campus API healthy");
        assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["data"]["uptime"].is_u64());
    }
}
