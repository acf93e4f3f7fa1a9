pub mod announcements;
pub mod auth;
pub mod clubs;
pub mod dashboard;
pub mod events;
pub mod feedback;
pub mod health;
pub mod lost_found;
pub mod polls;
pub mod resources;
pub mod swagger;
pub mod users;

use actix_web::{error, guard, web, HttpRequest, HttpResponse};

use crate::config::JSON_BODY_LIMIT;
use crate::middleware::{AuthMiddleware, RequireRole};
use crate::models::Role;
use crate::utils::{ApiResponse, CampusError};

/// Answer for every unmatched route.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::failure("Resource not found"))
}

/// JSON extractor settings: body limit, and malformed bodies rendered as a 400 envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(|err: error::JsonPayloadError, req: &HttpRequest| {
            log::warn!("⚠️ {} {} rejected: {}", req.method(), req.path(), err);
            CampusError::Validation(format!("Invalid JSON body: {}", err)).into()
        })
}

/// Public routes plus the authenticated `/api` tree. Role sets are attached
/// per resource; `/api/student` and `/api/teacher` are gated as a whole.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/auth")
                // Registered before `{role}` so "callback" is never read as a role.
                .route("/google/callback", web::get().to(auth::google_callback))
                .route("/google/{role}", web::get().to(auth::google_login)),
        )
        .service(
            web::scope("/api")
                .wrap(AuthMiddleware)
                .route("/user/me", web::get().to(users::me))
                // Announcements
                .service(
                    web::resource("/announcements")
                        .guard(guard::Post())
                        .wrap(RequireRole::only(Role::Admin))
                        .route(web::post().to(announcements::create_announcement)),
                )
                .route("/announcements", web::get().to(announcements::list_announcements))
                .service(
                    web::resource("/announcements/{id}")
                        .wrap(RequireRole::only(Role::Admin))
                        .route(web::delete().to(announcements::delete_announcement)),
                )
                // Events
                .service(
                    web::resource("/events")
                        .guard(guard::Post())
                        .wrap(RequireRole::any_of(&[Role::Teacher, Role::Admin]))
                        .route(web::post().to(events::create_event)),
                )
                .route("/events", web::get().to(events::list_events))
                .route("/events/{id}/rsvp", web::post().to(events::rsvp))
                // Clubs
                .service(
                    web::resource("/clubs")
                        .guard(guard::Post())
                        .wrap(RequireRole::only(Role::Admin))
                        .route(web::post().to(clubs::create_club)),
                )
                .route("/clubs", web::get().to(clubs::list_clubs))
                .service(
                    web::resource("/clubs/{id}")
                        .wrap(RequireRole::only(Role::Admin))
                        .route(web::delete().to(clubs::delete_club)),
                )
                // Polls
                .route("/polls", web::get().to(polls::list_polls))
                .route("/polls", web::post().to(polls::create_poll))
                .route("/polls/{id}/vote", web::post().to(polls::vote))
                // Resources
                .route("/resources", web::get().to(resources::list_resources))
                .route("/resources/{id}/download", web::post().to(resources::record_download))
                // Feedback
                .route("/feedback", web::get().to(feedback::list_feedback))
                .route("/feedback", web::post().to(feedback::submit_feedback))
                // Lost & found
                .route("/lost-found", web::get().to(lost_found::list_lost_items))
                .route("/lost-found", web::post().to(lost_found::report_lost_item))
                .service(
                    web::resource("/lost-found/{id}/status")
                        .wrap(RequireRole::any_of(&[Role::Teacher, Role::Admin]))
                        .route(web::patch().to(lost_found::update_status)),
                )
                // Student area
                .service(
                    web::scope("/student")
                        .wrap(RequireRole::only(Role::Student))
                        .route("/dashboard", web::get().to(dashboard::student_dashboard))
                        .route("/clubs", web::get().to(clubs::list_clubs))
                        .route("/clubs/{id}/join", web::post().to(clubs::join_club))
                        .route("/clubs/{id}/leave", web::post().to(clubs::leave_club)),
                )
                // Teacher area
                .service(
                    web::scope("/teacher")
                        .wrap(RequireRole::only(Role::Teacher))
                        .route("/dashboard", web::get().to(dashboard::teacher_dashboard))
                        .route("/events/{id}", web::patch().to(events::update_own_event))
                        .route("/events/{id}", web::delete().to(events::delete_own_event))
                        .route("/resources", web::post().to(resources::create_resource))
                        .route("/resources/{id}", web::patch().to(resources::update_own_resource))
                        .route("/resources/{id}", web::delete().to(resources::delete_own_resource))
                        .route("/feedback/{id}/respond", web::post().to(feedback::respond_to_feedback)),
                ),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::database;
    use crate::models::Principal;
    use crate::services::{auth_service, fixtures, GoogleIdentityProvider, IdentityProvider};
    use actix_web::{http::StatusCode, test, App};
    use std::sync::Arc;

    fn provider() -> web::Data<dyn IdentityProvider> {
        let provider: Arc<dyn IdentityProvider> = Arc::new(GoogleIdentityProvider::new(test_config().google));
        web::Data::from(provider)
    }

    fn bearer(principal: &Principal) -> (&'static str, String) {
        let token = auth_service::generate_jwt(principal, &test_config().jwt_secret).unwrap();
        ("Authorization", format!("Bearer {}", token))
    }

    macro_rules! campus_app {
        ($db:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(test_config()))
                    .app_data(web::Data::new($db))
                    .app_data(provider())
                    .app_data(json_config())
                    .configure(configure)
                    .default_service(web::to(not_found)),
            )
            .await
        };
    }

    async fn envelope(resp: actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>) -> serde_json::Value {
        test::read_body_json(resp).await
    }

    #[actix_web::test]
    async fn test_unknown_route_uses_envelope() {
        let app = campus_app!(database::offline_db().await);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/nowhere").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = envelope(resp).await;
        assert_eq!(body, serde_json::json!({ "success": false, "message": "Resource not found", "data": null }));
    }

    #[actix_web::test]
    async fn test_api_requires_bearer_token() {
        let app = campus_app!(database::offline_db().await);

        for (method, uri) in [("GET", "/api/clubs"), ("POST", "/api/polls/abc/vote"), ("GET", "/api/teacher/dashboard")] {
            let req = test::TestRequest::default()
                .method(method.parse().unwrap())
                .uri(uri)
                .insert_header(("Authorization", "Bearer not-a-jwt"))
                .to_request();
            let err = test::try_call_service(&app, req).await.unwrap_err();
            assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        }
    }

    #[actix_web::test]
    #[ignore] // requires MongoDB at MONGO_URI
    async fn test_role_gates() {
        let db = database::test_db().await;
        let student = fixtures::student(&db).await;
        let teacher = fixtures::teacher(&db).await;
        let app = campus_app!(db);

        let forbidden = [
            (&student, test::TestRequest::post().uri("/api/clubs")),
            (&student, test::TestRequest::post().uri("/api/events")),
            (&student, test::TestRequest::get().uri("/api/teacher/dashboard")),
            (&teacher, test::TestRequest::get().uri("/api/student/dashboard")),
            (&teacher, test::TestRequest::delete().uri("/api/announcements/abc")),
        ];
        for (principal, req) in forbidden {
            let err = test::try_call_service(&app, req.insert_header(bearer(principal)).to_request())
                .await
                .unwrap_err();
            assert_eq!(err.error_response().status(), StatusCode::FORBIDDEN);
        }

        let req = test::TestRequest::get().uri("/api/student/dashboard").insert_header(bearer(&student));
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/clubs").insert_header(bearer(&teacher));
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(envelope(resp).await["message"], "Clubs fetched");
    }

    #[actix_web::test]
    #[ignore] // requires MongoDB at MONGO_URI
    async fn test_malformed_json_and_ids() {
        let db = database::test_db().await;
        let student = fixtures::student(&db).await;
        let app = campus_app!(db);

        let req = test::TestRequest::post()
            .uri("/api/feedback")
            .insert_header(bearer(&student))
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json");
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(envelope(resp).await["success"], false);

        let req = test::TestRequest::post()
            .uri("/api/polls/not-an-id/vote")
            .insert_header(bearer(&student))
            .set_json(serde_json::json!({ "optionKey": "option_1" }));
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(envelope(resp).await["message"], "Poll not found");
    }
}
