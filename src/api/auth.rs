use actix_web::{http::header::LOCATION, web, HttpResponse};
use serde::Deserialize;

use crate::{
    config::AppConfig,
    database::MongoDB,
    models::{Role, UserProfile},
    services::{auth_service, IdentityProvider},
    utils::{ok, CampusError},
};

#[utoipa::path(
    get,
    path = "/auth/google/{role}",
    tag = "Auth",
    params(("role" = String, Path, description = "student, teacher or admin")),
    responses(
        (status = 302, description = "Redirect to the Google consent screen"),
        (status = 404, description = "Unknown role"),
        (status = 500, description = "OAuth credentials not configured")
    )
)]
pub async fn google_login(
    path: web::Path<String>,
    provider: web::Data<dyn IdentityProvider>,
) -> Result<HttpResponse, CampusError> {
    let role = Role::parse(&path).ok_or_else(|| CampusError::NotFound("Resource not found".to_string()))?;
    log::info!("🔐 GET /auth/google/{} - redirecting to Google", role);

    let url = provider.authorization_url(role.as_str())?;
    Ok(HttpResponse::Found().append_header((LOCATION, url)).finish())
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

#[utoipa::path(
    get,
    path = "/auth/google/callback",
    tag = "Auth",
    params(
        ("code" = Option<String>, Query, description = "Authorization code"),
        ("state" = Option<String>, Query, description = "Requested role"),
        ("error" = Option<String>, Query, description = "Provider error")
    ),
    responses(
        (status = 200, description = "Token and profile, when no client origin is configured"),
        (status = 302, description = "Redirect to the client with token and profile"),
        (status = 401, description = "Login failed"),
        (status = 403, description = "Invalid domain")
    )
)]
pub async fn google_callback(
    query: web::Query<CallbackQuery>,
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    provider: web::Data<dyn IdentityProvider>,
) -> Result<HttpResponse, CampusError> {
    log::info!("🔐 GET /auth/google/callback - processing Google OAuth");

    if let Some(error) = &query.error {
        log::warn!("❌ OAuth error from provider: {}", error);
        return Err(CampusError::Unauthorized(format!("Google sign-in failed: {}", error)));
    }

    let code = query
        .code
        .as_deref()
        .ok_or_else(|| CampusError::Unauthorized("Missing authorization code".to_string()))?;

    let role = Role::from_state(query.state.as_deref());
    let identity = provider.exchange_code(code).await?;

    let outcome = match auth_service::complete_oauth_login(&db, &config, identity, role).await {
        Ok(outcome) => outcome,
        Err(e) => {
            log::warn!("❌ OAuth login as {} failed: {}", role, e);
            return Err(e);
        }
    };

    match config.redirect_origin() {
        Some(origin) => {
            let url = client_redirect_url(origin, &outcome.token, &outcome.user, role.as_str())?;
            Ok(HttpResponse::Found().append_header((LOCATION, url)).finish())
        }
        None => Ok(ok("Login successful", outcome)),
    }
}

/// `<origin>/auth/callback` with the token and the serialized profile as query parameters.
fn client_redirect_url(origin: &str, token: &str, profile: &UserProfile, state: &str) -> Result<String, CampusError> {
    let profile_json = serde_json::to_string(profile)
        .map_err(|e| CampusError::Internal(format!("Failed to serialize profile: {}", e)))?;

    Ok(format!(
        "{}/auth/callback?success=true&token={}&profile={}&state={}",
        origin,
        urlencoding::encode(token),
        urlencoding::encode(&profile_json),
        urlencoding::encode(state)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::identity_provider::ExternalIdentity;
    use actix_web::{http::StatusCode, test as actix_test, App};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct StubProvider;

    #[async_trait]
    impl IdentityProvider for StubProvider {
        fn authorization_url(&self, state: &str) -> Result<String, CampusError> {
            Ok(format!("https://idp.test/auth?state={}", state))
        }

        async fn exchange_code(&self, _code: &str) -> Result<ExternalIdentity, CampusError> {
            Err(CampusError::Unauthorized("Failed to exchange authorization code".to_string()))
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: "abc".into(),
            name: "Asha Rao".into(),
            email: "asha@klh.edu.in".into(),
            role: Role::Student,
            profile_pic: String::new(),
            role_details: None,
        }
    }

    #[test]
    fn test_client_redirect_url_encodes_profile() {
        let url = client_redirect_url("http://localhost:3000", "t.o.k", &profile(), "student").unwrap();

        assert!(url.starts_with("http://localhost:3000/auth/callback?success=true&token=t.o.k&profile=%7B"));
        assert!(url.contains("Asha%20Rao"));
        assert!(url.ends_with("&state=student"));
    }

    #[actix_web::test]
    async fn test_login_redirects_with_role_state() {
        let provider: Arc<dyn IdentityProvider> = Arc::new(StubProvider);
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::from(provider))
                .route("/auth/google/{role}", web::get().to(google_login)),
        )
        .await;

        let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/auth/google/Teacher").to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get(LOCATION).unwrap(), "https://idp.test/auth?state=teacher");

        let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/auth/google/guest").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_failed_callback_never_redirects() {
        let provider: Arc<dyn IdentityProvider> = Arc::new(StubProvider);
        let db = crate::database::offline_db().await;
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::from(provider))
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(crate::config::test_config()))
                .route("/auth/google/callback", web::get().to(google_callback)),
        )
        .await;

        for uri in [
            "/auth/google/callback?error=access_denied",
            "/auth/google/callback?state=student",
            "/auth/google/callback?code=bad&state=student",
        ] {
            let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);
            assert!(resp.headers().get(LOCATION).is_none());
        }
    }
}
