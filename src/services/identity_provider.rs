use async_trait::async_trait;
use serde::Deserialize;

use crate::config::GoogleOAuthConfig;
use crate::utils::CampusError;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Account data returned by the external provider after a successful exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalIdentity {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// OAuth identity provider. Built once at startup and shared with the handlers.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is sent to; `state` comes back untouched on the callback.
    fn authorization_url(&self, state: &str) -> Result<String, CampusError>;

    async fn exchange_code(&self, code: &str) -> Result<ExternalIdentity, CampusError>;
}

pub struct GoogleIdentityProvider {
    config: GoogleOAuthConfig,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct GoogleUserInfo {
    id: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleIdentityProvider {
    pub fn new(config: GoogleOAuthConfig) -> Self {
        if config.client_id.is_none() || config.client_secret.is_none() {
            log::warn!("⚠️  Google OAuth credentials are not configured. OAuth routes will fail.");
        }
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn credentials(&self) -> Result<(&str, &str), CampusError> {
        match (self.config.client_id.as_deref(), self.config.client_secret.as_deref()) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(CampusError::Internal("Google OAuth credentials are not configured".to_string())),
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn authorization_url(&self, state: &str) -> Result<String, CampusError> {
        let (client_id, _) = self.credentials()?;

        let params = [
            ("client_id", client_id),
            ("redirect_uri", self.config.callback_url.as_str()),
            ("response_type", "code"),
            ("scope", "openid email profile"),
            ("state", state),
            ("prompt", "select_account"),
        ];

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        Ok(format!("{}?{}", GOOGLE_AUTH_URL, query_string))
    }

    async fn exchange_code(&self, code: &str) -> Result<ExternalIdentity, CampusError> {
        let (client_id, client_secret) = self.credentials()?;

        let token_response = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| CampusError::Unauthorized(format!("Failed to exchange code: {}", e)))?;

        if !token_response.status().is_success() {
            log::warn!("❌ Google token endpoint answered {}", token_response.status());
            return Err(CampusError::Unauthorized("Failed to exchange authorization code".to_string()));
        }

        let tokens: TokenResponse = token_response
            .json()
            .await
            .map_err(|_| CampusError::Unauthorized("No access token in response".to_string()))?;

        let user_info: GoogleUserInfo = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&tokens.access_token)
            .send()
            .await
            .map_err(|e| CampusError::Unauthorized(format!("Failed to get user info: {}", e)))?
            .json()
            .await
            .map_err(|_| CampusError::Unauthorized("Failed to read Google profile".to_string()))?;

        Ok(ExternalIdentity {
            id: user_info.id,
            email: user_info.email,
            name: user_info.name,
            picture: user_info.picture,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(with_credentials: bool) -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: with_credentials.then(|| "client-123".to_string()),
            client_secret: with_credentials.then(|| "shh".to_string()),
            callback_url: "http://localhost:5000/auth/google/callback".to_string(),
        }
    }

    #[test]
    fn test_authorization_url_carries_role_state() {
        let provider = GoogleIdentityProvider::new(config(true));
        let url = provider.authorization_url("teacher").unwrap();

        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("state=teacher"));
        assert!(url.contains("prompt=select_account"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A5000%2Fauth%2Fgoogle%2Fcallback"));
    }

    #[actix_web::test]
    async fn test_missing_credentials_fail_at_call_time() {
        let provider = GoogleIdentityProvider::new(config(false));
        assert!(provider.authorization_url("student").is_err());
        assert!(matches!(provider.exchange_code("abc").await, Err(CampusError::Internal(_))));
    }
}
