use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_DATABASE: &str = "smart_campus";
pub const DEFAULT_STUDENT_DOMAIN: &str = "@klh.edu.in";
pub const DEFAULT_CLIENT_ORIGIN: &str = "http://localhost:3000";
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const JSON_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Google OAuth client settings. Credentials are optional: without them the
/// OAuth routes answer with an error instead of the server refusing to boot.
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub callback_url: String,
}

/// Process configuration, loaded once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongo_uri: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub google: GoogleOAuthConfig,
    pub client_origins: Vec<String>,
    pub student_email_domain: String,
    pub uploads_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw.clone(),
            })?,
            Err(_) => 5000,
        };

        let mongo_uri = required("MONGO_URI")?;
        let database_name = env::var("MONGO_DB_NAME")
            .ok()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| database_from_uri(&mongo_uri));

        let jwt_secret = required("JWT_SECRET")?;

        let google = GoogleOAuthConfig {
            client_id: optional("GOOGLE_CLIENT_ID"),
            client_secret: optional("GOOGLE_CLIENT_SECRET"),
            callback_url: env::var("GOOGLE_CALLBACK_URL")
                .unwrap_or_else(|_| "http://localhost:5000/auth/google/callback".to_string()),
        };

        let client_origins = parse_origins(&env::var("CLIENT_URL").unwrap_or_default());
        let student_email_domain = normalize_domain(&env::var("STUDENT_EMAIL_DOMAIN").unwrap_or_default());
        let uploads_dir = PathBuf::from(env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string()));

        Ok(AppConfig {
            host,
            port,
            mongo_uri,
            database_name,
            jwt_secret,
            google,
            client_origins,
            student_email_domain,
            uploads_dir,
        })
    }

    /// Origin that receives the OAuth redirect; `None` means the callback answers with JSON.
    pub fn redirect_origin(&self) -> Option<&str> {
        self.client_origins.first().map(String::as_str)
    }

    /// Origins accepted by CORS.
    pub fn cors_origins(&self) -> Vec<String> {
        if self.client_origins.is_empty() {
            vec![DEFAULT_CLIENT_ORIGIN.to_string()]
        } else {
            self.client_origins.clone()
        }
    }

    pub fn lost_found_dir(&self) -> PathBuf {
        self.uploads_dir.join("lost-found")
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    optional(key).ok_or(ConfigError::Missing(key))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

/// Lowercased `@domain`; the leading `@` is added when missing.
fn normalize_domain(raw: &str) -> String {
    let domain = raw.trim().trim_start_matches('@').to_lowercase();
    if domain.is_empty() {
        DEFAULT_STUDENT_DOMAIN.to_string()
    } else {
        format!("@{}", domain)
    }
}

/// Extracts the database name from the URI path, falling back to the default.
fn database_from_uri(uri: &str) -> String {
    let without_scheme = uri.split("://").nth(1).unwrap_or(uri);
    without_scheme
        .split_once('/')
        .map(|(_, rest)| rest.split('?').next().unwrap_or(""))
        .filter(|name| !name.is_empty())
        .map(String::from)
        .unwrap_or_else(|| DEFAULT_DATABASE.to_string())
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 5000,
        mongo_uri: "mongodb://localhost:27017".to_string(),
        database_name: DEFAULT_DATABASE.to_string(),
        jwt_secret: "test-secret".to_string(),
        google: GoogleOAuthConfig {
            client_id: Some("client-id".to_string()),
            client_secret: Some("client-secret".to_string()),
            callback_url: "http://localhost:5000/auth/google/callback".to_string(),
        },
        client_origins: vec!["http://localhost:3000".to_string()],
        student_email_domain: DEFAULT_STUDENT_DOMAIN.to_string(),
        uploads_dir: PathBuf::from("uploads"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_from_uri() {
        assert_eq!(database_from_uri("mongodb://localhost:27017"), DEFAULT_DATABASE);
        assert_eq!(database_from_uri("mongodb://localhost:27017/"), DEFAULT_DATABASE);
        assert_eq!(
            database_from_uri("mongodb+srv://u:p@cluster0.example.net/campus?retryWrites=true"),
            "campus"
        );
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" http://a.test/ , ,https://b.test"),
            vec!["http://a.test".to_string(), "https://b.test".to_string()]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("klh.edu.in"), "@klh.edu.in");
        assert_eq!(normalize_domain(" @KLH.edu.in "), "@klh.edu.in");
        assert_eq!(normalize_domain(""), DEFAULT_STUDENT_DOMAIN);
        assert_eq!(normalize_domain("@"), DEFAULT_STUDENT_DOMAIN);
    }

    #[test]
    fn test_cors_origins_fallback() {
        let mut config = test_config();
        config.client_origins.clear();
        assert_eq!(config.cors_origins(), vec![DEFAULT_CLIENT_ORIGIN.to_string()]);
        assert!(config.redirect_origin().is_none());
    }
}
