//! Server configuration loaded from the environment.

use std::fmt;

use actix_cors::Cors;
use actix_web::http::header;
use codelitmus_core::ScorerConfig;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CORS_ORIGINS: &str = "*";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 1024 * 1024;

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Environment variable holding the bad value.
    pub key: &'static str,
    /// Raw value found.
    pub value: String,
    /// Why it was rejected.
    pub reason: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} has invalid value {:?}: {}", self.key, self.value, self.reason)
    }
}

impl std::error::Error for ConfigError {}

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Allowed CORS origins; `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: usize,
    /// Scoring settings shared by every request.
    pub scorer: ScorerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: split_origins(DEFAULT_CORS_ORIGINS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            scorer: ScorerConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Build the config from process environment variables.
    #[cfg_attr(test, allow(dead_code))]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let host = lookup("LITMUS_HOST")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.host);
        let port = parse_var(&lookup, "LITMUS_PORT")?.unwrap_or(defaults.port);
        let cors_origins = lookup("LITMUS_CORS_ORIGINS")
            .map(|value| split_origins(&value))
            .unwrap_or(defaults.cors_origins);
        let max_upload_bytes =
            parse_var(&lookup, "LITMUS_MAX_UPLOAD_BYTES")?.unwrap_or(defaults.max_upload_bytes);
        if max_upload_bytes == 0 {
            return Err(ConfigError {
                key: "LITMUS_MAX_UPLOAD_BYTES",
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        let empty_score =
            parse_var(&lookup, "LITMUS_EMPTY_SCORE")?.unwrap_or(defaults.scorer.empty_score);

        Ok(Self {
            host,
            port,
            cors_origins,
            max_upload_bytes,
            scorer: ScorerConfig {
                empty_score,
                ..defaults.scorer
            },
        })
    }

    /// Whether any origin may call the API.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }

    /// CORS middleware for the configured origins.
    pub fn cors(&self) -> Cors {
        let cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);
        if self.allows_any_origin() {
            return cors.allow_any_origin();
        }
        self.cors_origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|value| value.trim())
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|err: T::Err| ConfigError {
            key,
            reason: err.to_string(),
            value,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, http::StatusCode, test as actix_test, web};
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_variables() {
        let config = ServerConfig::from_lookup(|_| None).expect("config");
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.max_upload_bytes, 1_048_576);
        assert_eq!(config.scorer.empty_score, -3);
        assert!(config.allows_any_origin());
    }

    #[test]
    fn reads_every_variable() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("LITMUS_HOST", "0.0.0.0"),
            ("LITMUS_PORT", "9090"),
            (
                "LITMUS_CORS_ORIGINS",
                "http://localhost:3000, https://litmus.example.com,",
            ),
            ("LITMUS_MAX_UPLOAD_BYTES", "2048"),
            ("LITMUS_EMPTY_SCORE", "-2"),
        ]))
        .expect("config");

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9090);
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:3000", "https://litmus.example.com"]
        );
        assert!(!config.allows_any_origin());
        assert_eq!(config.max_upload_bytes, 2048);
        assert_eq!(config.scorer.empty_score, -2);
        assert_eq!(config.scorer.comment_marker, "#");
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = ServerConfig::from_lookup(lookup_from(&[("LITMUS_PORT", "eighty")]))
            .expect_err("bad port");
        assert_eq!(err.key, "LITMUS_PORT");
        assert!(err.to_string().contains("\"eighty\""));

        let err = ServerConfig::from_lookup(lookup_from(&[("LITMUS_EMPTY_SCORE", "low")]))
            .expect_err("bad score");
        assert_eq!(err.key, "LITMUS_EMPTY_SCORE");

        let err = ServerConfig::from_lookup(lookup_from(&[("LITMUS_MAX_UPLOAD_BYTES", "0")]))
            .expect_err("zero limit");
        assert_eq!(err.key, "LITMUS_MAX_UPLOAD_BYTES");
    }

    async fn preflight(config: &ServerConfig, origin: &str) -> (StatusCode, Option<String>) {
        let app = actix_test::init_service(
            App::new()
                .wrap(config.cors())
                .route("/analyze/", web::post().to(HttpResponse::Ok)),
        )
        .await;
        let req = actix_test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/analyze/")
            .insert_header((header::ORIGIN, origin))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        let allowed = resp
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        (resp.status(), allowed)
    }

    #[actix_web::test]
    async fn wildcard_origin_allows_anyone() {
        let config = ServerConfig::default();
        let (status, allowed) = preflight(&config, "https://anywhere.example.com").await;

        assert_eq!(status, StatusCode::OK);
        assert!(allowed.is_some());
    }

    #[actix_web::test]
    async fn listed_origins_only() {
        let config = ServerConfig {
            cors_origins: vec!["http://localhost:3000".to_string()],
            ..ServerConfig::default()
        };

        let (status, allowed) = preflight(&config, "http://localhost:3000").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(allowed.as_deref(), Some("http://localhost:3000"));

        let (_, denied) = preflight(&config, "https://evil.example.com").await;
        assert!(denied.is_none());
    }
}
