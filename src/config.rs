use crate::auth::ServiceAccountKey;
use crate::error::{Error, Result};
use crate::slides::DEFAULT_ENDPOINT;
use log::debug;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

const DEFAULT_BIND: &str = "0.0.0.0:8000";
const DEFAULT_FRONTEND_ORIGIN: &str = "https://json-gen.onrender.com";

/// Contents of `slidesync.toml`. Every key is optional.
#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub bind: Option<String>,
    #[serde(default)]
    pub frontend_origin: Option<String>,
    #[serde(default)]
    pub presentation_id: Option<String>,
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,
    #[serde(default)]
    pub slides_endpoint: Option<String>,
}

#[derive(Debug)]
pub struct Config {
    pub bind: SocketAddr,
    pub frontend_origin: String,
    pub presentation_id: String,
    pub credentials: ServiceAccountKey,
    pub slides_endpoint: String,
}

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("slidesync.toml")
}

fn read_file_config(path: &Path, explicit: bool) -> Result<FileConfig> {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {path:?}: {e}"))),
        Err(e) if explicit => Err(Error::Io {
            path: path.to_path_buf(),
            source: e,
        }),
        Err(_) => Ok(FileConfig::default()),
    }
}

/// Loads the config file (an explicit `--config` path must exist) and applies
/// environment overrides. Missing credentials or presentation id is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let file = match path {
        Some(path) => read_file_config(path, true)?,
        None => read_file_config(&config_path(), false)?,
    };
    resolve(file, |name| std::env::var(name).ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Config> {
    let credentials_json = match non_empty(env("GOOGLE_CREDS_JSON")) {
        Some(json) => json,
        None => match &file.credentials_file {
            Some(path) => std::fs::read_to_string(path).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?,
            None => {
                return Err(Error::Config(
                    "missing GOOGLE_CREDS_JSON environment variable and no credentials_file"
                        .into(),
                ));
            }
        },
    };
    let credentials = ServiceAccountKey::from_json(&credentials_json)?;

    let presentation_id = non_empty(env("PRESENTATION_ID"))
        .or(non_empty(file.presentation_id))
        .ok_or_else(|| {
            Error::Config("missing PRESENTATION_ID environment variable".into())
        })?;

    // PORT only applies when no explicit address is configured
    let bind = non_empty(env("SLIDESYNC_BIND"))
        .or(non_empty(file.bind))
        .or_else(|| non_empty(env("PORT")).map(|port| format!("0.0.0.0:{}", port.trim())))
        .unwrap_or_else(|| DEFAULT_BIND.to_string());
    let bind: SocketAddr = bind
        .parse()
        .map_err(|e| Error::Config(format!("invalid bind address {bind:?}: {e}")))?;

    let frontend_origin = non_empty(env("FRONTEND_ORIGIN"))
        .or(non_empty(file.frontend_origin))
        .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGIN.to_string());
    let frontend_origin = validate_origin(&frontend_origin)?;

    let slides_endpoint =
        non_empty(file.slides_endpoint).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    debug!("presentation={presentation_id} bind={bind} origin={frontend_origin}");
    Ok(Config {
        bind,
        frontend_origin,
        presentation_id,
        credentials,
        slides_endpoint,
    })
}

/// An origin is `scheme://host[:port]` with nothing after it.
fn validate_origin(origin: &str) -> Result<String> {
    let origin = origin.trim().trim_end_matches('/');
    let invalid = || Error::Config(format!("invalid frontend origin {origin:?}"));

    let url = reqwest::Url::parse(origin).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(invalid());
    }
    Ok(origin.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::auth::testing::{TEST_CLIENT_EMAIL, key_json};

    fn creds() -> String {
        key_json("https://oauth2.googleapis.com/token")
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn env_only_config_uses_defaults() {
        let config = resolve(
            FileConfig::default(),
            env(&[("GOOGLE_CREDS_JSON", creds().as_str()), ("PRESENTATION_ID", "deck-1")]),
        )
        .unwrap();
        assert_eq!(config.presentation_id, "deck-1");
        assert_eq!(config.bind, DEFAULT_BIND.parse::<SocketAddr>().unwrap());
        assert_eq!(config.frontend_origin, DEFAULT_FRONTEND_ORIGIN);
        assert_eq!(config.slides_endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.credentials.client_email, TEST_CLIENT_EMAIL);
    }

    #[test]
    fn missing_credentials_is_fatal() {
        let err = resolve(FileConfig::default(), env(&[("PRESENTATION_ID", "deck-1")]))
            .unwrap_err();
        assert!(err.to_string().contains("GOOGLE_CREDS_JSON"));
    }

    #[test]
    fn unusable_private_key_is_fatal() {
        let creds = r#"{"client_email": "sync@demo.iam", "private_key": "pem"}"#;
        let err = resolve(
            FileConfig::default(),
            env(&[("GOOGLE_CREDS_JSON", creds), ("PRESENTATION_ID", "deck-1")]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Credentials(_)));
    }

    #[test]
    fn missing_presentation_id_is_fatal() {
        let err = resolve(
            FileConfig::default(),
            env(&[("GOOGLE_CREDS_JSON", creds().as_str()), ("PRESENTATION_ID", "  ")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("PRESENTATION_ID"));
    }

    #[test]
    fn env_overrides_file() {
        let file: FileConfig = toml::from_str(
            r#"
            bind = "127.0.0.1:9000"
            frontend_origin = "https://file.example.org"
            presentation_id = "from-file"
            slides_endpoint = "http://localhost:8085"
            "#,
        )
        .unwrap();
        let config = resolve(
            file,
            env(&[
                ("GOOGLE_CREDS_JSON", creds().as_str()),
                ("PRESENTATION_ID", "from-env"),
                ("FRONTEND_ORIGIN", "https://env.example.org/"),
            ]),
        )
        .unwrap();
        assert_eq!(config.presentation_id, "from-env");
        assert_eq!(config.bind, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.frontend_origin, "https://env.example.org");
        assert_eq!(config.slides_endpoint, "http://localhost:8085");
    }

    #[test]
    fn port_applies_without_explicit_bind() {
        let config = resolve(
            FileConfig::default(),
            env(&[
                ("GOOGLE_CREDS_JSON", creds().as_str()),
                ("PRESENTATION_ID", "deck"),
                ("PORT", "10000"),
            ]),
        )
        .unwrap();
        assert_eq!(config.bind, "0.0.0.0:10000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn rejects_malformed_origin() {
        for origin in ["json-gen.onrender.com", "ftp://host", "https://host/app"] {
            let result = resolve(
                FileConfig::default(),
                env(&[
                    ("GOOGLE_CREDS_JSON", creds().as_str()),
                    ("PRESENTATION_ID", "deck"),
                    ("FRONTEND_ORIGIN", origin),
                ]),
            );
            assert!(matches!(result, Err(Error::Config(_))), "{origin}");
        }
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let err = load_config(Some(Path::new("/nonexistent/slidesync.toml"))).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
