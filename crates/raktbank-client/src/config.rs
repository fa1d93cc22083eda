//! Client configuration
//!
//! Read from the environment with logged defaults:
//!
//! - `RAKTBANK_API_URL`: collaborator base URL (default `http://127.0.0.1:3000`)
//! - `RAKTBANK_TIMEOUT_MS`: per-request timeout; unset or `0` means none

use std::env;
use std::time::Duration;

use reqwest::{Client, Url};
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::remote::{Endpoints, RemoteClient};

pub const API_URL_VAR: &str = "RAKTBANK_API_URL";
pub const TIMEOUT_VAR: &str = "RAKTBANK_TIMEOUT_MS";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: Url,
    /// `None` leaves requests unbounded
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            request_timeout: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_url = var(API_URL_VAR).unwrap_or_else(|| {
            info!("{API_URL_VAR} not set, using default: {DEFAULT_API_URL}");
            DEFAULT_API_URL.to_string()
        });
        let api_url = parse_api_url(&raw_url)?;

        let request_timeout = match var(TIMEOUT_VAR) {
            Some(raw) => {
                let ms = raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                    key: TIMEOUT_VAR,
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
                (ms > 0).then(|| Duration::from_millis(ms))
            }
            None => None,
        };

        debug!(api_url = %api_url, ?request_timeout, "client config loaded");
        Ok(Self {
            api_url,
            request_timeout,
        })
    }

    /// Build the HTTP client and resolve the collaborator endpoints.
    pub fn remote_client(&self) -> Result<RemoteClient, ConfigError> {
        let mut builder = Client::builder();
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(RemoteClient::new(http, Endpoints::from_base(&self.api_url)?))
    }
}

/// Only http(s) base URLs make sense for the collaborators.
pub fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        key: API_URL_VAR,
        value: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:3000/");
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            (API_URL_VAR, "https://bank.example.org/raktbank"),
            (TIMEOUT_VAR, "2500"),
        ]))
        .unwrap();
        assert_eq!(config.api_url.host_str(), Some("bank.example.org"));
        assert_eq!(config.request_timeout, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let config = ClientConfig::from_lookup(lookup(&[(TIMEOUT_VAR, "0")])).unwrap();
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[(API_URL_VAR, "  ")])).unwrap();
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:3000/");
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[(TIMEOUT_VAR, "soon")])),
            Err(ConfigError::InvalidValue { key: TIMEOUT_VAR, .. })
        ));
        assert!(ClientConfig::from_lookup(lookup(&[(API_URL_VAR, "not a url")])).is_err());
        assert!(parse_api_url("ftp://bank.example.org").is_err());
    }

    #[test]
    fn test_remote_client_endpoints() {
        let config = ClientConfig::new(Url::parse("http://localhost:9000").unwrap());
        let remote = config.remote_client().unwrap();
        assert_eq!(
            remote.endpoints().appointments.as_str(),
            "http://localhost:9000/api/appointments"
        );
    }
}
