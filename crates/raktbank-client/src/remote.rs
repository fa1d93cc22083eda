//! Remote collaborator endpoints
//!
//! Typed HTTP calls to the donor, appointment, inventory and prediction
//! services. Nothing here touches session state; callers decide what a
//! failure means.

use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ConfigError, PersistenceFailure, PredictionFailure, SyncError};
use crate::records::{Appointment, Donor, Inventory, PredictionRequest, PredictionResult};

pub const DONORS_PATH: &str = "/api/donors";
pub const APPOINTMENTS_PATH: &str = "/api/appointments";
pub const INVENTORY_PATH: &str = "/api/inventory";
pub const PREDICT_PATH: &str = "/api/predict";

/// Resolved endpoint URLs for one collaborator base URL
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub donors: Url,
    pub appointments: Url,
    pub inventory: Url,
    pub predict: Url,
}

impl Endpoints {
    /// Endpoint paths are resolved under the base URL's path, so a base of
    /// `http://host/bank` yields `http://host/bank/api/donors`.
    pub fn from_base(base: &Url) -> Result<Self, ConfigError> {
        let mut base = base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let join = |path: &str| {
            base.join(path.trim_start_matches('/')).map_err(|e| ConfigError::InvalidValue {
                key: "api url",
                value: base.to_string(),
                reason: e.to_string(),
            })
        };

        Ok(Self {
            donors: join(DONORS_PATH)?,
            appointments: join(APPOINTMENTS_PATH)?,
            inventory: join(INVENTORY_PATH)?,
            predict: join(PREDICT_PATH)?,
        })
    }
}

/// HTTP client bound to one set of collaborator endpoints.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct RemoteClient {
    http: Client,
    endpoints: Endpoints,
}

impl RemoteClient {
    pub fn new(http: Client, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub async fn create_donor(&self, donor: &Donor) -> Result<(), PersistenceFailure> {
        self.post_record(&self.endpoints.donors, donor).await
    }

    pub async fn create_appointment(&self, appointment: &Appointment) -> Result<(), PersistenceFailure> {
        self.post_record(&self.endpoints.appointments, appointment).await
    }

    /// Response bodies are ignored; only the status matters.
    async fn post_record<T: Serialize + ?Sized>(
        &self,
        url: &Url,
        record: &T,
    ) -> Result<(), PersistenceFailure> {
        let response = self
            .http
            .post(url.clone())
            .json(record)
            .send()
            .await
            .map_err(|source| PersistenceFailure::Transport {
                endpoint: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PersistenceFailure::Status {
                endpoint: url.to_string(),
                status,
            });
        }
        Ok(())
    }

    pub async fn fetch_inventory(&self) -> Result<Inventory, SyncError> {
        let response = self.http.get(self.endpoints.inventory.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status(status));
        }

        let bytes = response.bytes().await?;
        let items = serde_json::from_slice(&bytes).map_err(|e| SyncError::Decode(e.to_string()))?;
        Ok(Inventory::new(items)?)
    }

    pub async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PredictionFailure> {
        let response = self
            .http
            .post(self.endpoints.predict.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PredictionFailure::Status(status));
        }

        let body = response.bytes().await?;
        let value: Value =
            serde_json::from_slice(&body).map_err(|e| PredictionFailure::Malformed(e.to_string()))?;
        parse_prediction(value)
    }
}

/// Interpret a 2xx prediction body.
///
/// `{label, confidence?}` is a result, `{error}` is the collaborator's own
/// failure message, anything else is malformed. Missing or null confidence
/// counts as 0.
pub fn parse_prediction(value: Value) -> Result<PredictionResult, PredictionFailure> {
    let Value::Object(body) = value else {
        return Err(PredictionFailure::Malformed("expected a JSON object".to_string()));
    };

    if let Some(Value::String(message)) = body.get("error") {
        return Err(PredictionFailure::Rejected(message.clone()));
    }

    let label = match body.get("label") {
        Some(Value::String(label)) => label.clone(),
        _ => return Err(PredictionFailure::Malformed("missing string 'label'".to_string())),
    };

    let confidence = match body.get("confidence") {
        None | Some(Value::Null) => 0.0,
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(other) => {
            return Err(PredictionFailure::Malformed(format!(
                "confidence is not a number: {}",
                other
            )))
        }
    };
    if !(0.0..=1.0).contains(&confidence) {
        return Err(PredictionFailure::Malformed(format!(
            "confidence {} outside [0, 1]",
            confidence
        )));
    }

    Ok(PredictionResult { label, confidence })
}
