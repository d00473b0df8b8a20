//! gNMI JSON gateway client
//!
//! Talks to a gateway that exposes gNMI Get and Set as JSON over HTTP:
//!
//! - `POST {address}/gnmi/get`: `{"prefix": {"target": ..}, "path": [..], "encoding": "JSON"}`
//! - `POST {address}/gnmi/set`: `{"prefix": .., "update": [..], "delete": [..]}`
//!
//! Values use the gNMI JSON typed-value mapping (`stringVal`, `uintVal`,
//! `intVal`, `boolVal`). Get responses carry the tree in `jsonVal`, either
//! inline or, as the protobuf JSON mapping renders `bytes`, base64 encoded.

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::store::{ConfigStore, SetRequest, SetResponse, Snapshot};
use cfgmig_path::{Path, TypedValue, Update};
use serde::de::DeserializeOwned;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Store client over the gNMI JSON gateway
#[derive(Clone)]
pub struct HttpConfigStore {
    client: reqwest::Client,
    address: String,
}

impl HttpConfigStore {
    /// Build a client from explicit settings
    ///
    /// Loads the CA bundle and client identity unless TLS is disabled.
    ///
    /// # Errors
    /// - invalid settings or unreadable credential files
    /// - credentials rejected by the TLS backend
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;

        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(ca) = config.tls.read_ca()? {
            for cert in reqwest::Certificate::from_pem_bundle(&ca).map_err(StoreError::Credentials)? {
                builder = builder.add_root_certificate(cert);
            }
        }
        if let Some(identity) = config.tls.read_identity()? {
            builder = builder.identity(
                reqwest::Identity::from_pem(&identity).map_err(StoreError::Credentials)?,
            );
        }

        let client = builder.build().map_err(StoreError::Credentials)?;
        let address = config.address.trim_end_matches('/').to_string();
        tracing::debug!(%address, tls = !config.tls.disabled, "store client ready");

        Ok(Self { client, address })
    }

    /// Gateway base URL
    #[inline]
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    fn endpoint(&self, operation: &str) -> String {
        format!("{}/gnmi/{operation}", self.address)
    }

    async fn post<B, R>(&self, operation: &'static str, target: &str, body: &B) -> Result<R, StoreError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint(operation))
            .json(body)
            .send()
            .await
            .map_err(|source| StoreError::Transport {
                address: self.address.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                operation,
                target: target.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|source| StoreError::Decode { operation, source })
    }
}

impl fmt::Debug for HttpConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpConfigStore")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl ConfigStore for HttpConfigStore {
    async fn get(&self, target: &str, path: &Path) -> Result<Snapshot, StoreError> {
        tracing::debug!(target_name = %target, %path, "gnmi get");
        let request = WireGetRequest::new(target, path);
        let response: WireGetResponse = self.post("get", target, &request).await?;

        let json_val = response
            .into_tree()
            .ok_or_else(|| StoreError::EmptyResponse(target.to_string()))?;
        let tree = decode_json_val(target, json_val)?;
        Ok(Snapshot::new(target, serde_json::to_vec(&tree)?))
    }

    async fn set(&self, request: &SetRequest) -> Result<SetResponse, StoreError> {
        tracing::debug!(
            target_name = %request.target,
            updates = request.updates.len(),
            deletes = request.deletes.len(),
            "gnmi set"
        );
        let wire = WireSetRequest::from(request);
        let response: WireSetResponse = self.post("set", &request.target, &wire).await?;
        Ok(SetResponse {
            target: request.target.clone(),
            timestamp: response.timestamp,
        })
    }
}

#[derive(Debug, Serialize)]
struct WireGetRequest {
    prefix: Path,
    path: Vec<Path>,
    encoding: &'static str,
}

impl WireGetRequest {
    fn new(target: &str, path: &Path) -> Self {
        Self {
            prefix: Path::root().with_target(target),
            path: vec![path.clone()],
            encoding: "JSON",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct WireGetResponse {
    #[serde(default)]
    notification: Vec<WireNotification>,
}

impl WireGetResponse {
    /// Inline JSON of the first update carrying one
    fn into_tree(self) -> Option<Value> {
        self.notification
            .into_iter()
            .flat_map(|notification| notification.update)
            .find_map(|update| update.val.json_val)
    }
}

#[derive(Debug, Deserialize)]
struct WireNotification {
    #[serde(default)]
    update: Vec<WireReadUpdate>,
}

#[derive(Debug, Deserialize)]
struct WireReadUpdate {
    val: WireReadValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireReadValue {
    #[serde(default)]
    json_val: Option<Value>,
}

/// Resolve a `jsonVal` to the tree it carries
///
/// A string is the base64 form of the JSON bytes; anything else is the tree
/// itself.
fn decode_json_val(target: &str, json_val: Value) -> Result<Value, StoreError> {
    let Value::String(encoded) = json_val else {
        return Ok(json_val);
    };
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| StoreError::malformed_tree(target, e))?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::malformed_tree(target, e))
}

#[derive(Debug, Serialize)]
struct WireSetRequest {
    prefix: Path,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    update: Vec<WireUpdate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    delete: Vec<Path>,
}

impl From<&SetRequest> for WireSetRequest {
    fn from(request: &SetRequest) -> Self {
        Self {
            prefix: request.scoped_prefix(),
            update: request.updates.iter().map(WireUpdate::from).collect(),
            delete: request.deletes.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct WireUpdate {
    path: Path,
    val: WireTypedValue,
}

impl From<&Update> for WireUpdate {
    fn from(update: &Update) -> Self {
        Self {
            path: update.path().clone(),
            val: WireTypedValue::from(update.value()),
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
enum WireTypedValue {
    StringVal(String),
    UintVal(u64),
    IntVal(i64),
    BoolVal(bool),
}

impl From<&TypedValue> for WireTypedValue {
    fn from(value: &TypedValue) -> Self {
        match value {
            TypedValue::String(s) => Self::StringVal(s.clone()),
            TypedValue::U8(v) => Self::UintVal(u64::from(*v)),
            TypedValue::U16(v) => Self::UintVal(u64::from(*v)),
            TypedValue::U32(v) => Self::UintVal(u64::from(*v)),
            TypedValue::U64(v) => Self::UintVal(*v),
            TypedValue::I64(v) => Self::IntVal(*v),
            TypedValue::Bool(v) => Self::BoolVal(*v),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct WireSetResponse {
    #[serde(default)]
    timestamp: i64,
}
