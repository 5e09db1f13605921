//! HTTP record store client
//!
//! Reads the whole user-record collection with a single GET. The response is
//! a JSON object whose collection field (default `users`) holds the records:
//!
//! ```json
//! { "users": [ { "username": "alice", "password": 1234, "balance": 500 } ] }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::config::{validate_endpoint, Config};
use crate::domain::result::{Error, Result};
use crate::domain::{split_transactions, RecordCollection, RecordDefaults, UserRecord};
use crate::ports::RecordStore;

// =============================================================================
// Wire Models
// =============================================================================

/// One element of the store's collection field
///
/// Every field is optional on the wire; absent fields fall back to
/// `RecordDefaults` when mapped into a `UserRecord`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreRecord {
    #[serde(default, deserialize_with = "deserialize_text")]
    username: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    password: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    account_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    account_number: Option<String>,
    #[serde(default, deserialize_with = "deserialize_amount")]
    balance: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_text")]
    currency: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    credit: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    status: Option<String>,
    /// Semicolon-delimited history
    #[serde(default, deserialize_with = "deserialize_text")]
    transactions: Option<String>,
}

impl StoreRecord {
    /// Map into a domain record; `None` if there is no usable identity key
    fn into_record(self, defaults: &RecordDefaults) -> Option<UserRecord> {
        let identity_key = self.username.filter(|key| !key.trim().is_empty())?;

        let mut record = match self.password {
            Some(secret) => UserRecord::with_defaults(identity_key, secret, defaults),
            None => UserRecord::with_defaults(identity_key, "", defaults).without_secret(),
        };

        if let Some(name) = self.name {
            record.display_name = name;
        }
        if let Some(account_type) = self.account_type {
            record.account_type = account_type;
        }
        if let Some(number) = self.account_number {
            record.account_number = number;
        }
        if let Some(balance) = self.balance {
            record.balance = balance;
        }
        if let Some(currency) = self.currency {
            record.currency = currency;
        }
        if let Some(credit) = self.credit {
            record.credit = credit;
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(history) = self.transactions {
            record.transactions = split_transactions(&history);
        }

        Some(record)
    }
}

/// Deserialize a text field the store may send as a string, number or bool
///
/// All-digit secrets come back as JSON numbers, so they are turned into
/// their string form before anyone compares them. Arrays and objects are
/// ignored so the field falls back to its default.
fn deserialize_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<JsonValue> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(JsonValue::String(s)) => Some(s),
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        Some(JsonValue::Bool(b)) => Some(b.to_string()),
        Some(JsonValue::Null) | None => None,
        Some(other) => {
            warn!(value = %other, "Ignoring non-scalar text field");
            None
        }
    })
}

/// Deserialize an amount that can be number or string
///
/// Anything that does not parse as a decimal is ignored so the balance
/// falls back to zero.
fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<JsonValue> = Option::deserialize(deserializer)?;
    let text = match value {
        Some(JsonValue::Number(n)) => n.to_string(),
        Some(JsonValue::String(s)) => s.trim().to_string(),
        Some(JsonValue::Null) | None => return Ok(None),
        Some(other) => {
            warn!(value = %other, "Ignoring non-numeric amount");
            return Ok(None);
        }
    };
    if text.is_empty() {
        return Ok(None);
    }
    match text
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&text))
    {
        Ok(amount) => Ok(Some(amount)),
        Err(e) => {
            warn!(value = %text, error = %e, "Ignoring unreadable amount");
            Ok(None)
        }
    }
}

/// Extract the record collection from a store response body
///
/// Elements that are not objects or carry no identity key are skipped with a
/// warning rather than failing the whole collection. Unreadable optional
/// fields fall back to their defaults and keep the record.
pub fn parse_collection(
    body: &JsonValue,
    collection_field: &str,
    defaults: &RecordDefaults,
) -> Result<RecordCollection> {
    let items = body
        .get(collection_field)
        .ok_or_else(|| Error::malformed(format!("field '{}' is missing", collection_field)))?
        .as_array()
        .ok_or_else(|| {
            Error::malformed(format!("field '{}' is not an array", collection_field))
        })?;

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match StoreRecord::deserialize(item) {
            Ok(raw) => match raw.into_record(defaults) {
                Some(record) => records.push(record),
                None => warn!(index, "Skipping store record without identity key"),
            },
            Err(e) => warn!(index, error = %e, "Skipping unreadable store record"),
        }
    }

    Ok(records)
}

// =============================================================================
// HTTP Client
// =============================================================================

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default name of the collection field in the response body
pub const DEFAULT_COLLECTION_FIELD: &str = "users";

/// Record store reached over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    client: Client,
    endpoint: String,
    collection_field: String,
    defaults: RecordDefaults,
    timeout: Duration,
}

impl HttpRecordStore {
    /// Create a client for the given endpoint with default settings
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_options(
            endpoint,
            DEFAULT_COLLECTION_FIELD,
            RecordDefaults::default(),
            DEFAULT_TIMEOUT,
        )
    }

    /// Create a client from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_options(
            &config.endpoint_url,
            &config.collection_field,
            config.defaults.clone(),
            config.request_timeout(),
        )
    }

    pub fn with_options(
        endpoint: &str,
        collection_field: &str,
        defaults: RecordDefaults,
        timeout: Duration,
    ) -> Result<Self> {
        validate_endpoint(endpoint)?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            collection_field: collection_field.to_string(),
            defaults,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::transport(format!(
                "Record store timed out after {} ms",
                self.timeout.as_millis()
            ))
        } else if error.is_connect() {
            Error::transport(format!("Unable to connect to record store at {}", self.endpoint))
        } else {
            Error::transport(format!("Record store request failed: {}", error))
        }
    }

    /// Check response status and return appropriate errors
    fn check_response_status(&self, status: StatusCode) -> Result<()> {
        if status.is_success() {
            return Ok(());
        }
        match status.as_u16() {
            401 | 403 => Err(Error::transport(format!(
                "Record store refused the request (HTTP {})",
                status.as_u16()
            ))),
            429 => Err(Error::transport("Record store rate limit exceeded (HTTP 429)")),
            code => Err(Error::transport(format!("Record store error: HTTP {}", code))),
        }
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_all(&self) -> Result<RecordCollection> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        self.check_response_status(response.status())?;

        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let value: JsonValue = serde_json::from_slice(&body)
            .map_err(|e| Error::malformed(format!("Response is not valid JSON: {}", e)))?;

        let records = parse_collection(&value, &self.collection_field, &self.defaults)?;
        debug!(count = records.len(), "Fetched record collection");
        Ok(records)
    }
}
