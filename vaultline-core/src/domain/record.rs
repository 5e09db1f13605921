//! User record domain model

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A user's account record as held by the record store
///
/// The stored secret travels with the record so that credentials can be
/// checked against it, but it is never serialized or printed.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    /// Unique, stable login handle
    pub identity_key: String,
    #[serde(skip_serializing)]
    secret: Option<String>,
    pub display_name: String,
    /// Account classification (e.g. "Checking", "Premium")
    pub account_type: String,
    pub account_number: String,
    pub balance: Decimal,
    /// ISO 4217 currency code paired with `balance`
    pub currency: String,
    pub credit: String,
    pub status: String,
    /// Transaction descriptions, in store order
    pub transactions: Vec<String>,
}

/// An ordered record set from a single fetch
pub type RecordCollection = Vec<UserRecord>;

impl UserRecord {
    /// Create a record with every optional field at its fallback value
    pub fn new(identity_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::with_defaults(identity_key, secret, &RecordDefaults::default())
    }

    /// Create a record using the given fallbacks for absent fields
    pub fn with_defaults(
        identity_key: impl Into<String>,
        secret: impl Into<String>,
        defaults: &RecordDefaults,
    ) -> Self {
        let identity_key = identity_key.into();
        Self {
            display_name: identity_key.clone(),
            identity_key,
            secret: Some(secret.into()),
            account_type: defaults.account_type.clone(),
            account_number: String::new(),
            balance: Decimal::ZERO,
            currency: defaults.currency.clone(),
            credit: defaults.credit.clone(),
            status: defaults.status.clone(),
            transactions: Vec::new(),
        }
    }

    /// The stored secret, already coerced to a string
    ///
    /// `None` when the store holds no secret for this record; such a
    /// record can be refreshed but never logged into.
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    pub fn without_secret(mut self) -> Self {
        self.secret = None;
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_account_type(mut self, account_type: impl Into<String>) -> Self {
        self.account_type = account_type.into();
        self
    }

    pub fn with_account_number(mut self, number: impl Into<String>) -> Self {
        self.account_number = number.into();
        self
    }

    pub fn with_balance(mut self, balance: Decimal, currency: impl Into<String>) -> Self {
        self.balance = balance;
        self.currency = currency.into();
        self
    }

    pub fn with_credit(mut self, credit: impl Into<String>) -> Self {
        self.credit = credit.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_transactions<I, S>(mut self, transactions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transactions = transactions.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("identity_key", &self.identity_key)
            .field("secret", &"<redacted>")
            .field("display_name", &self.display_name)
            .field("account_type", &self.account_type)
            .field("account_number", &self.account_number)
            .field("balance", &self.balance)
            .field("currency", &self.currency)
            .field("credit", &self.credit)
            .field("status", &self.status)
            .field("transactions", &self.transactions)
            .finish()
    }
}

/// Split a semicolon-delimited history string into trimmed, non-empty entries
pub fn split_transactions(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

/// Fallback values for fields the store leaves out
///
/// Whether "700" and "Active" are business defaults or placeholder data is
/// unknown, so they are configuration rather than constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDefaults {
    #[serde(default = "default_credit")]
    pub credit: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_account_type")]
    pub account_type: String,
}

fn default_credit() -> String {
    "700".to_string()
}

fn default_status() -> String {
    "Active".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_account_type() -> String {
    "Standard".to_string()
}

impl Default for RecordDefaults {
    fn default() -> Self {
        Self {
            credit: default_credit(),
            status: default_status(),
            currency: default_currency(),
            account_type: default_account_type(),
        }
    }
}

/// A single login attempt's identity key and secret
///
/// Never stored beyond the verification call.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    identity_key: String,
    secret: String,
}

impl Credentials {
    pub fn new(identity_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity_key: identity_key.into(),
            secret: secret.into(),
        }
    }

    pub fn identity_key(&self) -> &str {
        &self.identity_key
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity_key", &self.identity_key)
            .field("secret", &"<redacted>")
            .finish()
    }
}
