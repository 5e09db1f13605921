//! Credential verification against a fetched record collection
//!
//! Secrets are compared as plain strings. This reproduces the store's
//! existing contract and is not a credential-protection scheme.

use crate::domain::{Credentials, UserRecord};

/// Find the first record matching the submitted credentials
///
/// The submitted identity key and secret are trimmed; the stored secret has
/// already been coerced to its string form when the collection was parsed.
/// Records without a stored secret never match.
pub fn verify(records: &[UserRecord], credentials: &Credentials) -> Option<UserRecord> {
    let identity_key = credentials.identity_key().trim();
    let secret = credentials.secret().trim();

    records
        .iter()
        .find(|record| record.identity_key == identity_key && record.secret() == Some(secret))
        .cloned()
}

/// First record with exactly this identity key
pub fn find_by_identity<'a>(records: &'a [UserRecord], identity_key: &str) -> Option<&'a UserRecord> {
    records
        .iter()
        .find(|record| record.identity_key == identity_key)
}
