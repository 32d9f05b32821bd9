//! Graph access tokens in the OS keychain.
//!
//! One entry per profile, keyed `graph.access_token.{profile}`. Keyring calls
//! run on the blocking pool since some platform backends prompt the user.

use keyring::Entry;
use thiserror::Error;

/// Errors that can occur during keychain operations.
#[derive(Debug, Error)]
pub enum KeychainError {
    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("No token stored for profile '{0}'")]
    NotFound(String),

    #[error("Keychain task failed: {0}")]
    TaskFailed(String),
}

/// Result type for keychain operations.
pub type Result<T> = std::result::Result<T, KeychainError>;

/// Stores, reads and removes per-profile Graph tokens.
#[derive(Debug, Clone, Default)]
pub struct KeychainAccess;

impl KeychainAccess {
    /// Keychain service all tokens are stored under.
    pub const SERVICE: &'static str = "io.topfive.cli";

    pub fn new() -> Self {
        Self
    }

    /// Keychain key for a profile's Graph access token.
    pub fn graph_access_token_key(profile: &str) -> String {
        format!("graph.access_token.{}", profile)
    }

    /// Saves the token for `profile`, replacing any previous one.
    pub async fn store_token(&self, profile: &str, token: &str) -> Result<()> {
        let token = token.to_string();
        with_entry(profile, move |entry| Ok(entry.set_password(&token)?)).await
    }

    /// Returns the token for `profile`, if one is stored.
    pub async fn token(&self, profile: &str) -> Result<Option<String>> {
        with_entry(profile, |entry| match entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        })
        .await
    }

    /// Removes the token for `profile`. Errors if none is stored.
    pub async fn delete_token(&self, profile: &str) -> Result<()> {
        let name = profile.to_string();
        with_entry(profile, move |entry| match entry.delete_credential() {
            Err(keyring::Error::NoEntry) => Err(KeychainError::NotFound(name)),
            other => Ok(other?),
        })
        .await
    }
}

/// Opens the profile's entry and runs `f` on the blocking pool.
async fn with_entry<T, F>(profile: &str, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&Entry) -> Result<T> + Send + 'static,
{
    let key = KeychainAccess::graph_access_token_key(profile);
    tokio::task::spawn_blocking(move || f(&Entry::new(KeychainAccess::SERVICE, &key)?))
        .await
        .map_err(|e| KeychainError::TaskFailed(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_access_token_key_format() {
        assert_eq!(
            KeychainAccess::graph_access_token_key("work"),
            "graph.access_token.work"
        );
    }

    #[test]
    fn not_found_names_the_profile() {
        let err = KeychainError::NotFound("work".to_string());
        assert_eq!(err.to_string(), "No token stored for profile 'work'");
    }

    // Touches the real keychain, so it needs OS permissions.
    // Run with: cargo test --features keychain-integration-tests -- --ignored
    #[cfg(feature = "keychain-integration-tests")]
    mod integration {
        use super::*;

        #[tokio::test]
        #[ignore = "requires OS keychain access"]
        async fn store_read_delete_cycle() {
            let keychain = KeychainAccess::new();
            let profile = "topfive-keychain-test";

            keychain.store_token(profile, "token-value").await.unwrap();
            assert_eq!(
                keychain.token(profile).await.unwrap(),
                Some("token-value".to_string())
            );

            keychain.delete_token(profile).await.unwrap();
            assert_eq!(keychain.token(profile).await.unwrap(), None);
            assert!(matches!(
                keychain.delete_token(profile).await,
                Err(KeychainError::NotFound(_))
            ));
        }
    }
}
