use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "masterrota";

/// ChurchSuite passwords kept in the OS keychain, keyed by `username@account`.
pub struct CredentialStore;

impl CredentialStore {
    fn entry(account: &str, username: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &Self::key(account, username))
            .context("Failed to create keyring entry")
    }

    fn key(account: &str, username: &str) -> String {
        format!("{}@{}", username, account)
    }

    /// Store the password for a ChurchSuite login in the OS keychain
    pub fn store(account: &str, username: &str, password: &str) -> Result<()> {
        Self::entry(account, username)?
            .set_password(password)
            .context("Failed to store password in keychain")?;
        Ok(())
    }

    /// Retrieve the password for a ChurchSuite login from the OS keychain
    pub fn get_password(account: &str, username: &str) -> Result<String> {
        Self::entry(account, username)?
            .get_password()
            .with_context(|| {
                format!(
                    "No password for {} in keychain (run `masterrota store-password`)",
                    Self::key(account, username)
                )
            })
    }
}
