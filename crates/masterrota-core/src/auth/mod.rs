//! Credential handling for the ChurchSuite login.
//!
//! `CredentialStore` keeps the password in the OS keychain so it does not
//! have to live in the config file.

pub mod credentials;

pub use credentials::CredentialStore;
