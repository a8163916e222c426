pub mod cache;
pub mod provider;

pub use cache::CachedCredentials;
pub use provider::{AccessToken, CredentialProvider, SecretSource, SecretStoreProvider};
