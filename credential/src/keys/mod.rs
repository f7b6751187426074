pub mod chain;
pub mod local;
pub mod provider;
pub mod store;

pub use chain::KeyProviderChain;
pub use local::LocalKeyProvider;
pub use provider::KeyProvider;
pub use provider::KeyProviderError;
pub use provider::SigningKey;
pub use store::StoreKeyProvider;
