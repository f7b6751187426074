pub mod entropy;
pub mod errors;
pub mod policy;
pub mod service;

pub use entropy::EntropySource;
pub use entropy::OsEntropy;
pub use errors::PasswordError;
pub use policy::HashingConfig;
pub use policy::PasswordPolicy;
pub use service::PasswordService;
