use std::sync::Arc;

use credential::keys::KeyProvider;
use credential::keys::KeyProviderChain;
use credential::keys::LocalKeyProvider;
use credential::keys::StoreKeyProvider;
use credential::password::PasswordService;
use credential::store::CacheStore;
use credential::token::RevocationRegistry;
use credential::token::TokenKind;
use credential::token::TokenService;

use crate::config::Config;
use crate::outbound::cache::RedisCacheStore;

/// Fully wired credential stack; the complete surface consumed by the
/// interface layer.
pub struct CredentialServices<C: CacheStore> {
    pub passwords: PasswordService,
    pub tokens: TokenService<KeyProviderChain, C>,
}

/// Assemble the credential stack on top of `store`.
///
/// Key lookups go to the shared store first and degrade to an in-process
/// tier; revocation checks use the store directly with no fallback. Missing
/// signing keys are seeded into the store here so every instance signs and
/// verifies against the same material; if the store is down the seed is
/// skipped and the local tier takes over, at the documented risk of
/// split-brain keys across instances.
pub async fn build<C: CacheStore>(
    store: Arc<C>,
    config: &Config,
) -> Result<CredentialServices<C>, anyhow::Error> {
    let passwords = PasswordService::new(config.password.policy(), config.password.hashing())?;

    let store_tier = Arc::new(StoreKeyProvider::new(Arc::clone(&store)));
    for kind in TokenKind::ALL {
        if let Err(e) = store_tier.ensure_key(kind).await {
            tracing::warn!(
                kind = %kind,
                error = %e,
                "Shared store unavailable; signing keys degrade to the local tier"
            );
        }
    }

    let tiers: Vec<Arc<dyn KeyProvider>> = vec![
        store_tier,
        Arc::new(LocalKeyProvider::with_history(config.tokens.key_history)),
    ];
    let keys = Arc::new(KeyProviderChain::new(tiers));

    let revocations = RevocationRegistry::new(store);
    let tokens = TokenService::new(config.tokens.durations(), keys, revocations);

    Ok(CredentialServices { passwords, tokens })
}

/// Production composition root: connect to Redis and assemble the stack.
pub async fn connect(config: &Config) -> Result<CredentialServices<RedisCacheStore>, anyhow::Error> {
    let store = Arc::new(RedisCacheStore::connect(&config.redis).await?);
    build(store, config).await
}
