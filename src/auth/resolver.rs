// src/auth/resolver.rs
use std::collections::HashMap;
use std::sync::Arc;

use super::{
    default_extractor, CredentialStrategy, ParameterExtractor, ProviderIdentifier, ResolveError,
};
use crate::config::ConfigTree;
use crate::strategies::{
    AksStrategy, AwsIamStrategy, AzureIdentityStrategy, GoogleServiceAccountStrategy,
    GoogleStrategy, OidcStrategy, ServiceAccountStrategy,
};
use crate::types::{ClusterDescriptor, Credential};
use crate::utils::logging::Logger;

struct ProviderEntry {
    extract: ParameterExtractor,
    strategy: Arc<dyn CredentialStrategy>,
}

/// Maps provider identifiers to a parameter extractor and the strategy that
/// issues the credential. Holds no per-call state.
#[derive(Default)]
pub struct CredentialResolver {
    providers: HashMap<ProviderIdentifier, ProviderEntry>,
}

impl CredentialResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_strategies(logger: Arc<dyn Logger>) -> Self {
        let mut resolver = Self::new();
        resolver.register_strategy(ProviderIdentifier::Aks, Arc::new(AksStrategy::new()));
        resolver.register_strategy(ProviderIdentifier::Aws, Arc::new(AwsIamStrategy::new()));
        resolver.register_strategy(
            ProviderIdentifier::Azure,
            Arc::new(AzureIdentityStrategy::new(logger)),
        );
        resolver.register_strategy(ProviderIdentifier::Google, Arc::new(GoogleStrategy::new()));
        resolver.register_strategy(
            ProviderIdentifier::GoogleServiceAccount,
            Arc::new(GoogleServiceAccountStrategy::new()),
        );
        resolver.register_strategy(ProviderIdentifier::Oidc, Arc::new(OidcStrategy::new()));
        resolver.register_strategy(
            ProviderIdentifier::ServiceAccount,
            Arc::new(ServiceAccountStrategy::new()),
        );
        resolver
    }

    /// Adds or replaces the entry for `provider`.
    pub fn register(
        &mut self,
        provider: ProviderIdentifier,
        extract: ParameterExtractor,
        strategy: Arc<dyn CredentialStrategy>,
    ) {
        self.providers
            .insert(provider, ProviderEntry { extract, strategy });
    }

    pub fn register_strategy(
        &mut self,
        provider: ProviderIdentifier,
        strategy: Arc<dyn CredentialStrategy>,
    ) {
        self.register(provider, default_extractor(provider), strategy);
    }

    pub fn providers(&self) -> Vec<ProviderIdentifier> {
        let mut providers: Vec<_> = self.providers.keys().copied().collect();
        providers.sort();
        providers
    }

    pub async fn resolve(
        &self,
        cluster: &ClusterDescriptor,
        provider: &str,
        config: &ConfigTree,
    ) -> Result<Credential, ResolveError> {
        let provider: ProviderIdentifier =
            provider
                .parse()
                .map_err(|_| ResolveError::UnsupportedProvider {
                    provider: provider.to_string(),
                })?;
        self.resolve_provider(cluster, provider, config).await
    }

    pub async fn resolve_provider(
        &self,
        cluster: &ClusterDescriptor,
        provider: ProviderIdentifier,
        config: &ConfigTree,
    ) -> Result<Credential, ResolveError> {
        let entry =
            self.providers
                .get(&provider)
                .ok_or_else(|| ResolveError::UnsupportedProvider {
                    provider: provider.to_string(),
                })?;

        let params = (entry.extract)(provider, cluster, config)?;
        tracing::debug!(cluster = %cluster.name, %provider, "invoking credential strategy");

        let credential = entry.strategy.get_credential(cluster, params).await?;
        Ok(credential)
    }
}
