// src/strategies/oidc.rs
use async_trait::async_trait;

use crate::auth::{CredentialStrategy, RequestAuthParameters, StrategyError};
use crate::types::{ClusterDescriptor, Credential};

const TOKEN_ENV_PREFIX: &str = "KUBERNETES_OIDC_TOKEN_";

/// Bearer tokens issued out of band by a named OIDC token provider and
/// handed over through `KUBERNETES_OIDC_TOKEN_<PROVIDER>`.
#[derive(Debug, Default)]
pub struct OidcStrategy;

impl OidcStrategy {
    pub fn new() -> Self {
        Self
    }
}

/// `my-provider` -> `KUBERNETES_OIDC_TOKEN_MY_PROVIDER`
pub(crate) fn token_env_var(provider: &str) -> String {
    let suffix: String = provider
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{}{}", TOKEN_ENV_PREFIX, suffix)
}

#[async_trait]
impl CredentialStrategy for OidcStrategy {
    async fn get_credential(
        &self,
        _cluster: &ClusterDescriptor,
        params: RequestAuthParameters,
    ) -> Result<Credential, StrategyError> {
        let RequestAuthParameters::Oidc(params) = params else {
            return Err(StrategyError::UnexpectedParameters { expected: "oidc" });
        };
        let provider = params
            .oidc_token_provider
            .filter(|p| !p.is_empty())
            .ok_or(StrategyError::MissingParameter("oidcTokenProvider"))?;

        let var = token_env_var(&provider);
        match std::env::var(&var) {
            Ok(token) if !token.trim().is_empty() => Ok(Credential::bearer(token.trim(), None)),
            _ => Err(StrategyError::TokenUnavailable(format!(
                "no token for OIDC provider {} in {}",
                provider, var
            ))),
        }
    }
}
