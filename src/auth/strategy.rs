// src/auth/strategy.rs
use async_trait::async_trait;

use super::{RequestAuthParameters, StrategyError};
use crate::types::{ClusterDescriptor, Credential};

/// Issues credentials for one authentication provider.
///
/// Parameters are moved in and dropped once the call returns, so secrets
/// never outlive the request. Implementations may block on network or child
/// processes and own any retry policy.
#[async_trait]
pub trait CredentialStrategy: Send + Sync {
    async fn get_credential(
        &self,
        cluster: &ClusterDescriptor,
        params: RequestAuthParameters,
    ) -> Result<Credential, StrategyError>;
}
