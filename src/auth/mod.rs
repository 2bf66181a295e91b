// src/auth/mod.rs
mod error;
mod params;
mod provider;
mod resolver;
mod strategy;

pub use error::{ConfigurationError, ResolveError, StrategyError};
pub use params::{
    default_extractor, AksAuthParameters, AwsAuthParameters, GoogleAuthParameters,
    ParameterExtractor, RequestAuthParameters, AWS_CLUSTER_ID_KEY, SERVICE_ACCOUNT_TOKEN_KEY,
};
#[cfg(test)]
pub use params::{OidcAuthParameters, AWS_ASSUME_ROLE_KEY};
pub use provider::ProviderIdentifier;
pub use resolver::CredentialResolver;
pub use strategy::CredentialStrategy;
