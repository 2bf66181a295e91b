// src/auth/error.rs
use std::io;

use super::ProviderIdentifier;
use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("missing environment configuration (auth.environment) for {provider} authentication")]
    MissingEnvironment { provider: ProviderIdentifier },
    #[error("missing request authentication configuration for {provider} in environment: {environment}")]
    MissingSection {
        provider: ProviderIdentifier,
        environment: String,
    },
    #[error("role identifier not found in cluster metadata: {key} is required for {provider} authentication of cluster {cluster}")]
    MissingClusterMetadata {
        provider: ProviderIdentifier,
        cluster: String,
        key: &'static str,
    },
    #[error("invalid {provider} authentication configuration: {source}")]
    Invalid {
        provider: ProviderIdentifier,
        #[source]
        source: ConfigError,
    },
}

/// Failure reported by a credential strategy. Passed through the resolver untouched.
#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    #[error("required parameter {0} is not configured")]
    MissingParameter(&'static str),
    #[error("strategy expected {expected} parameters")]
    UnexpectedParameters { expected: &'static str },
    #[error("failed to run {program}: {source}")]
    Io { program: String, source: io::Error },
    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("unexpected output from {program}: {message}")]
    InvalidOutput { program: String, message: String },
    #[error("failed to read token file {path}: {source}")]
    TokenFile { path: String, source: io::Error },
    #[error("token unavailable: {0}")]
    TokenUnavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("unsupported authentication provider: {provider}")]
    UnsupportedProvider { provider: String },
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Strategy(#[from] StrategyError),
}
