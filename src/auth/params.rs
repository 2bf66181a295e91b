// src/auth/params.rs
use secrecy::SecretString;

use super::{ConfigurationError, ProviderIdentifier};
use crate::config::{ConfigError, ConfigSection, ConfigTree};
use crate::types::ClusterDescriptor;

pub const AWS_ASSUME_ROLE_KEY: &str = "kubernetes.io/aws-assume-role";
pub const AWS_EXTERNAL_ID_KEY: &str = "kubernetes.io/aws-external-id";
pub const AWS_CLUSTER_ID_KEY: &str = "kubernetes.io/x-k8s-aws-id";
pub const SERVICE_ACCOUNT_TOKEN_KEY: &str = "serviceAccountToken";

const AUTH_SECTION: &str = "auth";
const ENVIRONMENT_KEY: &str = "environment";

// Every field is optional here; the strategy decides what it cannot do without.
#[derive(Debug, Default)]
pub struct AksAuthParameters {
    pub client_id: Option<String>,
    pub client_secret: Option<SecretString>,
    pub tenant_id: Option<String>,
    pub domain_hint: Option<String>,
}

#[derive(Debug, Default)]
pub struct GoogleAuthParameters {
    pub client_id: Option<String>,
    pub client_secret: Option<SecretString>,
}

#[derive(Debug, Default)]
pub struct OidcAuthParameters {
    pub oidc_token_provider: Option<String>,
}

#[derive(Debug)]
pub struct AwsAuthParameters {
    pub assume_role: String,
    pub external_id: Option<String>,
}

/// Per-call input for a strategy, built fresh from config or cluster metadata.
#[derive(Debug)]
pub enum RequestAuthParameters {
    None,
    Aks(AksAuthParameters),
    Aws(AwsAuthParameters),
    Google(GoogleAuthParameters),
    Oidc(OidcAuthParameters),
}

pub type ParameterExtractor = fn(
    ProviderIdentifier,
    &ClusterDescriptor,
    &ConfigTree,
) -> Result<RequestAuthParameters, ConfigurationError>;

pub fn default_extractor(provider: ProviderIdentifier) -> ParameterExtractor {
    match provider {
        ProviderIdentifier::Aks => aks_parameters,
        ProviderIdentifier::Aws => aws_parameters,
        ProviderIdentifier::Google => google_parameters,
        ProviderIdentifier::Oidc => oidc_parameters,
        ProviderIdentifier::Azure
        | ProviderIdentifier::GoogleServiceAccount
        | ProviderIdentifier::ServiceAccount => no_parameters,
    }
}

fn invalid(provider: ProviderIdentifier) -> impl Fn(ConfigError) -> ConfigurationError {
    move |source| ConfigurationError::Invalid { provider, source }
}

/// Resolves `auth.<provider>.<auth.environment>`, failing on the first missing level.
fn environment_section(
    provider: ProviderIdentifier,
    config: &ConfigTree,
) -> Result<ConfigSection<'_>, ConfigurationError> {
    let auth = config
        .get_optional_config(AUTH_SECTION)
        .map_err(invalid(provider))?
        .ok_or(ConfigurationError::MissingEnvironment { provider })?;

    let environment = auth
        .get_optional_string(ENVIRONMENT_KEY)
        .map_err(invalid(provider))?
        .filter(|env| !env.is_empty())
        .ok_or(ConfigurationError::MissingEnvironment { provider })?;

    let provider_section = auth
        .get_optional_config(provider.as_str())
        .map_err(invalid(provider))?;
    let section = match provider_section {
        Some(section) => section
            .get_optional_config(&environment)
            .map_err(invalid(provider))?,
        None => None,
    };

    section.ok_or(ConfigurationError::MissingSection {
        provider,
        environment,
    })
}

fn optional_secret(
    section: &ConfigSection<'_>,
    key: &str,
    provider: ProviderIdentifier,
) -> Result<Option<SecretString>, ConfigurationError> {
    Ok(section
        .get_optional_string(key)
        .map_err(invalid(provider))?
        .map(SecretString::from))
}

pub fn aks_parameters(
    provider: ProviderIdentifier,
    _cluster: &ClusterDescriptor,
    config: &ConfigTree,
) -> Result<RequestAuthParameters, ConfigurationError> {
    let section = environment_section(provider, config)?;
    let read = |key: &str| section.get_optional_string(key).map_err(invalid(provider));

    Ok(RequestAuthParameters::Aks(AksAuthParameters {
        client_id: read("clientId")?,
        client_secret: optional_secret(&section, "clientSecret", provider)?,
        tenant_id: read("tenantId")?,
        domain_hint: read("domainHint")?,
    }))
}

pub fn google_parameters(
    provider: ProviderIdentifier,
    _cluster: &ClusterDescriptor,
    config: &ConfigTree,
) -> Result<RequestAuthParameters, ConfigurationError> {
    let section = environment_section(provider, config)?;

    Ok(RequestAuthParameters::Google(GoogleAuthParameters {
        client_id: section
            .get_optional_string("clientId")
            .map_err(invalid(provider))?,
        client_secret: optional_secret(&section, "clientSecret", provider)?,
    }))
}

pub fn oidc_parameters(
    provider: ProviderIdentifier,
    _cluster: &ClusterDescriptor,
    config: &ConfigTree,
) -> Result<RequestAuthParameters, ConfigurationError> {
    let section = environment_section(provider, config)?;

    Ok(RequestAuthParameters::Oidc(OidcAuthParameters {
        oidc_token_provider: section
            .get_optional_string("oidcTokenProvider")
            .map_err(invalid(provider))?,
    }))
}

pub fn aws_parameters(
    provider: ProviderIdentifier,
    cluster: &ClusterDescriptor,
    _config: &ConfigTree,
) -> Result<RequestAuthParameters, ConfigurationError> {
    let assume_role = cluster.metadata(AWS_ASSUME_ROLE_KEY).ok_or_else(|| {
        ConfigurationError::MissingClusterMetadata {
            provider,
            cluster: cluster.name.clone(),
            key: AWS_ASSUME_ROLE_KEY,
        }
    })?;

    Ok(RequestAuthParameters::Aws(AwsAuthParameters {
        assume_role: assume_role.to_string(),
        external_id: cluster.metadata(AWS_EXTERNAL_ID_KEY).map(str::to_string),
    }))
}

pub fn no_parameters(
    _provider: ProviderIdentifier,
    _cluster: &ClusterDescriptor,
    _config: &ConfigTree,
) -> Result<RequestAuthParameters, ConfigurationError> {
    Ok(RequestAuthParameters::None)
}
