// src/strategies/google.rs
use async_trait::async_trait;
use secrecy::ExposeSecret;

use super::{parse_plain_token, run_command};
use crate::auth::{CredentialStrategy, GoogleAuthParameters, RequestAuthParameters, StrategyError};
use crate::types::{ClusterDescriptor, Credential};

const GCLOUD: &str = "gcloud";

/// User tokens from `gcloud auth print-access-token`, using the configured OAuth client.
#[derive(Debug, Default)]
pub struct GoogleStrategy;

/// Application default credentials from `gcloud auth application-default print-access-token`.
#[derive(Debug, Default)]
pub struct GoogleServiceAccountStrategy;

impl GoogleStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl GoogleServiceAccountStrategy {
    pub fn new() -> Self {
        Self
    }
}

fn oauth_client_env(
    params: &GoogleAuthParameters,
) -> Result<Vec<(&'static str, String)>, StrategyError> {
    let client_id = params
        .client_id
        .as_ref()
        .ok_or(StrategyError::MissingParameter("clientId"))?;
    let client_secret = params
        .client_secret
        .as_ref()
        .ok_or(StrategyError::MissingParameter("clientSecret"))?;

    Ok(vec![
        ("CLOUDSDK_AUTH_CLIENT_ID", client_id.clone()),
        (
            "CLOUDSDK_AUTH_CLIENT_SECRET",
            client_secret.expose_secret().to_string(),
        ),
    ])
}

#[async_trait]
impl CredentialStrategy for GoogleStrategy {
    async fn get_credential(
        &self,
        _cluster: &ClusterDescriptor,
        params: RequestAuthParameters,
    ) -> Result<Credential, StrategyError> {
        let RequestAuthParameters::Google(params) = params else {
            return Err(StrategyError::UnexpectedParameters { expected: "google" });
        };
        let envs = oauth_client_env(&params)?;

        let args = vec!["auth".to_string(), "print-access-token".to_string()];
        let stdout = run_command(GCLOUD, &args, &envs).await?;
        // gcloud does not report the expiry
        Ok(Credential::bearer(parse_plain_token(GCLOUD, &stdout)?, None))
    }
}

#[async_trait]
impl CredentialStrategy for GoogleServiceAccountStrategy {
    async fn get_credential(
        &self,
        _cluster: &ClusterDescriptor,
        _params: RequestAuthParameters,
    ) -> Result<Credential, StrategyError> {
        let args = vec![
            "auth".to_string(),
            "application-default".to_string(),
            "print-access-token".to_string(),
        ];
        let stdout = run_command(GCLOUD, &args, &[]).await?;
        Ok(Credential::bearer(parse_plain_token(GCLOUD, &stdout)?, None))
    }
}
