// src/strategies/azure.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::Deserialize;

use super::{run_command, AKS_SERVER_ID};
use crate::auth::{CredentialStrategy, RequestAuthParameters, StrategyError};
use crate::types::{ClusterDescriptor, Credential};
use crate::utils::logging::Logger;

const AZ: &str = "az";

/// Azure AD tokens for the signed-in identity through `az account get-access-token`.
pub struct AzureIdentityStrategy {
    program: String,
    logger: Arc<dyn Logger>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessTokenOutput {
    access_token: String,
    // Local time, older CLI versions only emit this one
    expires_on: Option<String>,
    #[serde(rename = "expires_on")]
    expires_on_epoch: Option<i64>,
}

impl AzureIdentityStrategy {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            program: AZ.to_string(),
            logger,
        }
    }

    #[cfg(test)]
    fn with_program(program: &str, logger: Arc<dyn Logger>) -> Self {
        Self {
            program: program.to_string(),
            logger,
        }
    }
}

fn parse_access_token(stdout: &str) -> Result<Credential, StrategyError> {
    let output: AccessTokenOutput =
        serde_json::from_str(stdout).map_err(|e| StrategyError::InvalidOutput {
            program: AZ.to_string(),
            message: e.to_string(),
        })?;

    let expires_at = match (output.expires_on_epoch, output.expires_on.as_deref()) {
        (Some(epoch), _) => DateTime::<Utc>::from_timestamp(epoch, 0),
        (None, Some(local)) => NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M:%S%.f")
            .ok()
            .and_then(|naive| naive.and_local_timezone(Local).single())
            .map(|dt| dt.with_timezone(&Utc)),
        (None, None) => None,
    };

    Ok(Credential::bearer(output.access_token, expires_at))
}

#[async_trait]
impl CredentialStrategy for AzureIdentityStrategy {
    async fn get_credential(
        &self,
        _cluster: &ClusterDescriptor,
        _params: RequestAuthParameters,
    ) -> Result<Credential, StrategyError> {
        self.logger.log("Fetching Azure access token");
        let args: Vec<String> = [
            "account",
            "get-access-token",
            "--resource",
            AKS_SERVER_ID,
            "--output",
            "json",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let stdout = run_command(&self.program, &args, &[]).await?;
        let credential = parse_access_token(&stdout)?;

        match credential.expires_at() {
            Some(at) => self
                .logger
                .debug_log(&format!("Azure access token expires at {}", at.to_rfc3339())),
            None => self
                .logger
                .debug_log("Azure access token has no expiry information"),
        }
        Ok(credential)
    }
}
