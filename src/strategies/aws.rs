// src/strategies/aws.rs
use async_trait::async_trait;
use serde::Deserialize;

use super::{parse_exec_credential, run_command};
use crate::auth::{
    AwsAuthParameters, CredentialStrategy, RequestAuthParameters, StrategyError,
    AWS_CLUSTER_ID_KEY,
};
use crate::types::{ClusterDescriptor, Credential};

const AWS: &str = "aws";
const SESSION_NAME: &str = "kube-credential-resolver";

/// EKS tokens through `aws eks get-token`, assuming the role from the cluster metadata.
#[derive(Debug, Default)]
pub struct AwsIamStrategy;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleOutput {
    credentials: AssumedCredentials,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumedCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: String,
}

impl AwsIamStrategy {
    pub fn new() -> Self {
        Self
    }

    // `eks get-token` cannot pass an external id, so those roles are assumed through STS first.
    async fn assume_role(
        &self,
        params: &AwsAuthParameters,
        external_id: &str,
    ) -> Result<Vec<(&'static str, String)>, StrategyError> {
        let args = vec![
            "sts".to_string(),
            "assume-role".to_string(),
            "--role-arn".to_string(),
            params.assume_role.clone(),
            "--role-session-name".to_string(),
            SESSION_NAME.to_string(),
            "--external-id".to_string(),
            external_id.to_string(),
            "--output".to_string(),
            "json".to_string(),
        ];
        let stdout = run_command(AWS, &args, &[]).await?;
        let assumed = parse_assume_role(&stdout)?;

        Ok(vec![
            ("AWS_ACCESS_KEY_ID", assumed.access_key_id),
            ("AWS_SECRET_ACCESS_KEY", assumed.secret_access_key),
            ("AWS_SESSION_TOKEN", assumed.session_token),
        ])
    }
}

fn parse_assume_role(stdout: &str) -> Result<AssumedCredentials, StrategyError> {
    serde_json::from_str::<AssumeRoleOutput>(stdout)
        .map(|output| output.credentials)
        .map_err(|e| StrategyError::InvalidOutput {
            program: AWS.to_string(),
            message: e.to_string(),
        })
}

fn get_token_args(cluster: &ClusterDescriptor, role_arn: Option<&str>) -> Vec<String> {
    let cluster_name = cluster
        .metadata(AWS_CLUSTER_ID_KEY)
        .unwrap_or(&cluster.name)
        .to_string();

    let mut args = vec![
        "eks".to_string(),
        "get-token".to_string(),
        "--cluster-name".to_string(),
        cluster_name,
    ];
    if let Some(role_arn) = role_arn {
        args.extend(["--role-arn".to_string(), role_arn.to_string()]);
    }
    args.extend(["--output".to_string(), "json".to_string()]);
    args
}

#[async_trait]
impl CredentialStrategy for AwsIamStrategy {
    async fn get_credential(
        &self,
        cluster: &ClusterDescriptor,
        params: RequestAuthParameters,
    ) -> Result<Credential, StrategyError> {
        let RequestAuthParameters::Aws(params) = params else {
            return Err(StrategyError::UnexpectedParameters { expected: "aws" });
        };

        let (args, envs) = match &params.external_id {
            Some(external_id) => (
                get_token_args(cluster, None),
                self.assume_role(&params, external_id).await?,
            ),
            None => (
                get_token_args(cluster, Some(&params.assume_role)),
                Vec::new(),
            ),
        };

        let stdout = run_command(AWS, &args, &envs).await?;
        parse_exec_credential(AWS, &stdout)
    }
}
