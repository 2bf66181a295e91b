// src/strategies/aks.rs
use async_trait::async_trait;
use secrecy::ExposeSecret;

use super::{parse_exec_credential, run_command, AKS_SERVER_ID};
use crate::auth::{AksAuthParameters, CredentialStrategy, RequestAuthParameters, StrategyError};
use crate::types::{ClusterDescriptor, Credential};

const KUBELOGIN: &str = "kubelogin";
const CLIENT_SECRET_ENV: &str = "AAD_SERVICE_PRINCIPAL_CLIENT_SECRET";

/// AKS tokens through `kubelogin get-token`.
#[derive(Debug, Default)]
pub struct AksStrategy;

impl AksStrategy {
    pub fn new() -> Self {
        Self
    }
}

type Invocation = (Vec<String>, Vec<(&'static str, String)>);

// Service principal login when a secret is configured, otherwise reuse the az CLI session.
fn kubelogin_invocation(params: &AksAuthParameters) -> Result<Invocation, StrategyError> {
    let mut args: Vec<String> = vec![
        "get-token".into(),
        "--server-id".into(),
        AKS_SERVER_ID.into(),
    ];
    let mut envs = Vec::new();

    match &params.client_secret {
        Some(secret) => {
            let client_id = params
                .client_id
                .as_ref()
                .ok_or(StrategyError::MissingParameter("clientId"))?;
            let tenant_id = params
                .tenant_id
                .as_ref()
                .ok_or(StrategyError::MissingParameter("tenantId"))?;
            args.extend([
                "--login".into(),
                "spn".into(),
                "--client-id".into(),
                client_id.clone(),
                "--tenant-id".into(),
                tenant_id.clone(),
            ]);
            envs.push((CLIENT_SECRET_ENV, secret.expose_secret().to_string()));
        }
        None => {
            args.extend(["--login".to_string(), "azurecli".to_string()]);
            if let Some(tenant_id) = &params.tenant_id {
                args.extend(["--tenant-id".into(), tenant_id.clone()]);
            }
        }
    }

    Ok((args, envs))
}

#[async_trait]
impl CredentialStrategy for AksStrategy {
    async fn get_credential(
        &self,
        cluster: &ClusterDescriptor,
        params: RequestAuthParameters,
    ) -> Result<Credential, StrategyError> {
        let RequestAuthParameters::Aks(params) = params else {
            return Err(StrategyError::UnexpectedParameters { expected: "aks" });
        };
        if let Some(hint) = &params.domain_hint {
            // kubelogin has no non-interactive use for a domain hint
            tracing::debug!(cluster = %cluster.name, domain_hint = %hint, "ignoring AKS domain hint");
        }

        let (args, envs) = kubelogin_invocation(&params)?;
        let stdout = run_command(KUBELOGIN, &args, &envs).await?;
        parse_exec_credential(KUBELOGIN, &stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn service_principal_invocation() {
        let params = AksAuthParameters {
            client_id: Some("client".to_string()),
            client_secret: Some(SecretString::from("secret")),
            tenant_id: Some("tenant".to_string()),
            domain_hint: None,
        };
        let (args, envs) = kubelogin_invocation(&params).unwrap();
        assert_eq!(
            args,
            vec![
                "get-token", "--server-id", AKS_SERVER_ID, "--login", "spn", "--client-id",
                "client", "--tenant-id", "tenant"
            ]
        );
        // the secret never appears on the command line
        assert!(!args.iter().any(|a| a == "secret"));
        assert_eq!(envs, vec![(CLIENT_SECRET_ENV, "secret".to_string())]);
    }

    #[test]
    fn azure_cli_invocation_without_secret() {
        let params = AksAuthParameters {
            tenant_id: Some("tenant".to_string()),
            ..Default::default()
        };
        let (args, envs) = kubelogin_invocation(&params).unwrap();
        assert_eq!(&args[3..], &["--login", "azurecli", "--tenant-id", "tenant"]);
        assert!(envs.is_empty());
    }

    #[test]
    fn service_principal_requires_ids() {
        let params = AksAuthParameters {
            client_secret: Some(SecretString::from("secret")),
            tenant_id: Some("tenant".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            kubelogin_invocation(&params),
            Err(StrategyError::MissingParameter("clientId"))
        ));
    }

    #[tokio::test]
    async fn rejects_foreign_parameters() {
        let err = AksStrategy::new()
            .get_credential(&ClusterDescriptor::new("c"), RequestAuthParameters::None)
            .await
            .unwrap_err();
        assert!(matches!(err, StrategyError::UnexpectedParameters { expected: "aks" }));
    }
}
