// src/strategies/mod.rs
//
// Built-in credential strategies. Token exchange is left to the vendor CLIs;
// these only assemble the invocation and read back the result.
mod aks;
mod aws;
mod azure;
mod google;
mod oidc;
mod service_account;

pub use aks::AksStrategy;
pub use aws::AwsIamStrategy;
pub use azure::AzureIdentityStrategy;
pub use google::{GoogleServiceAccountStrategy, GoogleStrategy};
pub use oidc::OidcStrategy;
pub use service_account::ServiceAccountStrategy;

use tokio::process::Command;

use crate::auth::StrategyError;
use crate::types::{Credential, ExecCredential};

/// Application id of the AKS AAD server, the audience for AKS tokens.
pub(crate) const AKS_SERVER_ID: &str = "6dae42f8-4368-4678-94ff-3960e28e3630";

/// Runs `program` and returns its stdout. Non-zero exits carry stderr back to the caller.
pub(crate) async fn run_command(
    program: &str,
    args: &[String],
    envs: &[(&str, String)],
) -> Result<String, StrategyError> {
    let output = Command::new(program)
        .args(args)
        .envs(envs.iter().map(|(k, v)| (*k, v.as_str())))
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| StrategyError::Io {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(StrategyError::CommandFailed {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    String::from_utf8(output.stdout).map_err(|e| StrategyError::InvalidOutput {
        program: program.to_string(),
        message: e.to_string(),
    })
}

/// Turns kubectl exec plugin output into a credential.
pub(crate) fn parse_exec_credential(program: &str, stdout: &str) -> Result<Credential, StrategyError> {
    let invalid = |message: String| StrategyError::InvalidOutput {
        program: program.to_string(),
        message,
    };

    let exec: ExecCredential = serde_json::from_str(stdout).map_err(|e| invalid(e.to_string()))?;
    let status = exec
        .status
        .ok_or_else(|| invalid("ExecCredential has no status".to_string()))?;

    match (status.token, status.client_certificate_data, status.client_key_data) {
        (Some(token), _, _) if !token.is_empty() => {
            Ok(Credential::bearer(token, status.expiration_timestamp))
        }
        (_, Some(cert), Some(key)) => Ok(Credential::ClientCertificate { cert, key }),
        _ => Err(invalid(
            "ExecCredential status carries neither a token nor a client certificate".to_string(),
        )),
    }
}

/// Trims plain token output such as `gcloud auth print-access-token`.
pub(crate) fn parse_plain_token(program: &str, stdout: &str) -> Result<String, StrategyError> {
    let token = stdout.trim();
    if token.is_empty() {
        return Err(StrategyError::InvalidOutput {
            program: program.to_string(),
            message: "empty token".to_string(),
        });
    }
    Ok(token.to_string())
}
