// src/strategies/service_account.rs
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::auth::{
    CredentialStrategy, RequestAuthParameters, StrategyError, SERVICE_ACCOUNT_TOKEN_KEY,
};
use crate::types::{ClusterDescriptor, Credential};

const IN_CLUSTER_TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// Static service account token from cluster metadata, falling back to the
/// projected in-cluster token and then to anonymous access.
#[derive(Debug)]
pub struct ServiceAccountStrategy {
    token_path: PathBuf,
}

impl ServiceAccountStrategy {
    pub fn new() -> Self {
        Self::with_token_path(IN_CLUSTER_TOKEN_PATH)
    }

    pub fn with_token_path(path: impl Into<PathBuf>) -> Self {
        Self {
            token_path: path.into(),
        }
    }
}

impl Default for ServiceAccountStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStrategy for ServiceAccountStrategy {
    async fn get_credential(
        &self,
        cluster: &ClusterDescriptor,
        _params: RequestAuthParameters,
    ) -> Result<Credential, StrategyError> {
        if let Some(token) = cluster.metadata(SERVICE_ACCOUNT_TOKEN_KEY) {
            return Ok(Credential::bearer(token, None));
        }

        match tokio::fs::read_to_string(&self.token_path).await {
            Ok(token) if !token.trim().is_empty() => Ok(Credential::bearer(token.trim(), None)),
            Ok(_) => Err(StrategyError::TokenUnavailable(format!(
                "service account token file {} is empty",
                self.token_path.display()
            ))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Credential::Anonymous),
            Err(source) => Err(StrategyError::TokenFile {
                path: self.token_path.display().to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn token_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn metadata_token_wins() {
        let file = token_file("from-file");
        let strategy = ServiceAccountStrategy::with_token_path(file.path());
        let cluster = ClusterDescriptor::new("c").with_metadata(SERVICE_ACCOUNT_TOKEN_KEY, "meta");
        let credential = strategy
            .get_credential(&cluster, RequestAuthParameters::None)
            .await
            .unwrap();
        assert_eq!(credential, Credential::bearer("meta", None));
    }

    #[tokio::test]
    async fn reads_in_cluster_token_file() {
        let file = token_file("file-token\n");

        let credential = ServiceAccountStrategy::with_token_path(file.path())
            .get_credential(&ClusterDescriptor::new("c"), RequestAuthParameters::None)
            .await
            .unwrap();
        assert_eq!(credential, Credential::bearer("file-token", None));
    }

    #[tokio::test]
    async fn anonymous_outside_a_cluster() {
        let dir = tempfile::tempdir().unwrap();
        let credential = ServiceAccountStrategy::with_token_path(dir.path().join("token"))
            .get_credential(&ClusterDescriptor::new("c"), RequestAuthParameters::None)
            .await
            .unwrap();
        assert_eq!(credential, Credential::Anonymous);
    }

    #[tokio::test]
    async fn empty_token_file_is_an_error() {
        let file = token_file("  ");

        let err = ServiceAccountStrategy::with_token_path(file.path())
            .get_credential(&ClusterDescriptor::new("c"), RequestAuthParameters::None)
            .await
            .unwrap_err();
        assert!(matches!(err, StrategyError::TokenUnavailable(_)));
    }
}
