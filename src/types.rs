// types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

pub const EXEC_CREDENTIAL_API_VERSION: &str = "client.authentication.k8s.io/v1";
pub const EXEC_CREDENTIAL_KIND: &str = "ExecCredential";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_provider: Option<String>,
    #[serde(default)]
    pub auth_metadata: BTreeMap<String, String>,
}

// Builders for descriptors that do not come from `kubernetes.clusters`
#[cfg(test)]
impl ClusterDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.auth_metadata.insert(key.to_string(), value.to_string());
        self
    }
}

impl ClusterDescriptor {
    /// Metadata value for `key`, treating blank values as absent.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.auth_metadata
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

#[derive(Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Credential {
    #[serde(rename = "bearer token")]
    BearerToken {
        token: String,
        #[serde(rename = "expiresAt", skip_serializing_if = "Option::is_none")]
        expires_at: Option<DateTime<Utc>>,
    },
    #[serde(rename = "x509 client certificate")]
    ClientCertificate { cert: String, key: String },
    #[serde(rename = "anonymous")]
    Anonymous,
}

impl Credential {
    pub fn bearer(token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Credential::BearerToken {
            token: token.into(),
            expires_at,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Credential::BearerToken { expires_at, .. } => *expires_at,
            _ => None,
        }
    }

    // Credentials without a known expiry are treated as still valid.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map_or(false, |at| at <= now)
    }

    pub fn to_exec_credential(&self) -> ExecCredential {
        let status = match self {
            Credential::BearerToken { token, expires_at } => ExecCredentialStatus {
                token: Some(token.clone()),
                expiration_timestamp: *expires_at,
                ..Default::default()
            },
            Credential::ClientCertificate { cert, key } => ExecCredentialStatus {
                client_certificate_data: Some(cert.clone()),
                client_key_data: Some(key.clone()),
                ..Default::default()
            },
            Credential::Anonymous => ExecCredentialStatus::default(),
        };

        ExecCredential {
            api_version: EXEC_CREDENTIAL_API_VERSION.to_string(),
            kind: EXEC_CREDENTIAL_KIND.to_string(),
            status: Some(status),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::BearerToken { expires_at, .. } => f
                .debug_struct("BearerToken")
                .field("token", &"[REDACTED]")
                .field("expires_at", expires_at)
                .finish(),
            Credential::ClientCertificate { cert, .. } => f
                .debug_struct("ClientCertificate")
                .field("cert", cert)
                .field("key", &"[REDACTED]")
                .finish(),
            Credential::Anonymous => write!(f, "Anonymous"),
        }
    }
}

// Output format of kubectl exec credential plugins (kubelogin, aws eks get-token).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecCredential {
    pub api_version: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ExecCredentialStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecCredentialStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_certificate_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_key_data: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn cluster_descriptor_from_yaml() {
        let yaml = r#"
name: prod-eks
url: https://eks.example.com
authProvider: aws
authMetadata:
  kubernetes.io/aws-assume-role: arn:aws:iam::123456789012:role/reader
"#;
        let cluster: ClusterDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cluster.name, "prod-eks");
        assert_eq!(cluster.auth_provider.as_deref(), Some("aws"));
        assert_eq!(
            cluster.metadata("kubernetes.io/aws-assume-role"),
            Some("arn:aws:iam::123456789012:role/reader")
        );
        assert_eq!(cluster.url.unwrap().host_str(), Some("eks.example.com"));
    }

    #[test]
    fn cluster_descriptor_rejects_invalid_url() {
        let yaml = "name: broken\nurl: not a url\n";
        assert!(serde_yaml::from_str::<ClusterDescriptor>(yaml).is_err());
    }

    #[test]
    fn blank_metadata_is_absent() {
        let cluster = ClusterDescriptor::new("c").with_metadata("k", "  ");
        assert_eq!(cluster.metadata("k"), None);
    }

    #[test]
    fn debug_redacts_secrets() {
        let token = Credential::bearer("super-secret", None);
        assert!(!format!("{:?}", token).contains("super-secret"));

        let cert = Credential::ClientCertificate {
            cert: "CERT".to_string(),
            key: "private-key".to_string(),
        };
        let debug = format!("{:?}", cert);
        assert!(debug.contains("CERT"));
        assert!(!debug.contains("private-key"));
    }

    #[test]
    fn expiry_checks() {
        let now = Utc::now();
        assert!(Credential::bearer("t", Some(now - Duration::seconds(1))).is_expired(now));
        assert!(!Credential::bearer("t", Some(now + Duration::minutes(5))).is_expired(now));
        assert!(!Credential::bearer("t", None).is_expired(now));
        assert!(!Credential::Anonymous.is_expired(now));
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(Credential::bearer("abc", None)).unwrap();
        assert_eq!(json["type"], "bearer token");
        assert_eq!(json["token"], "abc");
        assert!(json.get("expiresAt").is_none());

        let json = serde_json::to_value(Credential::Anonymous).unwrap();
        assert_eq!(json["type"], "anonymous");
    }

    #[test]
    fn exec_credential_document() {
        let exec = Credential::bearer("abc", None).to_exec_credential();
        let json = serde_json::to_value(&exec).unwrap();
        assert_eq!(json["apiVersion"], EXEC_CREDENTIAL_API_VERSION);
        assert_eq!(json["kind"], "ExecCredential");
        assert_eq!(json["status"]["token"], "abc");
        assert!(json["status"].get("clientKeyData").is_none());
    }
}
