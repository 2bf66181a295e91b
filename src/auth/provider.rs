// src/auth/provider.rs
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ProviderIdentifier {
    #[serde(rename = "aks")]
    Aks,
    #[serde(rename = "aws")]
    Aws,
    #[serde(rename = "azure")]
    Azure,
    #[serde(rename = "google")]
    Google,
    #[serde(rename = "googleServiceAccount")]
    GoogleServiceAccount,
    #[serde(rename = "oidc")]
    Oidc,
    #[serde(rename = "serviceAccount")]
    ServiceAccount,
}

impl ProviderIdentifier {
    pub const ALL: [ProviderIdentifier; 7] = [
        ProviderIdentifier::Aks,
        ProviderIdentifier::Aws,
        ProviderIdentifier::Azure,
        ProviderIdentifier::Google,
        ProviderIdentifier::GoogleServiceAccount,
        ProviderIdentifier::Oidc,
        ProviderIdentifier::ServiceAccount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderIdentifier::Aks => "aks",
            ProviderIdentifier::Aws => "aws",
            ProviderIdentifier::Azure => "azure",
            ProviderIdentifier::Google => "google",
            ProviderIdentifier::GoogleServiceAccount => "googleServiceAccount",
            ProviderIdentifier::Oidc => "oidc",
            ProviderIdentifier::ServiceAccount => "serviceAccount",
        }
    }
}

impl fmt::Display for ProviderIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown authentication provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderIdentifier {
    type Err = UnknownProvider;

    // Exact, case-sensitive match only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderIdentifier::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_known_provider() {
        for provider in ProviderIdentifier::ALL {
            assert_eq!(provider.as_str().parse::<ProviderIdentifier>(), Ok(provider));
        }
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!("AKS".parse::<ProviderIdentifier>().is_err());
        assert!("serviceaccount".parse::<ProviderIdentifier>().is_err());
        assert!(" aws".parse::<ProviderIdentifier>().is_err());
        assert_eq!(
            "unknown-provider".parse::<ProviderIdentifier>(),
            Err(UnknownProvider("unknown-provider".to_string()))
        );
    }

    #[test]
    fn serializes_as_identifier() {
        let json = serde_json::to_string(&ProviderIdentifier::GoogleServiceAccount).unwrap();
        assert_eq!(json, "\"googleServiceAccount\"");
    }
}
