// src/permissions.rs
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const CATALOG_ENTITY_RESOURCE_TYPE: &str = "catalog-entity";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PermissionKind {
    Resource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PermissionAction {
    Read,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct PermissionAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<PermissionAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(rename = "type")]
    pub kind: PermissionKind,
    #[schema(example = "kubernetes-resources.secrets.view")]
    pub name: String,
    pub attributes: PermissionAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

impl Permission {
    fn read_entity(name: &str) -> Self {
        Self {
            kind: PermissionKind::Resource,
            name: name.to_string(),
            attributes: PermissionAttributes {
                action: Some(PermissionAction::Read),
            },
            resource_type: Some(CATALOG_ENTITY_RESOURCE_TYPE.to_string()),
        }
    }
}

/// Permissions guarding the views of the kubernetes resources plugin.
pub fn kubernetes_resources_permissions() -> Vec<Permission> {
    vec![
        Permission::read_entity("kubernetes-resources.view"),
        Permission::read_entity("kubernetes-resources.secrets.view"),
        Permission::read_entity("kubernetes-resources.events.view"),
        Permission::read_entity("kubernetes-resources.yaml.view"),
    ]
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRuleMetadata {
    pub name: String,
    pub description: String,
    pub resource_type: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PermissionMetadata {
    pub permissions: Vec<Permission>,
    pub rules: Vec<PermissionRuleMetadata>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyConditionsRequestEntry {
    pub id: String,
    pub resource_type: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyConditionsRequest {
    pub items: Vec<ApplyConditionsRequestEntry>,
}

// Decisions are only ever produced for resource types with rules, so the
// items stay opaque here.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApplyConditionsResponse {
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<serde_json::Value>,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum PermissionError {
    #[error("Unexpected resource type: {resource_type} (request {id})")]
    UnexpectedResourceType { id: String, resource_type: String },
}

/// Fixed set of permissions and the rules that conditional decisions may reference.
#[derive(Debug, Clone)]
pub struct PermissionRegistry {
    permissions: Vec<Permission>,
    rules: Vec<PermissionRuleMetadata>,
}

impl PermissionRegistry {
    pub fn new(permissions: Vec<Permission>) -> Self {
        Self {
            permissions,
            rules: Vec::new(),
        }
    }

    pub fn metadata(&self) -> PermissionMetadata {
        PermissionMetadata {
            permissions: self.permissions.clone(),
            rules: self.rules.clone(),
        }
    }

    /// Conditional decisions are only possible for resource types with registered rules.
    /// None are registered, so any item is rejected.
    pub fn apply_conditions(
        &self,
        request: &ApplyConditionsRequest,
    ) -> Result<ApplyConditionsResponse, PermissionError> {
        if let Some(entry) = request
            .items
            .iter()
            .find(|entry| !self.rules.iter().any(|r| r.resource_type == entry.resource_type))
        {
            return Err(PermissionError::UnexpectedResourceType {
                id: entry.id.clone(),
                resource_type: entry.resource_type.clone(),
            });
        }

        Ok(ApplyConditionsResponse { items: Vec::new() })
    }
}

impl Default for PermissionRegistry {
    fn default() -> Self {
        Self::new(kubernetes_resources_permissions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_lists_permissions() {
        let metadata = PermissionRegistry::default().metadata();
        let json = serde_json::to_value(&metadata).unwrap();

        assert_eq!(json["rules"], serde_json::json!([]));
        let permissions = json["permissions"].as_array().unwrap();
        assert_eq!(permissions.len(), 4);
        assert_eq!(permissions[1]["name"], "kubernetes-resources.secrets.view");
        assert_eq!(permissions[1]["type"], "resource");
        assert_eq!(permissions[1]["resourceType"], "catalog-entity");
        assert_eq!(permissions[1]["attributes"]["action"], "read");
    }

    #[test]
    fn permission_names_are_unique() {
        let permissions = kubernetes_resources_permissions();
        let mut names: Vec<_> = permissions.iter().map(|p| p.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), permissions.len());
    }

    #[test]
    fn apply_conditions_rejects_unknown_resource_types() {
        let request: ApplyConditionsRequest = serde_json::from_value(serde_json::json!({
            "items": [{
                "id": "123",
                "resourceRef": "component:default/my-service",
                "resourceType": "catalog-entity",
                "conditions": {"rule": "IS_ENTITY_OWNER", "params": {}}
            }]
        }))
        .unwrap();

        let err = PermissionRegistry::default()
            .apply_conditions(&request)
            .unwrap_err();
        assert_eq!(
            err,
            PermissionError::UnexpectedResourceType {
                id: "123".to_string(),
                resource_type: "catalog-entity".to_string()
            }
        );
        assert_eq!(
            err.to_string(),
            "Unexpected resource type: catalog-entity (request 123)"
        );
    }

    #[test]
    fn apply_conditions_accepts_empty_batch() {
        let request = ApplyConditionsRequest { items: Vec::new() };
        let response = PermissionRegistry::default()
            .apply_conditions(&request)
            .unwrap();
        assert!(response.items.is_empty());
    }
}
