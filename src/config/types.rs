// config/types.rs
use serde_json::Value;
use std::{fs, io, path::Path};

use crate::types::ClusterDescriptor;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Load { path: String, source: io::Error },
    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },
    #[error("invalid type at '{key}', expected {expected}")]
    WrongType { key: String, expected: &'static str },
}

/// Hierarchical configuration loaded from a YAML or JSON document.
#[derive(Debug, Clone)]
pub struct ConfigTree {
    root: Value,
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::new(Value::Object(Default::default()))
    }
}

impl ConfigTree {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let root: Value = serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        // An empty document parses as null
        Ok(if root.is_null() {
            Self::default()
        } else {
            Self::new(root)
        })
    }

    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let expanded = shellexpand::tilde(path).to_string();
        let contents = fs::read_to_string(&expanded).map_err(|source| ConfigError::Load {
            path: expanded.clone(),
            source,
        })?;

        let is_json = Path::new(&expanded)
            .extension()
            .map_or(false, |ext| ext == "json");
        if is_json {
            let root = serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: expanded.clone(),
                message: e.to_string(),
            })?;
            Ok(Self::new(root))
        } else {
            Self::from_yaml_str(&contents).map_err(|e| match e {
                ConfigError::Parse { message, .. } => ConfigError::Parse {
                    path: expanded.clone(),
                    message,
                },
                other => other,
            })
        }
    }

    pub fn root(&self) -> ConfigSection<'_> {
        ConfigSection {
            prefix: String::new(),
            value: &self.root,
        }
    }

    pub fn get_optional_config(&self, key: &str) -> Result<Option<ConfigSection<'_>>, ConfigError> {
        self.root().get_optional_config(key)
    }

    /// Clusters declared under `kubernetes.clusters`.
    pub fn clusters(&self) -> Result<Vec<ClusterDescriptor>, ConfigError> {
        let Some(value) = self.root().lookup("kubernetes.clusters")? else {
            return Ok(Vec::new());
        };
        serde_json::from_value(value.clone()).map_err(|e| ConfigError::Parse {
            path: "kubernetes.clusters".to_string(),
            message: e.to_string(),
        })
    }

    pub fn find_cluster(&self, name: &str) -> Result<Option<ClusterDescriptor>, ConfigError> {
        Ok(self.clusters()?.into_iter().find(|c| c.name == name))
    }
}

/// Borrowed view of a section of a [`ConfigTree`].
#[derive(Debug, Clone)]
pub struct ConfigSection<'a> {
    prefix: String,
    value: &'a Value,
}

impl<'a> ConfigSection<'a> {
    fn full_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        }
    }

    // Walks a dotted key one segment at a time; a non-object in the middle is a type error.
    fn lookup(&self, key: &str) -> Result<Option<&'a Value>, ConfigError> {
        let mut current = self.value;
        let mut walked = self.prefix.clone();
        for segment in key.split('.') {
            let Value::Object(map) = current else {
                return Err(ConfigError::WrongType {
                    key: walked,
                    expected: "object",
                });
            };
            match map.get(segment) {
                Some(Value::Null) | None => return Ok(None),
                Some(next) => current = next,
            }
            if walked.is_empty() {
                walked = segment.to_string();
            } else {
                walked = format!("{}.{}", walked, segment);
            }
        }
        Ok(Some(current))
    }

    pub fn get_optional_config(&self, key: &str) -> Result<Option<ConfigSection<'a>>, ConfigError> {
        match self.lookup(key)? {
            None => Ok(None),
            Some(value @ Value::Object(_)) => Ok(Some(ConfigSection {
                prefix: self.full_key(key),
                value,
            })),
            Some(_) => Err(ConfigError::WrongType {
                key: self.full_key(key),
                expected: "object",
            }),
        }
    }

    pub fn get_optional_string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        match self.lookup(key)? {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(ConfigError::WrongType {
                key: self.full_key(key),
                expected: "string",
            }),
        }
    }
}
