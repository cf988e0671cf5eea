// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource identifiers and import-id parsing

use std::fmt;

use super::catalog::ResourceKind;
use super::model::Metadata;
use crate::constants::DEFAULT_NAMESPACE;
use crate::error::{ProviderError, Result};

/// Identifies one object: `namespace/name` for namespaced kinds, `name` otherwise
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceId {
    pub namespace: Option<String>,
    pub name: String,
}

impl ResourceId {
    /// Parse a user-supplied import id for `kind`
    pub fn parse_import(kind: &ResourceKind, id: &str) -> Result<Self> {
        let invalid = |reason: &str| ProviderError::InvalidImportId {
            id: id.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = id.trim().split('/').collect();
        match (kind.namespaced, parts.as_slice()) {
            (_, [name]) if name.is_empty() => Err(invalid("name must not be empty")),
            (true, [name]) => Ok(ResourceId {
                namespace: Some(DEFAULT_NAMESPACE.to_string()),
                name: name.to_string(),
            }),
            (true, [namespace, name]) if namespace.is_empty() || name.is_empty() => {
                Err(invalid("expected 'namespace/name' with both parts set"))
            }
            (true, [namespace, name]) => Ok(ResourceId {
                namespace: Some(namespace.to_string()),
                name: name.to_string(),
            }),
            (true, _) => Err(invalid("expected 'namespace/name' or 'name'")),
            (false, [name]) => Ok(ResourceId {
                namespace: None,
                name: name.to_string(),
            }),
            (false, _) => Err(invalid(&format!(
                "{} is cluster-scoped, expected 'name'",
                kind.api_resource.kind
            ))),
        }
    }

    /// Derive the id of the object described by `metadata`
    pub fn for_metadata(kind: &ResourceKind, metadata: &Metadata) -> Result<Self> {
        if metadata.name.is_empty() {
            return Err(ProviderError::InvalidSpec {
                kind: kind.api_resource.kind.clone(),
                message: "metadata.name must not be empty".to_string(),
            });
        }

        let namespace = match (kind.namespaced, &metadata.namespace) {
            (true, Some(ns)) if !ns.is_empty() => Some(ns.clone()),
            (true, _) => Some(DEFAULT_NAMESPACE.to_string()),
            (false, None) => None,
            (false, Some(_)) => {
                return Err(ProviderError::InvalidSpec {
                    kind: kind.api_resource.kind.clone(),
                    message: "cluster-scoped resources do not take metadata.namespace"
                        .to_string(),
                })
            }
        };

        Ok(ResourceId {
            namespace,
            name: metadata.name.clone(),
        })
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}", ns, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}
