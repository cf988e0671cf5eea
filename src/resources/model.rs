// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Terraform-facing state of a managed object and its wait settings

use kube::api::DynamicObject;
use kube::ResourceExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;

use super::catalog::ResourceKind;
use super::id::ResourceId;
use crate::constants::wait::{POLL_INTERVAL_SECS, TIMEOUT_SECS};
use crate::error::Result;
use crate::jsonpath::FieldPath;
use crate::wait::{Condition, WaitSpec};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ResourceModel {
    /// `namespace/name` or `name`, set once the object exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    /// Fields to wait for after create and update
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wait_for: Vec<WaitForField>,
    /// How long delete waits for the object to disappear
    #[serde(default)]
    pub delete_wait: WaitSettings,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,
}

/// Wait until `jsonpath` resolves to `value`, or to anything non-empty without one
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WaitForField {
    pub jsonpath: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaitSettings {
    /// Seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

fn default_timeout() -> u64 {
    TIMEOUT_SECS
}

fn default_poll_interval() -> u64 {
    POLL_INTERVAL_SECS
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            timeout: TIMEOUT_SECS,
            poll_interval: POLL_INTERVAL_SECS,
        }
    }
}

impl WaitSettings {
    pub fn deletion_spec(&self) -> WaitSpec {
        WaitSpec::new(
            Condition::ResourceAbsent,
            Duration::from_secs(self.timeout),
            Duration::from_secs(self.poll_interval),
        )
    }
}

impl WaitForField {
    pub fn to_wait_spec(&self) -> Result<WaitSpec> {
        Ok(WaitSpec::new(
            Condition::FieldEquals {
                path: FieldPath::parse(&self.jsonpath)?,
                expected: self.value.clone(),
            },
            Duration::from_secs(self.timeout),
            Duration::from_secs(self.poll_interval),
        ))
    }
}

impl ResourceModel {
    /// Build the object sent to the API server for server-side apply
    pub fn to_dynamic_object(&self, kind: &ResourceKind, id: &ResourceId) -> DynamicObject {
        let mut object = DynamicObject::new(&id.name, &kind.api_resource)
            .data(json!({ "spec": self.spec }));
        object.metadata.namespace = id.namespace.clone();
        if !self.metadata.labels.is_empty() {
            object.metadata.labels = Some(self.metadata.labels.clone());
        }
        if !self.metadata.annotations.is_empty() {
            object.metadata.annotations = Some(self.metadata.annotations.clone());
        }
        object
    }

    /// Build state from an object read back from the API server, keeping the
    /// wait settings of `prior` since the server knows nothing about them
    pub fn from_object(object: &DynamicObject, prior: Option<&ResourceModel>) -> Self {
        let id = ResourceId {
            namespace: object.namespace(),
            name: object.name_any(),
        };

        ResourceModel {
            id: Some(id.to_string()),
            metadata: Metadata {
                name: id.name,
                namespace: id.namespace,
                labels: object.labels().clone(),
                annotations: object.annotations().clone(),
                uid: object.metadata.uid.clone(),
                resource_version: object.metadata.resource_version.clone(),
                generation: object.metadata.generation,
            },
            spec: object.data.get("spec").cloned().unwrap_or(Value::Null),
            status: object.data.get("status").cloned(),
            wait_for: prior.map(|p| p.wait_for.clone()).unwrap_or_default(),
            delete_wait: prior.map(|p| p.delete_wait).unwrap_or_default(),
        }
    }
}
