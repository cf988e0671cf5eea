// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Descriptors of the resource types the provider serves

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::ApiResource;
use kube::core::object::HasSpec;
use kube::{CustomResourceExt, Resource};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::OnceLock;

use crate::error::{ProviderError, Result};
use crate::kubernetes::DynamicTarget;
use crate::types::{
    ClusterOverridePolicy, ClusterPropagationPolicy, FederatedResourceQuota, OverridePolicy,
    PropagationPolicy,
};

/// A custom resource exposed as a Terraform resource and data source
pub trait ProviderResource: Resource<DynamicType = ()> + CustomResourceExt + HasSpec {
    const TYPE_NAME: &'static str;
}

impl ProviderResource for PropagationPolicy {
    const TYPE_NAME: &'static str = "karmada_propagation_policy_v1alpha1";
}

impl ProviderResource for ClusterPropagationPolicy {
    const TYPE_NAME: &'static str = "karmada_cluster_propagation_policy_v1alpha1";
}

impl ProviderResource for OverridePolicy {
    const TYPE_NAME: &'static str = "karmada_override_policy_v1alpha1";
}

impl ProviderResource for ClusterOverridePolicy {
    const TYPE_NAME: &'static str = "karmada_cluster_override_policy_v1alpha1";
}

impl ProviderResource for FederatedResourceQuota {
    const TYPE_NAME: &'static str = "karmada_federated_resource_quota_v1alpha1";
}

/// Everything the generic engine needs to know about one resource type
#[derive(Clone, Debug)]
pub struct ResourceKind {
    pub type_name: &'static str,
    pub api_resource: ApiResource,
    pub namespaced: bool,
    validate_spec: fn(&Value) -> std::result::Result<(), serde_json::Error>,
    crd: fn() -> CustomResourceDefinition,
}

impl ResourceKind {
    pub fn of<K>() -> Self
    where
        K: ProviderResource,
        <K as HasSpec>::Spec: DeserializeOwned,
    {
        Self {
            type_name: K::TYPE_NAME,
            api_resource: ApiResource::erase::<K>(&()),
            namespaced: K::crd().spec.scope == "Namespaced",
            validate_spec: deserializes_as::<<K as HasSpec>::Spec>,
            crd: <K as CustomResourceExt>::crd,
        }
    }

    /// Check that `spec` matches the typed model of this resource
    pub fn validate_spec(&self, spec: &Value) -> Result<()> {
        (self.validate_spec)(spec).map_err(|e| ProviderError::InvalidSpec {
            kind: self.api_resource.kind.clone(),
            message: e.to_string(),
        })
    }

    /// The CustomResourceDefinition describing this resource's schema
    pub fn crd(&self) -> CustomResourceDefinition {
        (self.crd)()
    }

    pub fn target(&self, namespace: Option<&str>) -> DynamicTarget {
        DynamicTarget::new(self.api_resource.clone(), namespace.map(str::to_string))
    }
}

fn deserializes_as<S: DeserializeOwned>(spec: &Value) -> std::result::Result<(), serde_json::Error> {
    S::deserialize(spec).map(|_| ())
}

/// All resource types served by the provider
pub fn catalog() -> &'static [ResourceKind] {
    static CATALOG: OnceLock<Vec<ResourceKind>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        vec![
            ResourceKind::of::<PropagationPolicy>(),
            ResourceKind::of::<ClusterPropagationPolicy>(),
            ResourceKind::of::<OverridePolicy>(),
            ResourceKind::of::<ClusterOverridePolicy>(),
            ResourceKind::of::<FederatedResourceQuota>(),
        ]
    })
}

pub fn find_kind(type_name: &str) -> Result<&'static ResourceKind> {
    catalog()
        .iter()
        .find(|k| k.type_name == type_name)
        .ok_or_else(|| ProviderError::UnknownResourceType(type_name.to_string()))
}
