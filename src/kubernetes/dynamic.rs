// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Untyped access to custom resources through `DynamicObject`

use crate::config::ProviderConfig;
use crate::error::Result;
use crate::wait::FetchError;
use kube::{
    api::{ApiResource, DeleteParams, DynamicObject, Patch, PatchParams},
    Api, Client,
};
use serde_json::Value;
use tracing::{debug, info, instrument};

/// Where a single object lives: its API resource and, when namespaced, its namespace
#[derive(Clone, Debug)]
pub struct DynamicTarget {
    pub api_resource: ApiResource,
    pub namespace: Option<String>,
}

impl DynamicTarget {
    pub fn new(api_resource: ApiResource, namespace: Option<String>) -> Self {
        Self {
            api_resource,
            namespace,
        }
    }

    pub fn api(&self, client: &Client) -> Api<DynamicObject> {
        match &self.namespace {
            Some(ns) => Api::namespaced_with(client.clone(), ns, &self.api_resource),
            None => Api::all_with(client.clone(), &self.api_resource),
        }
    }

    fn describe(&self, name: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{} {}/{}", self.api_resource.kind, ns, name),
            None => format!("{} {}", self.api_resource.kind, name),
        }
    }
}

/// Get an object, returning `None` when it does not exist
#[instrument(skip(client, target), fields(kind = %target.api_resource.kind, namespace = ?target.namespace))]
pub async fn get_object(
    client: &Client,
    target: &DynamicTarget,
    name: &str,
) -> Result<Option<DynamicObject>> {
    let object = target.api(client).get_opt(name).await?;
    if object.is_none() {
        debug!("{} not found", target.describe(name));
    }
    Ok(object)
}

/// Fetch an object as a plain JSON document for wait conditions
pub async fn fetch_document(
    client: &Client,
    target: &DynamicTarget,
    name: &str,
) -> std::result::Result<Value, FetchError> {
    let object = target
        .api(client)
        .get(name)
        .await
        .map_err(FetchError::from_kube)?;
    serde_json::to_value(&object)
        .map_err(|e| FetchError::Failed(kube::Error::SerdeError(e)))
}

/// Create or update an object with server-side apply
#[instrument(skip(client, target, object, config), fields(kind = %target.api_resource.kind, namespace = ?target.namespace))]
pub async fn apply_object(
    client: &Client,
    target: &DynamicTarget,
    name: &str,
    object: &DynamicObject,
    config: &ProviderConfig,
) -> Result<DynamicObject> {
    let mut params = PatchParams::apply(&config.field_manager);
    if config.force_conflicts {
        params = params.force();
    }

    let applied = target
        .api(client)
        .patch(name, &params, &Patch::Apply(object))
        .await?;

    info!(
        "Applied {} as field manager '{}'",
        target.describe(name),
        config.field_manager
    );
    Ok(applied)
}

/// Request deletion of an object; an object that is already gone counts as deleted
#[instrument(skip(client, target), fields(kind = %target.api_resource.kind, namespace = ?target.namespace))]
pub async fn delete_object(client: &Client, target: &DynamicTarget, name: &str) -> Result<()> {
    match target.api(client).delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            info!("Deletion of {} requested", target.describe(name));
            Ok(())
        }
        Err(kube::Error::Api(err)) if err.code == 404 => {
            debug!("{} already deleted", target.describe(name));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
