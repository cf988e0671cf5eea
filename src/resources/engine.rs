// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Generic create/read/update/delete/import for every catalog resource

use kube::Client;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::catalog::ResourceKind;
use super::id::ResourceId;
use super::model::ResourceModel;
use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::kubernetes::{apply_object, delete_object, fetch_document, get_object, DynamicTarget};
use crate::wait::{wait_until, WaitOutcome, WaitSpec};

pub struct ResourceEngine<'a> {
    client: &'a Client,
    config: &'a ProviderConfig,
    kind: &'a ResourceKind,
}

impl<'a> ResourceEngine<'a> {
    pub fn new(client: &'a Client, config: &'a ProviderConfig, kind: &'a ResourceKind) -> Self {
        Self {
            client,
            config,
            kind,
        }
    }

    pub fn kind(&self) -> &ResourceKind {
        self.kind
    }

    /// Create the object described by `plan`; fails if it already exists
    #[instrument(skip_all, fields(kind = self.kind.type_name, name = %plan.metadata.name))]
    pub async fn create(
        &self,
        plan: &ResourceModel,
        cancel: &CancellationToken,
    ) -> Result<ResourceModel> {
        let id = ResourceId::for_metadata(self.kind, &plan.metadata)?;
        let waits = self.prepare(plan)?;
        let target = self.kind.target(id.namespace.as_deref());

        if get_object(self.client, &target, &id.name).await?.is_some() {
            return Err(ProviderError::AlreadyExists(format!(
                "{} {}",
                self.kind.api_resource.kind, id
            )));
        }

        info!("Creating {} {}", self.kind.api_resource.kind, id);
        self.apply_and_wait(plan, &id, &target, &waits, cancel)
            .await
    }

    /// Refresh `state` from the cluster; `None` means the object is gone
    #[instrument(skip_all, fields(kind = self.kind.type_name, name = %state.metadata.name))]
    pub async fn read(&self, state: &ResourceModel) -> Result<Option<ResourceModel>> {
        let id = ResourceId::for_metadata(self.kind, &state.metadata)?;
        let target = self.kind.target(id.namespace.as_deref());

        let object = get_object(self.client, &target, &id.name).await?;
        if object.is_none() {
            warn!(
                "{} {} no longer exists, removing it from state",
                self.kind.api_resource.kind, id
            );
        }
        Ok(object.map(|o| ResourceModel::from_object(&o, Some(state))))
    }

    /// Apply the changes from `state` to `plan`
    #[instrument(skip_all, fields(kind = self.kind.type_name, name = %plan.metadata.name))]
    pub async fn update(
        &self,
        state: &ResourceModel,
        plan: &ResourceModel,
        cancel: &CancellationToken,
    ) -> Result<ResourceModel> {
        let current = ResourceId::for_metadata(self.kind, &state.metadata)?;
        let id = ResourceId::for_metadata(self.kind, &plan.metadata)?;
        if current.name != id.name {
            return Err(ProviderError::ImmutableField("metadata.name".to_string()));
        }
        if current.namespace != id.namespace {
            return Err(ProviderError::ImmutableField("metadata.namespace".to_string()));
        }

        let waits = self.prepare(plan)?;
        let target = self.kind.target(id.namespace.as_deref());

        info!("Updating {} {}", self.kind.api_resource.kind, id);
        self.apply_and_wait(plan, &id, &target, &waits, cancel)
            .await
    }

    /// Delete the object and wait until the API server no longer returns it
    #[instrument(skip_all, fields(kind = self.kind.type_name, name = %state.metadata.name))]
    pub async fn delete(&self, state: &ResourceModel, cancel: &CancellationToken) -> Result<()> {
        let id = ResourceId::for_metadata(self.kind, &state.metadata)?;
        let target = self.kind.target(id.namespace.as_deref());

        delete_object(self.client, &target, &id.name).await?;

        let spec = state.delete_wait.deletion_spec();
        match self.wait(&spec, &target, &id, cancel).await? {
            WaitOutcome::Satisfied => info!("Deleted {} {}", self.kind.api_resource.kind, id),
            WaitOutcome::NotSatisfied => info!(
                "Deletion of {} {} requested, not waiting for completion",
                self.kind.api_resource.kind, id
            ),
        }
        Ok(())
    }

    /// Adopt an existing object into state by its import id
    #[instrument(skip(self), fields(kind = self.kind.type_name))]
    pub async fn import(&self, import_id: &str) -> Result<ResourceModel> {
        let id = ResourceId::parse_import(self.kind, import_id)?;
        let target = self.kind.target(id.namespace.as_deref());

        let object = get_object(self.client, &target, &id.name)
            .await?
            .ok_or_else(|| {
                ProviderError::NotFound(format!("{} {}", self.kind.api_resource.kind, id))
            })?;

        info!("Imported {} {}", self.kind.api_resource.kind, id);
        Ok(ResourceModel::from_object(&object, None))
    }

    /// Validate the planned spec and wait settings before touching the cluster
    fn prepare(&self, plan: &ResourceModel) -> Result<Vec<WaitSpec>> {
        self.kind.validate_spec(&plan.spec)?;
        plan.wait_for
            .iter()
            .map(|field| field.to_wait_spec())
            .collect()
    }

    async fn apply_and_wait(
        &self,
        plan: &ResourceModel,
        id: &ResourceId,
        target: &DynamicTarget,
        waits: &[WaitSpec],
        cancel: &CancellationToken,
    ) -> Result<ResourceModel> {
        let object = plan.to_dynamic_object(self.kind, id);
        apply_object(self.client, target, &id.name, &object, self.config).await?;

        // Waits run one after another, each with its own timeout
        for spec in waits {
            if self.wait(spec, target, id, cancel).await? == WaitOutcome::NotSatisfied {
                debug!("{} not reached yet, continuing without waiting", spec.condition);
            }
        }

        get_object(self.client, target, &id.name)
            .await?
            .map(|o| ResourceModel::from_object(&o, Some(plan)))
            .ok_or_else(|| {
                ProviderError::NotFound(format!(
                    "{} {} disappeared after apply",
                    self.kind.api_resource.kind, id
                ))
            })
    }

    async fn wait(
        &self,
        spec: &WaitSpec,
        target: &DynamicTarget,
        id: &ResourceId,
        cancel: &CancellationToken,
    ) -> Result<WaitOutcome> {
        wait_until(spec, cancel, || fetch_document(self.client, target, &id.name)).await
    }
}
