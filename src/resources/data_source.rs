// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Read-only lookups of existing objects

use kube::Client;
use tracing::instrument;

use super::catalog::ResourceKind;
use super::id::ResourceId;
use super::model::ResourceModel;
use crate::error::{ProviderError, Result};
use crate::kubernetes::get_object;

pub struct DataSource<'a> {
    client: &'a Client,
    kind: &'a ResourceKind,
}

impl<'a> DataSource<'a> {
    pub fn new(client: &'a Client, kind: &'a ResourceKind) -> Self {
        Self { client, kind }
    }

    /// Look up an object by `namespace/name` (or `name` for cluster-scoped kinds)
    #[instrument(skip(self), fields(kind = self.kind.type_name))]
    pub async fn read(&self, id: &str) -> Result<ResourceModel> {
        let id = ResourceId::parse_import(self.kind, id)?;
        let target = self.kind.target(id.namespace.as_deref());

        get_object(self.client, &target, &id.name)
            .await?
            .map(|o| ResourceModel::from_object(&o, None))
            .ok_or_else(|| {
                ProviderError::NotFound(format!("{} {}", self.kind.api_resource.kind, id))
            })
    }
}
