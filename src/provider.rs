// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Provider instance: one client and configuration shared by all operations

use kube::Client;
use tracing::info;

use crate::config::ProviderConfig;
use crate::error::Result;
use crate::kubernetes::create_client;
use crate::resources::{catalog, find_kind, DataSource, ResourceEngine};

pub struct Provider {
    client: Client,
    config: ProviderConfig,
}

impl Provider {
    pub fn new(client: Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }

    /// Create the Kubernetes client described by `config`
    pub async fn connect(config: ProviderConfig) -> Result<Self> {
        let client = create_client(&config).await?;
        info!(
            "Provider configured: field_manager={}, force_conflicts={}",
            config.field_manager, config.force_conflicts
        );
        Ok(Self::new(client, config))
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn resource(&self, type_name: &str) -> Result<ResourceEngine<'_>> {
        let kind = find_kind(type_name)?;
        Ok(ResourceEngine::new(&self.client, &self.config, kind))
    }

    pub fn data_source(&self, type_name: &str) -> Result<DataSource<'_>> {
        let kind = find_kind(type_name)?;
        Ok(DataSource::new(&self.client, kind))
    }

    /// Type names of all resources and data sources
    pub fn resource_types() -> impl Iterator<Item = &'static str> {
        catalog().iter().map(|k| k.type_name)
    }
}
