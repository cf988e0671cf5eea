// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client creation from provider configuration

use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config as KConfig};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Create the client shared by all operations of a provider instance
#[instrument(skip(config), fields(path = ?config.config_path, context = ?config.config_context))]
pub async fn create_client(config: &ProviderConfig) -> Result<Client> {
    let client_config = match &config.config_path {
        Some(path) => load_kubeconfig(path, config.config_context.as_deref()).await?,
        None => {
            debug!("No kubeconfig path configured, inferring client configuration");
            KConfig::infer().await.map_err(|e| {
                ProviderError::KubeconfigError(format!("Failed to infer config: {}", e))
            })?
        }
    };

    info!("Connecting to Kubernetes API at {}", client_config.cluster_url);

    Client::try_from(client_config)
        .map_err(|e| ProviderError::KubeconfigError(format!("Failed to create client: {}", e)))
}

/// Load a client configuration from a kubeconfig file, optionally selecting a context
async fn load_kubeconfig(path: &Path, context: Option<&str>) -> Result<KConfig> {
    let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
        ProviderError::KubeconfigError(format!(
            "Failed to read kubeconfig {}: {}",
            path.display(),
            e
        ))
    })?;

    config_from_kubeconfig(kubeconfig, context).await
}

async fn config_from_kubeconfig(kubeconfig: Kubeconfig, context: Option<&str>) -> Result<KConfig> {
    let options = KubeConfigOptions {
        context: context.map(str::to_string),
        ..Default::default()
    };

    KConfig::from_custom_kubeconfig(kubeconfig, &options)
        .await
        .map_err(|e| ProviderError::KubeconfigError(format!("Failed to create config: {}", e)))
}
