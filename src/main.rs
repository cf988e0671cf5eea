// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use karmada_provider::config::ProviderConfig;
use karmada_provider::diagnostics::Diagnostic;
use karmada_provider::error::ProviderError;
use karmada_provider::provider::Provider;
use karmada_provider::resources::{find_kind, ResourceModel};

#[derive(Parser, Debug)]
#[command(version, about = "Manage Karmada policies and quotas as Terraform-style resources")]
struct Cli {
    /// Kubeconfig of the Karmada API server (overrides KUBE_CONFIG_PATH)
    #[arg(long, global = true)]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use (overrides KUBE_CTX)
    #[arg(long, global = true)]
    context: Option<String>,

    /// Field manager for server-side apply (overrides KARMADA_FIELD_MANAGER)
    #[arg(long, global = true)]
    field_manager: Option<String>,

    /// Take over fields owned by other field managers
    #[arg(long, global = true)]
    force_conflicts: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the supported resource and data source types
    Resources,
    /// Print the CustomResourceDefinition behind a resource type
    Schema { type_name: String },
    /// Create or update the resource described in a manifest file
    Apply { file: PathBuf },
    /// Refresh the resource described in a manifest file
    Refresh { file: PathBuf },
    /// Delete the resource described in a manifest file
    Delete { file: PathBuf },
    /// Import an existing object into a state document
    Import { type_name: String, id: String },
    /// Read an object as a data source
    Read { type_name: String, id: String },
}

/// A manifest file: the resource type plus its model
#[derive(Serialize, Deserialize, Debug)]
struct ResourceBlock {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(flatten)]
    model: ResourceModel,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ProviderError>() {
                Some(provider_err) => eprintln!("{}", Diagnostic::from(provider_err)),
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Resources => {
            for type_name in Provider::resource_types() {
                println!("{}", type_name);
            }
            return Ok(());
        }
        Command::Schema { type_name } => {
            let crd = find_kind(type_name)?.crd();
            print!("{}", serde_yaml::to_string(&crd)?);
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(&cli)?;
    let provider = Provider::connect(config).await?;
    info!("Using field manager '{}'", provider.config().field_manager);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling pending waits");
            on_interrupt.cancel();
        }
    });

    match cli.command {
        Command::Apply { file } => {
            let block = load_block(&file)?;
            let engine = provider.resource(&block.type_name)?;
            let state = match engine.read(&block.model).await? {
                Some(current) => engine.update(&current, &block.model, &cancel).await?,
                None => engine.create(&block.model, &cancel).await?,
            };
            print_block(&block.type_name, state)?;
        }
        Command::Refresh { file } => {
            let block = load_block(&file)?;
            let engine = provider.resource(&block.type_name)?;
            match engine.read(&block.model).await? {
                Some(state) => print_block(&block.type_name, state)?,
                None => eprintln!(
                    "{}",
                    Diagnostic::warning(
                        "Resource no longer exists",
                        format!(
                            "{} '{}' was deleted outside of this provider",
                            block.type_name, block.model.metadata.name
                        ),
                    )
                ),
            }
        }
        Command::Delete { file } => {
            let block = load_block(&file)?;
            provider
                .resource(&block.type_name)?
                .delete(&block.model, &cancel)
                .await?;
        }
        Command::Import { type_name, id } => {
            let state = provider.resource(&type_name)?.import(&id).await?;
            print_block(&type_name, state)?;
        }
        Command::Read { type_name, id } => {
            let state = provider.data_source(&type_name)?.read(&id).await?;
            print_block(&type_name, state)?;
        }
        Command::Resources | Command::Schema { .. } => unreachable!("handled before connecting"),
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<ProviderConfig> {
    let mut config = ProviderConfig::from_env()?;
    if let Some(path) = &cli.kubeconfig {
        config.config_path = Some(path.clone());
    }
    if let Some(context) = &cli.context {
        config.config_context = Some(context.clone());
    }
    if let Some(field_manager) = &cli.field_manager {
        config.field_manager = field_manager.clone();
    }
    config.force_conflicts |= cli.force_conflicts;
    Ok(config)
}

fn load_block(path: &Path) -> Result<ResourceBlock> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("Invalid manifest {}", path.display()))
}

fn print_block(type_name: &str, model: ResourceModel) -> Result<()> {
    let block = ResourceBlock {
        type_name: type_name.to_string(),
        model,
    };
    print!("{}", serde_yaml::to_string(&block)?);
    Ok(())
}
