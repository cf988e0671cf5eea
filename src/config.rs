// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::constants::{env as keys, DEFAULT_FIELD_MANAGER};

/// Provider configuration, passed explicitly into every operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Kubeconfig file to load; `None` infers in-cluster or `$KUBECONFIG` settings
    pub config_path: Option<PathBuf>,
    /// Kubeconfig context to select, defaults to the current context
    pub config_context: Option<String>,
    /// Field manager name recorded on server-side apply
    pub field_manager: String,
    /// Take ownership of fields managed by other field managers on apply
    pub force_conflicts: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            config_context: None,
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            force_conflicts: false,
        }
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config_path = lookup(keys::KUBE_CONFIG_PATH)
            .filter(|p| !p.is_empty())
            .map(|p| PathBuf::from(shellexpand_home(&p, lookup(keys::HOME).as_deref())));
        let config_context = lookup(keys::KUBE_CTX).filter(|c| !c.is_empty());
        let field_manager = lookup(keys::FIELD_MANAGER)
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_FIELD_MANAGER.to_string());
        let force_conflicts = match lookup(keys::FORCE_CONFLICTS) {
            Some(v) => v.parse().with_context(|| {
                format!(
                    "{} must be 'true' or 'false', got '{}'",
                    keys::FORCE_CONFLICTS,
                    v
                )
            })?,
            None => false,
        };

        Ok(ProviderConfig {
            config_path,
            config_context,
            field_manager,
            force_conflicts,
        })
    }
}

/// Expand a leading `~/` to the user's home directory
fn shellexpand_home(path: &str, home: Option<&str>) -> String {
    match (path.strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = ProviderConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ProviderConfig::default());
        assert_eq!(config.field_manager, "Terraform");
        assert!(!config.force_conflicts);
    }

    #[test]
    fn test_reads_all_variables() {
        let config = ProviderConfig::from_lookup(lookup_from(&[
            (keys::KUBE_CONFIG_PATH, "/etc/karmada/karmada-apiserver.config"),
            (keys::KUBE_CTX, "karmada-apiserver"),
            (keys::FIELD_MANAGER, "platform-team"),
            (keys::FORCE_CONFLICTS, "true"),
        ]))
        .unwrap();

        assert_eq!(
            config.config_path,
            Some(PathBuf::from("/etc/karmada/karmada-apiserver.config"))
        );
        assert_eq!(config.config_context.as_deref(), Some("karmada-apiserver"));
        assert_eq!(config.field_manager, "platform-team");
        assert!(config.force_conflicts);
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let config = ProviderConfig::from_lookup(lookup_from(&[
            (keys::KUBE_CONFIG_PATH, ""),
            (keys::FIELD_MANAGER, ""),
        ]))
        .unwrap();

        assert_eq!(config.config_path, None);
        assert_eq!(config.field_manager, "Terraform");
    }

    #[test]
    fn test_home_is_expanded_from_lookup() {
        let config = ProviderConfig::from_lookup(lookup_from(&[
            (keys::KUBE_CONFIG_PATH, "~/.kube/karmada.config"),
            (keys::HOME, "/home/ops/"),
        ]))
        .unwrap();
        assert_eq!(
            config.config_path,
            Some(PathBuf::from("/home/ops/.kube/karmada.config"))
        );

        let config = ProviderConfig::from_lookup(lookup_from(&[(
            keys::KUBE_CONFIG_PATH,
            "~/.kube/karmada.config",
        )]))
        .unwrap();
        assert_eq!(config.config_path, Some(PathBuf::from("~/.kube/karmada.config")));
    }

    #[test]
    fn test_invalid_force_conflicts_is_rejected() {
        let err = ProviderConfig::from_lookup(lookup_from(&[(keys::FORCE_CONFLICTS, "yes")]))
            .unwrap_err();
        assert!(err.to_string().contains(keys::FORCE_CONFLICTS));
    }
}
