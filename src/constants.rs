// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Field manager used for server-side apply unless configured otherwise
pub const DEFAULT_FIELD_MANAGER: &str = "Terraform";

/// Namespace assumed for namespaced resources imported by bare name
pub const DEFAULT_NAMESPACE: &str = "default";

/// Environment variables read by `ProviderConfig::from_env`
pub mod env {
    pub const KUBE_CONFIG_PATH: &str = "KUBE_CONFIG_PATH";
    pub const KUBE_CTX: &str = "KUBE_CTX";
    pub const FIELD_MANAGER: &str = "KARMADA_FIELD_MANAGER";
    pub const FORCE_CONFLICTS: &str = "KARMADA_FORCE_CONFLICTS";
    pub const HOME: &str = "HOME";
}

/// Wait polling configuration
pub mod wait {
    use std::time::Duration;

    /// Default wait timeout in seconds
    pub const TIMEOUT_SECS: u64 = 30;
    /// Default delay between two polls in seconds
    pub const POLL_INTERVAL_SECS: u64 = 5;
    /// Poll intervals shorter than this are raised to it
    pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(500);
}
