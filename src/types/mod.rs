// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed models of the Karmada custom resources exposed by the provider.

pub mod common;
pub mod federated_resource_quota;
pub mod override_policy;
pub mod propagation_policy;

pub use federated_resource_quota::{FederatedResourceQuota, FederatedResourceQuotaSpec};
pub use override_policy::{ClusterOverridePolicy, OverridePolicy, OverrideSpec};
pub use propagation_policy::{ClusterPropagationPolicy, PropagationPolicy, PropagationSpec};
