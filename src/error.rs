// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;
use thiserror::Error;

use crate::wait::FetchError;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to load kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Failed to fetch resource state: {0}")]
    FetchFailure(#[from] FetchError),

    #[error("Timed out after {timeout:?} waiting for {target}")]
    WaitTimeoutExceeded { target: String, timeout: Duration },

    #[error("Wait for {0} was cancelled")]
    WaitCancelled(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    #[error("Field {0} cannot be changed in place, the resource must be replaced")]
    ImmutableField(String),

    #[error("Invalid JSONPath expression '{path}': {reason}")]
    InvalidJsonPath { path: String, reason: String },

    #[error("Invalid import id '{id}': {reason}")]
    InvalidImportId { id: String, reason: String },

    #[error("Invalid {kind} spec: {message}")]
    InvalidSpec { kind: String, message: String },

    #[error("Unsupported resource type: {0}")]
    UnknownResourceType(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;
