// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed diagnostics handed back to the caller of a provider operation.

use serde::Serialize;
use std::fmt;

use crate::error::ProviderError;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        };
        write!(f, "{}: {}\n\n  {}", level, self.summary, self.detail)
    }
}

impl From<&ProviderError> for Diagnostic {
    fn from(err: &ProviderError) -> Self {
        let summary = match err {
            ProviderError::WaitTimeoutExceeded { .. } => "Wait timeout exceeded",
            ProviderError::WaitCancelled(_) => "Wait cancelled",
            ProviderError::FetchFailure(_) => "Failed to observe resource state",
            ProviderError::KubeError(_) => "Kubernetes API request failed",
            ProviderError::KubeconfigError(_) => "Invalid provider configuration",
            ProviderError::NotFound(_) => "Resource not found",
            ProviderError::AlreadyExists(_) => "Resource already exists",
            ProviderError::ImmutableField(_) => "Resource requires replacement",
            ProviderError::InvalidJsonPath { .. } => "Invalid wait_for jsonpath",
            ProviderError::InvalidImportId { .. } => "Invalid import id",
            ProviderError::InvalidSpec { .. } => "Invalid resource spec",
            ProviderError::UnknownResourceType(_) => "Unsupported resource type",
        };
        Diagnostic::error(summary, err.to_string())
    }
}
